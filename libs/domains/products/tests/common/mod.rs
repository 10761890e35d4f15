//! Repository contract shared by every storage backend.
//!
//! Each backend's integration test file starts its own container and runs
//! these checks against it, so PostgreSQL and SQL Server are held to the same
//! observable behaviour.

#![allow(dead_code)]

use domain_products::*;
use rust_decimal::Decimal;
use std::time::Duration;
use test_utils::TestDataBuilder;
use uuid::Uuid;

pub fn product(name: &str, description: &str, category: &str) -> Product {
    Product::new(name, description, Decimal::new(1999, 2), 7, category).unwrap()
}

/// Create `n` products in `category`, oldest first.
pub async fn seed<R: ProductRepository>(repo: &R, builder: &TestDataBuilder, n: usize) -> Vec<Product> {
    let category = builder.category();
    let mut seeded = Vec::with_capacity(n);
    for i in 0..n {
        let p = product(&builder.name("product", &i.to_string()), "", &category);
        repo.create(&p).await.unwrap();
        seeded.push(p);
        // distinct created_at values keep the expected order unambiguous
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    seeded
}

fn ids(products: &[Product]) -> Vec<Uuid> {
    products.iter().map(Product::id).collect()
}

pub async fn round_trip<R: ProductRepository>(repo: &R, builder: &TestDataBuilder) {
    let category = builder.category();
    let plain = product(&builder.name("product", "plain"), "", &category);
    let described = product(&builder.name("product", "described"), "blue and shiny", &category);

    repo.create(&plain).await.unwrap();
    repo.create(&described).await.unwrap();

    let found = repo.find_by_id(plain.id()).await.unwrap();
    assert_eq!(found.as_ref(), Some(&plain));
    assert_eq!(found.unwrap().description(), "");

    let found = repo.find_by_id(described.id()).await.unwrap().unwrap();
    assert_eq!(found, described);
    assert_eq!(found.price().value(), Decimal::new(1999, 2));
    assert_eq!(found.created_at(), described.created_at());

    assert!(repo.find_by_id(Uuid::now_v7()).await.unwrap().is_none());
}

/// The largest and smallest prices the columns hold come back unchanged.
pub async fn price_extremes<R: ProductRepository>(repo: &R, builder: &TestDataBuilder) {
    let category = builder.category();
    let mut stored = Vec::new();
    for (suffix, amount) in [("max", Price::MAX), ("min", Decimal::new(1, 4))] {
        let p = Product::new(builder.name("product", suffix), "", amount, 1, &category).unwrap();
        repo.create(&p).await.unwrap();
        stored.push(p);
    }

    for p in &stored {
        let found = repo.find_by_id(p.id()).await.unwrap().unwrap();
        assert_eq!(found.price(), p.price());
    }

    let listed = repo
        .find_all(&ProductFilters::default().with_category(category))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|p| p.price().value() == Price::MAX));
}

pub async fn listing_window<R: ProductRepository>(repo: &R, builder: &TestDataBuilder) {
    let seeded = seed(repo, builder, 5).await;
    let newest_first: Vec<Uuid> = seeded.iter().rev().map(Product::id).collect();
    let category = builder.category();

    let all = repo
        .find_all(&ProductFilters::default().with_category(category.clone()))
        .await
        .unwrap();
    assert_eq!(ids(&all), newest_first);

    let first_page = repo
        .find_all(&ProductFilters::page(2, 0).with_category(category.clone()))
        .await
        .unwrap();
    assert_eq!(ids(&first_page), newest_first[..2]);

    let last_page = repo
        .find_all(&ProductFilters::page(2, 4).with_category(category.clone()))
        .await
        .unwrap();
    assert_eq!(ids(&last_page), newest_first[4..]);

    let past_end = repo
        .find_all(&ProductFilters::page(2, 5).with_category(category))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

pub async fn listing_filters<R: ProductRepository>(repo: &R, builder: &TestDataBuilder) {
    let mut seeded = seed(repo, builder, 3).await;
    seeded[1].deactivate();
    assert_eq!(repo.update(&seeded[1]).await.unwrap(), WriteOutcome::Applied);
    let category = builder.category();

    let inactive = repo
        .find_all(&ProductFilters::default().with_category(category.clone()).with_active(false))
        .await
        .unwrap();
    assert_eq!(ids(&inactive), vec![seeded[1].id()]);

    let active = repo
        .find_all(&ProductFilters::default().with_category(category).with_active(true))
        .await
        .unwrap();
    assert_eq!(ids(&active), vec![seeded[2].id(), seeded[0].id()]);

    let elsewhere = repo
        .find_all(&ProductFilters::default().with_category("no-such-category"))
        .await
        .unwrap();
    assert!(elsewhere.is_empty());
}

pub async fn update_and_delete<R: ProductRepository>(repo: &R, builder: &TestDataBuilder) {
    let category = builder.category();
    let mut p = product(&builder.name("product", "mutable"), "before", &category);
    repo.create(&p).await.unwrap();

    p.update(
        builder.name("product", "renamed"),
        "",
        Decimal::new(500, 2),
        0,
        category.clone(),
    )
    .unwrap();
    assert_eq!(repo.update(&p).await.unwrap(), WriteOutcome::Applied);

    let stored = repo.find_by_id(p.id()).await.unwrap().unwrap();
    assert_eq!(stored, p);
    assert_eq!(stored.description(), "");
    assert_eq!(stored.stock(), 0);

    assert_eq!(repo.delete(p.id()).await.unwrap(), WriteOutcome::Applied);
    assert!(repo.find_by_id(p.id()).await.unwrap().is_none());

    // both the vanished row and a never-seen id report NotFound, not an error
    assert_eq!(repo.update(&p).await.unwrap(), WriteOutcome::NotFound);
    assert_eq!(repo.delete(p.id()).await.unwrap(), WriteOutcome::NotFound);
    let ghost = product(&builder.name("product", "ghost"), "", &category);
    assert_eq!(repo.update(&ghost).await.unwrap(), WriteOutcome::NotFound);
}

pub async fn name_lookup<R: ProductRepository>(repo: &R, builder: &TestDataBuilder) {
    let name = builder.name("product", "unique");
    assert!(!repo.exists_by_name(&name).await.unwrap());

    repo.create(&product(&name, "", &builder.category())).await.unwrap();
    assert!(repo.exists_by_name(&name).await.unwrap());
    assert!(!repo.exists_by_name(&format!("{name}-other")).await.unwrap());
}

/// Uniqueness lives in the service; through it a second create conflicts and
/// nothing new is stored.
pub async fn duplicate_name_through_service<R: ProductRepository>(repo: R, builder: &TestDataBuilder) {
    let service = ProductService::new(repo);
    let input = || CreateProduct {
        name: builder.name("product", "dup"),
        description: String::new(),
        price: Decimal::new(999, 2),
        stock: Some(1),
        category: builder.category(),
    };

    service.create_product(input()).await.unwrap();
    let err = service.create_product(input()).await.unwrap_err();
    assert!(matches!(err, ProductError::Conflict(_)));

    let listed = service
        .list_products(ProductListQuery {
            category: Some(builder.category()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
