//! Integration tests for the SQL Server adapter
//!
//! SQL Server containers are slow to boot, so the whole contract runs against
//! one container, each step under its own category.

mod common;

use domain_products::MssqlProductRepository;
use test_utils::{TestDataBuilder, TestMssql};

#[tokio::test]
async fn test_repository_contract() {
    let db = TestMssql::new().await;
    let repo = MssqlProductRepository::new(db.pool());

    common::round_trip(&repo, &TestDataBuilder::from_test_name("mssql_round_trip")).await;
    common::price_extremes(&repo, &TestDataBuilder::from_test_name("mssql_price_extremes")).await;
    common::listing_window(&repo, &TestDataBuilder::from_test_name("mssql_listing_window")).await;
    common::listing_filters(&repo, &TestDataBuilder::from_test_name("mssql_listing_filters")).await;
    common::update_and_delete(&repo, &TestDataBuilder::from_test_name("mssql_update_and_delete"))
        .await;
    common::name_lookup(&repo, &TestDataBuilder::from_test_name("mssql_name_lookup")).await;
    common::duplicate_name_through_service(
        repo.clone(),
        &TestDataBuilder::from_test_name("mssql_duplicate_name"),
    )
    .await;
}

#[tokio::test]
async fn test_zero_limit_returns_nothing() {
    let db = TestMssql::new().await;
    let repo = MssqlProductRepository::new(db.pool());
    let builder = TestDataBuilder::from_test_name("mssql_zero_limit");

    common::seed(&repo, &builder, 2).await;

    let found = domain_products::ProductRepository::find_all(
        &repo,
        &domain_products::ProductFilters::page(0, 0).with_category(builder.category()),
    )
    .await
    .unwrap();
    assert!(found.is_empty());
}
