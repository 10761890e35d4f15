use rust_decimal::Decimal;
use std::fmt;

use crate::models::DomainError;

/// A strictly positive monetary amount.
///
/// The only way to obtain a `Price` is [`Price::new`], so holding one proves the
/// amount is above zero and fits a `DECIMAL(19, 4)` column exactly. There are no
/// mutators; a price change replaces the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Fractional digits kept by the price columns.
    pub const MAX_SCALE: u32 = 4;

    /// 999999999999999.9999, the largest `DECIMAL(19, 4)` value.
    pub const MAX: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, 4);

    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount <= Decimal::ZERO
            || amount > Self::MAX
            || amount.normalize().scale() > Self::MAX_SCALE
        {
            return Err(DomainError::InvalidPrice);
        }
        Ok(Self(amount))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}
