//! Fixed-point monetary amounts.
//!
//! All checkout amounts carry exactly two decimal places, matching the
//! `NUMERIC(_, 2)` columns they are stored in. Values are rounded half-to-even
//! on construction, the same way `PostgreSQL` quantizes numeric input.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors from building or combining money amounts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid money amount '{0}'")]
    Invalid(String),
    #[error("money amount {0} is outside ±{max}", max = Money::MAX_AMOUNT)]
    OutOfRange(Decimal),
    #[error("money arithmetic overflowed")]
    Overflow,
}

/// An amount of money with two decimal places.
///
/// Amounts are bounded by [`Money::MAX_AMOUNT`] in either direction, the
/// largest value a `NUMERIC(10,2)` column holds. Arithmetic that would leave
/// that range returns an error instead of wrapping or panicking.
///
/// ```
/// use critter_games_core::Money;
///
/// let price: Money = "19.99".parse().unwrap();
/// assert_eq!(price.times(3).unwrap().to_string(), "59.97");
/// assert_eq!(Money::ZERO.to_string(), "0.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places every amount is stored with.
    pub const SCALE: u32 = 2;

    /// Zero, rendered as `0.00`.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Largest magnitude an amount may have: `99999999.99`.
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, Self::SCALE);

    /// Create an amount, rounding to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the rounded amount exceeds
    /// [`Self::MAX_AMOUNT`] in magnitude.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        let mut rounded = amount.round_dp(Self::SCALE);
        if rounded.abs() > Self::MAX_AMOUNT {
            return Err(MoneyError::OutOfRange(amount));
        }
        rounded.rescale(Self::SCALE);
        Ok(Self(rounded))
    }

    /// Create an amount from a count of cents.
    ///
    /// Every `i32` cent count is within range.
    #[must_use]
    pub fn from_cents(cents: i32) -> Self {
        Self(Decimal::new(i64::from(cents), Self::SCALE))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit amount by a quantity.
    ///
    /// Negative quantities yield negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the product leaves the money range.
    pub fn times(self, quantity: i32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or(MoneyError::Overflow)
            .and_then(Self::new)
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the sum leaves the money range.
    pub fn checked_add(self, rhs: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(rhs.0)
            .ok_or(MoneyError::Overflow)
            .and_then(Self::new)
    }

    /// Sum amounts, failing as soon as a running total leaves the range.
    ///
    /// An empty iterator sums to zero.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the total leaves the money range.
    pub fn try_sum<I>(amounts: I) -> Result<Self, MoneyError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
