use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// ISO 4217-style currency code.
///
/// Supports standard fiat currencies (BGN, EUR, USD, etc.) as well as
/// arbitrary identifiers for informal settlement units.
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::CurrencyCode;
///
/// let bgn = CurrencyCode::new("BGN");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(bgn, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from currency conversion.
#[derive(Debug, Error)]
pub enum FxError {
    #[error("no exchange rate available for {currency} against base {base}")]
    RateNotFound {
        currency: CurrencyCode,
        base: CurrencyCode,
    },
    #[error("exchange rate must be positive, got {rate} for {currency}")]
    InvalidRate {
        currency: CurrencyCode,
        rate: Decimal,
    },
}

/// Conversion capability required by callers that record expenses in
/// foreign currencies.
///
/// The split and settlement engine itself never converts: it operates on
/// amounts already expressed in the group's base currency. This trait is
/// the seam where a rate-fetching implementation plugs in without the
/// engine depending on network or caching behavior.
pub trait CurrencyConverter {
    /// Convert `amount` from one currency to another, rounded to 2 decimals.
    fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, FxError>;
}

/// In-memory exchange rate table relative to a single base currency.
///
/// Stores one rate per currency: 1 unit of base = `rate` units of that
/// currency. Cross conversion between two non-base currencies routes
/// through the base.
///
/// # Examples
///
/// ```
/// use split_engine::core::currency::{CurrencyCode, CurrencyConverter, RateTable};
/// use rust_decimal_macros::dec;
///
/// let mut rates = RateTable::new(CurrencyCode::new("BGN"));
/// rates.set_rate(CurrencyCode::new("EUR"), dec!(0.51)).unwrap();
///
/// let converted = rates.convert(
///     dec!(100),
///     &CurrencyCode::new("BGN"),
///     &CurrencyCode::new("EUR"),
/// ).unwrap();
/// assert_eq!(converted, dec!(51.00));
/// ```
#[derive(Debug, Clone)]
pub struct RateTable {
    /// The base currency every stored rate is quoted against.
    pub base_currency: CurrencyCode,
    /// currency -> units per 1 unit of base.
    rates: HashMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Create an empty rate table with the given base currency.
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            base_currency,
            rates: HashMap::new(),
        }
    }

    /// Set the rate for a currency: 1 unit of base = `rate` units of `currency`.
    pub fn set_rate(&mut self, currency: CurrencyCode, rate: Decimal) -> Result<(), FxError> {
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate { currency, rate });
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Get the stored rate for a currency against the base.
    pub fn rate(&self, currency: &CurrencyCode) -> Result<Decimal, FxError> {
        if currency == &self.base_currency {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| FxError::RateNotFound {
                currency: currency.clone(),
                base: self.base_currency.clone(),
            })
    }
}

impl CurrencyConverter for RateTable {
    fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(amount);
        }
        // Route through the base currency.
        let base_amount = amount / self.rate(from)?;
        Ok((base_amount * self.rate(to)?).round_dp(2))
    }
}
