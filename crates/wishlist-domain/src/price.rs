//! Price and currency normalization for wishes.
//!
//! A wish either carries both a price and a currency or neither. Prices are
//! stored as decimal strings with exactly two fractional digits.

use serde::Deserialize;

/// Price as sent by clients: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Width of the `wishes.price` column.
pub const MAX_PRICE_LEN: usize = 32;

/// Normalized `(price, currency)` pair. Both fields are `Some` or both `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pricing {
    pub price: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be a number")]
    NotNumeric,
    #[error("price must not be negative")]
    Negative,
    #[error("price is too large")]
    TooLarge,
    #[error("currency is required when price is set")]
    MissingCurrency,
    #[error("currency must be a 3-letter code")]
    InvalidCurrency,
}

impl PriceError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NotNumeric | Self::Negative | Self::TooLarge => "price",
            Self::MissingCurrency | Self::InvalidCurrency => "currency",
        }
    }
}

fn parse_amount(input: &PriceInput) -> Result<Option<f64>, PriceError> {
    let value = match input {
        PriceInput::Number(n) => *n,
        PriceInput::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>().map_err(|_| PriceError::NotNumeric)?
        }
    };
    if !value.is_finite() {
        return Err(PriceError::NotNumeric);
    }
    if value < 0.0 {
        return Err(PriceError::Negative);
    }
    Ok(Some(value))
}

/// Accepts a 3-letter alphabetic code in any case and returns it uppercased.
pub fn normalize_currency(code: &str) -> Result<String, PriceError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PriceError::InvalidCurrency);
    }
    Ok(code.to_ascii_uppercase())
}

/// Apply the price/currency coupling.
///
/// The amount is rounded to two decimals first; if the rounded value is zero
/// (or no price was given) both fields are cleared, whatever the currency.
pub fn normalize(
    price: Option<&PriceInput>,
    currency: Option<&str>,
) -> Result<Pricing, PriceError> {
    let amount = match price {
        Some(input) => parse_amount(input)?,
        None => None,
    };
    let formatted = match amount {
        Some(value) => format!("{value:.2}"),
        None => return Ok(Pricing::default()),
    };
    if formatted.parse::<f64>().unwrap_or(0.0) == 0.0 {
        return Ok(Pricing::default());
    }
    if formatted.len() > MAX_PRICE_LEN {
        return Err(PriceError::TooLarge);
    }

    let currency = match currency.map(str::trim) {
        Some(code) if !code.is_empty() => normalize_currency(code)?,
        _ => return Err(PriceError::MissingCurrency),
    };

    Ok(Pricing {
        price: Some(formatted),
        currency: Some(currency),
    })
}
