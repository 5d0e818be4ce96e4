//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

/// Errors that can occur while converting amounts.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount does not fit in the currency's minor units.
    #[error("amount {0} cannot be represented in minor units")]
    AmountOutOfRange(Decimal),

    /// The string is not in the format "AMOUNT CURRENCY".
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// The currency code is not one we price in.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Converts a decimal amount to money, rounding half away from zero to minor units.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] if the amount overflows `i64` minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .and_then(|scale| amount.checked_mul(scale))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or(PricingError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Sums decimal amounts.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] if the sum overflows `Decimal`.
pub fn sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, PricingError> {
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount)
            .ok_or(PricingError::AmountOutOfRange(amount))
    })
}

/// Multiplies a unit amount by a quantity.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] if the product overflows `Decimal`.
pub fn line_total(unit: Decimal, quantity: u32) -> Result<Decimal, PricingError> {
    unit.checked_mul(Decimal::from(quantity))
        .ok_or(PricingError::AmountOutOfRange(unit))
}

/// Parse a price string (e.g., "12.99 USD") into an amount and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), PricingError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(PricingError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PricingError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(PricingError::UnknownCurrency(other.to_string())),
    };

    Ok((amount, currency))
}
