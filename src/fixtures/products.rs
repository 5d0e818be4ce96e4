//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    catalog::{Product, ProductKind, Term},
    fixtures::FixtureError,
    pricing::parse_price,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of fixture key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id coupons refer to
    pub id: String,

    /// Product kind
    pub kind: ProductKind,

    /// Product title
    pub title: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Billing terms, the first being the default
    pub terms: Vec<TermFixture>,
}

/// Billing term fixture from YAML
#[derive(Debug, Deserialize)]
pub struct TermFixture {
    /// Number of billing periods
    pub period: u32,

    /// Price per period (e.g. "12.99 USD")
    pub price: String,

    /// List price per period
    pub old: Option<String>,

    /// First period trial price
    pub trial: Option<String>,
}

impl TermFixture {
    /// Convert to a [`Term`], returning the currency of its prices.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed, the prices disagree on currency, or the
    /// period is zero.
    pub fn try_into_term(self) -> Result<(Term, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price)?;

        let mut term = Term::new(self.period)?.with_price(price);

        if let Some(old) = self.old {
            term = term.with_old(parse_in_currency(&old, currency)?);
        }

        if let Some(trial) = self.trial {
            term = term.with_trial(parse_in_currency(&trial, currency)?);
        }

        Ok((term, currency))
    }
}

impl ProductFixture {
    /// Convert to a [`Product`], returning the currency it is priced in.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has no terms, a term is invalid, or terms are priced
    /// in different currencies.
    pub fn try_into_product(self) -> Result<(Product, &'static Currency), FixtureError> {
        let mut product =
            Product::new(self.id.as_str(), self.kind, self.title).with_description(self.description);

        let mut product_currency = None;

        for term_fixture in self.terms {
            let (term, currency) = term_fixture.try_into_term()?;

            match product_currency {
                Some(existing) if existing != currency => {
                    return Err(currency_mismatch(existing, currency));
                }
                _ => product_currency = Some(currency),
            }

            product.billing_mut().add_term(term);
        }

        let currency = product_currency.ok_or(FixtureError::NoTerms(self.id))?;

        Ok((product, currency))
    }
}

fn parse_in_currency(value: &str, currency: &'static Currency) -> Result<Decimal, FixtureError> {
    let (amount, found) = parse_price(value)?;

    if found != currency {
        return Err(currency_mismatch(currency, found));
    }

    Ok(amount)
}

fn currency_mismatch(expected: &Currency, found: &Currency) -> FixtureError {
    FixtureError::CurrencyMismatch(
        expected.iso_alpha_code.to_string(),
        found.iso_alpha_code.to_string(),
    )
}
