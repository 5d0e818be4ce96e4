//! Catalog
//!
//! Products that can be put in a cart, each billed over one or more [`Term`]s.

use std::{borrow::Borrow, fmt};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod term;

pub use term::{Term, TermError};

/// Opaque product identifier (e.g. `".com"` or `"hosting-silver"`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unit a product's billing period is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    /// Monthly billing
    Month,

    /// Yearly billing
    Year,
}

impl fmt::Display for BillingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingUnit::Month => f.write_str("month"),
            BillingUnit::Year => f.write_str("year"),
        }
    }
}

/// Kind of product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Domain name registration
    Domain,

    /// Shared hosting plan
    SharedHosting,

    /// SSL certificate
    Ssl,
}

impl ProductKind {
    /// Return the unit this kind of product is billed in.
    pub fn unit(self) -> BillingUnit {
        match self {
            ProductKind::Domain | ProductKind::Ssl => BillingUnit::Year,
            ProductKind::SharedHosting => BillingUnit::Month,
        }
    }
}

/// Ordered billing terms offered for a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    terms: Vec<Term>,
}

impl Billing {
    /// Create billing from a list of terms.
    pub fn new(terms: impl Into<Vec<Term>>) -> Self {
        Self {
            terms: terms.into(),
        }
    }

    /// Append a term.
    pub fn add_term(&mut self, term: Term) -> &mut Self {
        self.terms.push(term);
        self
    }

    /// All terms in the order they were added
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Find the term covering `period` billing periods.
    pub fn term(&self, period: u32) -> Option<&Term> {
        self.terms.iter().find(|term| term.period() == period)
    }

    /// The first term, offered when no period is requested.
    pub fn default_term(&self) -> Option<&Term> {
        self.terms.first()
    }
}

/// A purchasable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    kind: ProductKind,
    title: String,
    description: String,
    billing: Billing,
}

impl Product {
    /// Create a product with no description and no terms.
    pub fn new(id: impl Into<ProductId>, kind: ProductKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: String::new(),
            billing: Billing::default(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a billing term.
    #[must_use]
    pub fn with_term(mut self, term: Term) -> Self {
        self.billing.add_term(term);
        self
    }

    /// Return the product id
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Return the product kind
    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    /// Return the title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Return the description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Return the billing terms
    pub fn billing(&self) -> &Billing {
        &self.billing
    }

    /// Return the billing terms, mutably.
    pub fn billing_mut(&mut self) -> &mut Billing {
        &mut self.billing
    }

    /// Return the unit the product is billed in
    pub fn unit(&self) -> BillingUnit {
        self.kind.unit()
    }

    /// Price of the product over the given term.
    pub fn price_for_term(&self, term: &Term) -> Decimal {
        self.resolve_term(term).total_price()
    }

    /// Amount saved over the given term.
    pub fn save_for_term(&self, term: &Term) -> Decimal {
        self.resolve_term(term).save()
    }

    /// Saving over the given term as a fraction.
    pub fn save_percent_for_term(&self, term: &Term) -> Percentage {
        self.resolve_term(term).save_percent()
    }

    /// Prefer this product's own pricing for the term's period, falling back to the term given.
    fn resolve_term<'a>(&'a self, term: &'a Term) -> &'a Term {
        self.billing.term(term.period()).unwrap_or(term)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn domain() -> Result<Product, TermError> {
        Ok(Product::new(".com", ProductKind::Domain, ".com Registration")
            .with_term(
                Term::new(1)?
                    .with_price(Decimal::new(1299, 2))
                    .with_old(Decimal::new(1499, 2)),
            )
            .with_term(Term::new(2)?.with_price(Decimal::new(1199, 2))))
    }

    #[test]
    fn accessors_return_constructor_values() -> TestResult {
        let product = domain()?.with_description("Register a .com");

        assert_eq!(product.id(), &ProductId::from(".com"));
        assert_eq!(product.kind(), ProductKind::Domain);
        assert_eq!(product.title(), ".com Registration");
        assert_eq!(product.description(), "Register a .com");
        assert_eq!(product.billing().terms().len(), 2);

        Ok(())
    }

    #[test]
    fn unit_follows_product_kind() {
        assert_eq!(ProductKind::Domain.unit(), BillingUnit::Year);
        assert_eq!(ProductKind::Ssl.unit(), BillingUnit::Year);
        assert_eq!(ProductKind::SharedHosting.unit(), BillingUnit::Month);
        assert_eq!(BillingUnit::Month.to_string(), "month");
    }

    #[test]
    fn price_for_term_uses_matching_billing_term() -> TestResult {
        let product = domain()?;

        // Same period, but the caller's copy carries a stale price.
        let stale = Term::new(2)?.with_price(Decimal::ONE);

        assert_eq!(product.price_for_term(&stale), Decimal::new(2398, 2));

        Ok(())
    }

    #[test]
    fn price_for_term_falls_back_to_given_term() -> TestResult {
        let product = domain()?;
        let term = Term::new(5)?.with_price(Decimal::from(10));

        assert_eq!(product.price_for_term(&term), Decimal::from(50));

        Ok(())
    }

    #[test]
    fn save_for_term_delegates_to_term() -> TestResult {
        let product = domain()?;
        let term = Term::new(1)?;

        assert_eq!(product.save_for_term(&term), Decimal::from(2));
        assert_eq!(product.save_for_term(&Term::new(2)?), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn default_term_is_first_term() -> TestResult {
        let product = domain()?;

        assert_eq!(product.billing().default_term().map(Term::period), Some(1));
        assert!(product.billing().term(3).is_none());

        Ok(())
    }

    #[test]
    fn product_id_displays_raw_value() {
        assert_eq!(ProductId::new("hosting").to_string(), "hosting");
        assert_eq!(ProductId::new("hosting").as_str(), "hosting");
    }
}
