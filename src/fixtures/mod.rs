//! Fixtures
//!
//! Products, cart items and coupons described in YAML, read from
//! `<base>/{products,items,coupons}/<name>.yml`.

use std::{fs, path::PathBuf, sync::Arc};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{
        Cart,
        item::{CartItem, CartItemError},
    },
    catalog::{Product, TermError},
    coupons::{Coupon, CouponError, collection::CouponCollection},
    fixtures::{coupons::CouponsFixture, items::ItemsFixture, products::ProductsFixture},
    pricing::PricingError,
};

pub mod coupons;
pub mod items;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid billing term
    #[error("Invalid term: {0}")]
    InvalidTerm(#[from] TermError),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product has no billing terms
    #[error("Product has no terms: {0}")]
    NoTerms(String),

    /// Product has no term for the requested period
    #[error("Product {product} has no term for period {period}")]
    TermNotFound {
        /// Fixture key of the product
        product: String,
        /// Requested period
        period: u32,
    },

    /// Item data was rejected
    #[error("Invalid item: {0}")]
    Item(#[from] CartItemError),

    /// Coupon lookup or registration failed
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// No items loaded
    #[error("No items loaded; cannot create cart")]
    NoItems,

    /// Not enough items in fixture
    #[error("Not enough items in fixture, available: {available}, requested: {requested}")]
    NotEnoughItems {
        /// Number of items defined in the fixture
        available: usize,
        /// Number of items requested
        requested: usize,
    },
}

impl From<PricingError> for FixtureError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::UnknownCurrency(code) => FixtureError::UnknownCurrency(code),
            PricingError::InvalidPrice(price) => FixtureError::InvalidPrice(price),
            PricingError::AmountOutOfRange(amount) => FixtureError::InvalidPrice(amount.to_string()),
        }
    }
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Fixture key -> product
    products: FxHashMap<String, Arc<Product>>,

    /// Pre-built items, in file order
    items: Vec<CartItem>,

    coupons: CouponCollection,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            items: Vec::new(),
            coupons: CouponCollection::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for (key, product_fixture) in fixture.products {
            let (product, currency) = product_fixture.try_into_product()?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.insert(key, Arc::new(product));
        }

        Ok(self)
    }

    /// Load items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products or
    /// terms don't exist.
    pub fn load_items(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ItemsFixture = self.read("items", name)?;

        for item_fixture in fixture.items {
            let product = self.product(&item_fixture.product)?;
            let item = item_fixture.try_into_item(Arc::clone(product))?;

            self.items.push(item);
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if a coupon code is repeated.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CouponsFixture = self.read("coupons", name)?;

        for (code, coupon_fixture) in fixture.coupons {
            let coupon = coupon_fixture.try_into_coupon(code)?;

            self.coupons.insert(coupon)?;
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, items, and coupons with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_items(name)?
            .load_coupons(name)?;

        Ok(fixture)
    }

    /// Get a product by its fixture key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Arc<Product>, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a coupon by its code
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon is not found.
    pub fn coupon(&self, code: &str) -> Result<&Coupon, FixtureError> {
        Ok(self.coupons.get_coupon(code)?)
    }

    /// Get all items
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Get all coupons
    pub fn coupons(&self) -> &CouponCollection {
        &self.coupons
    }

    /// Create a cart from the loaded items, optionally only the first `n`
    ///
    /// # Errors
    ///
    /// Returns an error if no items are loaded or fewer than `n` are.
    pub fn cart(&self, n: Option<usize>) -> Result<Cart, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        if self.items.is_empty() {
            return Err(FixtureError::NoItems);
        }

        if let Some(n) = n
            && n > self.items.len()
        {
            return Err(FixtureError::NotEnoughItems {
                requested: n,
                available: self.items.len(),
            });
        }

        let items: Vec<CartItem> = self
            .items
            .iter()
            .take(n.unwrap_or(self.items.len()))
            .cloned()
            .collect();

        Ok(Cart::with_items(items, currency))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        category: &str,
        name: &str,
    ) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a percentage string, either `"25%"` or a fraction like `"0.25"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] if the number cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = match trimmed.strip_suffix('%') {
        Some(points) => points
            .trim()
            .parse::<Decimal>()
            .ok()
            .and_then(|points| points.checked_div(Decimal::ONE_HUNDRED)),
        None => trimmed.parse::<Decimal>().ok(),
    };

    fraction
        .map(Percentage::from)
        .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))
}
