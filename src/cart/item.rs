//! Cart Items
//!
//! A cart item pairs a product and billing term with quantity, price, tax and the
//! discount written by coupons. The well-known fields are typed; any other key is
//! kept verbatim in an ordered attribute map (e.g. the domain name being registered).

use std::{collections::BTreeMap, fmt, sync::Arc};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{
    catalog::{BillingUnit, Product, ProductId, Term},
    pricing::{PricingError, line_total},
};

const ID: &str = "id";
const QUANTITY: &str = "quantity";
const PRICE: &str = "price";
const TAX: &str = "tax";
const DISCOUNT: &str = "discount";
const TERM: &str = "term";
const PRODUCT: &str = "product";

/// Errors raised when reading or writing cart item data.
#[derive(Debug, Error)]
pub enum CartItemError {
    /// The value assigned to an integer field was not an integer.
    #[error("{0} must be an integer")]
    NotAnInteger(String),

    /// Quantity must be a positive integer that fits in a `u32`.
    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    /// The value assigned to a numeric field was not numeric.
    #[error("{0} must be numeric")]
    NotNumeric(String),

    /// The value assigned to `term` was not a billing term.
    #[error("term must be a billing term")]
    NotATerm,

    /// The key is derived or bound at construction and cannot be assigned.
    #[error("{0} cannot be assigned")]
    ReadOnlyKey(String),

    /// No value is stored under the key.
    #[error("undefined cart item key: {0}")]
    UndefinedKey(String),

    /// The item could not be serialized for hashing.
    #[error("failed to serialize cart item: {0}")]
    Identity(#[from] serde_json::Error),
}

/// A value stored on a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ItemValue {
    /// Whole number
    Integer(i64),

    /// Decimal amount
    Decimal(Decimal),

    /// Free text
    Text(String),

    /// Flag
    Bool(bool),

    /// Billing term
    Term(Term),
}

impl ItemValue {
    /// Return the value as a decimal if it is numeric.
    ///
    /// Integers, decimals and text that parses as a decimal number are numeric.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ItemValue::Integer(value) => Some(Decimal::from(*value)),
            ItemValue::Decimal(value) => Some(*value),
            ItemValue::Text(value) => value.trim().parse().ok(),
            ItemValue::Bool(_) | ItemValue::Term(_) => None,
        }
    }

    /// Copy of the value with decimal amounts at their smallest scale.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            ItemValue::Decimal(value) => ItemValue::Decimal(value.normalize()),
            ItemValue::Term(term) => ItemValue::Term(term.normalized()),
            other => other.clone(),
        }
    }

    /// Return the value if it is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ItemValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Return the value if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ItemValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i32> for ItemValue {
    fn from(value: i32) -> Self {
        ItemValue::Integer(i64::from(value))
    }
}

impl From<i64> for ItemValue {
    fn from(value: i64) -> Self {
        ItemValue::Integer(value)
    }
}

impl From<u32> for ItemValue {
    fn from(value: u32) -> Self {
        ItemValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for ItemValue {
    fn from(value: Decimal) -> Self {
        ItemValue::Decimal(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        ItemValue::Text(value.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        ItemValue::Text(value)
    }
}

impl From<bool> for ItemValue {
    fn from(value: bool) -> Self {
        ItemValue::Bool(value)
    }
}

impl From<Term> for ItemValue {
    fn from(value: Term) -> Self {
        ItemValue::Term(value)
    }
}

/// Content hash identifying an item's configuration, independent of quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Return the hash as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything that identifies an item. Quantity is deliberately absent.
#[derive(Serialize)]
struct Identity<'a> {
    product: Option<&'a Product>,
    term: Option<Term>,
    price: Decimal,
    tax: Decimal,
    discount: Decimal,
    attributes: BTreeMap<&'a str, ItemValue>,
}

/// A single line in a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    product: Option<Arc<Product>>,
    term: Option<Term>,
    #[serde(deserialize_with = "deserialize_quantity")]
    quantity: u32,
    price: Decimal,
    tax: Decimal,
    discount: Decimal,
    #[serde(default)]
    attributes: BTreeMap<String, ItemValue>,
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match u32::deserialize(deserializer)? {
        0 => Err(de::Error::custom(CartItemError::InvalidQuantity(0))),
        quantity => Ok(quantity),
    }
}

impl CartItem {
    /// Create an empty item: quantity 1, zero price, tax and discount.
    pub fn new() -> Self {
        Self {
            product: None,
            term: None,
            quantity: 1,
            price: Decimal::ZERO,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            attributes: BTreeMap::new(),
        }
    }

    /// Create an item for a product billed over `term`.
    pub fn for_product(product: Arc<Product>, term: Term) -> Self {
        Self {
            product: Some(product),
            term: Some(term),
            ..Self::new()
        }
    }

    /// Create an item from key/value data merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns the first validation error raised by [`CartItem::set`].
    pub fn with_data<K: AsRef<str>>(
        data: impl IntoIterator<Item = (K, ItemValue)>,
    ) -> Result<Self, CartItemError> {
        let mut item = Self::new();

        for (key, value) in data {
            item.assign(key.as_ref(), value)?;
        }

        Ok(item)
    }

    /// Get a piece of data set on the item.
    ///
    /// `id` returns the content hash, `product` the product id.
    ///
    /// # Errors
    ///
    /// Returns [`CartItemError::UndefinedKey`] if nothing is stored under `key`.
    pub fn get(&self, key: &str) -> Result<ItemValue, CartItemError> {
        let undefined = || CartItemError::UndefinedKey(key.to_string());

        match key {
            ID => Ok(ItemValue::Text(self.id()?.to_string())),
            QUANTITY => Ok(ItemValue::Integer(i64::from(self.quantity))),
            PRICE => Ok(ItemValue::Decimal(self.price)),
            TAX => Ok(ItemValue::Decimal(self.tax)),
            DISCOUNT => Ok(ItemValue::Decimal(self.discount)),
            TERM => self.term.clone().map(ItemValue::Term).ok_or_else(undefined),
            PRODUCT => self
                .product
                .as_ref()
                .map(|product| ItemValue::Text(product.id().to_string()))
                .ok_or_else(undefined),
            _ => self.attributes.get(key).cloned().ok_or_else(undefined),
        }
    }

    /// Set a piece of data on the item and return the item's new id.
    ///
    /// `quantity` must be a positive integer; `price`, `tax` and `discount` must be
    /// numeric and are stored as decimals. Unknown keys are stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns a [`CartItemError`] if the value does not suit the key.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<ItemValue>,
    ) -> Result<ItemId, CartItemError> {
        self.assign(key, value.into())?;
        self.id()
    }

    /// Determine if a piece of data is set on the item.
    pub fn contains(&self, key: &str) -> bool {
        match key {
            ID | QUANTITY | PRICE | TAX | DISCOUNT => true,
            TERM => self.term.is_some(),
            PRODUCT => self.product.is_some(),
            _ => self.attributes.contains_key(key),
        }
    }

    /// Remove a piece of data from the item, returning it.
    ///
    /// Quantity, price, tax, discount and id always have a value and are left alone.
    pub fn remove(&mut self, key: &str) -> Option<ItemValue> {
        match key {
            ID | QUANTITY | PRICE | TAX | DISCOUNT => None,
            TERM => self.term.take().map(ItemValue::Term),
            PRODUCT => self
                .product
                .take()
                .map(|product| ItemValue::Text(product.id().to_string())),
            _ => self.attributes.remove(key),
        }
    }

    /// Content hash over every field except quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartItemError::Identity`] if the item cannot be serialized.
    pub fn id(&self) -> Result<ItemId, CartItemError> {
        let identity = Identity {
            product: self.product.as_deref(),
            term: self.term.as_ref().map(Term::normalized),
            price: self.price.normalize(),
            tax: self.tax.normalize(),
            discount: self.discount.normalize(),
            attributes: self
                .attributes
                .iter()
                .map(|(key, value)| (key.as_str(), value.normalized()))
                .collect(),
        };

        let canonical = serde_json::to_vec(&identity)?;

        Ok(ItemId(format!("{:x}", Sha256::digest(&canonical))))
    }

    /// Return the discount
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Overwrite the discount.
    pub fn set_discount(&mut self, discount: Decimal) {
        self.discount = discount;
    }

    /// Return the product
    pub fn product(&self) -> Option<&Arc<Product>> {
        self.product.as_ref()
    }

    /// Return the product id
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.as_deref().map(Product::id)
    }

    /// Return the billing term
    pub fn term(&self) -> Option<&Term> {
        self.term.as_ref()
    }

    /// Return the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Return the tax per unit
    pub fn tax(&self) -> Decimal {
        self.tax
    }

    /// Unit price excluding tax.
    ///
    /// Looked up from the product for the item's term when both are set, otherwise
    /// the stored price.
    pub fn price(&self) -> Decimal {
        match (self.product.as_deref(), self.term.as_ref()) {
            (Some(product), Some(term)) => product.price_for_term(term),
            _ => self.price,
        }
    }

    /// Unit price minus the discount
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountOutOfRange`] if the difference overflows.
    pub fn price_with_discount(&self) -> Result<Decimal, PricingError> {
        self.price()
            .checked_sub(self.discount)
            .ok_or(PricingError::AmountOutOfRange(self.discount))
    }

    /// Line total including tax
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountOutOfRange`] if the total overflows.
    pub fn total_price(&self) -> Result<Decimal, PricingError> {
        line_total(self.single_price()?, self.quantity)
    }

    /// Line total excluding tax
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountOutOfRange`] if the total overflows.
    pub fn total_price_excluding_tax(&self) -> Result<Decimal, PricingError> {
        line_total(self.price(), self.quantity)
    }

    /// Unit price including tax
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountOutOfRange`] if the sum overflows.
    pub fn single_price(&self) -> Result<Decimal, PricingError> {
        self.price()
            .checked_add(self.tax)
            .ok_or(PricingError::AmountOutOfRange(self.tax))
    }

    /// Unit price excluding tax
    pub fn single_price_excluding_tax(&self) -> Decimal {
        self.price()
    }

    /// Line tax
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountOutOfRange`] if the total overflows.
    pub fn total_tax(&self) -> Result<Decimal, PricingError> {
        line_total(self.tax, self.quantity)
    }

    /// Unit tax
    pub fn single_tax(&self) -> Decimal {
        self.tax
    }

    /// Return the product title
    pub fn title(&self) -> Option<&str> {
        self.product.as_deref().map(Product::title)
    }

    /// Return the product description
    pub fn description(&self) -> Option<&str> {
        self.product.as_deref().map(Product::description)
    }

    /// Return the unit the product is billed in
    pub fn unit(&self) -> Option<BillingUnit> {
        self.product.as_deref().map(Product::unit)
    }

    /// All terms the product can be billed over
    pub fn terms(&self) -> &[Term] {
        self.product
            .as_deref()
            .map(|product| product.billing().terms())
            .unwrap_or_default()
    }

    /// Term saving plus any coupon discount.
    pub fn save(&self) -> Decimal {
        let term_save = match (self.product.as_deref(), self.term.as_ref()) {
            (Some(product), Some(term)) => product.save_for_term(term),
            _ => Decimal::ZERO,
        };

        term_save + self.discount
    }

    /// Term saving as a fraction, when the item has a product and term.
    pub fn save_percent(&self) -> Option<Percentage> {
        match (self.product.as_deref(), self.term.as_ref()) {
            (Some(product), Some(term)) => Some(product.save_percent_for_term(term)),
            _ => None,
        }
    }

    fn assign(&mut self, key: &str, value: ItemValue) -> Result<(), CartItemError> {
        match key {
            QUANTITY => {
                let quantity = value
                    .as_integer()
                    .ok_or_else(|| CartItemError::NotAnInteger(key.to_string()))?;

                self.quantity = u32::try_from(quantity)
                    .ok()
                    .filter(|quantity| *quantity >= 1)
                    .ok_or(CartItemError::InvalidQuantity(quantity))?;
            }
            PRICE => self.price = numeric(key, &value)?,
            TAX => self.tax = numeric(key, &value)?,
            DISCOUNT => self.discount = numeric(key, &value)?,
            TERM => {
                let ItemValue::Term(term) = value else {
                    return Err(CartItemError::NotATerm);
                };

                self.term = Some(term);
            }
            ID | PRODUCT => return Err(CartItemError::ReadOnlyKey(key.to_string())),
            _ => {
                self.attributes.insert(key.to_string(), value);
            }
        }

        Ok(())
    }
}

impl Default for CartItem {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric(key: &str, value: &ItemValue) -> Result<Decimal, CartItemError> {
    value
        .as_decimal()
        .ok_or_else(|| CartItemError::NotNumeric(key.to_string()))
}
