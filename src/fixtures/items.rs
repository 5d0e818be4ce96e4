//! Item Fixtures

use std::{collections::BTreeMap, sync::Arc};

use serde::Deserialize;

use crate::{
    cart::item::{CartItem, ItemValue},
    catalog::Product,
    fixtures::FixtureError,
};

/// Wrapper for items in YAML
#[derive(Debug, Deserialize)]
pub struct ItemsFixture {
    /// Items in cart order
    pub items: Vec<ItemFixture>,
}

/// Cart item fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Fixture key of the product
    pub product: String,

    /// Billing period; the product's first term when omitted
    pub period: Option<u32>,

    /// Quantity, 1 when omitted
    pub quantity: Option<u32>,

    /// Extra item data (e.g. the domain name)
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeFixture>,
}

/// Scalar attribute value from YAML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AttributeFixture {
    /// Flag
    Bool(bool),

    /// Whole number
    Integer(i64),

    /// Text
    Text(String),
}

impl From<AttributeFixture> for ItemValue {
    fn from(attribute: AttributeFixture) -> Self {
        match attribute {
            AttributeFixture::Bool(value) => ItemValue::Bool(value),
            AttributeFixture::Integer(value) => ItemValue::Integer(value),
            AttributeFixture::Text(value) => ItemValue::Text(value),
        }
    }
}

impl ItemFixture {
    /// Convert to a [`CartItem`] for the already resolved product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has no term for the period, or the quantity or an
    /// attribute is rejected by the item.
    pub fn try_into_item(self, product: Arc<Product>) -> Result<CartItem, FixtureError> {
        let term = match self.period {
            Some(period) => product.billing().term(period),
            None => product.billing().default_term(),
        };

        let term = match (term, self.period) {
            (Some(term), _) => term.clone(),
            (None, Some(period)) => {
                return Err(FixtureError::TermNotFound {
                    product: self.product,
                    period,
                });
            }
            (None, None) => return Err(FixtureError::NoTerms(self.product)),
        };

        let mut item = CartItem::for_product(product, term);

        if let Some(quantity) = self.quantity {
            item.set("quantity", quantity)?;
        }

        for (key, value) in self.attributes {
            item.set(&key, value)?;
        }

        Ok(item)
    }
}
