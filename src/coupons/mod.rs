//! Coupons
//!
//! A coupon binds a code and a set of eligible products to one discount strategy.
//! Applying it writes a discount onto qualifying cart items in place.

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, item::CartItem},
    catalog::ProductId,
    coupons::{
        buy_one_get_one::BuyOneGetOne, free_addon::FreeAddon, percent_discount::PercentDiscount,
    },
};

pub mod buy_one_get_one;
pub mod collection;
pub mod free_addon;
pub mod percent_discount;

/// Errors related to coupon lookup and registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon is registered under the code.
    #[error("coupon not found: {0}")]
    NotFound(String),

    /// A coupon is already registered under the code.
    #[error("duplicate coupon code: {0}")]
    DuplicateCode(String),
}

/// Discount strategy enum
#[derive(Debug, Clone)]
pub enum CouponStrategy {
    /// Percentage off every eligible item
    PercentDiscount(PercentDiscount),

    /// Every second eligible item free or half price
    BuyOneGetOne(BuyOneGetOne),

    /// An addon product free with an eligible purchase
    FreeAddon(FreeAddon),
}

impl CouponStrategy {
    /// Apply the strategy to the cart, returning how many items were discounted.
    pub fn calculate_discount(&self, products: &FxHashSet<ProductId>, cart: &mut Cart) -> usize {
        match self {
            CouponStrategy::PercentDiscount(percent_discount) => {
                percent_discount.calculate_discount(products, cart)
            }
            CouponStrategy::BuyOneGetOne(buy_one_get_one) => {
                buy_one_get_one.calculate_discount(products, cart)
            }
            CouponStrategy::FreeAddon(free_addon) => free_addon.calculate_discount(products, cart),
        }
    }

    /// Short name of the strategy, as used in fixtures and logs.
    pub fn name(&self) -> &'static str {
        match self {
            CouponStrategy::PercentDiscount(_) => "percent_discount",
            CouponStrategy::BuyOneGetOne(_) => "buy_one_get_one",
            CouponStrategy::FreeAddon(_) => "free_addon",
        }
    }
}

impl From<PercentDiscount> for CouponStrategy {
    fn from(strategy: PercentDiscount) -> Self {
        CouponStrategy::PercentDiscount(strategy)
    }
}

impl From<BuyOneGetOne> for CouponStrategy {
    fn from(strategy: BuyOneGetOne) -> Self {
        CouponStrategy::BuyOneGetOne(strategy)
    }
}

impl From<FreeAddon> for CouponStrategy {
    fn from(strategy: FreeAddon) -> Self {
        CouponStrategy::FreeAddon(strategy)
    }
}

/// A coupon
#[derive(Debug, Clone)]
pub struct Coupon {
    code: String,
    products: FxHashSet<ProductId>,
    strategy: CouponStrategy,
}

impl Coupon {
    /// Create a new coupon.
    pub fn new(
        code: impl Into<String>,
        products: impl IntoIterator<Item = ProductId>,
        strategy: impl Into<CouponStrategy>,
    ) -> Self {
        Self {
            code: code.into(),
            products: products.into_iter().collect(),
            strategy: strategy.into(),
        }
    }

    /// Return the coupon code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Return the eligible product ids
    pub fn products(&self) -> &FxHashSet<ProductId> {
        &self.products
    }

    /// Return the strategy
    pub fn strategy(&self) -> &CouponStrategy {
        &self.strategy
    }

    /// Whether the coupon applies to the product.
    pub fn is_eligible(&self, product_id: &ProductId) -> bool {
        self.products.contains(product_id)
    }

    /// Write this coupon's discounts onto the cart's items.
    ///
    /// Items the coupon does not discount keep whatever discount they had. Applying the
    /// same coupon twice leaves the cart as applying it once does.
    #[tracing::instrument(
        name = "coupons.calculate_discount",
        skip(self, cart),
        fields(
            code = %self.code,
            strategy = self.strategy.name(),
            items = cart.len(),
            discounted = tracing::field::Empty
        )
    )]
    pub fn calculate_discount(&self, cart: &mut Cart) -> usize {
        let discounted = self.strategy.calculate_discount(&self.products, cart);

        tracing::Span::current().record("discounted", discounted);

        debug!(discounted, "applied coupon");

        discounted
    }
}

/// Whether the item's product is one of `products`. Items without a product never are.
pub(crate) fn is_eligible(products: &FxHashSet<ProductId>, item: &CartItem) -> bool {
    item.product_id()
        .is_some_and(|product_id| products.contains(product_id))
}
