//! Cartwheel prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError,
        item::{CartItem, CartItemError, ItemId, ItemValue},
        store::{CartSnapshot, CartStore, MemoryStore},
    },
    catalog::{Billing, BillingUnit, Product, ProductId, ProductKind, Term, TermError},
    coupons::{
        Coupon, CouponError, CouponStrategy,
        buy_one_get_one::{BogoReward, BuyOneGetOne},
        collection::CouponCollection,
        free_addon::FreeAddon,
        percent_discount::PercentDiscount,
    },
    fixtures::{Fixture, FixtureError},
    pricing::PricingError,
};
