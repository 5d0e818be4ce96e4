//! Coupon Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    catalog::ProductId,
    coupons::{
        Coupon, CouponStrategy,
        buy_one_get_one::{BogoReward, BuyOneGetOne},
        free_addon::FreeAddon,
        percent_discount::PercentDiscount,
    },
    fixtures::{FixtureError, parse_percentage},
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponFixture {
    /// Percentage off eligible items
    PercentDiscount {
        /// Eligible product ids
        products: Vec<String>,

        /// Percentage, e.g. "25%" or "0.25"
        percent: String,
    },

    /// Second eligible item free or half price
    BuyOneGetOne {
        /// Eligible product ids
        products: Vec<String>,

        /// Reward for the second item
        reward: BogoReward,
    },

    /// Addon free with an eligible purchase
    FreeAddon {
        /// Eligible product ids
        products: Vec<String>,

        /// Product id of the addon
        addon: String,
    },
}

impl CouponFixture {
    /// Convert to a [`Coupon`] with the given code.
    ///
    /// # Errors
    ///
    /// Returns an error if the percentage is malformed.
    pub fn try_into_coupon(self, code: String) -> Result<Coupon, FixtureError> {
        let (products, strategy) = match self {
            CouponFixture::PercentDiscount { products, percent } => (
                products,
                CouponStrategy::from(PercentDiscount::new(parse_percentage(&percent)?)),
            ),
            CouponFixture::BuyOneGetOne { products, reward } => {
                (products, CouponStrategy::from(BuyOneGetOne::new(reward)))
            }
            CouponFixture::FreeAddon { products, addon } => {
                (products, CouponStrategy::from(FreeAddon::new(addon)))
            }
        };

        Ok(Coupon::new(
            code,
            products.into_iter().map(ProductId::from),
            strategy,
        ))
    }
}
