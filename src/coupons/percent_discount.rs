//! Percent Discount
//!
//! A percentage off the price of every eligible item

use decimal_percentage::Percentage;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::{cart::Cart, catalog::ProductId, coupons::is_eligible};

/// Percentage-off strategy
#[derive(Debug, Clone)]
pub struct PercentDiscount {
    percent: Percentage,
}

impl PercentDiscount {
    /// Create a percent discount (e.g. `Percentage::from(0.25)` for 25% off).
    pub fn new(percent: Percentage) -> Self {
        Self { percent }
    }

    /// Return the percentage
    pub fn percent(&self) -> Percentage {
        self.percent
    }

    /// Set each eligible item's discount to its price times the percentage.
    pub fn calculate_discount(&self, products: &FxHashSet<ProductId>, cart: &mut Cart) -> usize {
        let mut discounted = 0;

        for (index, item) in cart.iter_mut().enumerate() {
            if !is_eligible(products, item) {
                continue;
            }

            let discount = self.percent * item.price();

            trace!(index, %discount, "percent discount");

            item.set_discount(discount);
            discounted += 1;
        }

        discounted
    }
}
