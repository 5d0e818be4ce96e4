//! Free Addon
//!
//! Buying any eligible product makes one addon product free.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::{cart::Cart, catalog::ProductId, coupons::is_eligible};

/// Free addon strategy
#[derive(Debug, Clone)]
pub struct FreeAddon {
    addon: ProductId,
}

impl FreeAddon {
    /// Create a free addon strategy for the given addon product.
    pub fn new(addon: impl Into<ProductId>) -> Self {
        Self {
            addon: addon.into(),
        }
    }

    /// Return the addon product id
    pub fn addon(&self) -> &ProductId {
        &self.addon
    }

    /// If any item is eligible, make the first addon item in the cart free.
    pub fn calculate_discount(&self, products: &FxHashSet<ProductId>, cart: &mut Cart) -> usize {
        let Some(trigger) = cart.iter().position(|item| is_eligible(products, item)) else {
            debug!(addon = %self.addon, "no qualifying purchase");

            return 0;
        };

        let addon = cart
            .iter_mut()
            .enumerate()
            .find(|(_, item)| item.product_id() == Some(&self.addon));

        let Some((index, item)) = addon else {
            debug!(addon = %self.addon, trigger, "addon not in cart");

            return 0;
        };

        let discount = item.price();

        trace!(index, trigger, %discount, "free addon");

        item.set_discount(discount);

        1
    }
}
