//! Coupon Collection

use rustc_hash::FxHashMap;

use crate::coupons::{Coupon, CouponError};

/// Coupons keyed by their unique code
#[derive(Debug, Clone, Default)]
pub struct CouponCollection {
    coupons: FxHashMap<String, Coupon>,
}

impl CouponCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, failing on the first repeated code.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::DuplicateCode`] if two coupons share a code.
    pub fn try_from_iter(coupons: impl IntoIterator<Item = Coupon>) -> Result<Self, CouponError> {
        let mut collection = Self::new();

        for coupon in coupons {
            collection.insert(coupon)?;
        }

        Ok(collection)
    }

    /// Register a coupon under its code.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::DuplicateCode`] if the code is already registered.
    pub fn insert(&mut self, coupon: Coupon) -> Result<(), CouponError> {
        if self.coupons.contains_key(coupon.code()) {
            return Err(CouponError::DuplicateCode(coupon.code().to_string()));
        }

        self.coupons.insert(coupon.code().to_string(), coupon);

        Ok(())
    }

    /// Look a coupon up by code.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NotFound`] if no coupon has the code.
    pub fn get_coupon(&self, code: &str) -> Result<&Coupon, CouponError> {
        self.coupons
            .get(code)
            .ok_or_else(|| CouponError::NotFound(code.to_string()))
    }

    /// Whether a coupon is registered under the code
    pub fn contains(&self, code: &str) -> bool {
        self.coupons.contains_key(code)
    }

    /// Number of coupons
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Iterate over the coupons in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Coupon> {
        self.coupons.values()
    }
}
