//! Cartwheel
//!
//! Cartwheel is a shopping cart and coupon engine for term-billed products such as domains,
//! hosting plans and SSL certificates.

pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
