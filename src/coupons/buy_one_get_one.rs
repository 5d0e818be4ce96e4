//! Buy One Get One
//!
//! Eligible items are paired in cart order; the second item of each pair is free or half
//! price. Both items of a pair must share a billing period. An item whose period differs
//! from the one waiting to be paired starts a new pair instead.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    cart::{Cart, item::CartItem},
    catalog::{ProductId, Term},
    coupons::is_eligible,
};

/// What the second item of a pair gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BogoReward {
    /// Discounted by its whole term price
    Free,

    /// Discounted by half its price
    Half,
}

impl BogoReward {
    /// Discount this reward grants on `item`.
    pub fn discount_for(self, item: &CartItem) -> Decimal {
        match self {
            BogoReward::Free => item.term().map_or_else(|| item.price(), Term::total_price),
            BogoReward::Half => item.price() / Decimal::TWO,
        }
    }
}

/// Buy-one-get-one strategy
#[derive(Debug, Clone)]
pub struct BuyOneGetOne {
    reward: BogoReward,
}

impl BuyOneGetOne {
    /// Create a buy-one-get-one strategy.
    pub fn new(reward: BogoReward) -> Self {
        Self { reward }
    }

    /// Return the reward
    pub fn reward(&self) -> BogoReward {
        self.reward
    }

    /// Discount the second item of every same-period pair of eligible items.
    pub fn calculate_discount(&self, products: &FxHashSet<ProductId>, cart: &mut Cart) -> usize {
        // Period of the eligible item waiting for a partner; `Some(None)` is an item without a term.
        let mut anchor: Option<Option<u32>> = None;
        let mut discounted = 0;

        for (index, item) in cart.iter_mut().enumerate() {
            if !is_eligible(products, item) {
                continue;
            }

            let period = item.term().map(Term::period);

            match anchor {
                Some(anchor_period) if anchor_period == period => {
                    let discount = self.reward.discount_for(item);

                    trace!(index, ?period, %discount, "paired item");

                    item.set_discount(discount);
                    anchor = None;
                    discounted += 1;
                }
                Some(anchor_period) => {
                    debug!(index, ?anchor_period, ?period, "period mismatch, re-anchoring");

                    anchor = Some(period);
                }
                None => anchor = Some(period),
            }
        }

        discounted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        catalog::{Product, ProductKind},
        coupons::tests::{cart_of, discounts},
    };

    use super::*;

    fn com() -> FxHashSet<ProductId> {
        [ProductId::from(".com")].into_iter().collect()
    }

    #[test]
    fn free_discounts_every_second_item() -> TestResult {
        let price = Decimal::new(1299, 2);
        let mut cart = cart_of(&[".com"; 6], price)?;

        let discounted = BuyOneGetOne::new(BogoReward::Free).calculate_discount(&com(), &mut cart);

        assert_eq!(discounted, 3);
        assert_eq!(
            discounts(&cart),
            vec![Decimal::ZERO, price, Decimal::ZERO, price, Decimal::ZERO, price]
        );

        Ok(())
    }

    #[test]
    fn single_item_is_not_discounted() -> TestResult {
        let mut cart = cart_of(&[".com"], Decimal::new(1299, 2))?;

        let discounted = BuyOneGetOne::new(BogoReward::Free).calculate_discount(&com(), &mut cart);

        assert_eq!(discounted, 0);
        assert_eq!(discounts(&cart), vec![Decimal::ZERO]);

        Ok(())
    }

    #[test]
    fn half_discounts_half_the_price() -> TestResult {
        let mut cart = cart_of(&[".com"; 3], Decimal::from(12))?;

        BuyOneGetOne::new(BogoReward::Half).calculate_discount(&com(), &mut cart);

        assert_eq!(
            discounts(&cart),
            vec![Decimal::ZERO, Decimal::from(6), Decimal::ZERO]
        );

        Ok(())
    }

    #[test]
    fn pairs_skip_non_eligible_items() -> TestResult {
        let price = Decimal::from(10);
        let mut cart = cart_of(&[".com", ".net", ".com"], price)?;

        BuyOneGetOne::new(BogoReward::Free).calculate_discount(&com(), &mut cart);

        assert_eq!(discounts(&cart), vec![Decimal::ZERO, Decimal::ZERO, price]);

        Ok(())
    }

    #[test]
    fn mismatched_period_starts_a_new_pair() -> TestResult {
        let one_year = Term::new(1)?.with_price(Decimal::from(10));
        let two_years = Term::new(2)?.with_price(Decimal::from(9));

        let product = Arc::new(
            Product::new(".com", ProductKind::Domain, ".com")
                .with_term(one_year.clone())
                .with_term(two_years.clone()),
        );

        let mut cart = Cart::new(iso::USD);

        for term in [&one_year, &one_year, &one_year, &two_years, &two_years, &two_years] {
            cart.add(CartItem::for_product(Arc::clone(&product), term.clone()));
        }

        BuyOneGetOne::new(BogoReward::Free).calculate_discount(&com(), &mut cart);

        assert_eq!(
            discounts(&cart),
            vec![
                Decimal::ZERO,
                Decimal::from(10),
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::from(18),
                Decimal::ZERO,
            ]
        );

        Ok(())
    }

    #[test]
    fn free_uses_whole_term_price() -> TestResult {
        let term = Term::new(3)?.with_price(Decimal::from(5));
        let product =
            Arc::new(Product::new(".com", ProductKind::Domain, ".com").with_term(term.clone()));

        let item = CartItem::for_product(product, term);

        assert_eq!(BogoReward::Free.discount_for(&item), Decimal::from(15));
        assert_eq!(BogoReward::Half.discount_for(&item), Decimal::new(75, 1));

        Ok(())
    }

    #[test]
    fn applying_twice_is_idempotent() -> TestResult {
        let mut cart = cart_of(&[".com"; 5], Decimal::new(1299, 2))?;
        let strategy = BuyOneGetOne::new(BogoReward::Free);

        strategy.calculate_discount(&com(), &mut cart);
        let once = discounts(&cart);

        strategy.calculate_discount(&com(), &mut cart);

        assert_eq!(discounts(&cart), once);

        Ok(())
    }
}
