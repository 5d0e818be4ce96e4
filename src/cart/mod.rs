//! Cart

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{
        item::{CartItem, CartItemError, ItemId},
        store::{CartSnapshot, CartStore},
    },
    pricing::{PricingError, sum, to_money},
};

pub mod item;
pub mod store;

/// Errors related to cart access, totals and persistence.
#[derive(Debug, Error)]
pub enum CartError {
    /// No item at the given position.
    #[error("Item {0} not found")]
    ItemNotFound(usize),

    /// A stored cart was priced in another currency (stored currency, requested currency).
    #[error("Stored cart has currency {0}, but {1} was requested")]
    CurrencyMismatch(String, &'static str),

    /// An item could not be hashed.
    #[error(transparent)]
    Item(#[from] CartItemError),

    /// Wrapped amount conversion error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The stored cart could not be encoded or decoded.
    #[error("Failed to encode or decode cart snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// An ordered collection of cart items priced in one currency.
///
/// Items keep insertion order, which is the order coupons scan them in. The same
/// product and term can appear any number of times as separate items.
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<CartItem>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a cart with the given items.
    pub fn with_items(items: impl Into<Vec<CartItem>>, currency: &'static Currency) -> Self {
        Cart {
            items: items.into(),
            currency,
        }
    }

    /// Append an item.
    pub fn add(&mut self, item: CartItem) {
        self.items.push(item);
    }

    /// All items in insertion order
    pub fn all(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over the items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Iterate over the items in insertion order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CartItem> {
        self.items.iter_mut()
    }

    /// Get an item by its position.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if there is no item at `index`.
    pub fn get(&self, index: usize) -> Result<&CartItem, CartError> {
        self.items.get(index).ok_or(CartError::ItemNotFound(index))
    }

    /// Get an item by its position, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if there is no item at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut CartItem, CartError> {
        self.items
            .get_mut(index)
            .ok_or(CartError::ItemNotFound(index))
    }

    /// Find the first item with the given content hash.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Item`] if an item scanned before the match cannot be hashed.
    pub fn find(&self, id: &ItemId) -> Result<Option<&CartItem>, CartError> {
        for item in &self.items {
            if item.id()? == *id {
                return Ok(Some(item));
            }
        }

        Ok(None)
    }

    /// Remove the item at `index`, shifting later items down.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if there is no item at `index`.
    pub fn remove(&mut self, index: usize) -> Result<CartItem, CartError> {
        if index >= self.items.len() {
            return Err(CartError::ItemNotFound(index));
        }

        Ok(self.items.remove(index))
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Get the number of items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Total number of units across all items.
    pub fn quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }

    /// Sum of line totals excluding tax.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Pricing`] if the amount overflows or does not fit in minor units.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(to_money(self.subtotal_amount()?, self.currency)?)
    }

    /// Sum of line taxes.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Pricing`] if the amount overflows or does not fit in minor units.
    pub fn total_tax(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(to_money(self.tax_amount()?, self.currency)?)
    }

    /// Sum of coupon discounts, one per item.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Pricing`] if the amount overflows or does not fit in minor units.
    pub fn total_discount(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(to_money(self.discount_amount()?, self.currency)?)
    }

    /// Subtotal plus tax, minus discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Pricing`] if the amount overflows or does not fit in minor units.
    pub fn total(&self) -> Result<Money<'static, Currency>, CartError> {
        let discount = self.discount_amount()?;
        let total = sum([self.subtotal_amount()?, self.tax_amount()?])?
            .checked_sub(discount)
            .ok_or(PricingError::AmountOutOfRange(discount))?;

        Ok(to_money(total, self.currency)?)
    }

    /// Store the cart under `cart_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Snapshot`] if the cart cannot be encoded.
    pub fn save(&self, store: &mut impl CartStore, cart_id: &str) -> Result<(), CartError> {
        let snapshot = CartSnapshot {
            currency: self.currency.iso_alpha_code.to_string(),
            items: self.items.clone(),
        };

        store.put(cart_id, serde_json::to_vec(&snapshot)?);

        Ok(())
    }

    /// Load the cart stored under `cart_id`, or an empty cart if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored data cannot be decoded or was priced in
    /// another currency.
    pub fn restore(
        store: &impl CartStore,
        cart_id: &str,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let data = store.get(cart_id);

        if data.is_empty() {
            return Ok(Cart::new(currency));
        }

        let snapshot: CartSnapshot = serde_json::from_slice(&data)?;

        if snapshot.currency != currency.iso_alpha_code {
            return Err(CartError::CurrencyMismatch(
                snapshot.currency,
                currency.iso_alpha_code,
            ));
        }

        Ok(Cart::with_items(snapshot.items, currency))
    }

    fn subtotal_amount(&self) -> Result<Decimal, PricingError> {
        sum(self
            .items
            .iter()
            .map(CartItem::total_price_excluding_tax)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn tax_amount(&self) -> Result<Decimal, PricingError> {
        sum(self
            .items
            .iter()
            .map(CartItem::total_tax)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn discount_amount(&self) -> Result<Decimal, PricingError> {
        sum(self.items.iter().map(CartItem::discount))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a mut Cart {
    type Item = &'a mut CartItem;
    type IntoIter = std::slice::IterMut<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::cart::{item::ItemValue, store::MemoryStore};

    use super::*;

    fn item(price: i64, tax: i64, quantity: i32) -> Result<CartItem, item::CartItemError> {
        CartItem::with_data([
            ("price", ItemValue::from(price)),
            ("tax", ItemValue::from(tax)),
            ("quantity", ItemValue::from(quantity)),
        ])
    }

    fn test_items() -> Result<[CartItem; 3], item::CartItemError> {
        Ok([item(10, 1, 1)?, item(20, 2, 2)?, item(5, 0, 1)?])
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(iso::GBP);

        assert_eq!(cart.currency(), iso::GBP);
        assert!(cart.is_empty());
    }

    #[test]
    fn add_keeps_insertion_order() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        for price in [3, 1, 2] {
            cart.add(item(price, 0, 1)?);
        }

        let prices: Vec<Decimal> = cart.iter().map(CartItem::price).collect();

        assert_eq!(
            prices,
            vec![Decimal::from(3), Decimal::from(1), Decimal::from(2)]
        );

        Ok(())
    }

    #[test]
    fn duplicate_items_are_kept_separately() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add(item(10, 0, 1)?);
        cart.add(item(10, 0, 1)?);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(0)?.id()?, cart.get(1)?.id()?);

        Ok(())
    }

    #[test]
    fn iter_mut_updates_items_in_place() -> TestResult {
        let mut cart = Cart::with_items(test_items()?, iso::GBP);

        for item in &mut cart {
            item.set_discount(Decimal::ONE);
        }

        assert!(cart.iter().all(|item| item.discount() == Decimal::ONE));

        Ok(())
    }

    #[test]
    fn get_missing_item_returns_error() {
        let cart = Cart::new(iso::GBP);

        assert!(matches!(cart.get(3), Err(CartError::ItemNotFound(3))));
    }

    #[test]
    fn remove_shifts_later_items() -> TestResult {
        let mut cart = Cart::with_items(test_items()?, iso::GBP);

        let removed = cart.remove(0)?;

        assert_eq!(removed.price(), Decimal::from(10));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(0)?.price(), Decimal::from(20));
        assert!(matches!(cart.remove(5), Err(CartError::ItemNotFound(5))));

        Ok(())
    }

    #[test]
    fn find_returns_item_by_content_hash() -> TestResult {
        let mut tagged = item(10, 0, 1)?;
        let id = tagged.set("domain", "example.com")?;

        let cart = Cart::with_items([item(10, 0, 1)?, tagged], iso::GBP);

        let found = cart.find(&id)?.map(|item| item.get("domain")).transpose()?;

        assert_eq!(found, Some(ItemValue::from("example.com")));

        Ok(())
    }

    #[test]
    fn find_unknown_id_returns_none() -> TestResult {
        let mut other = item(99, 0, 1)?;
        let id = other.set("domain", "example.org")?;

        let cart = Cart::with_items(test_items()?, iso::GBP);

        assert!(cart.find(&id)?.is_none());

        Ok(())
    }

    #[test]
    fn totals() -> TestResult {
        let mut cart = Cart::with_items(test_items()?, iso::GBP);

        cart.get_mut(1)?.set_discount(Decimal::new(250, 2));

        assert_eq!(cart.quantity(), 4);
        assert_eq!(cart.subtotal()?, Money::from_minor(55_00, iso::GBP));
        assert_eq!(cart.total_tax()?, Money::from_minor(5_00, iso::GBP));
        assert_eq!(cart.total_discount()?, Money::from_minor(2_50, iso::GBP));
        assert_eq!(cart.total()?, Money::from_minor(57_50, iso::GBP));

        Ok(())
    }

    #[test]
    fn totals_reject_line_overflow() -> TestResult {
        let huge = CartItem::with_data([
            ("price", ItemValue::from(Decimal::MAX)),
            ("quantity", ItemValue::from(2)),
        ])?;

        let cart = Cart::with_items([huge], iso::USD);

        assert!(matches!(
            cart.subtotal(),
            Err(CartError::Pricing(PricingError::AmountOutOfRange(_)))
        ));
        assert!(matches!(
            cart.total(),
            Err(CartError::Pricing(PricingError::AmountOutOfRange(_)))
        ));

        Ok(())
    }

    #[test]
    fn totals_reject_sum_overflow() -> TestResult {
        let huge = || CartItem::with_data([("tax", ItemValue::from(Decimal::MAX))]);

        let mut cart = Cart::with_items([huge()?, huge()?], iso::USD);

        assert!(matches!(
            cart.total_tax(),
            Err(CartError::Pricing(PricingError::AmountOutOfRange(_)))
        ));

        cart.clear();
        cart.add(CartItem::new());
        cart.get_mut(0)?.set_discount(Decimal::MIN);
        cart.add(CartItem::with_data([("price", ItemValue::from(Decimal::MAX))])?);

        assert!(matches!(
            cart.total(),
            Err(CartError::Pricing(PricingError::AmountOutOfRange(_)))
        ));

        Ok(())
    }

    #[test]
    fn totals_of_empty_cart_are_zero() -> TestResult {
        let cart = Cart::new(iso::USD);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, iso::USD));
        assert_eq!(cart.total()?, Money::from_minor(0, iso::USD));

        Ok(())
    }

    #[test]
    fn clear_empties_the_cart() -> TestResult {
        let mut cart = Cart::with_items(test_items()?, iso::GBP);

        cart.clear();

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn save_and_restore_round_trip() -> TestResult {
        let mut store = MemoryStore::default();
        let mut cart = Cart::with_items(test_items()?, iso::GBP);

        cart.get_mut(0)?.set("domain", "example.com")?;
        cart.save(&mut store, "session-1")?;

        let restored = Cart::restore(&store, "session-1", iso::GBP)?;

        assert_eq!(restored.all(), cart.all());

        Ok(())
    }

    #[test]
    fn restore_missing_cart_is_empty() -> TestResult {
        let store = MemoryStore::default();

        let cart = Cart::restore(&store, "nobody", iso::EUR)?;

        assert!(cart.is_empty());
        assert_eq!(cart.currency(), iso::EUR);

        Ok(())
    }

    #[test]
    fn restore_rejects_currency_mismatch() -> TestResult {
        let mut store = MemoryStore::default();

        Cart::with_items(test_items()?, iso::GBP).save(&mut store, "session-1")?;

        let result = Cart::restore(&store, "session-1", iso::USD);

        assert!(matches!(
            result,
            Err(CartError::CurrencyMismatch(stored, requested))
                if stored == "GBP" && requested == "USD"
        ));

        Ok(())
    }

    #[test]
    fn restore_rejects_corrupt_data() {
        let mut store = MemoryStore::default();

        store.put("session-1", b"not json".to_vec());

        let result = Cart::restore(&store, "session-1", iso::GBP);

        assert!(matches!(result, Err(CartError::Snapshot(_))));
    }

    #[test]
    fn restore_rejects_zero_quantity() -> TestResult {
        let mut store = MemoryStore::default();

        Cart::with_items([item(10, 1, 1)?], iso::GBP).save(&mut store, "session-1")?;

        let data = String::from_utf8(store.get("session-1"))?;

        assert!(data.contains(r#""quantity":1"#));

        store.put(
            "session-1",
            data.replace(r#""quantity":1"#, r#""quantity":0"#).into_bytes(),
        );

        let result = Cart::restore(&store, "session-1", iso::GBP);

        assert!(matches!(result, Err(CartError::Snapshot(_))));

        Ok(())
    }
}
