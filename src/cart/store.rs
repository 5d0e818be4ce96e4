//! Cart Storage
//!
//! Carts are persisted as opaque blobs keyed by a cart (session) id. Implement
//! [`CartStore`] to keep them somewhere durable; [`MemoryStore`] keeps them in-process.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cart::item::CartItem;

/// Key-value storage for encoded carts.
pub trait CartStore {
    /// Return the blob stored under `cart_id`, or an empty blob if there is none.
    fn get(&self, cart_id: &str) -> Vec<u8>;

    /// Store `data` under `cart_id`, replacing any previous blob.
    fn put(&mut self, cart_id: &str, data: Vec<u8>);

    /// Discard the blob stored under `cart_id`.
    fn flush(&mut self, cart_id: &str);
}

/// Encoded form of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// ISO alpha code of the cart currency
    pub currency: String,

    /// Items in insertion order
    pub items: Vec<CartItem>,
}

/// In-process cart store
#[derive(Debug, Default)]
pub struct MemoryStore {
    carts: FxHashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts
    pub fn len(&self) -> usize {
        self.carts.len()
    }

    /// Whether no carts are stored
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}

impl CartStore for MemoryStore {
    fn get(&self, cart_id: &str) -> Vec<u8> {
        self.carts.get(cart_id).cloned().unwrap_or_default()
    }

    fn put(&mut self, cart_id: &str, data: Vec<u8>) {
        trace!(cart_id, bytes = data.len(), "storing cart");

        self.carts.insert(cart_id.to_string(), data);
    }

    fn flush(&mut self, cart_id: &str) {
        trace!(cart_id, "flushing cart");

        self.carts.remove(cart_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_cart_is_empty() {
        let store = MemoryStore::new();

        assert!(store.get("nobody").is_empty());
    }

    #[test]
    fn put_replaces_previous_blob() {
        let mut store = MemoryStore::new();

        store.put("a", b"first".to_vec());
        store.put("a", b"second".to_vec());

        assert_eq!(store.get("a"), b"second".to_vec());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn flush_discards_only_that_cart() {
        let mut store = MemoryStore::new();

        store.put("a", b"one".to_vec());
        store.put("b", b"two".to_vec());
        store.flush("a");

        assert!(store.get("a").is_empty());
        assert_eq!(store.get("b"), b"two".to_vec());

        store.flush("b");

        assert!(store.is_empty());
    }
}
