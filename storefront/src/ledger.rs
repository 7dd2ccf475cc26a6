//! Order ledger.

use crate::types::Order;

/// Placed orders of the signed-in user, in the order received
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderLedger(Vec<Order>);

impl OrderLedger {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Replaces every order with a fetched sequence, keeping its order
    pub fn replace_all(&mut self, orders: Vec<Order>) {
        self.0 = orders;
    }

    /// Appends a freshly placed order
    pub fn append(&mut self, order: Order) {
        self.0.push(order);
    }

    /// Forgets every order
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// All orders
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.0
    }

    /// Number of orders
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ledger is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
