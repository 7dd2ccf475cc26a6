//! Cart aggregation.
//!
//! Lines are keyed by product id. Quantities and sums are updated one unit at
//! a time, and the total moves with every change, so `total` always equals
//! the sum of the line sums.

use crate::error::ShopError;
use crate::money::Money;
use crate::types::{CartLine, Product, ProductId};
use std::collections::BTreeMap;

/// The shopping cart
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartState {
    lines: BTreeMap<ProductId, CartLine>,
    total: Money,
}

impl CartState {
    /// Creates an empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product`
    ///
    /// Title and price are captured when the line is created and never
    /// re-read from the catalog; later units are charged at the captured
    /// price so `sum == quantity * unit_price` holds.
    pub fn add_line(&mut self, product: &Product) {
        let line = self
            .lines
            .entry(product.id.clone())
            .and_modify(|line| {
                line.quantity += 1;
                line.sum += line.unit_price;
            })
            .or_insert_with(|| CartLine {
                product_id: product.id.clone(),
                title: product.title.clone(),
                unit_price: product.price,
                quantity: 1,
                sum: product.price,
            });
        self.total += line.unit_price;
    }

    /// Removes one unit of `product_id`, dropping the line at zero
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::PreconditionViolation`] if there is no line for
    /// the product. The cart is left unchanged.
    pub fn remove_line(&mut self, product_id: &ProductId) -> Result<(), ShopError> {
        let Some(line) = self.lines.get_mut(product_id) else {
            return Err(ShopError::PreconditionViolation(format!(
                "no cart line for product {product_id}"
            )));
        };

        let unit_price = line.unit_price;
        if line.quantity > 1 {
            line.quantity -= 1;
            line.sum -= unit_price;
        } else {
            self.lines.remove(product_id);
        }
        self.total -= unit_price;
        Ok(())
    }

    /// Empties the cart
    pub fn clear(&mut self) {
        self.lines.clear();
        self.total = Money::zero();
    }

    /// Drops the whole line for a deleted product, whatever its quantity
    ///
    /// Returns the evicted line. No-op if the product is not in the cart.
    pub fn evict_product(&mut self, product_id: &ProductId) -> Option<CartLine> {
        let line = self.lines.remove(product_id)?;
        self.total -= line.sum;
        Some(line)
    }

    /// Lines in ascending product id order
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.values().cloned().collect()
    }

    /// The line for one product
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Whether the cart holds a line for the product
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lines.contains_key(product_id)
    }

    /// Sum of all line sums
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Number of distinct lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
