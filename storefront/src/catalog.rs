//! Product registry.
//!
//! Holds the full catalog and the subset owned by the signed-in user. Every
//! mutation touches both views so a product id is present in both (when
//! owned) or in neither.

use crate::error::ShopError;
use crate::types::{Product, ProductEdit, ProductId, UserId};

/// Catalog and owned subset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogState {
    catalog: Vec<Product>,
    owned: Vec<Product>,
}

impl CatalogState {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both views
    ///
    /// The owned subset is derived here, once, by filtering on `owner`.
    pub fn set_all(&mut self, products: Vec<Product>, owner: Option<&UserId>) {
        self.catalog = products;
        self.rederive_owned(owner);
    }

    /// Recomputes the owned subset for another user (or none)
    pub fn rederive_owned(&mut self, owner: Option<&UserId>) {
        self.owned = match owner {
            Some(owner) => self
                .catalog
                .iter()
                .filter(|p| &p.owner_id == owner)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
    }

    /// Appends a newly created product to the catalog
    ///
    /// It joins the owned subset only when `owner` is its creator.
    pub fn create(&mut self, product: Product, owner: Option<&UserId>) {
        if owner == Some(&product.owner_id) {
            self.owned.push(product.clone());
        }
        self.catalog.push(product);
    }

    /// Applies an edit in place in both views
    ///
    /// Price and owner are carried over from the owned record.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::StaleReference`] if `id` is not in the owned
    /// subset. Nothing is changed in that case.
    pub fn update(&mut self, id: &ProductId, edit: &ProductEdit) -> Result<Product, ShopError> {
        let Some(owned_index) = self.owned.iter().position(|p| &p.id == id) else {
            return Err(ShopError::StaleReference(id.clone()));
        };

        let updated = edit.apply_to(&self.owned[owned_index]);
        self.owned[owned_index] = updated.clone();

        match self.catalog.iter().position(|p| &p.id == id) {
            Some(index) => self.catalog[index] = updated.clone(),
            None => {
                tracing::warn!(product_id = %id, "Owned product missing from catalog, re-adding");
                self.catalog.push(updated.clone());
            },
        }

        Ok(updated)
    }

    /// Removes the product from both views
    ///
    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: &ProductId) -> bool {
        let before = self.catalog.len() + self.owned.len();
        self.catalog.retain(|p| &p.id != id);
        self.owned.retain(|p| &p.id != id);
        before != self.catalog.len() + self.owned.len()
    }

    /// Drops the owned subset, keeping the catalog
    pub fn clear_owned(&mut self) {
        self.owned.clear();
    }

    /// Every product, in server order
    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    /// Products owned by the signed-in user
    #[must_use]
    pub fn owned(&self) -> &[Product] {
        &self.owned
    }

    /// Looks up a product in the catalog
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.iter().find(|p| &p.id == id)
    }

    /// Whether the signed-in user owns `id`
    #[must_use]
    pub fn owns(&self, id: &ProductId) -> bool {
        self.owned.iter().any(|p| &p.id == id)
    }
}
