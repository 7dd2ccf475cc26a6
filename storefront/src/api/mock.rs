//! In-memory [`ShopApi`] for tests and demos.

use super::{ApiError, ApiFuture, ShopApi};
use crate::action::SyncCommand;
use crate::money::Money;
use crate::types::{CartLine, Order, OrderId, Product, ProductDraft, ProductEdit, ProductId, Session, UserId};
use chrono::{DateTime, Utc};
use futures::future;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Backend {
    products: Vec<Product>,
    orders: BTreeMap<UserId, Vec<Order>>,
    next_id: u64,
    failures: HashMap<SyncCommand, ApiError>,
    calls: Vec<SyncCommand>,
}

impl Backend {
    fn next_id(&mut self, prefix: char) -> String {
        self.next_id += 1;
        format!("{prefix}{:04}", self.next_id)
    }
}

/// Server double that assigns ids and records calls
///
/// Clones share the same backend, so a test keeps one handle while the
/// environment owns another.
#[derive(Clone, Debug, Default)]
pub struct MockShopApi {
    backend: Arc<Mutex<Backend>>,
}

impl MockShopApi {
    /// Creates an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend already holding `products`
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::new();
        api.lock().products = products;
        api
    }

    /// Makes every call of `operation` fail with `error` until [`Self::recover`]
    pub fn fail(&self, operation: SyncCommand, error: ApiError) {
        self.lock().failures.insert(operation, error);
    }

    /// Stops injecting failures for `operation`
    pub fn recover(&self, operation: SyncCommand) {
        self.lock().failures.remove(&operation);
    }

    /// Operations received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<SyncCommand> {
        self.lock().calls.clone()
    }

    /// Products as stored on the server
    #[must_use]
    pub fn stored_products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    /// Orders stored for `user`
    #[must_use]
    pub fn stored_orders(&self, user: &UserId) -> Vec<Order> {
        self.lock().orders.get(user).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and runs `f` unless a failure is injected
    fn call<T, F>(&self, operation: SyncCommand, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Backend) -> Result<T, ApiError>,
    {
        let mut backend = self.lock();
        backend.calls.push(operation);
        if let Some(error) = backend.failures.get(&operation) {
            return Err(error.clone());
        }
        f(&mut backend)
    }
}

fn not_found(id: &ProductId) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("no product {id}"),
    }
}

impl ShopApi for MockShopApi {
    fn fetch_products(&self) -> ApiFuture<'_, Vec<Product>> {
        let result = self.call(SyncCommand::FetchProducts, |b| Ok(b.products.clone()));
        Box::pin(future::ready(result))
    }

    fn create_product<'a>(
        &'a self,
        session: &'a Session,
        draft: &'a ProductDraft,
    ) -> ApiFuture<'a, ProductId> {
        let result = self.call(SyncCommand::CreateProduct, |b| {
            let id = ProductId::new(b.next_id('p'));
            b.products
                .push(draft.clone().into_product(id.clone(), session.user_id.clone()));
            Ok(id)
        });
        Box::pin(future::ready(result))
    }

    fn update_product<'a>(
        &'a self,
        _session: &'a Session,
        id: &'a ProductId,
        edit: &'a ProductEdit,
    ) -> ApiFuture<'a, ()> {
        let result = self.call(SyncCommand::UpdateProduct, |b| {
            let product = b
                .products
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| not_found(id))?;
            *product = edit.apply_to(product);
            Ok(())
        });
        Box::pin(future::ready(result))
    }

    fn delete_product<'a>(&'a self, _session: &'a Session, id: &'a ProductId) -> ApiFuture<'a, ()> {
        let result = self.call(SyncCommand::DeleteProduct, |b| {
            b.products.retain(|p| &p.id != id);
            Ok(())
        });
        Box::pin(future::ready(result))
    }

    fn fetch_orders<'a>(&'a self, session: &'a Session) -> ApiFuture<'a, Vec<Order>> {
        let result = self.call(SyncCommand::FetchOrders, |b| {
            Ok(b.orders.get(&session.user_id).cloned().unwrap_or_default())
        });
        Box::pin(future::ready(result))
    }

    fn place_order<'a>(
        &'a self,
        session: &'a Session,
        lines: &'a [CartLine],
        total: Money,
        placed_at: DateTime<Utc>,
    ) -> ApiFuture<'a, OrderId> {
        let result = self.call(SyncCommand::PlaceOrder, |b| {
            let id = OrderId::new(b.next_id('o'));
            b.orders.entry(session.user_id.clone()).or_default().push(Order {
                id: id.clone(),
                lines: lines.to_vec(),
                total,
                placed_at,
            });
            Ok(id)
        });
        Box::pin(future::ready(result))
    }
}
