//! Remote document store access.
//!
//! Reducers never talk to the network directly: they capture an
//! `Arc<dyn ShopApi>` from the environment inside the effects they return.

use crate::money::Money;
use crate::types::{CartLine, Order, OrderId, Product, ProductDraft, ProductEdit, ProductId, Session};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub mod http;
pub mod mock;
pub mod wire;

pub use http::HttpShopApi;
pub use mock::MockShopApi;

/// Errors from a single remote call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be completed
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-2xx status
    #[error("Server returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Response decoding failed: {0}")]
    Decode(String),
}

/// Boxed future returned by [`ShopApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// One method per remote operation; each performs exactly one round trip
///
/// Implementations never retry.
pub trait ShopApi: Send + Sync {
    /// Reads the whole catalog
    fn fetch_products(&self) -> ApiFuture<'_, Vec<Product>>;

    /// Creates a product owned by `session.user_id`, returning its new id
    fn create_product<'a>(
        &'a self,
        session: &'a Session,
        draft: &'a ProductDraft,
    ) -> ApiFuture<'a, ProductId>;

    /// Writes title, description and image URL of a product
    fn update_product<'a>(
        &'a self,
        session: &'a Session,
        id: &'a ProductId,
        edit: &'a ProductEdit,
    ) -> ApiFuture<'a, ()>;

    /// Deletes a product
    fn delete_product<'a>(&'a self, session: &'a Session, id: &'a ProductId) -> ApiFuture<'a, ()>;

    /// Reads the orders of `session.user_id`
    fn fetch_orders<'a>(&'a self, session: &'a Session) -> ApiFuture<'a, Vec<Order>>;

    /// Places an order for `session.user_id`, returning its new id
    fn place_order<'a>(
        &'a self,
        session: &'a Session,
        lines: &'a [CartLine],
        total: Money,
        placed_at: DateTime<Utc>,
    ) -> ApiFuture<'a, OrderId>;
}
