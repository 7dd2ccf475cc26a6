//! The storefront facade.
//!
//! [`Shop`] owns one store and exposes the command contract the UI layer
//! issues against, plus read projections. Remote commands resolve when the
//! store has applied their settling event, so a projection read right after
//! `.await` reflects the outcome.

use crate::action::{ShopAction, SyncCommand};
use crate::api::HttpShopApi;
use crate::cart::CartState;
use crate::config::ShopConfig;
use crate::error::ShopError;
use crate::money::Money;
use crate::reducer::{ShopEnvironment, ShopReducer};
use crate::state::ShopState;
use crate::types::{CartLine, Order, Product, ProductDraft, ProductEdit, ProductId, RequestId, Session};
use shopfront_core::environment::SystemClock;
use shopfront_runtime::Store;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Store type backing a [`Shop`]
pub type ShopStore = Store<ShopState, ShopAction, ShopEnvironment, ShopReducer>;

/// Storefront state container and command API
///
/// Explicitly constructed; every `Shop` is an isolated store. Clones share
/// the same store.
#[derive(Clone)]
pub struct Shop {
    store: ShopStore,
    environment: ShopEnvironment,
    next_request: Arc<AtomicU64>,
}

impl Shop {
    /// Create a shop over an injected environment
    #[must_use]
    pub fn new(environment: ShopEnvironment) -> Self {
        Self::with_config(environment, &ShopConfig::default())
    }

    /// Create a shop over an injected environment with explicit configuration
    #[must_use]
    pub fn with_config(environment: ShopEnvironment, config: &ShopConfig) -> Self {
        let store = Store::with_broadcast_capacity(
            ShopState::default(),
            ShopReducer::new(),
            environment.clone(),
            config.broadcast_capacity,
        );
        Self {
            store,
            environment,
            next_request: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Create a shop talking HTTP to `config.base_url` on the system clock
    #[must_use]
    pub fn connect(config: &ShopConfig) -> Self {
        let environment = ShopEnvironment::new(
            Arc::new(HttpShopApi::new(config.base_url.clone())),
            Arc::new(SystemClock),
        );
        Self::with_config(environment, config)
    }

    /// The underlying store, for observers that subscribe to actions
    #[must_use]
    pub const fn store(&self) -> &ShopStore {
        &self.store
    }

    fn next_request(&self) -> RequestId {
        RequestId::new(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Sends a remote command and waits for the event that settles it
    async fn settle<F>(&self, command: F) -> Result<ShopAction, ShopError>
    where
        F: FnOnce(RequestId) -> ShopAction,
    {
        let request = self.next_request();
        let outcome = self
            .store
            .send_and_settle(command(request), move |a| a.settled_request() == Some(request))
            .await?;

        match outcome {
            ShopAction::SyncFailed { error, .. } => Err(error),
            settled => Ok(settled),
        }
    }

    // ========== Remote commands ==========

    /// Fetch the whole catalog, replacing both catalog views
    ///
    /// # Errors
    ///
    /// [`ShopError::Transport`] if the request fails; state is unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<(), ShopError> {
        self.settle(|request| ShopAction::FetchProducts { request }).await?;
        Ok(())
    }

    /// Create a product owned by the signed-in user
    ///
    /// Returns the server-assigned id. The product is appended locally
    /// without a re-fetch.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotAuthenticated`], [`ShopError::InvalidProduct`] (both
    /// before any I/O) or [`ShopError::Transport`].
    #[tracing::instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<ProductId, ShopError> {
        match self.settle(|request| ShopAction::CreateProduct { request, draft }).await? {
            ShopAction::ProductCreated { product, .. } => Ok(product.id),
            other => Err(unexpected(&other)),
        }
    }

    /// Edit title, description and image of an owned product
    ///
    /// # Errors
    ///
    /// [`ShopError::NotAuthenticated`], [`ShopError::InvalidProduct`],
    /// [`ShopError::StaleReference`] if the product is not owned (all before
    /// any I/O) or [`ShopError::Transport`]. Also [`ShopError::StaleReference`]
    /// when the server accepted the edit but the product stopped being owned
    /// while the request was in flight; the catalog is unchanged then.
    #[tracing::instrument(skip(self, edit))]
    pub async fn update_product(&self, product_id: ProductId, edit: ProductEdit) -> Result<(), ShopError> {
        self.settle(|request| ShopAction::UpdateProduct {
            request,
            product_id,
            edit,
        })
        .await?;
        Ok(())
    }

    /// Delete a product, evicting it from the cart as well
    ///
    /// # Errors
    ///
    /// [`ShopError::NotAuthenticated`] or [`ShopError::Transport`].
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), ShopError> {
        self.settle(|request| ShopAction::DeleteProduct { request, product_id })
            .await?;
        Ok(())
    }

    /// Fetch the signed-in user's orders, replacing the ledger
    ///
    /// # Errors
    ///
    /// [`ShopError::NotAuthenticated`] or [`ShopError::Transport`].
    #[tracing::instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Result<(), ShopError> {
        self.settle(|request| ShopAction::FetchOrders { request }).await?;
        Ok(())
    }

    /// Place an order for a snapshot of cart lines
    ///
    /// On success the order is appended to the ledger and the cart is
    /// cleared, whatever it holds by then.
    ///
    /// # Errors
    ///
    /// [`ShopError::NotAuthenticated`], [`ShopError::EmptyOrder`] (both
    /// before any I/O) or [`ShopError::Transport`].
    #[tracing::instrument(skip(self, lines, total), fields(lines = lines.len(), total = %total))]
    pub async fn place_order(&self, lines: Vec<CartLine>, total: Money) -> Result<Order, ShopError> {
        match self
            .settle(|request| ShopAction::PlaceOrder { request, lines, total })
            .await?
        {
            ShopAction::OrderPlaced { order, .. } => Ok(order),
            other => Err(unexpected(&other)),
        }
    }

    /// Place an order for the current cart contents
    ///
    /// # Errors
    ///
    /// Same as [`Shop::place_order`].
    pub async fn checkout(&self) -> Result<Order, ShopError> {
        let (lines, total) = self.store.state(|s| (s.cart.lines(), s.cart.total())).await;
        self.place_order(lines, total).await
    }

    // ========== Cart ==========

    /// Add one unit of a product to the cart
    ///
    /// # Errors
    ///
    /// [`ShopError::Store`] if the store is shutting down.
    pub async fn add_to_cart(&self, product: Product) -> Result<(), ShopError> {
        self.store.send(ShopAction::AddToCart { product }).await?;
        Ok(())
    }

    /// Remove one unit of a product from the cart
    ///
    /// # Errors
    ///
    /// [`ShopError::PreconditionViolation`] if the cart has no line for the
    /// product.
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<(), ShopError> {
        let missing = || ShopError::PreconditionViolation(format!("no cart line for product {product_id}"));
        if !self.store.state(|s| s.cart.contains(product_id)).await {
            tracing::error!(product_id = %product_id, "Removal of a line the cart does not hold");
            return Err(missing());
        }
        let handle = self
            .store
            .send(ShopAction::RemoveFromCart {
                product_id: product_id.clone(),
            })
            .await?;
        // The line can go between the check and the send; the cart reducer
        // only starts an effect when it refuses the removal.
        if handle.started() > 0 {
            return Err(missing());
        }
        Ok(())
    }

    // ========== Session ==========

    /// Start a session; it ends by itself at `session.expires_at`
    ///
    /// # Errors
    ///
    /// [`ShopError::SessionExpired`] if the session is already expired.
    pub async fn sign_in(&self, session: Session) -> Result<(), ShopError> {
        if session.is_expired_at(self.environment.clock.now()) {
            return Err(ShopError::SessionExpired);
        }
        self.store.send(ShopAction::SessionStarted { session }).await?;
        Ok(())
    }

    /// End the session, forgetting owned products and orders
    ///
    /// # Errors
    ///
    /// [`ShopError::Store`] if the store is shutting down.
    pub async fn sign_out(&self) -> Result<(), ShopError> {
        self.store.send(ShopAction::SignedOut).await?;
        Ok(())
    }

    // ========== Projections ==========

    /// Every product, in server order
    pub async fn catalog(&self) -> Vec<Product> {
        self.store.state(|s| s.products.catalog().to_vec()).await
    }

    /// Products owned by the signed-in user
    pub async fn owned_products(&self) -> Vec<Product> {
        self.store.state(|s| s.products.owned().to_vec()).await
    }

    /// One product from the catalog
    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        self.store.state(|s| s.products.get(id).cloned()).await
    }

    /// Snapshot of the cart
    pub async fn cart(&self) -> CartState {
        self.store.state(|s| s.cart.clone()).await
    }

    /// Orders of the signed-in user, as received
    pub async fn orders(&self) -> Vec<Order> {
        self.store.state(|s| s.orders.orders().to_vec()).await
    }

    /// Current session
    pub async fn session(&self) -> Option<Session> {
        self.store.state(|s| s.session.clone()).await
    }

    /// Most recent failure or refusal
    pub async fn last_error(&self) -> Option<ShopError> {
        self.store.state(|s| s.last_error.clone()).await
    }

    /// Whether a command of this kind is in flight
    pub async fn is_syncing(&self, command: SyncCommand) -> bool {
        self.store.state(|s| s.is_syncing(command)).await
    }

    /// Stop accepting commands and wait for in-flight ones
    ///
    /// Commands already sent still settle and their callers are answered.
    /// The session timer is cancelled.
    ///
    /// # Errors
    ///
    /// [`ShopError::Store`] if commands are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ShopError> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }
}

fn unexpected(action: &ShopAction) -> ShopError {
    tracing::error!(?action, "Command settled with an unexpected event");
    ShopError::PreconditionViolation("command settled with an unexpected event".to_string())
}
