//! Storefront reducers.
//!
//! The cart and the catalog have reducers scoped to their slice of
//! [`ShopState`]. The ledger reducer and [`SyncReducer`] see the whole state
//! because they check the session. [`SyncReducer`] runs last: it owns the
//! session, issues remote commands as effects and tracks which of them are
//! still pending.

use crate::action::{ShopAction, SyncCommand};
use crate::api::ShopApi;
use crate::cart::CartState;
use crate::catalog::CatalogState;
use crate::error::ShopError;
use crate::state::ShopState;
use crate::types::{Order, RequestId, Session, UserId};
use shopfront_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use shopfront_core::effect::Effect;
use shopfront_core::environment::Clock;
use shopfront_core::reducer::Reducer;
use shopfront_core::{SmallVec, async_effect, delay, smallvec};
use std::sync::Arc;

/// Environment for the storefront containing dependencies
#[derive(Clone)]
pub struct ShopEnvironment {
    /// Remote document store
    pub api: Arc<dyn ShopApi>,
    /// Clock for order timestamps and session expiry
    pub clock: Arc<dyn Clock>,
}

impl ShopEnvironment {
    /// Creates a new storefront environment
    pub fn new(api: Arc<dyn ShopApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

fn reject(error: ShopError) -> Effect<ShopAction> {
    async_effect! { Some(ShopAction::Rejected { error }) }
}

/// Folds cart commands and the events that touch the cart
#[derive(Clone, Copy, Debug, Default)]
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    fn reduce(
        &self,
        cart: &mut CartState,
        action: ShopAction,
        _env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        match action {
            ShopAction::AddToCart { product } => {
                cart.add_line(&product);
                smallvec![Effect::None]
            },
            ShopAction::RemoveFromCart { product_id } => match cart.remove_line(&product_id) {
                Ok(()) => smallvec![Effect::None],
                Err(error) => {
                    tracing::error!(product_id = %product_id, "Removal of a line the cart does not hold");
                    smallvec![reject(error)]
                },
            },
            ShopAction::ProductDeleted { product_id, .. } => {
                if let Some(line) = cart.evict_product(&product_id) {
                    tracing::debug!(product_id = %product_id, sum = %line.sum, "Evicted deleted product from cart");
                }
                smallvec![Effect::None]
            },
            ShopAction::OrderPlaced { .. } => {
                cart.clear();
                smallvec![Effect::None]
            },
            _ => smallvec![Effect::None],
        }
    }
}

/// Keeps the catalog and the owned subset in step
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogReducer;

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    fn reduce(
        &self,
        catalog: &mut CatalogState,
        action: ShopAction,
        _env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        match action {
            ShopAction::ProductsLoaded { products, owner, .. } => {
                catalog.set_all(products, owner.as_ref());
                smallvec![Effect::None]
            },
            ShopAction::UpdateAccepted { request, product_id, edit } => {
                match catalog.update(&product_id, &edit) {
                    Ok(_) => smallvec![async_effect! {
                        Some(ShopAction::ProductUpdated { request, product_id, edit })
                    }],
                    Err(error) => {
                        // The product left the owned subset while the request was in flight.
                        tracing::error!(product_id = %product_id, "Update accepted for a product no longer owned");
                        smallvec![async_effect! {
                            Some(ShopAction::SyncFailed {
                                request,
                                command: SyncCommand::UpdateProduct,
                                error,
                            })
                        }]
                    },
                }
            },
            ShopAction::ProductDeleted { product_id, .. } => {
                catalog.delete(&product_id);
                smallvec![Effect::None]
            },
            ShopAction::SignedOut => {
                catalog.clear_owned();
                smallvec![Effect::None]
            },
            _ => smallvec![Effect::None],
        }
    }
}

/// Replaces or extends the order ledger
///
/// Runs on the whole state: orders only land in the ledger while their
/// owner is the signed-in user.
#[derive(Clone, Copy, Debug, Default)]
pub struct LedgerReducer;

impl LedgerReducer {
    fn belongs_to_session(state: &ShopState, owner: &UserId) -> bool {
        let current = state.session.as_ref().is_some_and(|s| &s.user_id == owner);
        if !current {
            tracing::warn!(%owner, "Orders settled for a user who is no longer signed in");
        }
        current
    }
}

impl Reducer for LedgerReducer {
    type State = ShopState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    fn reduce(
        &self,
        state: &mut ShopState,
        action: ShopAction,
        env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        match action {
            ShopAction::SessionStarted { session } => {
                // Runs before the session is replaced; another user's orders go.
                let switching = state.session.as_ref().is_some_and(|s| s.user_id != session.user_id);
                if switching && !session.is_expired_at(env.clock.now()) {
                    state.orders.clear();
                }
            },
            ShopAction::OrdersLoaded { orders, owner, .. } => {
                if Self::belongs_to_session(state, &owner) {
                    state.orders.replace_all(orders);
                }
            },
            ShopAction::OrderPlaced { order, owner, .. } => {
                if Self::belongs_to_session(state, &owner) {
                    state.orders.append(order);
                }
            },
            ShopAction::SignedOut => state.orders.clear(),
            _ => {},
        }
        smallvec![Effect::None]
    }
}

/// Session handling and remote command issue/settle bookkeeping
#[derive(Clone, Copy, Debug, Default)]
pub struct SyncReducer;

impl SyncReducer {
    fn authenticated(state: &ShopState) -> Result<Session, ShopError> {
        state.session.clone().ok_or(ShopError::NotAuthenticated)
    }

    fn start(state: &mut ShopState, request: RequestId, command: SyncCommand) {
        tracing::debug!(%request, %command, "Issuing remote command");
        metrics::counter!("shop.sync.issued", "command" => command.as_str()).increment(1);
        state.pending.insert(request, command);
    }

    fn settle(state: &mut ShopState, request: RequestId) {
        if let Some(command) = state.pending.remove(&request) {
            tracing::info!(%request, %command, "Remote command settled");
            metrics::counter!("shop.sync.completed", "command" => command.as_str()).increment(1);
        }
    }

    /// Settles a command that failed its checks without any I/O
    fn refuse(
        request: RequestId,
        command: SyncCommand,
        error: ShopError,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        tracing::warn!(%request, %command, error = %error, "Command refused before sending");
        smallvec![async_effect! {
            Some(ShopAction::SyncFailed { request, command, error })
        }]
    }

    fn failed(request: RequestId, command: SyncCommand, error: impl Into<ShopError>) -> ShopAction {
        ShopAction::SyncFailed {
            request,
            command,
            error: error.into(),
        }
    }
}

impl Reducer for SyncReducer {
    type State = ShopState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut ShopState,
        action: ShopAction,
        env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        match action {
            // ========== Session ==========
            ShopAction::SessionStarted { session } => {
                let now = env.clock.now();
                if session.is_expired_at(now) {
                    tracing::warn!(user_id = %session.user_id, "Ignoring session that has already expired");
                    return smallvec![Effect::None];
                }

                let expires_at = session.expires_at;
                let remaining = (expires_at - now).to_std().unwrap_or_default();
                tracing::info!(user_id = %session.user_id, "Session started");
                state.products.rederive_owned(Some(&session.user_id));
                state.session = Some(session);

                smallvec![delay! {
                    duration: remaining,
                    action: ShopAction::SessionExpired { expires_at }
                }]
            },
            ShopAction::SessionExpired { expires_at } => {
                let current = state.session.as_ref().is_some_and(|s| s.expires_at == expires_at);
                if !current {
                    tracing::trace!("Stale session timer ignored");
                    return smallvec![Effect::None];
                }
                tracing::info!("Session expired");
                smallvec![async_effect! { Some(ShopAction::SignedOut) }]
            },
            ShopAction::SignedOut => {
                state.session = None;
                smallvec![Effect::None]
            },

            // ========== Remote commands ==========
            ShopAction::FetchProducts { request } => {
                let owner = state.session.as_ref().map(|s| s.user_id.clone());
                Self::start(state, request, SyncCommand::FetchProducts);

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    Some(match api.fetch_products().await {
                        Ok(products) => ShopAction::ProductsLoaded { request, products, owner },
                        Err(error) => Self::failed(request, SyncCommand::FetchProducts, error),
                    })
                }]
            },
            ShopAction::CreateProduct { request, draft } => {
                let checked = Self::authenticated(state).and_then(|session| {
                    draft.validate()?;
                    Ok(session)
                });
                let session = match checked {
                    Ok(session) => session,
                    Err(error) => return Self::refuse(request, SyncCommand::CreateProduct, error),
                };
                Self::start(state, request, SyncCommand::CreateProduct);

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.create_product(&session, &draft).await;
                    Some(match result {
                        Ok(id) => ShopAction::ProductCreated {
                            request,
                            product: draft.into_product(id, session.user_id),
                        },
                        Err(error) => Self::failed(request, SyncCommand::CreateProduct, error),
                    })
                }]
            },
            ShopAction::UpdateProduct { request, product_id, edit } => {
                let checked = Self::authenticated(state).and_then(|session| {
                    edit.validate()?;
                    if !state.products.owns(&product_id) {
                        return Err(ShopError::StaleReference(product_id.clone()));
                    }
                    Ok(session)
                });
                let session = match checked {
                    Ok(session) => session,
                    Err(error) => return Self::refuse(request, SyncCommand::UpdateProduct, error),
                };
                Self::start(state, request, SyncCommand::UpdateProduct);

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.update_product(&session, &product_id, &edit).await;
                    Some(match result {
                        Ok(()) => ShopAction::UpdateAccepted { request, product_id, edit },
                        Err(error) => Self::failed(request, SyncCommand::UpdateProduct, error),
                    })
                }]
            },
            ShopAction::DeleteProduct { request, product_id } => {
                let session = match Self::authenticated(state) {
                    Ok(session) => session,
                    Err(error) => return Self::refuse(request, SyncCommand::DeleteProduct, error),
                };
                Self::start(state, request, SyncCommand::DeleteProduct);

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.delete_product(&session, &product_id).await;
                    Some(match result {
                        Ok(()) => ShopAction::ProductDeleted { request, product_id },
                        Err(error) => Self::failed(request, SyncCommand::DeleteProduct, error),
                    })
                }]
            },
            ShopAction::FetchOrders { request } => {
                let session = match Self::authenticated(state) {
                    Ok(session) => session,
                    Err(error) => return Self::refuse(request, SyncCommand::FetchOrders, error),
                };
                Self::start(state, request, SyncCommand::FetchOrders);

                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    Some(match api.fetch_orders(&session).await {
                        Ok(orders) => ShopAction::OrdersLoaded {
                            request,
                            owner: session.user_id,
                            orders,
                        },
                        Err(error) => Self::failed(request, SyncCommand::FetchOrders, error),
                    })
                }]
            },
            ShopAction::PlaceOrder { request, lines, total } => {
                let checked = Self::authenticated(state).and_then(|session| {
                    if lines.is_empty() {
                        return Err(ShopError::EmptyOrder);
                    }
                    Ok(session)
                });
                let session = match checked {
                    Ok(session) => session,
                    Err(error) => return Self::refuse(request, SyncCommand::PlaceOrder, error),
                };
                Self::start(state, request, SyncCommand::PlaceOrder);

                let placed_at = env.clock.now();
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.place_order(&session, &lines, total, placed_at).await;
                    Some(match result {
                        Ok(id) => ShopAction::OrderPlaced {
                            request,
                            owner: session.user_id,
                            order: Order { id, lines, total, placed_at },
                        },
                        Err(error) => Self::failed(request, SyncCommand::PlaceOrder, error),
                    })
                }]
            },

            // ========== Settling events ==========
            ShopAction::ProductsLoaded { request, owner, .. } => {
                Self::settle(state, request);
                // The user may have changed while the fetch was in flight.
                let current = state.session.as_ref().map(|s| &s.user_id);
                if owner.as_ref() != current {
                    state.products.rederive_owned(current);
                }
                smallvec![Effect::None]
            },
            ShopAction::ProductCreated { request, product } => {
                Self::settle(state, request);
                // Owned only if its creator is still the one signed in.
                let current = state.session.as_ref().map(|s| &s.user_id);
                state.products.create(product, current);
                smallvec![Effect::None]
            },
            ShopAction::ProductUpdated { request, .. }
            | ShopAction::ProductDeleted { request, .. }
            | ShopAction::OrdersLoaded { request, .. }
            | ShopAction::OrderPlaced { request, .. } => {
                Self::settle(state, request);
                smallvec![Effect::None]
            },
            ShopAction::SyncFailed { request, command, error } => {
                state.pending.remove(&request);
                tracing::warn!(%request, %command, error = %error, "Remote command failed");
                metrics::counter!("shop.sync.failed", "command" => command.as_str()).increment(1);
                state.last_error = Some(error);
                smallvec![Effect::None]
            },
            ShopAction::Rejected { error } => {
                tracing::error!(error = %error, "Command rejected");
                state.last_error = Some(error);
                smallvec![Effect::None]
            },

            // Handled by the slice reducers
            ShopAction::AddToCart { .. }
            | ShopAction::RemoveFromCart { .. }
            | ShopAction::UpdateAccepted { .. } => smallvec![Effect::None],
        }
    }
}

/// The storefront reducer: every slice reducer combined with [`SyncReducer`]
pub struct ShopReducer {
    inner: CombinedReducer<ShopState, ShopAction, ShopEnvironment>,
}

impl ShopReducer {
    /// Creates the combined reducer
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: combine_reducers::<ShopState, ShopAction, ShopEnvironment>(vec![
                Box::new(scope_reducer(
                    CartReducer,
                    |s: &ShopState| &s.cart,
                    |s: &mut ShopState, cart: CartState| s.cart = cart,
                )),
                Box::new(scope_reducer(
                    CatalogReducer,
                    |s: &ShopState| &s.products,
                    |s: &mut ShopState, products: CatalogState| s.products = products,
                )),
                Box::new(LedgerReducer),
                Box::new(SyncReducer),
            ]),
        }
    }
}

impl Default for ShopReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for ShopReducer {
    type State = ShopState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    fn reduce(
        &self,
        state: &mut ShopState,
        action: ShopAction,
        env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        self.inner.reduce(state, action, env)
    }
}
