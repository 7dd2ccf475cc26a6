//! # Shopfront
//!
//! Client-side state synchronization for a storefront backed by a remote
//! document store.
//!
//! One [`Shop`] owns the catalog, the cart and the order ledger. The UI layer
//! issues commands against it and reads projections back; nothing else holds
//! mutable access to the collections.
//!
//! ## Architecture
//!
//! ```text
//! command ─▶ SyncReducer ─▶ Effect (one HTTP round trip)
//!                                  │
//!                                  ▼
//!             success event | SyncFailed ─▶ Cart / Catalog / Ledger reducers
//! ```
//!
//! - **Cart** ([`cart`]): line items keyed by product id with exact decimal sums
//! - **Catalog** ([`catalog`]): every product plus the subset owned by the signed-in user
//! - **Ledger** ([`ledger`]): orders of the signed-in user
//! - **Remote sync** ([`api`], [`reducer`]): one best-effort request per command, never retried
//!
//! A failed command leaves every collection exactly as it was.
//!
//! ## Example
//!
//! ```ignore
//! use shopfront::{Shop, ShopConfig};
//!
//! let shop = Shop::connect(&ShopConfig::from_env()?);
//! shop.sign_in(session).await?;
//! shop.fetch_products().await?;
//!
//! let first = shop.catalog().await.remove(0);
//! shop.add_to_cart(first).await?;
//! let order = shop.checkout().await?;
//! ```

pub mod action;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod money;
pub mod reducer;
pub mod shop;
pub mod state;
pub mod types;
pub mod validation;

pub use action::{ShopAction, SyncCommand};
pub use api::{ApiError, HttpShopApi, MockShopApi, ShopApi};
pub use cart::CartState;
pub use catalog::CatalogState;
pub use config::{ConfigError, ShopConfig};
pub use error::ShopError;
pub use ledger::OrderLedger;
pub use money::Money;
pub use reducer::{ShopEnvironment, ShopReducer};
pub use shop::Shop;
pub use state::ShopState;
pub use types::{
    CartLine, Order, OrderId, Product, ProductDraft, ProductEdit, ProductId, RequestId, Session, UserId,
};
pub use validation::ValidationError;
