//! Actions for the storefront store.

use crate::error::ShopError;
use crate::money::Money;
use crate::types::{CartLine, Order, Product, ProductDraft, ProductEdit, ProductId, RequestId, Session, UserId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Remote operation kinds, used for pending tracking and metrics labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyncCommand {
    /// Read the whole catalog
    FetchProducts,
    /// Create a product
    CreateProduct,
    /// Edit a product
    UpdateProduct,
    /// Delete a product
    DeleteProduct,
    /// Read the user's orders
    FetchOrders,
    /// Place an order
    PlaceOrder,
}

impl SyncCommand {
    /// Stable snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchProducts => "fetch_products",
            Self::CreateProduct => "create_product",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::FetchOrders => "fetch_orders",
            Self::PlaceOrder => "place_order",
        }
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can happen to the storefront state
///
/// Commands carrying a [`RequestId`] perform one round trip and settle into
/// exactly one event with the same id: a success event or `SyncFailed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopAction {
    // ===== Cart =====
    /// Add one unit of a product to the cart
    AddToCart {
        /// Product being added
        product: Product,
    },
    /// Remove one unit of a product from the cart
    RemoveFromCart {
        /// Product whose line shrinks
        product_id: ProductId,
    },

    // ===== Session =====
    /// A user signed in
    SessionStarted {
        /// New credentials
        session: Session,
    },
    /// A session timer fired
    SessionExpired {
        /// Expiry the timer was scheduled for
        expires_at: DateTime<Utc>,
    },
    /// The user signed out or the session expired
    SignedOut,

    // ===== Remote commands =====
    /// Read the whole catalog
    FetchProducts {
        /// Correlation id
        request: RequestId,
    },
    /// Create a product owned by the signed-in user
    CreateProduct {
        /// Correlation id
        request: RequestId,
        /// Product payload
        draft: ProductDraft,
    },
    /// Edit an owned product
    UpdateProduct {
        /// Correlation id
        request: RequestId,
        /// Product to edit
        product_id: ProductId,
        /// New fields
        edit: ProductEdit,
    },
    /// Delete an owned product
    DeleteProduct {
        /// Correlation id
        request: RequestId,
        /// Product to delete
        product_id: ProductId,
    },
    /// Read the signed-in user's orders
    FetchOrders {
        /// Correlation id
        request: RequestId,
    },
    /// Place an order with a snapshot of cart lines
    PlaceOrder {
        /// Correlation id
        request: RequestId,
        /// Line snapshot
        lines: Vec<CartLine>,
        /// Amount to charge
        total: Money,
    },

    // ===== Events =====
    /// The catalog was fetched
    ProductsLoaded {
        /// Correlation id
        request: RequestId,
        /// Every product
        products: Vec<Product>,
        /// User signed in when the fetch was issued
        owner: Option<UserId>,
    },
    /// A product was created on the server
    ProductCreated {
        /// Correlation id
        request: RequestId,
        /// The new product under its server id
        product: Product,
    },
    /// The server accepted an edit that is not applied locally yet
    UpdateAccepted {
        /// Correlation id
        request: RequestId,
        /// Edited product
        product_id: ProductId,
        /// Fields that were sent
        edit: ProductEdit,
    },
    /// A product edit was applied to both catalog views
    ProductUpdated {
        /// Correlation id
        request: RequestId,
        /// Edited product
        product_id: ProductId,
        /// Fields that were sent
        edit: ProductEdit,
    },
    /// A product was deleted on the server
    ProductDeleted {
        /// Correlation id
        request: RequestId,
        /// Deleted product
        product_id: ProductId,
    },
    /// The user's orders were fetched
    OrdersLoaded {
        /// Correlation id
        request: RequestId,
        /// User the orders belong to
        owner: UserId,
        /// Orders as received
        orders: Vec<Order>,
    },
    /// An order was accepted by the server
    OrderPlaced {
        /// Correlation id
        request: RequestId,
        /// User who placed it
        owner: UserId,
        /// The order under its server id
        order: Order,
    },
    /// A remote command failed; no state was changed
    SyncFailed {
        /// Correlation id
        request: RequestId,
        /// Which command failed
        command: SyncCommand,
        /// Why
        error: ShopError,
    },
    /// A local command was refused
    Rejected {
        /// Why
        error: ShopError,
    },
}

impl ShopAction {
    /// Request id this action settles, if it is a settling event
    #[must_use]
    pub const fn settled_request(&self) -> Option<RequestId> {
        match self {
            Self::ProductsLoaded { request, .. }
            | Self::ProductCreated { request, .. }
            | Self::ProductUpdated { request, .. }
            | Self::ProductDeleted { request, .. }
            | Self::OrdersLoaded { request, .. }
            | Self::OrderPlaced { request, .. }
            | Self::SyncFailed { request, .. } => Some(*request),
            _ => None,
        }
    }

    /// Remote command this action issues, with its request id
    #[must_use]
    pub const fn issued_command(&self) -> Option<(RequestId, SyncCommand)> {
        match self {
            Self::FetchProducts { request } => Some((*request, SyncCommand::FetchProducts)),
            Self::CreateProduct { request, .. } => Some((*request, SyncCommand::CreateProduct)),
            Self::UpdateProduct { request, .. } => Some((*request, SyncCommand::UpdateProduct)),
            Self::DeleteProduct { request, .. } => Some((*request, SyncCommand::DeleteProduct)),
            Self::FetchOrders { request } => Some((*request, SyncCommand::FetchOrders)),
            Self::PlaceOrder { request, .. } => Some((*request, SyncCommand::PlaceOrder)),
            _ => None,
        }
    }
}
