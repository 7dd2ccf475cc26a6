//! Domain types for the storefront.
//!
//! Entities are plain values: the store owns every collection and replaces
//! records instead of sharing mutable references to them.

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Server-assigned product identifier
    ///
    /// Ordering is lexicographic, which is the display order of cart lines.
    ProductId
);

string_id!(
    /// Identifier of an authenticated user
    UserId
);

string_id!(
    /// Server-assigned order identifier
    OrderId
);

/// Correlates a remote command with the action that settles it
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a new request id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw value
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// A product in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier
    pub id: ProductId,
    /// The user who created the product
    pub owner_id: UserId,
    /// Display title
    pub title: String,
    /// Image location
    pub image_url: String,
    /// Free-form description
    pub description: String,
    /// Unit price, fixed at creation
    pub price: Money,
}

/// Payload for creating a product
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductDraft {
    /// Display title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Image location
    pub image_url: String,
    /// Unit price
    pub price: Money,
}

impl ProductDraft {
    /// Builds the catalog record once the server assigned an id
    #[must_use]
    pub fn into_product(self, id: ProductId, owner_id: UserId) -> Product {
        Product {
            id,
            owner_id,
            title: self.title,
            image_url: self.image_url,
            description: self.description,
            price: self.price,
        }
    }
}

/// Payload for editing a product
///
/// Carries no price: prices are immutable once a product exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductEdit {
    /// New display title
    pub title: String,
    /// New description
    pub description: String,
    /// New image location
    pub image_url: String,
}

impl ProductEdit {
    /// Applies the edit, keeping the id, owner and price of `product`
    #[must_use]
    pub fn apply_to(&self, product: &Product) -> Product {
        Product {
            id: product.id.clone(),
            owner_id: product.owner_id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            description: self.description.clone(),
            price: product.price,
        }
    }
}

/// One aggregated entry of the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line is for
    pub product_id: ProductId,
    /// Title captured when the line was created
    pub title: String,
    /// Price captured when the line was created
    pub unit_price: Money,
    /// Always at least 1
    pub quantity: u32,
    /// Always `quantity * unit_price`
    pub sum: Money,
}

/// A placed order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned identifier
    pub id: OrderId,
    /// Cart lines at placement time
    pub lines: Vec<CartLine>,
    /// Amount charged
    pub total: Money,
    /// When the order was placed
    pub placed_at: DateTime<Utc>,
}

/// Credentials of the signed-in user
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Acting user
    pub user_id: UserId,
    /// Bearer token for authenticated requests
    pub token: String,
    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session
    #[must_use]
    pub fn new(user_id: UserId, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            token: token.into(),
            expires_at,
        }
    }

    /// Whether the session is no longer valid at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
