//! Error types for the storefront.

use crate::api::ApiError;
use crate::types::ProductId;
use crate::validation::ValidationError;
use shopfront_runtime::StoreError;
use thiserror::Error;

/// Errors surfaced by storefront commands
///
/// Errors are values carried by actions, so they are `Clone` and compare by
/// content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// The request could not complete or the server answered non-2xx
    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status, when the server answered
        status: Option<u16>,
        /// What went wrong
        message: String,
    },

    /// A command referenced a product that is not in the expected collection
    #[error("Stale reference to product {0}")]
    StaleReference(ProductId),

    /// A local command was issued against state that does not allow it
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// An authenticated command was issued without a session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The session had already expired when it was offered
    #[error("Session expired")]
    SessionExpired,

    /// The product payload failed validation
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ValidationError),

    /// An order was placed with no lines
    #[error("Cannot place an empty order")]
    EmptyOrder,

    /// The store rejected or lost the command
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ShopError {
    /// Whether re-issuing the same command may succeed
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<ApiError> for ShopError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status { status, body } => Self::Transport {
                status: Some(status),
                message: if body.is_empty() {
                    format!("server answered {status}")
                } else {
                    format!("server answered {status}: {body}")
                },
            },
            ApiError::Request(message) => Self::Transport {
                status: None,
                message,
            },
            ApiError::Decode(message) => Self::Transport {
                status: None,
                message: format!("malformed response: {message}"),
            },
        }
    }
}
