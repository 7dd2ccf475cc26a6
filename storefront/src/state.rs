//! Root storefront state.

use crate::action::SyncCommand;
use crate::cart::CartState;
use crate::catalog::CatalogState;
use crate::error::ShopError;
use crate::ledger::OrderLedger;
use crate::types::{RequestId, Session};
use std::collections::BTreeMap;

/// Everything the store owns
///
/// Fields are public so reducers can be scoped onto them; outside the crate
/// the state is only reached through read projections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShopState {
    /// Signed-in user, if any
    pub session: Option<Session>,
    /// Catalog and owned subset
    pub products: CatalogState,
    /// Shopping cart
    pub cart: CartState,
    /// Orders of the signed-in user
    pub orders: OrderLedger,
    /// Remote commands issued and not yet settled
    pub pending: BTreeMap<RequestId, SyncCommand>,
    /// Most recent failure or refusal
    pub last_error: Option<ShopError>,
}

impl ShopState {
    /// Whether a command of this kind is in flight
    #[must_use]
    pub fn is_syncing(&self, command: SyncCommand) -> bool {
        self.pending.values().any(|c| *c == command)
    }

    /// Whether any remote command is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }
}
