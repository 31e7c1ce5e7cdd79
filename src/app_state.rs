//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::{pagination::PaginationConfig, store::TransactionStore};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The store that transactions are read from.
    pub store: Arc<dyn TransactionStore>,

    /// The config that controls how to page transactions.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] that reads transactions from `store`.
    pub fn new(store: impl TransactionStore + 'static, pagination_config: PaginationConfig) -> Self {
        Self {
            store: Arc::new(store),
            pagination_config,
        }
    }
}
