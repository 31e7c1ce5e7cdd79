//! Defines the transaction store trait.

mod mongo;

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::{Error, transaction::Transaction};

pub use mongo::MongoTransactionStore;

/// Read access to a collection of transactions.
///
/// Both methods take a MongoDB filter document. Callers that page through results
/// should pass the identical filter to [TransactionStore::count] and
/// [TransactionStore::find_page] so that the count describes the pages.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Count the transactions matching `filter`.
    async fn count(&self, filter: &Document) -> Result<u64, Error>;

    /// Retrieve up to `limit` transactions matching `filter`, sorted by
    /// transaction date from newest to oldest, after skipping the first
    /// `skip` matches.
    async fn find_page(
        &self,
        filter: &Document,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error>;

    /// Check that the store can be reached.
    async fn ping(&self) -> Result<(), Error>;

    /// Create the text index that search queries rely on. Does nothing if the
    /// index already exists.
    async fn create_text_index(&self) -> Result<(), Error>;
}

/// Check that `store` is reachable and, if `create_text_index` is set, make sure
/// the text index exists.
///
/// Failures are logged and otherwise ignored. The server keeps answering
/// requests while the store is down, each failing request gets a 500.
pub async fn check_store(store: &dyn TransactionStore, create_text_index: bool) {
    match store.ping().await {
        Ok(()) => tracing::info!("Connected to the transaction store"),
        Err(error) => {
            tracing::error!("Error connecting to the transaction store: {error}");
            return;
        }
    }

    if create_text_index
        && let Err(error) = store.create_text_index().await
    {
        tracing::error!("Could not create text index: {error}");
    }
}
