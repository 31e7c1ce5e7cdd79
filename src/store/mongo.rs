//! Implements the transaction store on a MongoDB collection.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
};

use crate::{
    Error,
    transaction::{DESCRIPTION_FIELD, TRANS_DATE_FIELD, Transaction},
};

use super::TransactionStore;

/// Stores transactions as documents in a MongoDB collection.
///
/// Cloning is cheap, clones share the client's connection pool.
#[derive(Debug, Clone)]
pub struct MongoTransactionStore {
    database: Database,
    collection: Collection<Document>,
}

impl MongoTransactionStore {
    /// Create a client for `uri` and use the collection `collection` in the
    /// database `database`.
    ///
    /// No connection is made here, the driver connects lazily on the first
    /// operation. Use [TransactionStore::ping] to check connectivity.
    ///
    /// # Errors
    /// Returns [Error::InvalidConfig] if `uri` is not a valid MongoDB
    /// connection string.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(uri).await.map_err(|error| {
            Error::InvalidConfig(format!(
                "could not create MongoDB client for {uri:?}: {}",
                error.kind
            ))
        })?;

        Ok(Self::new(client.database(database), collection))
    }

    /// Use the collection `collection` in `database`.
    pub fn new(database: Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
            database,
        }
    }
}

#[async_trait]
impl TransactionStore for MongoTransactionStore {
    async fn count(&self, filter: &Document) -> Result<u64, Error> {
        let count = self.collection.count_documents(filter.clone()).await?;

        Ok(count)
    }

    async fn find_page(
        &self,
        filter: &Document,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error> {
        let mut sort = Document::new();
        sort.insert(TRANS_DATE_FIELD, -1);

        let documents: Vec<Document> = self
            .collection
            .find(filter.clone())
            .sort(sort)
            .skip(skip)
            // A limit of zero means "no limit" to MongoDB.
            .limit(i64::try_from(limit.max(1)).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Transaction::new).collect())
    }

    async fn ping(&self) -> Result<(), Error> {
        self.database.run_command(doc! { "ping": 1 }).await?;

        Ok(())
    }

    async fn create_text_index(&self) -> Result<(), Error> {
        let mut keys = Document::new();
        keys.insert(DESCRIPTION_FIELD, "text");

        let result = self
            .collection
            .create_index(IndexModel::builder().keys(keys).build())
            .await?;
        tracing::info!("Text index {} is ready", result.index_name);

        Ok(())
    }
}
