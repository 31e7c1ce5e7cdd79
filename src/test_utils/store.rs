use std::{
    cmp::Ordering,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use mongodb::bson::{Bson, DateTime, Document, doc};

use crate::{
    Error, TransactionStore,
    transaction::{DESCRIPTION_FIELD, TRANS_DATE_FIELD, Transaction},
};

/// Milliseconds since the epoch for 2023-01-01T00:00:00Z.
pub(crate) const JAN_1_2023_MILLIS: i64 = 1_672_531_200_000;
const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// An in-memory store that understands the subset of MongoDB filters built
/// for transaction queries and records every filter it is given.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransactionStore {
    documents: Vec<Document>,
    count_filters: Arc<Mutex<Vec<Document>>>,
    find_filters: Arc<Mutex<Vec<Document>>>,
    text_index_requests: Arc<Mutex<usize>>,
    unreachable: bool,
}

impl FakeTransactionStore {
    pub(crate) fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// A store with `count` transactions, one per day starting on 2023-01-01,
    /// with credits of 10, 20, 30 and so on.
    pub(crate) fn with_transactions(count: usize) -> Self {
        let documents = (0..count)
            .map(|i| {
                doc! {
                    "id": i as i64,
                    "trans_date": DateTime::from_millis(JAN_1_2023_MILLIS + i as i64 * DAY_MILLIS),
                    "credit": (i + 1) as f64 * 10.0,
                    "description": format!("transaction #{i}"),
                }
            })
            .collect();

        Self::new(documents)
    }

    /// Make pings fail while still answering queries, like a store that was
    /// down at startup and came back later.
    pub(crate) fn unreachable(self) -> Self {
        Self {
            unreachable: true,
            ..self
        }
    }

    pub(crate) fn text_index_requests(&self) -> usize {
        *self.text_index_requests.lock().unwrap()
    }

    pub(crate) fn count_filters(&self) -> Vec<Document> {
        self.count_filters.lock().unwrap().clone()
    }

    pub(crate) fn find_filters(&self) -> Vec<Document> {
        self.find_filters.lock().unwrap().clone()
    }

    fn matching(&self, filter: &Document) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|document| matches_filter(document, filter))
            .collect()
    }
}

#[async_trait]
impl TransactionStore for FakeTransactionStore {
    async fn count(&self, filter: &Document) -> Result<u64, Error> {
        self.count_filters.lock().unwrap().push(filter.clone());

        Ok(self.matching(filter).len() as u64)
    }

    async fn find_page(
        &self,
        filter: &Document,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>, Error> {
        self.find_filters.lock().unwrap().push(filter.clone());

        let mut matching = self.matching(filter);
        matching.sort_by(|a, b| {
            compare(b.get(TRANS_DATE_FIELD), a.get(TRANS_DATE_FIELD)).unwrap_or(Ordering::Equal)
        });

        Ok(matching
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .map(Transaction::new)
            .collect())
    }

    async fn ping(&self) -> Result<(), Error> {
        if self.unreachable {
            return Err(Error::Store("server selection timeout".to_owned()));
        }

        Ok(())
    }

    async fn create_text_index(&self) -> Result<(), Error> {
        *self.text_index_requests.lock().unwrap() += 1;

        Ok(())
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| match (key.as_str(), condition) {
        ("$text", Bson::Document(text)) => {
            let search = text.get_str("$search").unwrap_or_default().to_lowercase();
            let description = document
                .get_str(DESCRIPTION_FIELD)
                .unwrap_or_default()
                .to_lowercase();
            search
                .split_whitespace()
                .any(|term| description.contains(term))
        }
        (field, Bson::Document(range)) => range.iter().all(|(operator, bound)| {
            let ordering = compare(document.get(field), Some(bound));
            match operator.as_str() {
                "$gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                "$lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                other => panic!("unsupported operator {other}"),
            }
        }),
        (field, value) => document.get(field) == Some(value),
    })
}

/// Compare values of the same type, `None` for anything else.
fn compare(left: Option<&Bson>, right: Option<&Bson>) -> Option<Ordering> {
    match (left?, right?) {
        (Bson::DateTime(left), Bson::DateTime(right)) => Some(left.cmp(right)),
        (Bson::Double(left), Bson::Double(right)) => left.partial_cmp(right),
        _ => None,
    }
}

/// A store whose every operation fails with the same error.
#[derive(Debug, Clone)]
pub(crate) struct FailingTransactionStore {
    message: String,
}

impl FailingTransactionStore {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

#[async_trait]
impl TransactionStore for FailingTransactionStore {
    async fn count(&self, _filter: &Document) -> Result<u64, Error> {
        Err(Error::Store(self.message.clone()))
    }

    async fn find_page(
        &self,
        _filter: &Document,
        _skip: u64,
        _limit: u64,
    ) -> Result<Vec<Transaction>, Error> {
        Err(Error::Store(self.message.clone()))
    }

    async fn ping(&self) -> Result<(), Error> {
        Err(Error::Store(self.message.clone()))
    }

    async fn create_text_index(&self) -> Result<(), Error> {
        Err(Error::Store(self.message.clone()))
    }
}
