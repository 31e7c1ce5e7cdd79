//! The transaction document and the page of transactions sent to clients.

use mongodb::bson::{Bson, Document};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use time::{OffsetDateTime, macros::format_description};

/// The field holding the date a transaction happened.
pub(crate) const TRANS_DATE_FIELD: &str = "trans_date";
/// The field holding the amount credited.
pub(crate) const CREDIT_FIELD: &str = "credit";
/// The free-text field covered by the text index.
pub(crate) const DESCRIPTION_FIELD: &str = "description";

/// A transaction as stored in the document store.
///
/// Only `trans_date`, `credit` and `description` mean anything to this crate.
/// All other fields are passed through to the client untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction(Document);

impl Transaction {
    /// Wrap a raw document.
    pub fn new(document: Document) -> Self {
        Self(document)
    }

    /// The raw document.
    pub fn document(&self) -> &Document {
        &self.0
    }
}

impl From<Document> for Transaction {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        document_to_json(&self.0).serialize(serializer)
    }
}

/// One page of transactions matching a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsPage {
    /// The transactions on this page, newest first.
    pub transactions: Vec<Transaction>,
    /// How many transactions match the query across all pages.
    pub total_count: u64,
    /// The requested page number.
    pub current_page: u64,
    /// How many pages are needed to show every matching transaction.
    pub total_pages: u64,
}

/// Convert a document to plain JSON.
///
/// Object IDs become hex strings and dates become ISO 8601 strings with
/// millisecond precision, which is what web clients of the API expect.
/// Types with no natural JSON equivalent fall back to relaxed Extended JSON.
fn document_to_json(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect::<Map<String, Value>>(),
    )
}

fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(date_time) => format_date_time(date_time.timestamp_millis())
            .map(Value::String)
            .unwrap_or_else(|| value.clone().into_relaxed_extjson()),
        // JSON has no NaN or infinity.
        Bson::Double(number) => Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::Int32(number) => Value::from(*number),
        Bson::Int64(number) => Value::from(*number),
        Bson::String(text) => Value::String(text.clone()),
        Bson::Boolean(flag) => Value::Bool(*flag),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Document(document) => document_to_json(document),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}

fn format_date_time(timestamp_millis: i64) -> Option<String> {
    let date_time =
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp_millis) * 1_000_000).ok()?;

    date_time
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .ok()
}
