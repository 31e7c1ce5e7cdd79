//! Builds the store filter for a transactions query.

use mongodb::bson::{Bson, DateTime, Document, doc};

use super::{
    models::{CREDIT_FIELD, TRANS_DATE_FIELD},
    query::{Bounds, DateBound, TransactionQuery},
};

/// Build the filter document that selects the transactions matching `query`.
///
/// Only the criteria present in `query` produce a clause, so an empty query
/// gives an empty filter that matches every transaction. Range clauses are
/// inclusive and only contain the bounds that were supplied.
pub(crate) fn build_filter(query: &TransactionQuery) -> Document {
    let mut filter = Document::new();

    if let Some(search) = &query.search {
        filter.insert("$text", doc! { "$search": search.as_str() });
    }

    if let Some(clause) = range_clause(&query.date_range, date_bound_to_bson) {
        filter.insert(TRANS_DATE_FIELD, clause);
    }

    if let Some(clause) = range_clause(&query.amount_range, |amount| Bson::Double(*amount)) {
        filter.insert(CREDIT_FIELD, clause);
    }

    filter
}

fn range_clause<T>(bounds: &Bounds<T>, to_bson: impl Fn(&T) -> Bson) -> Option<Document> {
    if bounds.is_unbounded() {
        return None;
    }

    let mut clause = Document::new();

    if let Some(min) = &bounds.min {
        clause.insert("$gte", to_bson(min));
    }

    if let Some(max) = &bounds.max {
        clause.insert("$lte", to_bson(max));
    }

    Some(clause)
}

fn date_bound_to_bson(bound: &DateBound) -> Bson {
    match bound {
        DateBound::Parsed(date_time) => {
            let millis = date_time.unix_timestamp_nanos().div_euclid(1_000_000);
            Bson::DateTime(DateTime::from_millis(millis as i64))
        }
        DateBound::Unparsed(raw) => Bson::String(raw.clone()),
    }
}
