//! Defines the route handler that lists transactions as JSON.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use mongodb::bson::Document;

use crate::{
    AppState, Error, endpoints,
    pagination::{Pagination, PaginationConfig},
    store::TransactionStore,
};

use super::{
    filter::build_filter,
    models::TransactionsPage,
    query::{TransactionQuery, TransactionsQueryParams},
};

/// The state needed for listing transactions.
#[derive(Clone)]
pub(crate) struct ListTransactionsState {
    /// The store to read transactions from.
    store: Arc<dyn TransactionStore>,
    /// The defaults for requests that do not specify a page.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            pagination_config: state.pagination_config,
        }
    }
}

/// Get a page of transactions matching the filters in the query string.
///
/// The query string is read as raw pairs so that repeated or unexpected keys
/// never reject the request.
///
/// Store errors are logged and turned into a 500 response by [Error].
pub(crate) async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<TransactionsPage>, Error> {
    let params = TransactionsQueryParams::from_pairs(pairs);
    tracing::debug!("Received query params: {params:?}");

    let query = TransactionQuery::parse(params, &state.pagination_config);
    let filter = build_filter(&query);
    tracing::debug!("Constructed filter: {filter}");

    fetch_page(state.store.as_ref(), &filter, query.pagination)
        .await
        .map(Json)
        .inspect_err(|error| {
            tracing::error!("Error in {}: {error}", endpoints::TRANSACTIONS_API)
        })
}

/// Count the transactions matching `filter`, then fetch the requested page of
/// them.
///
/// The count and the fetch are separate reads, so writes that land in between
/// can make the page disagree with the count.
async fn fetch_page(
    store: &dyn TransactionStore,
    filter: &Document,
    pagination: Pagination,
) -> Result<TransactionsPage, Error> {
    let total_count = store.count(filter).await?;
    tracing::debug!("Total matching documents: {total_count}");

    let transactions = store
        .find_page(filter, pagination.skip(), pagination.limit)
        .await?;
    tracing::debug!("Fetched transactions: {}", transactions.len());

    Ok(TransactionsPage {
        transactions,
        total_count,
        current_page: pagination.page,
        total_pages: pagination.page_count(total_count),
    })
}
