//! Listing, searching and paging transactions.

mod filter;
mod list_endpoint;
mod models;
mod query;

pub(crate) use list_endpoint::get_transactions_endpoint;
pub use models::{Transaction, TransactionsPage};
pub(crate) use models::{DESCRIPTION_FIELD, TRANS_DATE_FIELD};
