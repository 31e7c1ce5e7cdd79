//! The API endpoints URIs.

/// The route for listing, searching and paging transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
