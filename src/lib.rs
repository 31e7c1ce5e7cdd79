//! A read-only REST API for listing bank transactions stored in MongoDB.
//!
//! The single endpoint, `GET /api/transactions`, supports full-text search,
//! date and amount ranges, and offset pagination. Responses are JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod config;
mod endpoints;
mod logging;
mod not_found;
mod pagination;
mod routing;
mod store;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use config::ServerConfig;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use store::{MongoTransactionStore, TransactionStore, check_store};
pub use transaction::{Transaction, TransactionsPage};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The document store rejected or failed to answer a query.
    ///
    /// The string is the store's own description of the error. It is passed
    /// on to the client as-is, no distinction is made between connection
    /// failures, timeouts and rejected filters.
    #[error("{0}")]
    Store(String),

    /// A configuration value could not be used, e.g. a malformed MongoDB
    /// connection string.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The server could not bind to or serve on its socket.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<mongodb::error::Error> for Error {
    /// Keeps the driver's description of what went wrong and drops the error
    /// labels it appends.
    fn from(value: mongodb::error::Error) -> Self {
        Error::Store(value.kind.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Store(description) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    message: "Error fetching transactions",
                    error: description,
                }),
            )
                .into_response(),
            // Startup errors should never reach a handler, but if they do the
            // details stay in the server logs.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        message: "Internal server error",
                        error: String::new(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use crate::Error;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    }

    #[tokio::test]
    async fn store_error_is_internal_server_error_with_description() {
        let response = Error::Store("connection refused".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "Error fetching transactions",
                "error": "connection refused",
            })
        );
    }

    #[tokio::test]
    async fn driver_error_keeps_only_its_message() {
        let driver_error = mongodb::Client::with_uri_str("not a connection string")
            .await
            .unwrap_err();
        let want = driver_error.kind.to_string();

        let got = Error::from(driver_error);

        assert_eq!(got, Error::Store(want.clone()));
        assert!(!want.is_empty());
        assert!(!want.contains("labels"), "got {want:?}");
    }

    #[tokio::test]
    async fn config_error_hides_details() {
        let response = Error::InvalidConfig("bad uri".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "");
    }
}
