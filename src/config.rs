//! Command line and environment configuration for the server.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use clap::Parser;

use crate::Error;

/// The REST API server for listing transactions.
///
/// Every option can also be set with the environment variable named in its
/// help text.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// The MongoDB connection string.
    #[arg(
        long,
        env = "MONGODB_URI",
        default_value = "mongodb://localhost:27017/transaction_db"
    )]
    pub mongodb_uri: String,

    /// The database that holds the transactions collection.
    #[arg(long, env = "MONGODB_DATABASE", default_value = "transaction_db")]
    pub database: String,

    /// The collection that holds transactions.
    #[arg(long, env = "MONGODB_COLLECTION", default_value = "transactions")]
    pub collection: String,

    /// The only origin allowed to make cross-origin requests.
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:3001")]
    pub cors_origin: String,

    /// Create the text index on transaction descriptions at startup.
    #[arg(long, env = "CREATE_TEXT_INDEX")]
    pub create_text_index: bool,
}

impl ServerConfig {
    /// The address to listen on, all interfaces on the configured port.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// The allowed CORS origin as a header value.
    ///
    /// # Errors
    /// Returns [Error::InvalidConfig] if the origin contains characters that
    /// are not allowed in a header.
    pub fn cors_origin_header(&self) -> Result<HeaderValue, Error> {
        HeaderValue::from_str(&self.cors_origin).map_err(|error| {
            Error::InvalidConfig(format!(
                "CORS origin {:?} is not a valid header value: {error}",
                self.cors_origin
            ))
        })
    }
}
