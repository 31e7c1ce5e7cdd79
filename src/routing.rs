//! Application router configuration.

use axum::{Router, http::HeaderValue, middleware, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{
    AppState, endpoints, logging::logging_middleware, not_found::get_404_not_found,
    transaction::get_transactions_endpoint,
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are only allowed from `cors_origin`.
pub fn build_router(state: AppState, cors_origin: HeaderValue) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS_API, get(get_transactions_endpoint))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(create_cors_layer(cors_origin))
        .with_state(state)
}

fn create_cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(Any)
        .allow_headers(Any)
}
