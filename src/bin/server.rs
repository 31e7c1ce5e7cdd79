use std::process::ExitCode;

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use transaction_query::{
    AppState, Error, MongoTransactionStore, PaginationConfig, ServerConfig, build_router,
    check_store, graceful_shutdown,
};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let config = ServerConfig::parse();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("Server stopped: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Error> {
    let cors_origin = config.cors_origin_header()?;
    let store =
        MongoTransactionStore::connect(&config.mongodb_uri, &config.database, &config.collection)
            .await?;

    // Requests are served whether or not the database is reachable yet.
    let startup_store = store.clone();
    let create_text_index = config.create_text_index;
    tokio::spawn(async move { check_store(&startup_store, create_text_index).await });

    let state = AppState::new(store, PaginationConfig::default());
    let router = add_tracing_layer(build_router(state, cors_origin));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let addr = config.socket_addr();
    tracing::info!("Server is running on {addr}");
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_filter(filter))
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but the route handlers
        // already log their errors, so disable that.
        .on_failure(());

    router.layer(tracing_layer)
}
