pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::backup::handlers;
use crate::state::AppState;

/// Snapshots carry every member, check-in and payment; allow well past the
/// 2 MiB axum default.
const MAX_SNAPSHOT_BYTES: usize = 16 * 1024 * 1024;

fn cors(methods: [Method; 2]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods(methods)
}

pub fn build_router(state: AppState) -> Router {
    let backup = Router::new()
        .route(
            "/backup",
            post(handlers::handle_backup)
                .options(handlers::handle_preflight)
                .fallback(handlers::method_not_allowed),
        )
        // Deprecated: older clients posted here
        .route(
            "/backupdata",
            post(handlers::handle_legacy_backup)
                .options(handlers::handle_preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_SNAPSHOT_BYTES))
        .layer(cors([Method::POST, Method::OPTIONS]));

    let restore = Router::new()
        .route(
            "/restore",
            // `get` would also answer HEAD; only GET is accepted here
            get(handlers::handle_restore)
                .head(handlers::method_not_allowed)
                .options(handlers::handle_preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(cors([Method::GET, Method::OPTIONS]));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(backup)
        .merge(restore)
        .with_state(state)
}
