//! terramap-api — HTTP surface for the map-widget service.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/get_map_widget?height=<px>` | Run a map program from the `code` form field |
//! | GET | `/get_map_widget` | Fixed elevation demo map |
//! | GET | `/healthz` | Liveness probe |
//!
//! All origins may call the widget endpoint; the rendered documents are
//! meant to be embedded by third-party frontends.

pub mod handlers;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

use terra_core::ServiceConfig;
use terramap_eo::EoClient;

/// Shared state for the widget handlers.
///
/// The client carries only a connection pool; credentials are read fresh
/// inside each request.
#[derive(Clone)]
pub struct ApiState {
    pub config: ServiceConfig,
    pub client: EoClient,
}

/// Build the complete service router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/get_map_widget",
            get(handlers::demo_map_widget).post(handlers::map_widget),
        )
        .route("/healthz", get(handlers::healthz))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
