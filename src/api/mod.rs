pub mod admin;
pub mod drawings;
pub mod health;
pub mod scan;

use crate::db::Repository;
use crate::exclusions::ExclusionRegistry;
use crate::scan::ScanOrchestrator;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub exclusions: Arc<ExclusionRegistry>,
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        exclusions: Arc<ExclusionRegistry>,
        orchestrator: Arc<ScanOrchestrator>,
    ) -> Self {
        Self {
            repo,
            exclusions,
            orchestrator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/analyze-token", post(scan::analyze_token))
        .route("/api/scan-all-buys", post(scan::scan_all_buys))
        .route("/api/admin/blocklist", get(admin::get_blocklist))
        .route("/api/admin/blocklist/add", post(admin::add_to_blocklist))
        .route(
            "/api/admin/blocklist/remove",
            post(admin::remove_from_blocklist),
        )
        .route("/api/admin/blocklist/clear", post(admin::clear_blocklist))
        .route("/api/drawing/save", post(drawings::save_drawing))
        .route("/api/drawing/results", get(drawings::list_drawings))
        .route("/api/drawing/results/:id", get(drawings::get_drawing))
        .layer(cors)
        .with_state(state)
}
