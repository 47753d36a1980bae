mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::admission::AdmissionService;

pub fn build_router(admissions: AdmissionService) -> Router {
    let state = Arc::new(AppState { admissions });

    Router::new()
        .route(
            "/api/drivers",
            get(handlers::list_drivers).post(handlers::add_driver),
        )
        .route(
            "/api/riders",
            get(handlers::list_riders).post(handlers::add_rider),
        )
        .route("/api/regions", get(handlers::region_list))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, admissions: AdmissionService) -> std::io::Result<()> {
    let app = build_router(admissions);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "carpool server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
