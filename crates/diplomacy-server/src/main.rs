//! Diplomacy coordination core HTTP server.
//!
//! Stateless axum surface over the lobby coordinator and per-game adapters
//! from `diplomacy-core`. CORS is wide open (`*`, any origin) and preflight
//! returns 204, matching spec §6.

use axum::http::Method;
use diplomacy_server::{config::ServerConfig, routes, AppState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();
    let bind_address = config.bind_address;
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = routes::router(state).layer(TraceLayer::new_for_http()).layer(cors);

    info!(%bind_address, "starting diplomacy coordination server");
    let listener = tokio::net::TcpListener::bind(bind_address).await.expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
