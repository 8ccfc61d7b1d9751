pub mod games;
pub mod identity;
pub mod lobby;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/identity", post(identity::identity))
        .route("/api/auth/login", post(identity::login))
        .route("/api/lobby/create", post(lobby::create))
        .route("/api/lobby/join", post(lobby::join))
        .route("/api/lobby/:code", get(lobby::get_lobby))
        .route("/api/lobby/:code/start", post(lobby::start))
        .route("/api/lobby/:code/game", get(lobby::game))
        .route("/api/lobby/:code/orders", get(lobby::get_orders).post(lobby::post_orders))
        .route("/api/lobby/:code/process", post(lobby::process))
        .route("/api/games", get(games::list).post(games::create))
        .route("/api/games/:id", get(games::get_game).delete(games::delete))
        .route("/api/games/:id/join", post(games::join))
        .route("/api/games/:id/leave", post(games::leave))
        .route("/api/games/:id/orders", get(games::get_orders).post(games::post_orders))
        .route("/api/games/:id/process", post(games::process))
        .route("/api/games/:id/history", get(games::history))
        .with_state(state)
}
