//! Lobby HTTP surface (spec §6 "Lobby" row): the jackbox-style join flow
//! plus the per-lobby game controls the host drives once a game exists.

use axum::extract::{Path, Query, State};
use axum::Json;
use diplomacy_core::Assignment;
use diplomacy_protocol::{ApiEnvelope, GameId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::error::{forbidden, not_found, AppError};
use crate::state::AppState;

use super::games::{OrderSubmission, OrdersResponse, ProcessResponse};

#[derive(Deserialize)]
pub struct CreateRequest {
    pub display_name: String,
    pub map_name: Option<String>,
    #[serde(default)]
    pub assignment: Option<Assignment>,
}

#[derive(Deserialize)]
pub struct JoinRequest {
    pub code: String,
    pub display_name: String,
}

#[derive(Serialize)]
pub struct LobbyResponse {
    pub code: String,
    pub player: diplomacy_core::PlayerInfo,
    pub lobby: diplomacy_core::Lobby,
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateRequest>,
) -> Result<(axum::http::StatusCode, Json<ApiEnvelope<LobbyResponse>>), AppError> {
    let (lobby, player) = state.lobbies.create(
        &user.username,
        &req.display_name,
        user.token,
        req.map_name.as_deref(),
        req.assignment.unwrap_or_default(),
    )?;
    info!(code = %lobby.code, "lobby created");
    Ok((
        axum::http::StatusCode::CREATED,
        Json(ApiEnvelope::ok(LobbyResponse { code: lobby.code.as_str().to_string(), player, lobby })),
    ))
}

pub async fn join(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<JoinRequest>,
) -> Result<Json<ApiEnvelope<LobbyResponse>>, AppError> {
    let (lobby, player) = state.lobbies.join(&req.code, &user.username, &req.display_name, user.token)?;
    info!(code = %lobby.code, %user.username, "player joined lobby");
    Ok(Json(ApiEnvelope::ok(LobbyResponse { code: lobby.code.as_str().to_string(), player, lobby })))
}

pub async fn get_lobby(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiEnvelope<diplomacy_core::Lobby>>, AppError> {
    let lobby = state.lobbies.get(&code)?;
    Ok(Json(ApiEnvelope::ok(lobby)))
}

#[derive(Serialize)]
pub struct StartResponse {
    pub lobby: diplomacy_core::Lobby,
    pub game_id: GameId,
}

pub async fn start(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<Json<ApiEnvelope<StartResponse>>, AppError> {
    let (lobby, game_id) = state.lobbies.start(&code, &user.username)?;
    info!(%game_id, "lobby started");
    Ok(Json(ApiEnvelope::ok(StartResponse { lobby, game_id })))
}

fn game_for_code(state: &AppState, code: &str) -> Result<(diplomacy_core::Lobby, std::sync::Arc<diplomacy_core::GameAdapter>), AppError> {
    let lobby = state.lobbies.get(code)?;
    let game_id = lobby.game_id.clone().ok_or_else(|| not_found("lobby has not started a game yet"))?;
    let game = state.lobbies.game_for(&game_id).ok_or_else(|| not_found("game not found"))?;
    Ok((lobby, game))
}

pub async fn game(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiEnvelope<serde_json::Value>>, AppError> {
    let (_, game) = game_for_code(&state, &code)?;
    Ok(Json(ApiEnvelope::ok(game.to_json()?)))
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub power: Option<String>,
}

pub async fn get_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(code): Path<String>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiEnvelope<OrdersResponse>>, AppError> {
    let (_, game) = game_for_code(&state, &code)?;
    super::games::orderable_for(&game, &user, query.power.as_deref())
}

pub async fn post_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(code): Path<String>,
    Json(req): Json<OrderSubmission>,
) -> Result<Json<ApiEnvelope<OrdersResponse>>, AppError> {
    let (_, game) = game_for_code(&state, &code)?;
    super::games::submit_orders(&game, &user, req)
}

pub async fn process(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<Json<ApiEnvelope<ProcessResponse>>, AppError> {
    let (lobby, game) = game_for_code(&state, &code)?;
    if lobby.host != user.username {
        return Err(forbidden("only the host may force a process tick"));
    }
    super::games::process_game(&game).await
}
