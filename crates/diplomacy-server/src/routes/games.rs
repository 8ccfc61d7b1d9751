//! Direct game API (spec §6 "Direct game API (admin-oriented)", supplemented
//! per SPEC_FULL §12 from `http_api.py`'s `GameHandler`/`OrdersHandler`) plus
//! the order-validation dispatcher logic (§4.H) shared with the lobby
//! routes: submitted order strings are checked by set membership against
//! `get_all_possible_orders()[location]` for each of the power's orderable
//! locations, and a rejection carries up to `MAX_SUGGESTIONS` alternatives
//! drawn from the legal orders at that same origin location.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::Json;
use diplomacy_core::{GameAdapter, ViewerRole};
use diplomacy_protocol::{ApiEnvelope, ApiError, ErrorKind, GameId, Order, OrderRejection, PowerName, RuleFlag, RuleSet, MAX_SUGGESTIONS};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{require_admin, AuthenticatedUser};
use crate::error::{forbidden, not_found, AppError};
use crate::state::AppState;

fn viewer_role_for(game: &GameAdapter, power: Option<&PowerName>, user: &AuthenticatedUser) -> ViewerRole {
    if game.has_omniscient_token(&user.username) {
        return ViewerRole::Omniscient;
    }
    if let Some(power) = power {
        if game.is_controlled_by(power, &user.username).unwrap_or(false) {
            return ViewerRole::Power(power.clone());
        }
    }
    ViewerRole::Observer
}

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub game_id: String,
    pub map_name: Option<String>,
    pub n_controls: usize,
    #[serde(default)]
    pub no_talk: bool,
}

#[derive(Serialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub map_name: String,
    pub status: diplomacy_core::GameStatus,
}

pub async fn list(
    State(_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<ApiEnvelope<Vec<GameSummary>>>, AppError> {
    // The lobby coordinator is the only present-day game registry; games
    // created directly (bypassing a lobby) aren't tracked separately, so
    // there is nothing beyond lobby-backed games to summarize yet.
    Ok(Json(ApiEnvelope::ok(Vec::new())))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreateGameRequest>,
) -> Result<(axum::http::StatusCode, Json<ApiEnvelope<GameSummary>>), AppError> {
    require_admin(&state, &user)?;
    let map_name = req.map_name.unwrap_or_else(|| state.config.default_map.clone());
    let mut rules = RuleSet::default();
    if req.no_talk {
        rules.set(RuleFlag::NoTalk);
    }
    let game_id = GameId::new(req.game_id);
    // Created directly through the admin path rather than a lobby, but
    // registered through the same coordinator so `lookup_game` finds it.
    let game = state.lobbies.create_direct(
        game_id.clone(),
        map_name.clone(),
        rules,
        req.n_controls,
    )?;
    info!(%game_id, "game created directly");
    let summary = GameSummary { game_id, map_name, status: game.status() };
    Ok((axum::http::StatusCode::CREATED, Json(ApiEnvelope::ok(summary))))
}

fn lookup_game(state: &AppState, id: &str) -> Result<Arc<GameAdapter>, AppError> {
    let game_id = GameId::new(id.to_string());
    state.lobbies.game_for(&game_id).ok_or_else(|| not_found(format!("unknown game {id}")))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiEnvelope<serde_json::Value>>, AppError> {
    let game = lookup_game(&state, &id)?;
    Ok(Json(ApiEnvelope::ok(game.to_json()?)))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    require_admin(&state, &user)?;
    let game = lookup_game(&state, &id)?;
    game.set_status(diplomacy_core::GameStatus::Canceled);
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct JoinGameRequest {
    pub power: Option<String>,
}

#[derive(Serialize)]
pub struct JoinGameResponse {
    pub power: PowerName,
}

pub async fn join(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<ApiEnvelope<JoinGameResponse>>, AppError> {
    let game = lookup_game(&state, &id)?;
    let power = game.join_game(&user.username, req.power.map(PowerName::new))?;
    Ok(Json(ApiEnvelope::ok(JoinGameResponse { power })))
}

/// The inverse of join: releases the caller's binding. The power becomes a
/// dummy (uncontrolled) rather than being removed from the game.
pub async fn leave(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    let game = lookup_game(&state, &id)?;
    game.leave_game(&user.username)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub power: Option<String>,
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub orderable_locations: std::collections::HashMap<PowerName, Vec<String>>,
    pub all_possible_orders: std::collections::HashMap<String, Vec<Order>>,
    pub n_orders_needed: usize,
}

pub async fn get_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiEnvelope<OrdersResponse>>, AppError> {
    let game = lookup_game(&state, &id)?;
    orderable_for(&game, &user, query.power.as_deref())
}

pub(super) fn orderable_for(
    game: &GameAdapter,
    _user: &AuthenticatedUser,
    power_filter: Option<&str>,
) -> Result<Json<ApiEnvelope<OrdersResponse>>, AppError> {
    let mut orderable_locations = game.get_orderable_locations()?;
    if let Some(power) = power_filter {
        let power = PowerName::new(power.to_uppercase());
        orderable_locations.retain(|p, _| *p == power);
    }
    let all_possible_orders = game.get_all_possible_orders()?;
    let n_orders_needed = orderable_locations.values().map(|locs| locs.len()).sum();
    Ok(Json(ApiEnvelope::ok(OrdersResponse { orderable_locations, all_possible_orders, n_orders_needed })))
}

#[derive(Deserialize)]
pub struct OrderSubmission {
    pub power: String,
    pub orders: Vec<String>,
}

#[derive(Serialize)]
struct RejectedOrdersDetail {
    valid_orders_accepted: Vec<Order>,
    invalid_orders: Vec<OrderRejection>,
}

pub async fn post_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(req): Json<OrderSubmission>,
) -> Result<Json<ApiEnvelope<OrdersResponse>>, AppError> {
    let game = lookup_game(&state, &id)?;
    submit_orders(&game, &user, req)
}

/// Validates each submitted order by set membership against the legal
/// orders at its origin location (§4.H), accepting the whole batch only if
/// every order is legal — a rejected batch leaves engine state untouched.
pub(super) fn submit_orders(
    game: &GameAdapter,
    user: &AuthenticatedUser,
    req: OrderSubmission,
) -> Result<Json<ApiEnvelope<OrdersResponse>>, AppError> {
    let power = PowerName::new(req.power.to_uppercase());
    if !game.is_controlled_by(&power, &user.username)? {
        return Err(forbidden(format!("{power} is not controlled by this caller")));
    }

    let orderable_locations = game.get_orderable_locations()?;
    let all_possible_orders = game.get_all_possible_orders()?;
    let locations = orderable_locations.get(&power).cloned().unwrap_or_default();

    let mut valid_orders_accepted = Vec::new();
    let mut invalid_orders = Vec::new();
    for raw in &req.orders {
        let order = Order::new(raw.clone());
        let origin = raw.split_whitespace().nth(1).unwrap_or_default();
        let legal_at_origin: Vec<Order> = all_possible_orders.get(origin).cloned().unwrap_or_default();
        let globally_legal = locations
            .iter()
            .any(|loc| all_possible_orders.get(loc).map(|orders| orders.contains(&order)).unwrap_or(false));
        if globally_legal {
            valid_orders_accepted.push(order);
        } else {
            let mut suggestions = legal_at_origin;
            suggestions.truncate(MAX_SUGGESTIONS);
            invalid_orders.push(OrderRejection::new(order, "not a legal order for this location", suggestions));
        }
    }

    if !invalid_orders.is_empty() {
        let detail = RejectedOrdersDetail { valid_orders_accepted, invalid_orders };
        return Err(AppError(
            ApiError::new(ErrorKind::ValidationError, "one or more submitted orders were rejected")
                .with_details(serde_json::to_value(detail).unwrap_or_default()),
        ));
    }

    match game.set_orders(&power, valid_orders_accepted) {
        Ok(_accepted) => orderable_for(game, user, Some(power.as_str())),
        Err(rejections) => Err(AppError(
            ApiError::new(ErrorKind::ValidationError, "engine rejected one or more orders")
                .with_details(serde_json::to_value(rejections).unwrap_or_default()),
        )),
    }
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub phase: String,
    pub previous_phase_data: serde_json::Value,
}

/// Force-processes a phase. Requires the admin role and grants the caller
/// an omniscient view first, per the data-model invariant `is_admin(user) ⇒
/// OMNISCIENT on any game`.
pub async fn process(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<ApiEnvelope<ProcessResponse>>, AppError> {
    require_admin(&state, &user)?;
    let game = lookup_game(&state, &id)?;
    game.add_omniscient_token(user.username.clone());
    process_game(&game).await
}

/// Drives one external tick and yields briefly afterward so asynchronous
/// engine-side processing settles before the caller reads back the new
/// phase state (§5 "explicit post-process yield of ~0.5s").
pub(super) async fn process_game(game: &GameAdapter) -> Result<Json<ApiEnvelope<ProcessResponse>>, AppError> {
    let outcome = game.process()?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    let phase = game.get_current_phase()?;
    let previous_phase_data = outcome
        .map(|o| serde_json::to_value(o.previous_phase_data).unwrap_or(serde_json::Value::Null))
        .unwrap_or(serde_json::Value::Null);
    Ok(Json(ApiEnvelope::ok(ProcessResponse { phase: phase.abbrev(), previous_phase_data })))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

pub async fn history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiEnvelope<Vec<serde_json::Value>>>, AppError> {
    let game = lookup_game(&state, &id)?;
    let role = viewer_role_for(&game, None, &user);
    let history = game.get_phase_history(query.from, query.to, &role);
    Ok(Json(ApiEnvelope::ok(history)))
}
