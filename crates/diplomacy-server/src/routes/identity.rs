//! Identity & legacy auth (spec §6): account creation by display name alone,
//! or the username/password form. Both mint a token and, per
//! `http_api.py`'s `LoginHandler`, create the account on first use rather
//! than requiring a prior sign-up step.

use axum::extract::State;
use axum::Json;
use diplomacy_protocol::{ApiEnvelope, Username};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{validation, AppError};
use crate::state::AppState;

const MAX_DISPLAY_NAME: usize = 20;

fn normalize_display_name(display_name: &str) -> Username {
    Username::from(display_name.to_lowercase().replace(' ', "_").as_str())
}

#[derive(Deserialize)]
pub struct IdentityRequest {
    pub display_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct IdentityResponse {
    pub token: String,
    pub username: Username,
    pub display_name: String,
}

pub async fn identity(
    State(state): State<AppState>,
    Json(req): Json<IdentityRequest>,
) -> Result<Json<ApiEnvelope<IdentityResponse>>, AppError> {
    if req.display_name.is_empty() || req.display_name.chars().count() > MAX_DISPLAY_NAME {
        return Err(validation(format!("display_name must be 1-{MAX_DISPLAY_NAME} characters")));
    }
    let username = normalize_display_name(&req.display_name);

    {
        let mut registry = state.users.lock().expect("user registry mutex poisoned");
        registry.identity_or_create(&username);
    }
    let token = state.tokens.mint(&username, state.config.token_lifetime);
    info!(%username, "identity session created");

    Ok(Json(ApiEnvelope::ok(IdentityResponse {
        token,
        username,
        display_name: req.display_name,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiEnvelope<IdentityResponse>>, AppError> {
    let username = Username::normalize(&req.username);

    {
        let mut registry = state.users.lock().expect("user registry mutex poisoned");
        registry.login_or_create(&username, &req.password)?;
    }
    let token = state.tokens.mint(&username, state.config.token_lifetime);
    info!(%username, "login session created");

    Ok(Json(ApiEnvelope::ok(IdentityResponse {
        token,
        display_name: username.as_str().to_string(),
        username,
    })))
}
