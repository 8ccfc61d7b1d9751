//! Bearer token extraction — the first step of the request pipeline in
//! spec §4.H ("extract bearer token → verify against 4.B"). An
//! `AuthenticatedUser` extractor fails the request before any handler body
//! runs if the token is missing, malformed, expired, or revoked.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use diplomacy_protocol::Username;

use crate::error::{unauthenticated, AppError};
use crate::state::AppState;

pub struct AuthenticatedUser {
    pub username: Username,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthenticated("missing bearer token"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthenticated("malformed authorization header"))?
            .to_string();

        let claims = state.tokens.verify(&token)?;
        let registry = state.users.lock().expect("user registry mutex poisoned");
        if !registry.has_valid_token(&state.tokens, &token) {
            return Err(unauthenticated("token has been revoked"));
        }

        Ok(Self { username: claims.subject(), token })
    }
}

/// Require that the authenticated caller is a registered admin. Used by the
/// direct game API's force-process route, which also grants the caller an
/// omniscient view per the data-model invariant `is_admin(user) ⇒
/// OMNISCIENT on any game`.
pub fn require_admin(state: &AppState, user: &AuthenticatedUser) -> Result<(), AppError> {
    let registry = state.users.lock().expect("user registry mutex poisoned");
    if registry.is_admin(&user.username) {
        Ok(())
    } else {
        Err(crate::error::forbidden("admin role required"))
    }
}
