//! Bridges the coordination core's stable `ApiError`/`ErrorKind` vocabulary
//! (spec §7) onto axum's `IntoResponse`. Nothing downstream of a route
//! handler should ever construct a response by hand — return a
//! `Result<T, AppError>` and let this do the mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diplomacy_core::IntoApiError;
use diplomacy_core::{AdapterError, LobbyError, TokenError, UserError};
use diplomacy_engine::error::EngineError;
use diplomacy_protocol::{ApiEnvelope, ApiError, ErrorKind};

pub struct AppError(pub ApiError);

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

macro_rules! from_domain_error {
    ($ty:ty) => {
        impl From<$ty> for AppError {
            fn from(err: $ty) -> Self {
                Self(err.into_api_error())
            }
        }
    };
}

from_domain_error!(TokenError);
from_domain_error!(UserError);
from_domain_error!(EngineError);
from_domain_error!(AdapterError);
from_domain_error!(LobbyError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope: ApiEnvelope<()> = ApiEnvelope::err(&self.0);
        (status, Json(envelope)).into_response()
    }
}

pub fn unauthenticated(message: impl Into<String>) -> AppError {
    AppError(ApiError::new(ErrorKind::Unauthenticated, message))
}

pub fn validation(message: impl Into<String>) -> AppError {
    AppError(ApiError::new(ErrorKind::ValidationError, message))
}

pub fn not_found(message: impl Into<String>) -> AppError {
    AppError(ApiError::new(ErrorKind::NotFound, message))
}

pub fn forbidden(message: impl Into<String>) -> AppError {
    AppError(ApiError::new(ErrorKind::Forbidden, message))
}
