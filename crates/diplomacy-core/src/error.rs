//! Funnels every module-local error type into the stable, boundary-facing
//! `ErrorKind` taxonomy (spec §7). Nothing upstream of the HTTP layer should
//! ever match on an engine- or module-specific error variant by name.

use crate::adapter::AdapterError;
use crate::lobby::LobbyError;
use crate::token::TokenError;
use crate::users::UserError;
use diplomacy_engine::error::EngineError;
use diplomacy_protocol::{ApiError, ErrorKind};

pub trait IntoApiError {
    fn into_api_error(self) -> ApiError;
}

impl IntoApiError for TokenError {
    fn into_api_error(self) -> ApiError {
        match self {
            TokenError::Expired => ApiError::new(ErrorKind::Unauthenticated, "token has expired"),
            TokenError::Invalid => ApiError::new(ErrorKind::Unauthenticated, "token is invalid"),
        }
    }
}

impl IntoApiError for UserError {
    fn into_api_error(self) -> ApiError {
        match self {
            UserError::UnknownUser(u) => ApiError::new(ErrorKind::NotFound, format!("unknown user {u}")),
            UserError::AlreadyExists(u) => ApiError::new(ErrorKind::Conflict, format!("user {u} already exists")),
            UserError::BadPassword => ApiError::new(ErrorKind::Unauthenticated, "incorrect password"),
        }
    }
}

impl IntoApiError for EngineError {
    fn into_api_error(self) -> ApiError {
        match self {
            EngineError::UnknownMap(m) => ApiError::new(ErrorKind::ValidationError, format!("unknown map {m}")),
            EngineError::UnknownPower(p) => ApiError::new(ErrorKind::ValidationError, format!("unknown power {p}")),
            EngineError::PowerAlreadyControlled(p) => {
                ApiError::new(ErrorKind::Conflict, format!("power {p} is already controlled"))
            }
            EngineError::NotOrderable => ApiError::new(ErrorKind::PreconditionFailed, "game is not accepting orders right now"),
            EngineError::OrdersRejected(rejections) => ApiError::new(ErrorKind::ValidationError, "one or more orders were rejected")
                .with_details(serde_json::to_value(rejections).unwrap_or_default()),
            EngineError::NoPendingRetreat(p) => ApiError::new(ErrorKind::PreconditionFailed, format!("no pending retreat for {p}")),
        }
    }
}

impl IntoApiError for AdapterError {
    fn into_api_error(self) -> ApiError {
        match self {
            AdapterError::NotActive => ApiError::new(ErrorKind::PreconditionFailed, "game is not active"),
            AdapterError::Engine(e) => e.into_api_error(),
        }
    }
}

impl IntoApiError for LobbyError {
    fn into_api_error(self) -> ApiError {
        match self {
            LobbyError::NotFound => ApiError::new(ErrorKind::NotFound, "unknown lobby code"),
            LobbyError::AlreadyStarted => ApiError::new(ErrorKind::PreconditionFailed, "lobby has already started"),
            LobbyError::Full => ApiError::new(ErrorKind::Conflict, "lobby is full"),
            LobbyError::NameTaken => ApiError::new(ErrorKind::Conflict, "display name is taken in this lobby"),
            LobbyError::NotHost => ApiError::new(ErrorKind::Forbidden, "only the host may do this"),
            LobbyError::CodeSpaceExhausted => ApiError::new(ErrorKind::InternalError, "could not allocate a lobby code"),
            LobbyError::Adapter(e) => e.into_api_error(),
            LobbyError::User(e) => e.into_api_error(),
        }
    }
}
