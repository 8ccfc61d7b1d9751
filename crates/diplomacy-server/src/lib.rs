//! HTTP boundary for the Diplomacy coordination core (component H): a
//! stateless axum surface over `diplomacy-core`'s lobby coordinator and
//! game adapters, with one serialized region per game (spec §5).

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;
