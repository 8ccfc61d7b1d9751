//! Coordination logic for the Diplomacy game service: token authority, user
//! registry, player logs, the phase clock's talk-round extension, the game
//! engine adapter, and the lobby coordinator. Everything here is pure
//! coordination — order legality and adjudication live behind the
//! `diplomacy-engine` crate's `Engine` trait.

pub mod adapter;
pub mod error;
pub mod lobby;
pub mod player_log;
pub mod talk;
pub mod token;
pub mod users;

pub use adapter::{AdapterError, GameAdapter, GameStatus, ViewerRole};
pub use error::IntoApiError;
pub use lobby::{Assignment, Lobby, LobbyCoordinator, LobbyError, LobbyStatus, PlayerInfo};
pub use player_log::{PlayerLogError, PlayerLogStore};
pub use talk::{TalkController, TalkOutcome, TalkState};
pub use token::{Claims, TokenAuthority, TokenError, DEFAULT_LIFETIME};
pub use users::{ConnectionHandle, User, UserError, UserRegistry};
