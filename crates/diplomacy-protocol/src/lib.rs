//! Diplomacy coordination core — shared wire and data types.
//!
//! No I/O, no async: this crate is the vocabulary every other crate in the
//! workspace speaks (phase identifiers, rule flags, order strings, log
//! entries, the JSON envelope and error taxonomy). Kept dependency-light
//! (`serde` + `thiserror` only) so it can be pulled into the engine crate
//! without dragging the server's async stack along.

pub mod envelope;
pub mod ids;
pub mod log_entry;
pub mod order;
pub mod phase;
pub mod rules;

pub use envelope::{ApiEnvelope, ApiError, ErrorKind};
pub use ids::{GameId, LobbyCode, PowerName, Username, CODE_ALPHABET, CODE_LENGTH};
pub use log_entry::PhaseLogEntry;
pub use order::{Order, OrderRejection, MAX_SUGGESTIONS};
pub use phase::{PhaseId, PhaseParseError, PhaseType, Season};
pub use rules::{RuleFlag, RuleSet};
