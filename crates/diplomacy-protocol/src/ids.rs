//! Identifier newtypes shared across the coordination core.
//!
//! Kept as thin wrappers over `String` rather than opaque integers: usernames,
//! game ids and lobby codes are all human-typable and round-trip through
//! JSON, HTTP path segments and log lines as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A username, always stored lowercase-normalized (DATA MODEL, `User`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Normalize a raw display-derived or login username: lowercase, trimmed.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

/// An engine game id, e.g. `"game_ABCD"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the conventional game id for a lobby code (`lobby.rs::start_game`).
    pub fn for_lobby_code(code: &LobbyCode) -> Self {
        Self(format!("game_{code}"))
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unambiguous alphabet for lobby codes: no `0/O`, `1/I/L` (spec §6).
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 4;

/// A 4-character lobby code, always normalized to uppercase.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyCode(String);

impl LobbyCode {
    /// Normalize a user-supplied code: upper-cased, stripped.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// Wrap an already-generated, already-valid code without renormalizing.
    pub fn from_generated(raw: String) -> Self {
        debug_assert_eq!(raw.len(), CODE_LENGTH);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A power name, e.g. `"FRANCE"`. Kept as a string (not a fixed enum) since the
/// available powers are map data, not a compiled-in constant (DESIGN NOTES).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerName(String);

impl PowerName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PowerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_normalizes_case_and_whitespace() {
        assert_eq!(Username::normalize(" Alice ").as_str(), "alice");
    }

    #[test]
    fn lobby_code_for_game_id() {
        let code = LobbyCode::normalize("abcd");
        assert_eq!(GameId::for_lobby_code(&code).as_str(), "game_ABCD");
    }
}
