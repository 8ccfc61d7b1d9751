//! Per-player phase log entries (component 4.C), grounded directly on
//! `original_source/diplomacy/server/player_log.py`'s JSONL append/read
//! contract: one entry per phase, already filtered for what that player was
//! allowed to see when the phase was logged.

use crate::phase::PhaseId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One logged phase, as it will be appended as a single JSONL line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseLogEntry {
    pub phase: PhaseId,
    /// The filtered phase snapshot this player was allowed to see — shape is
    /// engine-defined, so it's carried as opaque JSON rather than a crate type.
    pub state: Value,
}

impl PhaseLogEntry {
    pub fn new(phase: PhaseId, state: Value) -> Self {
        Self { phase, state }
    }

    /// Serialize as a single JSONL line (no trailing newline — callers append
    /// their own, matching `player_log.py`'s `write(...); write('\n')`).
    pub fn to_jsonl_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{PhaseType, Season};
    use serde_json::json;

    #[test]
    fn jsonl_round_trip() {
        let entry = PhaseLogEntry::new(
            PhaseId::new(Season::Spring, 1901, PhaseType::Movement),
            json!({"units": {"FRANCE": ["A PAR"]}}),
        );
        let line = entry.to_jsonl_line().unwrap();
        assert!(!line.ends_with('\n'));
        let parsed = PhaseLogEntry::from_jsonl_line(&line).unwrap();
        assert_eq!(parsed, entry);
    }
}
