//! Per-player, per-game filtered phase log (component C). Grounded directly
//! on `examples/original_source/diplomacy/server/player_log.py`: one JSONL
//! file per (username, game_id), appended to with a trailing newline,
//! directories created on demand.

use diplomacy_protocol::{GameId, PhaseLogEntry, Username};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlayerLogError {
    #[error("i/o error writing player log: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt log entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub struct PlayerLogStore {
    root: PathBuf,
}

impl PlayerLogStore {
    /// `data_path/player_logs/...`, matching `PlayerLog.__init__`.
    pub fn new(data_path: impl AsRef<Path>) -> Self {
        Self {
            root: data_path.as_ref().join("player_logs"),
        }
    }

    fn user_dir(&self, username: &Username) -> PathBuf {
        self.root.join(username.as_str())
    }

    fn game_log_path(&self, username: &Username, game_id: &GameId) -> PathBuf {
        self.user_dir(username).join(format!("{}.jsonl", game_id.as_str()))
    }

    /// Append one entry, atomically including its trailing newline — readers
    /// of a concurrently-written tail never observe a partial record.
    pub fn append(&self, username: &Username, game_id: &GameId, entry: &PhaseLogEntry) -> Result<(), PlayerLogError> {
        fs::create_dir_all(self.user_dir(username))?;
        let path = self.game_log_path(username, game_id);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut line = entry.to_jsonl_line()?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Read entries `[offset .. offset+limit)`, clipped to what's available.
    /// Missing file/directory is an empty list, not an error.
    pub fn read(
        &self,
        username: &Username,
        game_id: &GameId,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<PhaseLogEntry>, PlayerLogError> {
        let path = self.game_log_path(username, game_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            if i < offset {
                continue;
            }
            if let Some(limit) = limit {
                if entries.len() >= limit {
                    break;
                }
            }
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(PhaseLogEntry::from_jsonl_line(line)?);
        }
        Ok(entries)
    }

    /// Every game id with a log for this user, or an empty list if the user
    /// has none yet.
    pub fn list_game_ids(&self, username: &Username) -> Vec<GameId> {
        let dir = self.user_dir(username);
        let Ok(read_dir) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let name = name.to_str()?;
                name.strip_suffix(".jsonl").map(|id| GameId::new(id.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(phase: &str) -> PhaseLogEntry {
        PhaseLogEntry::new(phase.parse().unwrap(), json!({"phase": phase}))
    }

    #[test]
    fn append_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerLogStore::new(dir.path());
        let user = Username::from("alice");
        let game = GameId::new("game_ABCD");

        store.append(&user, &game, &entry("S1901M")).unwrap();
        store.append(&user, &game, &entry("F1901M")).unwrap();
        store.append(&user, &game, &entry("W1901A")).unwrap();

        let all = store.read(&user, &game, None, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].phase.abbrev(), "S1901M");
        assert_eq!(all[2].phase.abbrev(), "W1901A");
    }

    #[test]
    fn limit_and_offset_clip_to_available() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerLogStore::new(dir.path());
        let user = Username::from("alice");
        let game = GameId::new("game_ABCD");
        for phase in ["S1901M", "F1901M", "W1901A"] {
            store.append(&user, &game, &entry(phase)).unwrap();
        }

        let page = store.read(&user, &game, Some(1), 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].phase.abbrev(), "F1901M");

        let overrun = store.read(&user, &game, Some(10), 2).unwrap();
        assert_eq!(overrun.len(), 1);
    }

    #[test]
    fn missing_log_reads_as_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerLogStore::new(dir.path());
        let user = Username::from("nobody");
        let game = GameId::new("game_NONE");
        assert_eq!(store.read(&user, &game, None, 0).unwrap(), Vec::new());
        assert_eq!(store.list_game_ids(&user), Vec::<GameId>::new());
    }

    #[test]
    fn list_game_ids_finds_every_logged_game() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlayerLogStore::new(dir.path());
        let user = Username::from("alice");
        store.append(&user, &GameId::new("game_ONE"), &entry("S1901M")).unwrap();
        store.append(&user, &GameId::new("game_TWO"), &entry("S1901M")).unwrap();

        let mut ids: Vec<String> = store.list_game_ids(&user).into_iter().map(|g| g.as_str().to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["game_ONE".to_string(), "game_TWO".to_string()]);
    }
}
