//! Lobby coordinator (component G): the jackbox-style join flow — a
//! human-typable code plus a display name, no password required to get a
//! seat at the table. Shaped after the teacher's `lobby.rs`/`player_manager.rs`
//! pair: one coordinator owning a map of lobbies plus the players inside
//! each, host/ready/start bookkeeping kept close to the data it guards.

use crate::adapter::GameAdapter;
use crate::player_log::PlayerLogStore;
use crate::token::TokenAuthority;
use crate::users::UserRegistry;
use diplomacy_engine::Engine;
use diplomacy_protocol::{
    GameId, LobbyCode, PowerName, RuleFlag, RuleSet, Username, CODE_ALPHABET, CODE_LENGTH,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    Waiting,
    Started,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum Assignment {
    #[default]
    Random,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub username: Username,
    pub display_name: String,
    pub token: String,
    pub power: Option<PowerName>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lobby {
    pub code: LobbyCode,
    pub map_name: String,
    pub assignment: Assignment,
    pub status: LobbyStatus,
    pub host: Username,
    pub players: Vec<PlayerInfo>,
    pub n_powers: usize,
    pub game_id: Option<GameId>,
}

impl Lobby {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

/// Hand-written so `player_count` (derived from `players`, per the lobby
/// response's wire shape) rides along without being a field callers can get
/// out of sync with `players.len()`.
impl Serialize for Lobby {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Lobby", 9)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("map_name", &self.map_name)?;
        state.serialize_field("assignment", &self.assignment)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("host", &self.host)?;
        state.serialize_field("players", &self.players)?;
        state.serialize_field("player_count", &self.player_count())?;
        state.serialize_field("n_powers", &self.n_powers)?;
        state.serialize_field("game_id", &self.game_id)?;
        state.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("unknown lobby code")]
    NotFound,
    #[error("lobby has already started")]
    AlreadyStarted,
    #[error("lobby is full")]
    Full,
    #[error("display name is already taken in this lobby")]
    NameTaken,
    #[error("only the host may do this")]
    NotHost,
    #[error("could not allocate a free lobby code")]
    CodeSpaceExhausted,
    #[error(transparent)]
    Adapter(#[from] crate::adapter::AdapterError),
    #[error(transparent)]
    User(#[from] crate::users::UserError),
}

const CODE_COLLISION_RETRIES: usize = 100;

struct Inner {
    lobbies: HashMap<LobbyCode, Lobby>,
    games: HashMap<GameId, Arc<GameAdapter>>,
    admin_token: Option<String>,
}

pub struct LobbyCoordinator {
    inner: Mutex<Inner>,
    engine: Arc<dyn Engine>,
    player_log: Arc<PlayerLogStore>,
    user_registry: Arc<Mutex<UserRegistry>>,
    token_authority: Arc<TokenAuthority>,
    default_map: String,
    talk_num_rounds: u32,
}

impl LobbyCoordinator {
    pub fn new(
        engine: Arc<dyn Engine>,
        player_log: Arc<PlayerLogStore>,
        user_registry: Arc<Mutex<UserRegistry>>,
        token_authority: Arc<TokenAuthority>,
        default_map: String,
        talk_num_rounds: u32,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lobbies: HashMap::new(),
                games: HashMap::new(),
                admin_token: None,
            }),
            engine,
            player_log,
            user_registry,
            token_authority,
            default_map,
            talk_num_rounds,
        }
    }

    fn generate_code(lobbies: &HashMap<LobbyCode, Lobby>) -> Result<LobbyCode, LobbyError> {
        let mut rng = rand::thread_rng();
        for _ in 0..CODE_COLLISION_RETRIES {
            let raw: String = (0..CODE_LENGTH)
                .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = LobbyCode::from_generated(raw);
            if !lobbies.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(LobbyError::CodeSpaceExhausted)
    }

    /// The process-wide admin token used to authorize privileged engine
    /// interactions (game creation). Minted lazily, and re-minted if the
    /// stored one fails revalidation.
    fn admin_token(&self, inner: &mut Inner) -> String {
        let registry = self.user_registry.lock().expect("user registry mutex poisoned");
        let admin = Username::from("__system__");
        let needs_mint = match &inner.admin_token {
            Some(token) => !registry.has_valid_token(&self.token_authority, token),
            None => true,
        };
        if needs_mint {
            drop(registry);
            let mut registry = self.user_registry.lock().expect("user registry mutex poisoned");
            registry.identity_or_create(&admin);
            let _ = registry.set_admin(&admin, true);
            inner.admin_token = Some(self.token_authority.mint(&admin, crate::token::DEFAULT_LIFETIME));
        }
        inner.admin_token.clone().expect("admin token was just minted")
    }

    pub fn create(
        &self,
        username: &Username,
        display_name: &str,
        token: String,
        map_name: Option<&str>,
        assignment: Assignment,
    ) -> Result<(Lobby, PlayerInfo), LobbyError> {
        self.user_registry.lock().expect("user registry mutex poisoned").identity_or_create(username);

        let mut inner = self.inner.lock().expect("lobby coordinator mutex poisoned");
        let code = Self::generate_code(&inner.lobbies)?;
        let map_name = map_name.unwrap_or(&self.default_map).to_string();
        let n_powers = diplomacy_engine::lookup_map(&map_name).map(|m| m.n_powers()).unwrap_or(7);

        let host_player = PlayerInfo {
            username: username.clone(),
            display_name: display_name.to_string(),
            token,
            power: None,
        };
        let lobby = Lobby {
            code: code.clone(),
            map_name,
            assignment,
            status: LobbyStatus::Waiting,
            host: username.clone(),
            players: vec![host_player.clone()],
            n_powers,
            game_id: None,
        };
        inner.lobbies.insert(code, lobby.clone());
        Ok((lobby, host_player))
    }

    pub fn join(&self, code: &str, username: &Username, display_name: &str, token: String) -> Result<(Lobby, PlayerInfo), LobbyError> {
        self.user_registry.lock().expect("user registry mutex poisoned").identity_or_create(username);

        let code = LobbyCode::normalize(code);
        let mut inner = self.inner.lock().expect("lobby coordinator mutex poisoned");
        let lobby = inner.lobbies.get_mut(&code).ok_or(LobbyError::NotFound)?;

        if lobby.status != LobbyStatus::Waiting {
            return Err(LobbyError::AlreadyStarted);
        }

        if let Some(existing) = lobby.players.iter_mut().find(|p| p.username == *username) {
            existing.token = token;
            existing.display_name = display_name.to_string();
            return Ok((lobby.clone(), existing.clone()));
        }

        if lobby.player_count() >= lobby.n_powers {
            return Err(LobbyError::Full);
        }
        if lobby.players.iter().any(|p| p.display_name.eq_ignore_ascii_case(display_name)) {
            return Err(LobbyError::NameTaken);
        }

        let player = PlayerInfo {
            username: username.clone(),
            display_name: display_name.to_string(),
            token,
            power: None,
        };
        lobby.players.push(player.clone());
        Ok((lobby.clone(), player))
    }

    pub fn start(&self, code: &str, username: &Username) -> Result<(Lobby, GameId), LobbyError> {
        let code = LobbyCode::normalize(code);
        let mut inner = self.inner.lock().expect("lobby coordinator mutex poisoned");

        {
            let lobby = inner.lobbies.get(&code).ok_or(LobbyError::NotFound)?;
            if lobby.host != *username {
                return Err(LobbyError::NotHost);
            }
            if lobby.status != LobbyStatus::Waiting {
                return Err(LobbyError::AlreadyStarted);
            }
        }

        let _admin_token = self.admin_token(&mut inner);

        let lobby = inner.lobbies.get(&code).expect("checked above").clone();
        let map_info = diplomacy_engine::lookup_map(&lobby.map_name);
        let available_powers: Vec<PowerName> = map_info.map(|m| m.powers.clone()).unwrap_or_default();
        let mut sample = available_powers;
        sample.shuffle(&mut rand::thread_rng());
        let assigned: Vec<PowerName> = sample.into_iter().take(lobby.player_count()).collect();

        let game_id = GameId::for_lobby_code(&code);
        let mut rules = RuleSet::default();
        rules.set(RuleFlag::PowerChoice);

        let adapter = GameAdapter::new(
            game_id.clone(),
            lobby.map_name.clone(),
            rules,
            lobby.player_count(),
            self.talk_num_rounds,
            self.engine.clone(),
            self.player_log.clone(),
        )?;

        for (player, power) in lobby.players.iter().zip(assigned.iter()) {
            if let Err(e) = adapter.join_game(&player.username, Some(power.clone())) {
                let _ = self.engine.delete_game(&game_id);
                return Err(e.into());
            }
        }

        let mut updated = lobby;
        updated.status = LobbyStatus::Started;
        updated.game_id = Some(game_id.clone());
        for (player, power) in updated.players.iter_mut().zip(assigned.iter()) {
            player.power = Some(power.clone());
        }

        inner.lobbies.insert(code, updated.clone());
        inner.games.insert(game_id.clone(), Arc::new(adapter));

        Ok((updated, game_id))
    }

    pub fn get(&self, code: &str) -> Result<Lobby, LobbyError> {
        let code = LobbyCode::normalize(code);
        let inner = self.inner.lock().expect("lobby coordinator mutex poisoned");
        inner.lobbies.get(&code).cloned().ok_or(LobbyError::NotFound)
    }

    pub fn get_for_token(&self, token: &str) -> Result<Lobby, LobbyError> {
        let inner = self.inner.lock().expect("lobby coordinator mutex poisoned");
        inner
            .lobbies
            .values()
            .find(|lobby| lobby.players.iter().any(|p| p.token == token))
            .cloned()
            .ok_or(LobbyError::NotFound)
    }

    pub fn game_for(&self, game_id: &GameId) -> Option<Arc<GameAdapter>> {
        let inner = self.inner.lock().expect("lobby coordinator mutex poisoned");
        inner.games.get(game_id).cloned()
    }

    /// Creates and registers a game directly, bypassing the lobby join flow
    /// (the admin-oriented direct game API's `POST /api/games`). The game is
    /// reachable through `game_for` exactly like a lobby-started one, just
    /// with no backing `Lobby` record.
    pub fn create_direct(
        &self,
        game_id: GameId,
        map_name: String,
        rules: RuleSet,
        n_controls: usize,
    ) -> Result<Arc<GameAdapter>, LobbyError> {
        let game = Arc::new(GameAdapter::new(
            game_id.clone(),
            map_name,
            rules,
            n_controls,
            self.talk_num_rounds,
            self.engine.clone(),
            self.player_log.clone(),
        )?);
        self.inner.lock().expect("lobby coordinator mutex poisoned").games.insert(game_id, game.clone());
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diplomacy_engine::ReferenceEngine;
    use tempfile::tempdir;

    fn coordinator() -> LobbyCoordinator {
        let engine: Arc<dyn Engine> = Arc::new(ReferenceEngine::new());
        let dir = tempdir().unwrap();
        let player_log = Arc::new(PlayerLogStore::new(dir.path()));
        let registry = Arc::new(Mutex::new(UserRegistry::new()));
        let auth = Arc::new(TokenAuthority::new(TokenAuthority::generate_secret()));
        LobbyCoordinator::new(engine, player_log, registry, auth, "standard".to_string(), 2)
    }

    #[test]
    fn create_then_join_then_start_matches_scenario_three() {
        let coord = coordinator();
        let host = Username::from("alice");
        let (lobby, host_player) = coord.create(&host, "Alice", "tok-alice".to_string(), Some("standard"), Assignment::Random).unwrap();
        assert_eq!(lobby.status, LobbyStatus::Waiting);
        assert_eq!(host_player.username, host);

        let p2 = Username::from("bob");
        let p3 = Username::from("carol");
        coord.join(lobby.code.as_str(), &p2, "Bob", "tok-bob".to_string()).unwrap();
        coord.join(lobby.code.as_str(), &p3, "Carol", "tok-carol".to_string()).unwrap();

        let fetched = coord.get(lobby.code.as_str()).unwrap();
        assert_eq!(fetched.player_count(), 3);

        let (started, game_id) = coord.start(lobby.code.as_str(), &host).unwrap();
        assert_eq!(started.status, LobbyStatus::Started);
        assert_eq!(game_id, GameId::for_lobby_code(&lobby.code));
        for player in &started.players {
            assert!(player.power.is_some());
        }
    }

    #[test]
    fn join_rejects_duplicate_display_name() {
        let coord = coordinator();
        let host = Username::from("alice");
        let (lobby, _) = coord.create(&host, "Alice", "tok-alice".to_string(), None, Assignment::Random).unwrap();
        let err = coord.join(lobby.code.as_str(), &Username::from("bob"), "Alice", "tok-bob".to_string()).unwrap_err();
        assert!(matches!(err, LobbyError::NameTaken));
    }

    #[test]
    fn only_host_may_start() {
        let coord = coordinator();
        let host = Username::from("alice");
        let (lobby, _) = coord.create(&host, "Alice", "tok-alice".to_string(), None, Assignment::Random).unwrap();
        let err = coord.start(lobby.code.as_str(), &Username::from("bob")).unwrap_err();
        assert!(matches!(err, LobbyError::NotHost));
    }

    #[test]
    fn join_after_start_is_rejected() {
        let coord = coordinator();
        let host = Username::from("alice");
        let (lobby, _) = coord.create(&host, "Alice", "tok-alice".to_string(), None, Assignment::Random).unwrap();
        coord.start(lobby.code.as_str(), &host).unwrap();
        let err = coord.join(lobby.code.as_str(), &Username::from("bob"), "Bob", "tok-bob".to_string()).unwrap_err();
        assert!(matches!(err, LobbyError::AlreadyStarted));
    }
}
