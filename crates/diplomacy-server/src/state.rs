//! Shared application state handed to every route handler.

use std::sync::{Arc, Mutex};

use diplomacy_core::{LobbyCoordinator, PlayerLogStore, TokenAuthority, UserRegistry};
use diplomacy_engine::{Engine, ReferenceEngine};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub lobbies: Arc<LobbyCoordinator>,
    pub users: Arc<Mutex<UserRegistry>>,
    pub tokens: Arc<TokenAuthority>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let secret = config
            .token_secret
            .clone()
            .map(|s| s.into_bytes())
            .unwrap_or_else(TokenAuthority::generate_secret);
        let tokens = Arc::new(TokenAuthority::new(secret));
        let users = Arc::new(Mutex::new(UserRegistry::new()));
        let player_log = Arc::new(PlayerLogStore::new(&config.data_dir));
        let engine: Arc<dyn Engine> = Arc::new(ReferenceEngine::new());
        let lobbies = Arc::new(LobbyCoordinator::new(
            engine,
            player_log,
            users.clone(),
            tokens.clone(),
            config.default_map.clone(),
            config.talk_num_rounds,
        ));
        Self {
            lobbies,
            users,
            tokens,
            config: Arc::new(config),
        }
    }
}
