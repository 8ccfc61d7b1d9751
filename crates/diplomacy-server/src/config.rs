//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the server
    pub bind_address: SocketAddr,
    /// HMAC secret signing player tokens. Generated at startup if unset.
    pub token_secret: Option<String>,
    /// Lifetime of a freshly minted token
    pub token_lifetime: Duration,
    /// Directory player phase logs are written under
    pub data_dir: String,
    /// Map used when a lobby doesn't name one
    pub default_map: String,
    /// Negotiation rounds per TALK phase
    pub talk_num_rounds: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".parse().unwrap(),
            token_secret: None,
            token_lifetime: Duration::from_secs(24 * 60 * 60),
            data_dir: "data".to_string(),
            default_map: "standard".to_string(),
            talk_num_rounds: 2,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// [`ServerConfig::default`] for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("DIPLOMACY_BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            }
        }
        if let Ok(secret) = std::env::var("DIPLOMACY_TOKEN_SECRET") {
            config.token_secret = Some(secret);
        }
        if let Ok(secs) = std::env::var("DIPLOMACY_TOKEN_LIFETIME_SECS") {
            if let Ok(secs) = secs.parse() {
                config.token_lifetime = Duration::from_secs(secs);
            }
        }
        if let Ok(dir) = std::env::var("DIPLOMACY_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Ok(map) = std::env::var("DIPLOMACY_DEFAULT_MAP") {
            config.default_map = map;
        }
        if let Ok(rounds) = std::env::var("DIPLOMACY_TALK_ROUNDS") {
            if let Ok(rounds) = rounds.parse() {
                config.talk_num_rounds = rounds;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_locally_and_talks_twice() {
        let config = ServerConfig::default();
        assert_eq!(config.talk_num_rounds, 2);
        assert_eq!(config.default_map, "standard");
    }
}
