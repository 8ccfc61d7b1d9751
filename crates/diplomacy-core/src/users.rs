//! User registry & connection bindings (component B). Mirrors the teacher's
//! `player_manager.rs` in shape — one struct owning several maps that must
//! mutate atomically together — but the relationships here are token-centric
//! rather than client-id-centric: tokens are the authorization artifact,
//! connection handles are the notification artifact, and the two are kept
//! decoupled on purpose (DESIGN NOTES).

use diplomacy_protocol::Username;
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Clone, Debug)]
pub struct User {
    pub username: Username,
    pub password_hash: Option<String>,
    pub is_admin: bool,
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum UserError {
    #[error("unknown user {0}")]
    UnknownUser(Username),
    #[error("user {0} already exists")]
    AlreadyExists(Username),
    #[error("incorrect password")]
    BadPassword,
}

/// Opaque connection handle; the server crate hands these out per physical
/// connection (HTTP keep-alive socket, websocket, etc.) and this registry
/// never looks inside them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(pub u64);

#[derive(Default)]
pub struct UserRegistry {
    users: HashMap<Username, User>,
    revoked_tokens: HashSet<String>,
    token_to_handle: HashMap<String, ConnectionHandle>,
    handle_to_tokens: HashMap<ConnectionHandle, HashSet<String>>,
    token_owner: HashMap<String, Username>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, username: Username, password_hash: Option<String>) -> Result<(), UserError> {
        if self.users.contains_key(&username) {
            return Err(UserError::AlreadyExists(username));
        }
        self.users.insert(
            username.clone(),
            User {
                username,
                password_hash,
                is_admin: false,
            },
        );
        Ok(())
    }

    /// Create the account on first sight, or verify the password against an
    /// existing one — the exact nuance of `http_api.py`'s `LoginHandler`:
    /// never "always check password", only when the account pre-existed.
    pub fn login_or_create(&mut self, username: &Username, password: &str) -> Result<(), UserError> {
        match self.users.get(username) {
            Some(existing) => {
                let hash = existing.password_hash.as_deref().unwrap_or("");
                if bcrypt::verify(password, hash).unwrap_or(false) {
                    Ok(())
                } else {
                    Err(UserError::BadPassword)
                }
            }
            None => {
                let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).expect("bcrypt hashing of a bounded password never fails");
                self.add_user(username.clone(), Some(hash))
            }
        }
    }

    /// Identity/legacy auth: no password at all, account created if missing.
    pub fn identity_or_create(&mut self, username: &Username) {
        self.users.entry(username.clone()).or_insert_with(|| User {
            username: username.clone(),
            password_hash: None,
            is_admin: false,
        });
    }

    pub fn get(&self, username: &Username) -> Option<&User> {
        self.users.get(username)
    }

    pub fn set_admin(&mut self, username: &Username, is_admin: bool) -> Result<(), UserError> {
        let user = self.users.get_mut(username).ok_or_else(|| UserError::UnknownUser(username.clone()))?;
        user.is_admin = is_admin;
        Ok(())
    }

    pub fn is_admin(&self, username: &Username) -> bool {
        self.users.get(username).map(|u| u.is_admin).unwrap_or(false)
    }

    /// Remove a user and disconnect/revoke every live token they hold.
    pub fn remove_user(&mut self, username: &Username) -> Result<(), UserError> {
        if self.users.remove(username).is_none() {
            return Err(UserError::UnknownUser(username.clone()));
        }
        let owned_tokens: Vec<String> = self
            .token_owner
            .iter()
            .filter(|(_, owner)| *owner == username)
            .map(|(token, _)| token.clone())
            .collect();
        for token in owned_tokens {
            self.disconnect_token(&token);
            self.token_owner.remove(&token);
        }
        Ok(())
    }

    /// True iff `token` verifies under `authority`, is not revoked, and its
    /// subject is a known user.
    pub fn has_valid_token(&self, authority: &crate::token::TokenAuthority, token: &str) -> bool {
        let Ok(claims) = authority.verify(token) else {
            return false;
        };
        if self.revoked_tokens.contains(&claims.jti) {
            return false;
        }
        self.users.contains_key(&claims.subject())
    }

    /// Record a (token, handle) binding. Idempotent if the same handle
    /// reattaches; a different handle wins with a logged warning, matching
    /// "preferring the latest attach call" (4.B).
    pub fn connect(&mut self, username: &Username, token: String, handle: ConnectionHandle) {
        if let Some(prior) = self.token_to_handle.get(&token) {
            if *prior != handle {
                warn!(token = %redact(&token), ?prior, ?handle, "token reattached to a different connection handle");
                self.handle_to_tokens.entry(*prior).or_default().remove(&token);
            }
        }
        self.token_to_handle.insert(token.clone(), handle);
        self.handle_to_tokens.entry(handle).or_default().insert(token.clone());
        self.token_owner.insert(token, username.clone());
    }

    /// Atomically move `token`'s binding to `new_handle`, detaching it from
    /// whatever handle it was on before.
    pub fn reattach(&mut self, token: &str, new_handle: ConnectionHandle) {
        if let Some(prior) = self.token_to_handle.get(token).copied() {
            self.handle_to_tokens.entry(prior).or_default().remove(token);
        }
        self.token_to_handle.insert(token.to_string(), new_handle);
        self.handle_to_tokens.entry(new_handle).or_default().insert(token.to_string());
    }

    pub fn disconnect_token(&mut self, token: &str) {
        if let Ok(claims_id) = crate::token::TokenAuthority::decode_id(token) {
            self.revoked_tokens.insert(claims_id);
        }
        if let Some(handle) = self.token_to_handle.remove(token) {
            self.handle_to_tokens.entry(handle).or_default().remove(token);
        }
        self.token_owner.remove(token);
    }

    pub fn remove_connection(&mut self, handle: ConnectionHandle, revoke_tokens: bool) {
        let Some(tokens) = self.handle_to_tokens.remove(&handle) else {
            return;
        };
        for token in tokens {
            self.token_to_handle.remove(&token);
            if revoke_tokens {
                if let Ok(id) = crate::token::TokenAuthority::decode_id(&token) {
                    self.revoked_tokens.insert(id);
                }
            }
        }
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked_tokens.contains(jti)
    }
}

fn redact(token: &str) -> String {
    let visible = token.len().min(8);
    format!("{}…", &token[..visible])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenAuthority;

    #[test]
    fn login_creates_account_on_first_use() {
        let mut registry = UserRegistry::new();
        let user = Username::from("alice");
        assert!(registry.login_or_create(&user, "hunter2").is_ok());
        assert!(registry.get(&user).is_some());
    }

    #[test]
    fn login_rejects_wrong_password_on_existing_account() {
        let mut registry = UserRegistry::new();
        let user = Username::from("alice");
        registry.login_or_create(&user, "hunter2").unwrap();
        let err = registry.login_or_create(&user, "wrong").unwrap_err();
        assert!(matches!(err, UserError::BadPassword));
    }

    #[test]
    fn disconnect_token_revokes_even_before_expiry() {
        let mut registry = UserRegistry::new();
        let auth = TokenAuthority::new(TokenAuthority::generate_secret());
        let user = Username::from("alice");
        registry.identity_or_create(&user);
        let token = auth.mint(&user, crate::token::DEFAULT_LIFETIME);

        assert!(registry.has_valid_token(&auth, &token));
        registry.disconnect_token(&token);
        assert!(!registry.has_valid_token(&auth, &token));
    }

    #[test]
    fn connect_then_remove_connection_revokes_all_its_tokens() {
        let mut registry = UserRegistry::new();
        let auth = TokenAuthority::new(TokenAuthority::generate_secret());
        let user = Username::from("alice");
        registry.identity_or_create(&user);
        let token = auth.mint(&user, crate::token::DEFAULT_LIFETIME);
        let handle = ConnectionHandle(1);
        registry.connect(&user, token.clone(), handle);

        registry.remove_connection(handle, true);
        assert!(!registry.has_valid_token(&auth, &token));
    }
}
