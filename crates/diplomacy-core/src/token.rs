//! Token authority (component A): mint, verify and decode stateless bearer
//! tokens. Grounded directly on `examples/original_source/diplomacy/utils/token.py`
//! — same claim set (`sub`, `iat`, `exp`, `jti`), same HS256 algorithm, same
//! 24h default lifetime — reimplemented with `jsonwebtoken` instead of
//! PyJWT.

use diplomacy_protocol::Username;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Claims carried by every token. `iat`/`exp` are seconds since the epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

impl Claims {
    pub fn subject(&self) -> Username {
        Username::from(self.sub.as_str())
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token signature or structure is invalid")]
    Invalid,
}

/// Mints and verifies tokens under one HMAC secret. Stateless: holds no
/// per-token bookkeeping (that's the user registry's revocation set).
#[derive(Clone)]
pub struct TokenAuthority {
    secret: Vec<u8>,
}

impl TokenAuthority {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    /// Generate a fresh random 256-bit secret, matching
    /// `token.py::generate_secret_key`'s `os.urandom(32)`.
    pub fn generate_secret() -> Vec<u8> {
        use rand::RngCore;
        let mut bytes = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }

    /// Mint a fresh signed token for `subject`. Each call embeds a unique
    /// `jti`, so equal (subject, lifetime) inputs never collide.
    pub fn mint(&self, subject: &Username, lifetime: Duration) -> String {
        let now = now_secs();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + lifetime.as_secs(),
            jti: generate_jti(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(&self.secret))
            .expect("HS256 encoding of well-formed claims never fails")
    }

    /// Verify signature and expiry, returning the claims on success.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);
        let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;
        Ok(data.claims)
    }

    /// Parse the `jti` claim without verifying the signature — a lookup key
    /// only, never an authorization decision (mirrors `get_token_id`'s
    /// `verify_signature: False` decode).
    pub fn decode_id(token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["jti"]);
        let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|_| TokenError::Invalid)?;
        Ok(data.claims.jti)
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_secs()
}

fn generate_jti() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_then_verify_round_trips_subject() {
        let auth = TokenAuthority::new(TokenAuthority::generate_secret());
        let user = Username::from("alice");
        let token = auth.mint(&user, DEFAULT_LIFETIME);
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.subject(), user);
    }

    #[test]
    fn distinct_mints_have_distinct_ids() {
        let auth = TokenAuthority::new(TokenAuthority::generate_secret());
        let user = Username::from("alice");
        let t1 = auth.mint(&user, DEFAULT_LIFETIME);
        let t2 = auth.mint(&user, DEFAULT_LIFETIME);
        assert_ne!(TokenAuthority::decode_id(&t1).unwrap(), TokenAuthority::decode_id(&t2).unwrap());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let auth1 = TokenAuthority::new(TokenAuthority::generate_secret());
        let auth2 = TokenAuthority::new(TokenAuthority::generate_secret());
        let token = auth1.mint(&Username::from("alice"), DEFAULT_LIFETIME);
        assert_eq!(auth2.verify(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = TokenAuthority::new(TokenAuthority::generate_secret());
        let token = auth.mint(&Username::from("alice"), Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(auth.verify(&token).unwrap_err(), TokenError::Expired);
    }
}
