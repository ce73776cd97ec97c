//! Credential storage and token bookkeeping.
//!
//! The store holds the immutable login identity plus the current
//! access/refresh token pair. The pair is swapped as a unit, so a reader
//! never observes an old access token next to a new refresh token. Nothing
//! here touches the network or the disk.

use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use tbmcp_core::Config;

/// An access/refresh token pair issued by the login or refresh endpoint.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: Option<String>,
    /// Expiry read from the JWT `exp` claim, when one is present.
    pub expires_at: Option<SystemTime>,
}

impl TokenPair {
    pub fn new(access: String, refresh: Option<String>) -> Self {
        let expires_at = jwt_expiry(&access);
        Self {
            access,
            refresh,
            expires_at,
        }
    }

    /// True when the access token is past, or within `margin` of, its
    /// expiry. Tokens without a parsable claim never proactively expire;
    /// the 401 path still renews them.
    pub fn is_expired(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(at) => SystemTime::now() + margin >= at,
            None => false,
        }
    }
}

/// The login identity this process authenticates with.
#[derive(Debug, Clone)]
pub enum Identity {
    /// Username/password exchanged at the login endpoint.
    Password { username: String, password: String },
    /// A pre-issued token seeded into the store. Cannot be renewed.
    StaticToken,
}

/// Holds the login identity and the current token pair.
pub struct CredentialStore {
    identity: Identity,
    tokens: RwLock<Option<TokenPair>>,
}

impl CredentialStore {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            tokens: RwLock::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        if let Some(token) = &config.access_token {
            let store = Self::new(Identity::StaticToken);
            store.set_tokens(TokenPair::new(token.clone(), None));
            store
        } else {
            // Config validation guarantees both fields are present here.
            Self::new(Identity::Password {
                username: config.username.clone().unwrap_or_default(),
                password: config.password.clone().unwrap_or_default(),
            })
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Snapshot of the current token pair.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().expect("credential lock poisoned").clone()
    }

    /// Replace the token pair atomically.
    pub fn set_tokens(&self, pair: TokenPair) {
        *self.tokens.write().expect("credential lock poisoned") = Some(pair);
    }
}

/// Extract the `exp` claim from a JWT without verifying the signature.
pub(crate) fn jwt_expiry(token: &str) -> Option<SystemTime> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_u64()?;
    Some(UNIX_EPOCH + Duration::from_secs(exp))
}

#[cfg(test)]
pub(crate) mod test_support {
    use base64::Engine;

    /// Build an unsigned JWT whose `exp` claim is `offset_secs` from now.
    pub fn jwt_expiring_in(offset_secs: i64) -> String {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_secs() as i64;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header = engine.encode(br#"{"alg":"none"}"#);
        let payload = engine.encode(format!(r#"{{"exp":{}}}"#, now + offset_secs));
        format!("{}.{}.sig", header, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::jwt_expiring_in;
    use super::*;

    #[test]
    fn test_jwt_expiry_parses_exp() {
        let token = jwt_expiring_in(3600);
        let expires_at = jwt_expiry(&token).unwrap();
        assert!(expires_at > SystemTime::now());
    }

    #[test]
    fn test_jwt_expiry_malformed_tokens() {
        assert!(jwt_expiry("not-a-jwt").is_none());
        assert!(jwt_expiry("a.b.c").is_none());
        assert!(jwt_expiry("").is_none());
        // Valid base64 payload but no exp claim
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload = engine.encode(br#"{"sub":"user"}"#);
        assert!(jwt_expiry(&format!("h.{}.s", payload)).is_none());
    }

    #[test]
    fn test_expiry_margin() {
        // Expires in 10s: fresh without margin, expired with a 30s margin.
        let pair = TokenPair::new(jwt_expiring_in(10), None);
        assert!(!pair.is_expired(Duration::ZERO));
        assert!(pair.is_expired(Duration::from_secs(30)));

        let expired = TokenPair::new(jwt_expiring_in(-10), None);
        assert!(expired.is_expired(Duration::ZERO));
    }

    #[test]
    fn test_opaque_token_never_expires() {
        let pair = TokenPair::new("opaque-token".to_string(), None);
        assert!(!pair.is_expired(Duration::from_secs(3600)));
    }

    #[test]
    fn test_set_tokens_replaces_pair_as_unit() {
        let store = CredentialStore::new(Identity::StaticToken);
        assert!(store.tokens().is_none());

        store.set_tokens(TokenPair::new("a1".into(), Some("r1".into())));
        store.set_tokens(TokenPair::new("a2".into(), Some("r2".into())));

        let snapshot = store.tokens().unwrap();
        assert_eq!(snapshot.access, "a2");
        assert_eq!(snapshot.refresh.as_deref(), Some("r2"));
    }

    #[test]
    fn test_from_config_seeds_static_token() {
        let config = Config::from_lookup(|key| match key {
            "THINGSBOARD_API_BASE" => Some("http://localhost:8080/api".into()),
            "THINGSBOARD_ACCESS_TOKEN" => Some("seeded".into()),
            _ => None,
        })
        .unwrap();

        let store = CredentialStore::from_config(&config);
        assert!(matches!(store.identity(), Identity::StaticToken));
        assert_eq!(store.tokens().unwrap().access, "seeded");
    }
}
