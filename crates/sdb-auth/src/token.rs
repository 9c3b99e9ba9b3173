//! In-memory bearer token store (§4.8 "Token store").
//!
//! A token is valid iff present and `now < expiresAt`; any read purges it if
//! expired. Tokens survive only the lifetime of the auth process.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Mutex;

const TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy)]
struct Session {
    account_id: i64,
    gm_level: u8,
    expires_at: DateTime<Utc>,
}

/// The authenticated identity a valid token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: i64,
    pub gm_level: u8,
}

/// Guards the token map behind a single mutex; all operations are O(1).
pub struct TokenStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a fresh 30-minute bearer token for `account_id`.
    pub fn issue(&self, account_id: i64, gm_level: u8) -> String {
        let token = random_token();
        let session = Session {
            account_id,
            gm_level,
            expires_at: Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES),
        };
        self.sessions.lock().unwrap().insert(token.clone(), session);
        token
    }

    /// Resolve `token` to its identity, purging it if it has expired.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = *sessions.get(token)?;
        if Utc::now() >= session.expires_at {
            sessions.remove(token);
            return None;
        }
        Some(Identity {
            account_id: session.account_id,
            gm_level: session.gm_level,
        })
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_resolves_to_the_issuing_account() {
        let store = TokenStore::new();
        let token = store.issue(42, 3);
        assert_eq!(store.resolve(&token), Some(Identity { account_id: 42, gm_level: 3 }));
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let store = TokenStore::new();
        assert_eq!(store.resolve("not-a-real-token"), None);
    }

    #[test]
    fn expired_token_is_purged_on_read() {
        let store = TokenStore::new();
        let token = random_token();
        store.sessions.lock().unwrap().insert(
            token.clone(),
            Session {
                account_id: 1,
                gm_level: 0,
                expires_at: Utc::now() - Duration::seconds(1),
            },
        );
        assert_eq!(store.resolve(&token), None);
        assert!(!store.sessions.lock().unwrap().contains_key(&token));
    }
}
