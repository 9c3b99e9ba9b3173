//! Account database access (§4.8 "SRP-6 credential check", "Signup")
//!
//! Talks to the realm's `account`/`account_access` tables the same way
//! `sdb-spells::mirror` talks to its spell mirror: a plain `turso`
//! connection opened per store, no pooling.

use crate::{Error, Result};
use std::path::Path;

/// Credentials loaded for an SRP-6 login attempt.
pub struct Credentials {
    pub id: i64,
    pub salt: [u8; 32],
    pub verifier: [u8; 32],
}

/// Talks to the `account` and `account_access` tables.
pub struct AccountStore {
    _db: turso::Database,
    conn: turso::Connection,
}

impl AccountStore {
    /// Open (creating if needed) the account database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = turso::Builder::new_local(&path.to_string_lossy()).build().await?;
        let conn = db.connect()?;
        Self::ensure_schema(&conn).await?;
        Ok(Self { _db: db, conn })
    }

    async fn ensure_schema(conn: &turso::Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS account (\
                id INTEGER PRIMARY KEY AUTOINCREMENT, \
                username TEXT UNIQUE NOT NULL, \
                salt BLOB NOT NULL, \
                verifier BLOB NOT NULL, \
                email TEXT UNIQUE NOT NULL, \
                joindate TEXT NOT NULL, \
                expansion INTEGER NOT NULL)",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS account_access (\
                id INTEGER PRIMARY KEY AUTOINCREMENT, \
                account_id INTEGER NOT NULL, \
                gmlevel INTEGER NOT NULL)",
            (),
        )
        .await?;
        Ok(())
    }

    /// Load `{id, salt, verifier}` for `username`, if the account exists.
    pub async fn credentials(&self, username: &str) -> Result<Option<Credentials>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, salt, verifier FROM account WHERE username = ?1",
                turso::params![username.to_string()],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let id: i64 = row.get(0)?;
        let salt: Vec<u8> = row.get(1)?;
        let verifier: Vec<u8> = row.get(2)?;
        Ok(Some(Credentials {
            id,
            salt: to_array(&salt),
            verifier: to_array(&verifier),
        }))
    }

    /// The highest `gmlevel` recorded across `account_id`'s access rows, or
    /// 0 if it has none.
    pub async fn max_gm_level(&self, account_id: i64) -> Result<u8> {
        let mut rows = self
            .conn
            .query(
                "SELECT MAX(gmlevel) FROM account_access WHERE account_id = ?1",
                turso::params![account_id],
            )
            .await?;
        let level = match rows.next().await? {
            Some(row) => row.get::<Option<i64>>(0)?.unwrap_or(0),
            None => 0,
        };
        Ok(level.clamp(0, u8::MAX as i64) as u8)
    }

    /// Whether `username` or `email` is already registered.
    pub async fn exists(&self, username: &str, email: &str) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM account WHERE username = ?1 OR email = ?2",
                turso::params![username.to_string(), email.to_string()],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Insert a new account row. Callers must have already validated the
    /// username/password/email shape and checked [`Self::exists`].
    pub async fn create_account(
        &self,
        username: &str,
        salt: &[u8; 32],
        verifier: &[u8; 32],
        email: &str,
        joindate: &str,
    ) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO account (username, salt, verifier, email, joindate, expansion) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 2)",
                turso::params![
                    username.to_string(),
                    salt.to_vec(),
                    verifier.to_vec(),
                    email.to_string(),
                    joindate.to_string()
                ],
            )
            .await?;
        let mut rows = self.conn.query("SELECT last_insert_rowid()", ()).await?;
        let id: i64 = rows.next().await?.ok_or(Error::UnknownAccount)?.get(0)?;
        Ok(id)
    }
}

fn to_array(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let len = bytes.len().min(32);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srp;

    #[tokio::test]
    async fn created_account_round_trips_its_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(&dir.path().join("realmd.db")).await.unwrap();

        let salt = srp::random_salt();
        let verifier = srp::compute_verifier("Thrall", "doomhammer", &salt);
        let id = store
            .create_account("Thrall", &salt, &verifier, "thrall@example.com", "2026-08-01")
            .await
            .unwrap();

        let creds = store.credentials("Thrall").await.unwrap().unwrap();
        assert_eq!(creds.id, id);
        assert_eq!(creds.salt, salt);
        assert_eq!(creds.verifier, verifier);
    }

    #[tokio::test]
    async fn exists_matches_on_either_username_or_email() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(&dir.path().join("realmd.db")).await.unwrap();
        let salt = srp::random_salt();
        let verifier = srp::compute_verifier("Malfurion", "nightmare", &salt);
        store
            .create_account("Malfurion", &salt, &verifier, "malfurion@example.com", "2026-08-01")
            .await
            .unwrap();

        assert!(store.exists("Malfurion", "someone-else@example.com").await.unwrap());
        assert!(store.exists("someone-else", "malfurion@example.com").await.unwrap());
        assert!(!store.exists("someone-else", "someone-else@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_username_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(&dir.path().join("realmd.db")).await.unwrap();
        assert!(store.credentials("Nobody").await.unwrap().is_none());
    }
}
