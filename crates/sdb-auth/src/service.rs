//! Login/signup facade over [`AccountStore`], [`TokenStore`], and SRP-6 (§4.8).

use crate::account::AccountStore;
use crate::token::TokenStore;
use crate::{srp, validation, Error, Result};

/// Result of a successful login: a bearer token and the account's GM level.
pub struct LoginOutcome {
    pub token: String,
    pub gm_level: u8,
}

/// Ties the account database, SRP-6 verification, and the token store
/// together behind the two HTTP-facing operations.
pub struct AuthService {
    accounts: AccountStore,
    tokens: TokenStore,
}

impl AuthService {
    pub fn new(accounts: AccountStore) -> Self {
        Self {
            accounts,
            tokens: TokenStore::new(),
        }
    }

    /// Strict SRP-6 login: unknown accounts and verifier mismatches both
    /// fail with the same `LoginFailed` error (never revealing which),
    /// mapped to HTTP 401. A lenient fallback-on-mismatch was observed in
    /// the original source but is deliberately not replicated here.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let creds = self
            .accounts
            .credentials(username)
            .await?
            .ok_or(Error::LoginFailed)?;
        if !srp::verify(username, password, &creds.salt, &creds.verifier) {
            return Err(Error::LoginFailed);
        }
        let gm_level = self.accounts.max_gm_level(creds.id).await?;
        let token = self.tokens.issue(creds.id, gm_level);
        Ok(LoginOutcome { token, gm_level })
    }

    /// Validate, reject duplicates, and create a new account.
    pub async fn signup(&self, username: &str, password: &str, email: &str) -> Result<i64> {
        validation::username(username)?;
        validation::password(password)?;
        validation::email(email)?;
        if self.accounts.exists(username, email).await? {
            return Err(Error::DuplicateAccount);
        }
        let salt = srp::random_salt();
        let verifier = srp::compute_verifier(username, password, &salt);
        let joindate = chrono::Utc::now().to_rfc3339();
        self.accounts
            .create_account(username, &salt, &verifier, email, &joindate)
            .await
    }

    /// Resolve a bearer token to its identity.
    pub fn authorize(&self, token: &str) -> Result<crate::token::Identity> {
        self.tokens.resolve(token).ok_or(Error::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (tempfile::TempDir, AuthService) {
        let dir = tempfile::tempdir().unwrap();
        let accounts = AccountStore::open(&dir.path().join("realmd.db")).await.unwrap();
        (dir, AuthService::new(accounts))
    }

    #[tokio::test]
    async fn signup_then_login_round_trips() {
        let (_dir, service) = setup().await;
        service.signup("Anduin", "lightbringer", "anduin@example.com").await.unwrap();

        let outcome = service.login("Anduin", "lightbringer").await.unwrap();
        assert!(service.authorize(&outcome.token).is_ok());
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let (_dir, service) = setup().await;
        service.signup("Varian", "wrynn1234", "varian@example.com").await.unwrap();
        let result = service.signup("Varian", "different", "other@example.com").await;
        assert!(matches!(result, Err(Error::DuplicateAccount)));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_under_strict_login() {
        let (_dir, service) = setup().await;
        service.signup("Tyrande", "whisperwind", "tyrande@example.com").await.unwrap();
        let result = service.login("Tyrande", "wrongpassword").await;
        assert!(matches!(result, Err(Error::LoginFailed)));
    }

    #[tokio::test]
    async fn invalid_signup_fields_are_rejected_before_touching_the_database() {
        let (_dir, service) = setup().await;
        assert!(matches!(
            service.signup("ab", "longenough", "a@b.com").await,
            Err(Error::InvalidUsername)
        ));
        assert!(matches!(
            service.signup("validname", "x", "a@b.com").await,
            Err(Error::InvalidPassword)
        ));
        assert!(matches!(
            service.signup("validname", "longenough", "not-an-email").await,
            Err(Error::InvalidEmail)
        ));
    }
}
