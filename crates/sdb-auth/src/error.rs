//! Error type for account verification, the token store, and the supervisor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sql(#[from] turso::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("username must be 3-16 alphanumeric characters")]
    InvalidUsername,

    #[error("password must be 4-16 characters")]
    InvalidPassword,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("username or email already registered")]
    DuplicateAccount,

    #[error("unknown account")]
    UnknownAccount,

    #[error("invalid username or password")]
    LoginFailed,

    #[error("bearer token is missing or expired")]
    Unauthorized,

    #[error("unknown service {0}")]
    UnknownService(String),
}

pub type Result<T> = std::result::Result<T, Error>;
