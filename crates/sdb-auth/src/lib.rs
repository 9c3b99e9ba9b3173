//! SRP-6 account verification, a bearer token store, and the process
//! supervisor for `auth`/`world`/`armory` (§4.8)

pub mod account;
pub mod error;
pub mod service;
pub mod srp;
pub mod supervisor;
pub mod token;
pub mod validation;

pub use account::{AccountStore, Credentials};
pub use error::{Error, Result};
pub use service::{AuthService, LoginOutcome};
pub use supervisor::{ServiceConfig, ServiceStatus, Supervisor};
pub use token::{Identity, TokenStore};
