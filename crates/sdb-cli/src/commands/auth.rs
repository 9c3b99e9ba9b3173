//! Account and service-supervisor commands (§4.8, §6.4 `/api/starter/*`)

use crate::config::StarterConfig;
use anyhow::Result;
use clap::Subcommand;
use sdb_auth::{AccountStore, AuthService, Supervisor};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create a new account
    Signup {
        username: String,
        password: String,
        email: String,
    },

    /// Verify credentials and mint a bearer token
    Login { username: String, password: String },

    /// Report whether `auth`/`world`/`armory` are running
    Status,

    /// Start a managed service
    Start { name: String },

    /// Stop a managed service
    Stop { name: String },

    /// Restart a managed service
    Restart { name: String },

    /// Spawn a fresh copy of this supervisor, then exit once it has started
    SelfRestart,
}

pub async fn execute(account_db: &PathBuf, starter: &StarterConfig, command: AuthCommands) -> Result<()> {
    match command {
        AuthCommands::Signup { username, password, email } => {
            let service = AuthService::new(AccountStore::open(account_db).await?);
            let id = service.signup(&username, &password, &email).await?;
            println!("account {id} created");
            Ok(())
        }
        AuthCommands::Login { username, password } => {
            let service = AuthService::new(AccountStore::open(account_db).await?);
            let outcome = service.login(&username, &password).await?;
            println!("token={} gmLevel={}", outcome.token, outcome.gm_level);
            Ok(())
        }
        AuthCommands::Status => {
            let supervisor = Supervisor::new(starter.service_configs());
            for (name, status) in supervisor.status_all() {
                println!(
                    "{name}: {} ({})",
                    if status.running { "running" } else { "stopped" },
                    status.pids.iter().map(i32::to_string).collect::<Vec<_>>().join(",")
                );
            }
            Ok(())
        }
        AuthCommands::Start { name } => {
            let supervisor = Supervisor::new(starter.service_configs());
            let pid = supervisor.start(&name)?;
            println!("{name} started (pid {pid})");
            Ok(())
        }
        AuthCommands::Stop { name } => {
            let supervisor = Supervisor::new(starter.service_configs());
            supervisor.stop(&name)?;
            println!("{name} stopped");
            Ok(())
        }
        AuthCommands::Restart { name } => {
            let supervisor = Supervisor::new(starter.service_configs());
            let pid = supervisor.restart(&name)?;
            println!("{name} restarted (pid {pid})");
            Ok(())
        }
        AuthCommands::SelfRestart => {
            let supervisor = Supervisor::new(starter.service_configs());
            let binary = std::env::current_exe()?;
            let args: Vec<String> = std::env::args().skip(1).collect();
            println!("spawning a fresh copy of {} and exiting", binary.display());
            supervisor.self_restart(&binary, &starter.paths.logs_dir, &args)?;
            Ok(())
        }
    }
}
