//! Main entry point for the `sdb` CLI and HTTP servers

mod cli;
mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{generate, Generator};
use sdb_spells::{SpellEditor, SpellMirror};
use sdb_store::EditStore;
use std::io;
use std::path::PathBuf;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    match cli.command {
        Commands::Dbc { command } => {
            let store = open_store()?;
            commands::dbc::execute(&store, command)
        }
        Commands::Index { command } => commands::index::execute(command),
        Commands::Thumbnails { command } => commands::thumbnails::execute(command),
        Commands::Spells { command } => {
            let store = open_store()?;
            let mirror = SpellMirror::open(&PathBuf::from("spell-mirror.db")).await?;
            let editor = SpellEditor::new(store, mirror);
            commands::spells::execute(&editor, command).await
        }
        Commands::Talents { command } => commands::talents::execute(command),
        Commands::Auth { command } => {
            let starter = config::load_starter_config(&PathBuf::from("starter-config.json"))?;
            commands::auth::execute(&PathBuf::from("realmd.db"), &starter, command).await
        }
        Commands::Serve(args) => commands::serve::execute(args).await,
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

/// Build the [`EditStore`] from `config.json`'s base/custom DBC paths,
/// exiting with the AMBIENT config-error convention (§6.5) on failure.
fn open_store() -> Result<EditStore> {
    let config = config::load_config(&PathBuf::from("config.json"))?;
    Ok(EditStore::new(
        config.paths.base.dbc,
        config.paths.custom.dbc,
        "backups",
    ))
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
