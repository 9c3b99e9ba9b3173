//! Root CLI structure for the sdbeditor toolchain

use crate::commands::{
    auth::AuthCommands, dbc::DbcCommands, index::IndexCommands, serve::ServeArgs,
    spells::SpellCommands, talents::TalentCommands, thumbnails::ThumbnailCommands,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sdb")]
#[command(about = "Edit the WoW 3.3.5a client databases and run the operator servers", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// DBC table operations
    Dbc {
        #[command(subcommand)]
        command: DbcCommands,
    },

    /// Derived-index rebuilds
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },

    /// Icon thumbnail generation
    Thumbnails {
        #[command(subcommand)]
        command: ThumbnailCommands,
    },

    /// Spell editing
    Spells {
        #[command(subcommand)]
        command: SpellCommands,
    },

    /// Talent tree deployment
    Talents {
        #[command(subcommand)]
        command: TalentCommands,
    },

    /// Accounts and the auth/world/armory supervisor
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Run the Data API and Supervisor API servers
    Serve(ServeArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
