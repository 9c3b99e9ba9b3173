//! Talent tree deployment commands (§4.7, §6.4 `/api/talent-config/deploy`)

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum TalentCommands {
    /// Normalize `talent-config.json` and deploy `SurrealTalentConfig_AIO.lua`
    /// to both the source and runtime Lua directories
    Deploy {
        config: PathBuf,
        #[arg(long)]
        source_dir: PathBuf,
        #[arg(long)]
        runtime_dir: PathBuf,
    },

    /// Explain why the legacy DBC column-repack endpoint is disabled
    RepackStatus,
}

pub fn execute(command: TalentCommands) -> Result<()> {
    match command {
        TalentCommands::Deploy {
            config,
            source_dir,
            runtime_dir,
        } => {
            let config = sdb_talents::load(&config)?;
            let report = sdb_talents::deploy(&config, &source_dir, &runtime_dir)?;
            println!(
                "deployed {} bytes to {} and {}",
                report.bytes_written,
                report.source_path.display(),
                report.runtime_path.display()
            );
            Ok(())
        }
        TalentCommands::RepackStatus => {
            match sdb_talents::repack_disabled() {
                Ok(()) => unreachable!("repack_disabled always errors"),
                Err(err) => println!("repack unavailable: {err}"),
            }
            Ok(())
        }
    }
}
