//! BLP to PNG thumbnail generation (§4.4)

use anyhow::Result;
use clap::Subcommand;
use sdb_cli_utils::create_spinner;
use sdb_thumbnails::{engine, ThumbnailWatcher};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ThumbnailCommands {
    /// Generate thumbnails for every icon missing one, preferring the
    /// export copy of each name and falling back to the base copy
    GenerateAll {
        #[arg(long)]
        base_icons_dir: PathBuf,
        #[arg(long)]
        export_icons_dir: PathBuf,
        #[arg(long)]
        thumbnails_dir: PathBuf,
    },

    /// Watch the export icon directory and regenerate thumbnails as BLPs
    /// arrive, falling back to the base directory's copy when needed
    Watch {
        #[arg(long)]
        base_icons_dir: PathBuf,
        #[arg(long)]
        export_icons_dir: PathBuf,
        #[arg(long)]
        thumbnails_dir: PathBuf,
    },
}

pub fn execute(command: ThumbnailCommands) -> Result<()> {
    match command {
        ThumbnailCommands::GenerateAll {
            base_icons_dir,
            export_icons_dir,
            thumbnails_dir,
        } => {
            let spinner = create_spinner("generating thumbnails");
            let report = engine::generate_all(&base_icons_dir, &export_icons_dir, &thumbnails_dir)?;
            spinner.finish_with_message(format!(
                "{} generated, {} skipped, {} failed",
                report.generated, report.skipped, report.failed
            ));
            Ok(())
        }
        ThumbnailCommands::Watch {
            base_icons_dir,
            export_icons_dir,
            thumbnails_dir,
        } => {
            let _watcher = ThumbnailWatcher::spawn(&base_icons_dir, &export_icons_dir, &thumbnails_dir)?;
            println!(
                "watching {} for new icons, ctrl-c to stop",
                export_icons_dir.display()
            );
            loop {
                std::thread::park();
            }
        }
    }
}
