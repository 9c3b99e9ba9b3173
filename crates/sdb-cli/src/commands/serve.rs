//! Launches the Data API and Supervisor API servers (§6.4)

use crate::config::{self, StarterConfig};
use crate::server::data::{DataState, IndexPaths, TalentPaths};
use crate::server::supervisor::SupervisorState;
use crate::server::{self, data, supervisor};
use anyhow::Result;
use clap::Args;
use sdb_auth::{AccountStore, AuthService, Supervisor};
use sdb_spells::{SpellEditor, SpellMirror};
use sdb_store::EditStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    #[arg(long, default_value = "starter-config.json")]
    starter_config: PathBuf,
    #[arg(long, default_value_t = 3001)]
    data_port: u16,
    #[arg(long, default_value_t = 5000)]
    supervisor_port: u16,
    #[arg(long, default_value = "backups")]
    backups_dir: PathBuf,
    #[arg(long, default_value = "spell-mirror.db")]
    mirror_db: PathBuf,
    #[arg(long, default_value = "realmd.db")]
    account_db: PathBuf,
    #[arg(long, default_value = "talent-config.json")]
    talent_config: PathBuf,
    #[arg(long, default_value = ".")]
    talent_source_dir: PathBuf,
    #[arg(long, default_value = ".")]
    talent_runtime_dir: PathBuf,
    #[arg(long, default_value = "indices")]
    out_dir: PathBuf,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = config::load_config(&args.config)?;
    let starter_config: StarterConfig = config::load_starter_config(&args.starter_config)?;

    let store = Arc::new(EditStore::new(
        config.paths.base.dbc.clone(),
        config.paths.custom.dbc.clone(),
        args.backups_dir.clone(),
    ));
    // The spell editor owns an independently-cached `EditStore` pointed at
    // the same directories; each table it touches still goes through the
    // same base/export/backup layering as the Data API's store.
    let spell_store = EditStore::new(
        config.paths.base.dbc.clone(),
        config.paths.custom.dbc.clone(),
        args.backups_dir.clone(),
    );
    let mirror = SpellMirror::open(&args.mirror_db).await?;
    let spells = Arc::new(SpellEditor::new(spell_store, mirror));

    let data_state = DataState {
        store: store.clone(),
        spells,
        icon_index: Arc::new(RwLock::new(None)),
        index_paths: IndexPaths {
            dbc_dir: config.paths.base.dbc.clone(),
            base_icons_dir: config.paths.base.icons.clone(),
            export_icons_dir: config.paths.custom.icons.clone(),
            thumbnails_dir: args.out_dir.join("thumbnails"),
            out_dir: args.out_dir.clone(),
        },
        talent_paths: TalentPaths {
            config: args.talent_config,
            source_dir: args.talent_source_dir,
            runtime_dir: args.talent_runtime_dir,
        },
    };

    let account_store = AccountStore::open(&args.account_db).await?;
    let supervisor_state = SupervisorState {
        auth: Arc::new(AuthService::new(account_store)),
        supervisor: Arc::new(Supervisor::new(starter_config.service_configs())),
        supervisor_binary: std::env::current_exe()?,
        log_dir: starter_config.paths.logs_dir.clone(),
        restart_args: std::env::args().skip(1).collect(),
    };

    let data_router = data::router(data_state);
    let supervisor_router = supervisor::router(supervisor_state);

    let data_port = args.data_port;
    let supervisor_port = args.supervisor_port;
    let data_task = tokio::spawn(async move { server::serve(data_router, data_port).await });
    let supervisor_task = tokio::spawn(async move { server::serve(supervisor_router, supervisor_port).await });

    let (data_result, supervisor_result) = tokio::try_join!(data_task, supervisor_task)?;
    data_result?;
    supervisor_result?;
    Ok(())
}
