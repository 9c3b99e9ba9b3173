//! Data API: DBC edits, spell editing, talent flattening, index rebuilds
//! (§6.4, port 3001 by default).

use crate::commands::dbc::import_csv;
use crate::server::error::AppError;
use axum::extract::{Path as AxPath, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use sdb_index::{icon_manifest, spell_icon, sprite_atlas};
use sdb_spells::SpellEditor;
use sdb_store::{EditStore, Source};
use sdb_wdbc::export_to_json;
use serde::Deserialize;
use serde_json::{json, Value as Json_};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct IndexPaths {
    pub dbc_dir: PathBuf,
    pub base_icons_dir: PathBuf,
    pub export_icons_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub out_dir: PathBuf,
}

#[derive(Clone)]
pub struct TalentPaths {
    pub config: PathBuf,
    pub source_dir: PathBuf,
    pub runtime_dir: PathBuf,
}

#[derive(Clone)]
pub struct DataState {
    pub store: Arc<EditStore>,
    pub spells: Arc<SpellEditor>,
    pub icon_index: Arc<RwLock<Option<spell_icon::SpellIconIndex>>>,
    pub index_paths: IndexPaths,
    pub talent_paths: TalentPaths,
}

pub fn router(state: DataState) -> Router {
    Router::new()
        .route("/api/dbc/list", get(dbc_list))
        .route("/api/dbc/read/{filename}", get(dbc_read))
        .route("/api/dbc/save/{filename}", post(dbc_save))
        .route("/api/dbc/diff/{filename}", get(dbc_diff))
        .route("/api/dbc/export-csv/{filename}", get(dbc_export_csv))
        .route("/api/dbc/import-csv/{filename}", post(dbc_import_csv))
        .route("/api/spells/{id}", get(spell_read))
        .route("/api/spells/{id}/edit", put(spell_edit))
        .route("/api/spells/create-from-template", post(spell_create_from_template))
        .route("/api/spell-search", get(spell_search))
        .route("/api/talents/{class}", get(talents_for_class))
        .route("/api/talent-config/deploy", post(talent_deploy))
        .route("/api/update-manifest", post(update_manifest))
        .with_state(state)
}

async fn dbc_list(State(state): State<DataState>) -> Result<Json<Json_>, AppError> {
    let summaries = state.store.list()?;
    Ok(Json(json!(summaries
        .into_iter()
        .map(|s| json!({
            "name": s.name,
            "hasBase": s.has_base,
            "hasExport": s.has_export,
            "recordCount": s.record_count,
            "fieldCount": s.field_count,
        }))
        .collect::<Vec<_>>())))
}

#[derive(Deserialize)]
struct SourceQuery {
    source: Option<String>,
}

fn parse_source(raw: Option<&str>) -> Source {
    match raw {
        Some("base") => Source::Base,
        Some("export") => Source::Export,
        _ => Source::Auto,
    }
}

async fn dbc_read(
    State(state): State<DataState>,
    AxPath(filename): AxPath<String>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<Json_>, AppError> {
    let read = state.store.read(&filename, parse_source(query.source.as_deref()))?;
    let mut out = Vec::new();
    export_to_json(&read.record_set, &mut out).map_err(AppError::from)?;
    let value: Json_ = serde_json::from_slice(&out).unwrap_or(Json_::Null);
    Ok(Json(value))
}

async fn dbc_save(
    State(state): State<DataState>,
    AxPath(filename): AxPath<String>,
    Json(records): Json<Vec<BTreeMap<String, Json_>>>,
) -> Result<Json<Json_>, AppError> {
    let table_name = filename.strip_suffix(".dbc").unwrap_or(&filename);
    let schema = sdb_wdbc::registry()
        .get(table_name)
        .ok_or_else(|| AppError::bad_request(format!("no bundled schema for {filename}")))?;

    let rows = records
        .into_iter()
        .map(|row| {
            let values = schema
                .fields
                .iter()
                .map(|field| {
                    let cell = row.get(&field.name).cloned().unwrap_or(Json_::Null);
                    json_to_value(&cell, field.field_type)
                })
                .collect();
            sdb_wdbc::Record::new(values)
        })
        .collect::<Vec<_>>();

    let stats = state.store.save(&filename, &rows)?;
    Ok(Json(json!({
        "recordCount": stats.record_count,
        "fieldCount": stats.field_count,
        "recordSize": stats.record_size,
        "stringBlockSize": stats.string_block_size,
    })))
}

fn json_to_value(value: &Json_, field_type: sdb_wdbc::FieldType) -> sdb_wdbc::Value {
    use sdb_wdbc::{FieldType, Value};
    match field_type {
        FieldType::Int32 => Value::Int32(value.as_i64().unwrap_or(0) as i32),
        FieldType::UInt32 => Value::UInt32(value.as_u64().unwrap_or(0) as u32),
        FieldType::Flags => Value::Flags(value.as_u64().unwrap_or(0) as u32),
        FieldType::Float => Value::Float(value.as_f64().unwrap_or(0.0) as f32),
        FieldType::String => Value::String(value.as_str().unwrap_or_default().to_string()),
    }
}

async fn dbc_diff(
    State(state): State<DataState>,
    AxPath(filename): AxPath<String>,
) -> Result<Json<Json_>, AppError> {
    let diff = state.store.diff(&filename)?;
    Ok(Json(json!({
        "added": diff.added,
        "removed": diff.removed,
        "modified": diff.modified.iter().map(|m| json!({
            "key": m.key,
            "changedFields": m.changed_fields,
        })).collect::<Vec<_>>(),
    })))
}

async fn dbc_export_csv(
    State(state): State<DataState>,
    AxPath(filename): AxPath<String>,
) -> Result<String, AppError> {
    let read = state.store.read(&filename, Source::Auto)?;
    let mut out = Vec::new();
    sdb_wdbc::export_to_csv(&read.record_set, &mut out).map_err(AppError::from)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

async fn dbc_import_csv(
    State(state): State<DataState>,
    AxPath(filename): AxPath<String>,
    body: String,
) -> Result<Json<Json_>, AppError> {
    let tmp = std::env::temp_dir().join(format!("{filename}.import.csv"));
    std::fs::write(&tmp, body).map_err(sdb_wdbc::Error::Io)?;
    let records = import_csv(&filename, &tmp).map_err(|e| AppError::bad_request(e.to_string()))?;
    let _ = std::fs::remove_file(&tmp);
    let stats = state.store.save(&filename, &records)?;
    Ok(Json(json!({
        "recordCount": stats.record_count,
        "fieldCount": stats.field_count,
    })))
}

async fn spell_read(
    State(state): State<DataState>,
    AxPath(id): AxPath<u32>,
) -> Result<Json<Json_>, AppError> {
    let icon_index = state.icon_index.read().await;
    let lookup = icon_index.as_ref().map(|idx| &idx.index);
    let view = state.spells.read(id, lookup).await?;
    Ok(Json(serde_json::to_value(view).unwrap_or(Json_::Null)))
}

async fn spell_edit(
    State(state): State<DataState>,
    AxPath(id): AxPath<u32>,
    Json(patch): Json<BTreeMap<String, Json_>>,
) -> Result<Json<Json_>, AppError> {
    state.spells.edit(id, &patch).await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
struct CreateFromTemplateBody {
    #[serde(rename = "templateId")]
    template_id: u32,
    #[serde(rename = "newId")]
    new_id: u32,
    #[serde(default)]
    patch: BTreeMap<String, Json_>,
}

async fn spell_create_from_template(
    State(state): State<DataState>,
    Json(body): Json<CreateFromTemplateBody>,
) -> Result<Json<Json_>, AppError> {
    state
        .spells
        .create_from_template(body.template_id, body.new_id, &body.patch)
        .await?;
    Ok(Json(json!({ "id": body.new_id })))
}

#[derive(Deserialize)]
struct SearchQuery {
    field: String,
    q: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

async fn spell_search(
    State(state): State<DataState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Json_>, AppError> {
    let matches = state.spells.search_reference(&query.field, &query.q, query.limit)?;
    Ok(Json(json!(matches)))
}

async fn talents_for_class(
    State(state): State<DataState>,
    AxPath(class): AxPath<String>,
) -> Result<Json<Json_>, AppError> {
    let config = sdb_talents::load(&state.talent_paths.config)?;
    let class_trees = config
        .classes
        .iter()
        .find(|c| c.class_name.eq_ignore_ascii_case(&class) || c.class_id.to_string() == class)
        .ok_or_else(|| AppError::bad_request(format!("unknown class {class}")))?;

    let icon_index = state.icon_index.read().await;
    let sprite_map_path = state.index_paths.out_dir.join("sprite-map.json");
    let sprite_map: Option<sprite_atlas::SpriteMap> = std::fs::read(&sprite_map_path)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());

    let talents: Vec<Json_> = class_trees
        .tabs
        .iter()
        .flat_map(|tab| {
            tab.talents.iter().map(|talent| {
                let icon_name = talent
                    .spell_ranks
                    .first()
                    .and_then(|rank_id| icon_index.as_ref()?.index.get(&rank_id.to_string()).cloned());
                let coords = icon_name.as_ref().and_then(|name| {
                    sprite_atlas::lookup(sprite_map.as_ref()?, &class_trees.class_name, name)
                });
                json!({
                    "tabIdx": tab.tab_idx,
                    "id": talent.id,
                    "name": talent.name,
                    "row": talent.row,
                    "col": talent.col,
                    "maxRank": talent.max_rank,
                    "spellRanks": talent.spell_ranks,
                    "icon": icon_name,
                    "spriteCoords": coords.map(|c| json!({"x": c.x, "y": c.y})),
                })
            })
        })
        .collect();

    Ok(Json(json!({ "class": class_trees.class_name, "talents": talents })))
}

async fn talent_deploy(State(state): State<DataState>) -> Result<Json<Json_>, AppError> {
    let config = sdb_talents::load(&state.talent_paths.config)?;
    let report = sdb_talents::deploy(&config, &state.talent_paths.source_dir, &state.talent_paths.runtime_dir)?;
    Ok(Json(json!({
        "sourcePath": report.source_path,
        "runtimePath": report.runtime_path,
        "bytesWritten": report.bytes_written,
    })))
}

async fn update_manifest(State(state): State<DataState>) -> Result<Json<Json_>, AppError> {
    let paths = state.index_paths.clone();
    let icon_index_slot = state.icon_index.clone();

    tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let spell_path = paths.dbc_dir.join("Spell.dbc");
        let spell_icon_path = paths.dbc_dir.join("SpellIcon.dbc");

        let icon_list = sdb_index::icon_list::scan_layered(&paths.base_icons_dir, &paths.export_icons_dir)
            .map_err(sdb_wdbc::Error::Io)?;
        sdb_index::icon_list::persist(&paths.out_dir.join("icon-list.json"), &icon_list)?;

        let built_icon_index = spell_icon::build(&spell_path, &spell_icon_path, now)?;
        write_json(&paths.out_dir.join("spell-icon-index.json"), &built_icon_index)?;

        let name_index = sdb_index::spell_name::build(&spell_path, &built_icon_index, now)?;
        write_json(&paths.out_dir.join("spell-name-index.json"), &name_index)?;

        let manifest = icon_manifest::build(&icon_list, &paths.thumbnails_dir, &spell_icon_path, now)?;
        write_json(&paths.out_dir.join("icon-manifest.json"), &manifest)?;

        *icon_index_slot.blocking_write() = Some(built_icon_index);
        Ok(())
    });

    Ok(Json(json!({ "status": "rebuilding" })))
}

fn write_json<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<(), AppError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| AppError::bad_request(format!("serializing index: {e}")))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(sdb_wdbc::Error::Io)?;
    }
    std::fs::write(path, bytes).map_err(sdb_wdbc::Error::Io)?;
    Ok(())
}
