//! SQL mirror over the `spell` table (§4.6)
//!
//! Selected editable fields are mirrored into an auxiliary `turso`
//! database. The mirror is the source of truth for edits: it overrides
//! the DBC on read, letting a running game server observe changes live.

use crate::editable::SECTIONS;
use crate::Result;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;

/// `sqlColumn → editableFieldName` aliases where the mirror's historical
/// column naming diverges from the DBC schema's field name.
const COLUMN_ALIASES: &[(&str, &str)] = &[("SpellName0", "SpellName"), ("MaxLevel", "MaximumLevel")];

fn column_to_field(column: &str) -> String {
    COLUMN_ALIASES
        .iter()
        .find(|(col, _)| *col == column)
        .map_or_else(|| column.to_string(), |(_, field)| (*field).to_string())
}

fn field_to_column(field: &str) -> String {
    COLUMN_ALIASES
        .iter()
        .find(|(_, f)| *f == field)
        .map_or_else(|| field.to_string(), |(col, _)| (*col).to_string())
}

fn mirrored_columns() -> Vec<String> {
    let mut columns: Vec<String> = SECTIONS
        .iter()
        .flat_map(|(_, fields)| fields.iter())
        .filter(|f| **f != "ID")
        .map(|f| field_to_column(f))
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

/// Async connection to the spell mirror database
pub struct SpellMirror {
    _db: turso::Database,
    conn: turso::Connection,
}

impl SpellMirror {
    /// Open (creating if needed) the mirror database at `path` and ensure
    /// the `spell` table exists with every mirrored column.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = turso::Builder::new_local(&path.to_string_lossy()).build().await?;
        let conn = db.connect()?;
        Self::ensure_schema(&conn).await?;
        Ok(Self { _db: db, conn })
    }

    async fn ensure_schema(conn: &turso::Connection) -> Result<()> {
        let columns = mirrored_columns()
            .into_iter()
            .map(|c| format!("{c} TEXT"))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(
            &format!("CREATE TABLE IF NOT EXISTS spell (id INTEGER PRIMARY KEY, {columns})"),
            (),
        )
        .await?;
        Ok(())
    }

    /// Fetch the mirror row for `id`, keyed by editable field name
    pub async fn get_patch(&self, id: u32) -> Result<BTreeMap<String, Json>> {
        let columns = mirrored_columns();
        let select_list = columns.join(", ");
        let sql = format!("SELECT {select_list} FROM spell WHERE id = ?1");
        let mut rows = self.conn.query(&sql, turso::params![i64::from(id)]).await?;

        let mut patch = BTreeMap::new();
        if let Some(row) = rows.next().await? {
            for (i, column) in columns.iter().enumerate() {
                let text: Option<String> = row.get(i)?;
                if let Some(text) = text {
                    let field = column_to_field(column);
                    let value = serde_json::from_str(&text).unwrap_or(Json::String(text));
                    patch.insert(field, value);
                }
            }
        }
        Ok(patch)
    }

    /// Apply a patch of `{editableField: value}` to `id`. Unknown field
    /// names are silently skipped. Inserts a row on the spell's first
    /// patch, otherwise updates only the touched columns.
    pub async fn apply_patch(&self, id: u32, patch: &BTreeMap<String, Json>) -> Result<()> {
        let known_columns = mirrored_columns();
        let touched: Vec<(String, String)> = patch
            .iter()
            .filter_map(|(field, value)| {
                let column = field_to_column(field);
                known_columns
                    .contains(&column)
                    .then(|| (column, value.to_string()))
            })
            .collect();

        if touched.is_empty() {
            return Ok(());
        }

        let mut exists_rows = self
            .conn
            .query("SELECT 1 FROM spell WHERE id = ?1", turso::params![i64::from(id)])
            .await?;
        let exists = exists_rows.next().await?.is_some();

        if exists {
            let assignments = touched
                .iter()
                .enumerate()
                .map(|(i, (col, _))| format!("{col} = ?{}", i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE spell SET {assignments} WHERE id = ?{}",
                touched.len() + 1
            );
            let mut params: Vec<turso::Value> =
                touched.iter().map(|(_, v)| turso::Value::Text(v.clone())).collect();
            params.push(turso::Value::Integer(i64::from(id)));
            self.conn.execute(&sql, params).await?;
        } else {
            let column_list = touched
                .iter()
                .map(|(c, _)| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = (1..=touched.len())
                .map(|i| format!("?{}", i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("INSERT INTO spell (id, {column_list}) VALUES (?1, {placeholders})");
            let mut params: Vec<turso::Value> = vec![turso::Value::Integer(i64::from(id))];
            params.extend(touched.iter().map(|(_, v)| turso::Value::Text(v.clone())));
            self.conn.execute(&sql, params).await?;
        }

        Ok(())
    }

    /// Whether `id` already has a mirror row (used by `createFromTemplate`)
    pub async fn exists(&self, id: u32) -> Result<bool> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM spell WHERE id = ?1", turso::params![i64::from(id)])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// `suggestFreeId` (§4.6): `max(max(existingId)+1, max(maxId-50000, 900000))`
    pub async fn suggest_free_id(&self, max_dbc_id: u32) -> Result<u32> {
        let mut rows = self.conn.query("SELECT MAX(id) FROM spell", ()).await?;
        let existing_max: i64 = match rows.next().await? {
            Some(row) => row.get::<Option<i64>>(0)?.unwrap_or(0),
            None => 0,
        };

        let from_existing = existing_max as u32 + 1;
        let reserved_floor = (max_dbc_id.saturating_sub(50_000)).max(900_000);
        Ok(from_existing.max(reserved_floor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_patch_inserts_then_second_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = SpellMirror::open(&dir.path().join("mirror.db")).await.unwrap();

        let mut patch = BTreeMap::new();
        patch.insert("SpellName".to_string(), Json::String("Pyroblast".to_string()));
        mirror.apply_patch(133, &patch).await.unwrap();

        let read_back = mirror.get_patch(133).await.unwrap();
        assert_eq!(read_back["SpellName"], Json::String("Pyroblast".to_string()));

        let mut patch2 = BTreeMap::new();
        patch2.insert("Rank".to_string(), Json::String("Rank 3".to_string()));
        mirror.apply_patch(133, &patch2).await.unwrap();

        let read_back2 = mirror.get_patch(133).await.unwrap();
        assert_eq!(read_back2["SpellName"], Json::String("Pyroblast".to_string()));
        assert_eq!(read_back2["Rank"], Json::String("Rank 3".to_string()));
    }

    #[tokio::test]
    async fn unknown_fields_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = SpellMirror::open(&dir.path().join("mirror.db")).await.unwrap();

        let mut patch = BTreeMap::new();
        patch.insert("NotARealField".to_string(), Json::String("x".to_string()));
        mirror.apply_patch(133, &patch).await.unwrap();

        assert!(!mirror.exists(133).await.unwrap());
    }

    #[tokio::test]
    async fn suggest_free_id_stays_above_reserved_floor() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = SpellMirror::open(&dir.path().join("mirror.db")).await.unwrap();
        let id = mirror.suggest_free_id(1_000).await.unwrap();
        assert_eq!(id, 900_000);
    }
}
