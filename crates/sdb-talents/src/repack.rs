//! Legacy DBC column-packing repack (§4.7 "DBC repack (legacy, disabled)").
//!
//! Preserved for reference per the design notes; the HTTP handler that would
//! trigger this is gated to return `410 Gone` — see `sdb-cli`'s talent route.

use crate::{Error, Result};
use sdb_wdbc::{Record, Schema, Value};

/// The client's hardcoded talent-grid column cap.
pub const MAX_COLUMNS: u32 = 4;

/// All talents belonging to one class's tab, ready to be repacked.
pub struct TabGroup {
    pub class_token: u32,
    pub tab_number: u32,
    pub talents: Vec<Record>,
}

/// A display coordinate surviving the repack, for the parallel Lua table.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCoord {
    pub class_token: u32,
    pub tab_number: u32,
    pub talent_index: u32,
    pub display_row: u32,
    pub display_col: u32,
}

/// Unconditionally errors; the endpoint that would call this pipeline is
/// disabled per the design notes on the legacy repack's observed game-server
/// crash. [`repack_tab`] remains available for offline use.
pub fn repack_disabled() -> Result<()> {
    Err(Error::RepackDisabled)
}

/// Sort `group`'s talents by (row, col), force the lowest-ID talent to
/// position 0, then pack row-major into [`MAX_COLUMNS`] columns. Returns the
/// rewritten records (with `TierID`/`ColumnIndex` set to the packed
/// coordinates) alongside the real display coordinates for the Lua table.
pub fn repack_tab(group: &TabGroup, schema: &Schema) -> Result<(Vec<Record>, Vec<DisplayCoord>)> {
    let field_index = |name: &str| -> Result<usize> {
        schema
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| sdb_wdbc::Error::InvalidRecord(format!("schema is missing field {name}")).into())
    };
    let id_idx = field_index("ID")?;
    let tier_idx = field_index("TierID")?;
    let col_idx = field_index("ColumnIndex")?;

    let mut ordered: Vec<&Record> = group.talents.iter().collect();
    ordered.sort_by_key(|r| (field_u32(r, tier_idx), field_u32(r, col_idx), field_u32(r, id_idx)));

    if let Some(lowest_pos) = ordered
        .iter()
        .enumerate()
        .min_by_key(|(_, r)| field_u32(r, id_idx))
        .map(|(i, _)| i)
    {
        ordered.swap(0, lowest_pos);
    }

    let mut records = Vec::with_capacity(ordered.len());
    let mut coords = Vec::with_capacity(ordered.len());
    for (i, record) in ordered.into_iter().enumerate() {
        let display_row = i as u32 / MAX_COLUMNS;
        let display_col = i as u32 % MAX_COLUMNS;

        let mut values = record.values().to_vec();
        values[tier_idx] = Value::UInt32(display_row);
        values[col_idx] = Value::UInt32(display_col);
        records.push(Record::new(values));

        coords.push(DisplayCoord {
            class_token: group.class_token,
            tab_number: group.tab_number,
            talent_index: i as u32,
            display_row,
            display_col,
        });
    }

    Ok((records, coords))
}

fn field_u32(record: &Record, index: usize) -> u32 {
    record.get(index).and_then(Value::as_key).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::registry;

    fn index_of(schema: &Schema, name: &str) -> usize {
        schema.fields.iter().position(|f| f.name == name).unwrap()
    }

    fn talent_record(id: u32, tier: u32, col: u32) -> Record {
        let schema = registry().get("Talent").unwrap();
        let mut values = vec![Value::UInt32(0); schema.declared_field_count()];
        values[0] = Value::UInt32(id);
        values[index_of(&schema, "TierID")] = Value::UInt32(tier);
        values[index_of(&schema, "ColumnIndex")] = Value::UInt32(col);
        Record::new(values)
    }

    #[test]
    fn packs_five_talents_into_four_columns() {
        let schema = registry().get("Talent").unwrap();
        let group = TabGroup {
            class_token: 1,
            tab_number: 1,
            talents: vec![
                talent_record(200, 0, 0),
                talent_record(201, 0, 5),
                talent_record(202, 0, 6),
                talent_record(203, 1, 0),
                talent_record(204, 1, 1),
            ],
        };
        let (records, coords) = repack_tab(&group, &schema).unwrap();
        assert_eq!(records.len(), 5);
        for coord in &coords {
            assert!(coord.display_col < MAX_COLUMNS);
        }
        // row-major packing: talent_index 4 lands on row 1, col 0
        assert_eq!(coords[4].display_row, 1);
        assert_eq!(coords[4].display_col, 0);
    }

    #[test]
    fn forces_lowest_id_talent_to_position_zero() {
        let schema = registry().get("Talent").unwrap();
        let group = TabGroup {
            class_token: 1,
            tab_number: 1,
            talents: vec![talent_record(300, 0, 1), talent_record(299, 0, 0)],
        };
        let (records, coords) = repack_tab(&group, schema).unwrap();
        let id_idx = index_of(schema, "ID");
        assert_eq!(field_u32(&records[0], id_idx), 299);
        assert_eq!(coords[0].display_row, 0);
        assert_eq!(coords[0].display_col, 0);
    }

    #[test]
    fn disabled_endpoint_always_errors() {
        assert!(matches!(repack_disabled(), Err(Error::RepackDisabled)));
    }
}
