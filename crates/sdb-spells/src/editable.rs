//! Editable-fields projection of a `Spell.dbc` row (§4.6)

use sdb_wdbc::{Record, SchemaField, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Section name → whitelisted field names, in UI display order
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("selectSpell", &["ID", "SpellName", "Rank"]),
    (
        "base",
        &[
            "SpellName",
            "Rank",
            "Description",
            "ToolTip",
            "MaxLevel",
            "BaseLevel",
            "SpellLevel",
            "DurationIndex",
            "RangeIndex",
            "Speed",
            "SchoolMask",
            "CastingTimeIndex",
            "RecoveryTime",
            "CategoryRecoveryTime",
            "Category",
            "DispelType",
            "Mechanic",
        ],
    ),
    (
        "targetsProcs",
        &[
            "Stances",
            "StancesNot",
            "Targets",
            "TargetCreatureType",
            "RequiresSpellFocus",
            "CasterAuraState",
            "TargetAuraState",
            "CasterAuraSpell",
            "TargetAuraSpell",
            "ProcFlags",
            "ProcChance",
            "ProcCharges",
        ],
    ),
    (
        "effects",
        &[
            "Effect_1",
            "Effect_2",
            "Effect_3",
            "EffectBasePoints_1",
            "EffectBasePoints_2",
            "EffectBasePoints_3",
            "EffectMechanic_1",
            "EffectMechanic_2",
            "EffectMechanic_3",
            "EffectApplyAuraName_1",
            "EffectApplyAuraName_2",
            "EffectApplyAuraName_3",
        ],
    ),
    (
        "items",
        &[
            "EquippedItemClass",
            "EquippedItemSubClassMask",
            "EquippedItemInventoryTypeMask",
        ],
    ),
    (
        "flags",
        &[
            "Attributes_1",
            "Attributes_2",
            "Attributes_3",
            "Attributes_4",
            "Attributes_5",
            "Attributes_6",
            "Attributes_7",
        ],
    ),
    ("icon", &["SpellIconID", "ActiveIconID"]),
    ("visual", &["SpellVisual1", "SpellVisual2", "SpellMissileID"]),
];

/// Fields whose reference is resolved through a search endpoint (§4.6
/// "Reference resolution")
pub const REFERENCE_FIELDS: &[&str] = &[
    "SpellIconID",
    "ActiveIconID",
    "SpellVisual1",
    "SpellVisual2",
    "SpellMissileID",
];

/// One read of a spell through the editable-fields model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellView {
    /// Spell ID
    pub id: u32,
    /// Visible (`enUS`) name
    pub name: String,
    /// Visible rank string
    pub rank: String,
    /// Visible description
    pub description: String,
    /// Visible tooltip
    #[serde(rename = "toolTip")]
    pub tool_tip: String,
    /// Raw `SpellIconID` value
    #[serde(rename = "spellIconId")]
    pub spell_icon_id: u32,
    /// Normalized icon base name, if resolvable
    pub icon: Option<String>,
    /// `section → field → value`
    pub editable: BTreeMap<String, BTreeMap<String, Json>>,
    /// Whether this spell has a mirror override
    #[serde(rename = "customSpell")]
    pub custom_spell: bool,
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Int32(v) => Json::from(*v),
        Value::UInt32(v) | Value::Flags(v) => Json::from(*v),
        Value::Float(v) => serde_json::Number::from_f64(f64::from(*v))
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(v) => Json::String(v.clone()),
    }
}

pub(crate) fn field_value(record: &Record, fields: &[SchemaField], name: &str) -> Option<Json> {
    record.get_by_name(fields, name).map(value_to_json)
}

fn string_field(record: &Record, fields: &[SchemaField], name: &str) -> String {
    match record.get_by_name(fields, name) {
        Some(Value::String(v)) => v.clone(),
        _ => String::new(),
    }
}

/// Project `record` into the editable-fields view, overlaying `mirror`
/// (column name → value, already alias-mapped) on top of the DBC values.
pub fn project(
    id: u32,
    record: &Record,
    fields: &[SchemaField],
    mirror: &BTreeMap<String, Json>,
    icon_name: Option<String>,
) -> SpellView {
    let lookup = |name: &str| -> Json {
        mirror
            .get(name)
            .cloned()
            .or_else(|| field_value(record, fields, name))
            .unwrap_or(Json::Null)
    };

    let editable: BTreeMap<String, BTreeMap<String, Json>> = SECTIONS
        .iter()
        .map(|(section, field_names)| {
            let values = field_names
                .iter()
                .map(|name| ((*name).to_string(), lookup(name)))
                .collect();
            ((*section).to_string(), values)
        })
        .collect();

    let spell_icon_id = lookup("SpellIconID").as_u64().unwrap_or(0) as u32;

    SpellView {
        id,
        name: mirror
            .get("SpellName")
            .and_then(Json::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| string_field(record, fields, "SpellName")),
        rank: mirror
            .get("Rank")
            .and_then(Json::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| string_field(record, fields, "Rank")),
        description: mirror
            .get("Description")
            .and_then(Json::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| string_field(record, fields, "Description")),
        tool_tip: mirror
            .get("ToolTip")
            .and_then(Json::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| string_field(record, fields, "ToolTip")),
        spell_icon_id,
        icon: icon_name,
        editable,
        custom_spell: !mirror.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_wdbc::registry;

    #[test]
    fn projects_named_fields_into_their_sections() {
        let schema = registry().get("Spell").unwrap();
        let fields = schema.resolve(schema.declared_field_count() as u32);
        let mut values = vec![Value::UInt32(0); fields.len()];
        let id_index = fields.iter().position(|f| f.name == "ID").unwrap();
        let name_index = fields.iter().position(|f| f.name == "SpellName").unwrap();
        values[id_index] = Value::UInt32(133);
        values[name_index] = Value::String("Fireball".to_string());
        let record = Record::new(values);

        let view = project(133, &record, &fields, &BTreeMap::new(), None);
        assert_eq!(view.name, "Fireball");
        assert!(!view.custom_spell);
        assert_eq!(
            view.editable["base"]["SpellName"],
            Json::String("Fireball".to_string())
        );
    }

    #[test]
    fn mirror_overrides_dbc_values() {
        let schema = registry().get("Spell").unwrap();
        let fields = schema.resolve(schema.declared_field_count() as u32);
        let values = vec![Value::UInt32(0); fields.len()];
        let record = Record::new(values);

        let mut mirror = BTreeMap::new();
        mirror.insert("SpellName".to_string(), Json::String("Pyroblast".to_string()));

        let view = project(133, &record, &fields, &mirror, None);
        assert_eq!(view.name, "Pyroblast");
        assert!(view.custom_spell);
    }
}
