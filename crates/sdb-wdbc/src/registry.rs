//! Process-wide registry of bundled table schemas (§4.2)
//!
//! Schemas here are intentionally partial past the fields the rest of the
//! crate actually reads by name — `Schema::resolve` pads anything beyond
//! a schema's declared fields with `Field_N: uint32`, so there is no need
//! to enumerate every column of a 234-field table just to name the ones
//! the editor cares about.

use crate::{FieldType, Schema, SchemaField};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Points at the file and field that hold a table's human-readable name,
/// for building on-demand lookup maps when resolving foreign keys.
#[derive(Debug, Clone, Copy)]
pub struct LookupSource {
    /// DBC file name, e.g. `Faction.dbc`
    pub file: &'static str,
    /// Name of the display-name field within that file's schema
    pub name_field: &'static str,
}

fn spell_schema() -> Schema {
    // index 0
    let schema = Schema::new("Spell").field(SchemaField::new("ID", FieldType::UInt32));
    // indices 1..=17: visible + locale + flags
    let schema = schema
        .loc_string("SpellName")
        // indices 18..=68: Rank / Description / ToolTip locstrings (base section)
        .loc_string("Rank")
        .loc_string("Description")
        .loc_string("ToolTip")
        // base section scalars
        .field(SchemaField::new("MaxLevel", FieldType::UInt32))
        .field(SchemaField::new("BaseLevel", FieldType::UInt32))
        .field(SchemaField::new("SpellLevel", FieldType::UInt32))
        .field(SchemaField::new("DurationIndex", FieldType::UInt32).with_ref("SpellDuration"))
        .field(SchemaField::new("RangeIndex", FieldType::UInt32).with_ref("SpellRange"))
        .field(SchemaField::new("Speed", FieldType::Float))
        .field(SchemaField::new("SchoolMask", FieldType::Flags))
        .field(SchemaField::new("CastingTimeIndex", FieldType::UInt32).with_ref("SpellCastTimes"))
        .field(SchemaField::new("RecoveryTime", FieldType::UInt32))
        .field(SchemaField::new("CategoryRecoveryTime", FieldType::UInt32))
        .field(SchemaField::new("Category", FieldType::UInt32).with_ref("SpellCategory"))
        .field(SchemaField::new("DispelType", FieldType::UInt32).with_ref("SpellDispelType"))
        .field(SchemaField::new("Mechanic", FieldType::UInt32).with_ref("SpellMechanic"))
        // targetsProcs section
        .array_fields("Attributes", FieldType::Flags, 7)
        .field(SchemaField::new("Stances", FieldType::Flags))
        .field(SchemaField::new("StancesNot", FieldType::Flags))
        .field(SchemaField::new("Targets", FieldType::Flags))
        .field(SchemaField::new("TargetCreatureType", FieldType::UInt32))
        .field(SchemaField::new("RequiresSpellFocus", FieldType::UInt32).with_ref("SpellFocusObject"))
        .field(SchemaField::new("CasterAuraState", FieldType::UInt32))
        .field(SchemaField::new("TargetAuraState", FieldType::UInt32))
        .field(SchemaField::new("CasterAuraSpell", FieldType::UInt32))
        .field(SchemaField::new("TargetAuraSpell", FieldType::UInt32))
        .field(SchemaField::new("ProcFlags", FieldType::Flags))
        .field(SchemaField::new("ProcChance", FieldType::UInt32))
        .field(SchemaField::new("ProcCharges", FieldType::UInt32))
        // effects section
        .array_fields("Effect", FieldType::UInt32, 3)
        .array_fields("EffectDieSides", FieldType::Int32, 3)
        .array_fields("EffectBasePoints", FieldType::Int32, 3)
        .array_fields("EffectMechanic", FieldType::UInt32, 3)
        .array_fields("EffectRadiusIndex", FieldType::UInt32, 3)
        .array_fields("EffectApplyAuraName", FieldType::UInt32, 3)
        .array_fields("EffectAmplitude", FieldType::Float, 3)
        .array_fields("EffectMiscValue", FieldType::Int32, 3)
        // items section
        .field(SchemaField::new("EquippedItemClass", FieldType::Int32).with_ref("ItemClass"))
        .field(SchemaField::new("EquippedItemSubClassMask", FieldType::Flags))
        .field(SchemaField::new("EquippedItemInventoryTypeMask", FieldType::Flags))
        // filler up to the SpellIconID offset (field 133, byte offset 532)
        .array_fields("Field", FieldType::UInt32, 5);
    schema
        .field(SchemaField::new("SpellIconID", FieldType::UInt32).with_ref("SpellIcon"))
        .field(SchemaField::new("ActiveIconID", FieldType::UInt32).with_ref("SpellIcon"))
        .field(SchemaField::new("SpellVisual1", FieldType::UInt32))
        .field(SchemaField::new("SpellVisual2", FieldType::UInt32))
        .field(SchemaField::new("SpellMissileID", FieldType::UInt32))
        .with_key_field("ID")
}

fn spell_icon_schema() -> Schema {
    Schema::new("SpellIcon")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("IconPath", FieldType::String))
        .with_key_field("ID")
}

fn talent_schema() -> Schema {
    Schema::new("Talent")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("TalentTabID", FieldType::UInt32).with_ref("TalentTab"))
        .field(SchemaField::new("TierID", FieldType::UInt32))
        .field(SchemaField::new("ColumnIndex", FieldType::UInt32))
        .array_fields("SpellRank", FieldType::UInt32, 9)
        .array_fields("PrereqTalent", FieldType::UInt32, 3)
        .array_fields("PrereqRank", FieldType::UInt32, 3)
        .field(SchemaField::new("Flags", FieldType::Flags))
        .field(SchemaField::new("RequiredSpellID", FieldType::UInt32))
        .array_fields("CategoryMask", FieldType::UInt32, 2)
        .with_key_field("ID")
}

fn talent_tab_schema() -> Schema {
    Schema::new("TalentTab")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .loc_string("Name")
        .field(SchemaField::new("SpellIconID", FieldType::UInt32).with_ref("SpellIcon"))
        .field(SchemaField::new("RaceMask", FieldType::Flags))
        .field(SchemaField::new("ClassMask", FieldType::Flags))
        .field(SchemaField::new("PetTalentMask", FieldType::Flags))
        .field(SchemaField::new("OrderIndex", FieldType::UInt32))
        .field(SchemaField::new("BackgroundFile", FieldType::String))
        .with_key_field("ID")
}

fn chr_classes_schema() -> Schema {
    Schema::new("ChrClasses")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("PlayerClass", FieldType::UInt32))
        .field(SchemaField::new("DamageBonusStat", FieldType::Int32))
        .field(SchemaField::new("DisplayPower", FieldType::UInt32))
        .field(SchemaField::new("PetNameToken", FieldType::String))
        .loc_string("Name")
        .loc_string("NameFemale")
        .loc_string("NameMale")
        .field(SchemaField::new("Filename", FieldType::String))
        .field(SchemaField::new("SpellClassSet", FieldType::UInt32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .with_key_field("ID")
}

fn chr_races_schema() -> Schema {
    Schema::new("ChrRaces")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .field(SchemaField::new("FactionID", FieldType::UInt32).with_ref("Faction"))
        .field(SchemaField::new("ExplorationSoundID", FieldType::UInt32))
        .field(SchemaField::new("MaleDisplayID", FieldType::UInt32))
        .field(SchemaField::new("FemaleDisplayID", FieldType::UInt32))
        .field(SchemaField::new("ClientPrefix", FieldType::String))
        .field(SchemaField::new("BaseLanguage", FieldType::UInt32))
        .field(SchemaField::new("CreatureType", FieldType::UInt32))
        .loc_string("Name")
        .loc_string("NameFemale")
        .loc_string("NameMale")
        .field(SchemaField::new("ClientFileString", FieldType::String))
        .field(SchemaField::new("CinematicSequenceID", FieldType::UInt32))
        .with_key_field("ID")
}

fn faction_schema() -> Schema {
    Schema::new("Faction")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("ReputationIndex", FieldType::Int32))
        .array_fields("ReputationRaceMask", FieldType::Flags, 4)
        .array_fields("ReputationClassMask", FieldType::Flags, 4)
        .array_fields("ReputationBase", FieldType::Int32, 4)
        .array_fields("ReputationFlags", FieldType::Flags, 4)
        .field(SchemaField::new("ParentFactionID", FieldType::UInt32).with_ref("Faction"))
        .field(SchemaField::new("ParentFactionModIn", FieldType::Float))
        .field(SchemaField::new("ParentFactionModOut", FieldType::Float))
        .loc_string("Name")
        .loc_string("Description")
        .with_key_field("ID")
}

fn map_schema() -> Schema {
    Schema::new("Map")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Directory", FieldType::String))
        .field(SchemaField::new("InstanceType", FieldType::UInt32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .field(SchemaField::new("PvP", FieldType::UInt32))
        .loc_string("MapName")
        .field(SchemaField::new("AreaTableID", FieldType::UInt32).with_ref("AreaTable"))
        .loc_string("MapDescription0")
        .loc_string("MapDescription1")
        .field(SchemaField::new("LoadingScreenID", FieldType::UInt32))
        .field(SchemaField::new("MinimapIconScale", FieldType::Float))
        .field(SchemaField::new("CorpseMapID", FieldType::Int32))
        .array_fields("Corpse", FieldType::Float, 2)
        .field(SchemaField::new("TimeOfDayOverride", FieldType::Int32))
        .field(SchemaField::new("ExpansionID", FieldType::UInt32))
        .field(SchemaField::new("RaidOffset", FieldType::UInt32))
        .field(SchemaField::new("MaxPlayers", FieldType::UInt32))
        .with_key_field("ID")
}

fn achievement_schema() -> Schema {
    Schema::new("Achievement")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("FactionFlag", FieldType::Int32))
        .field(SchemaField::new("MapID", FieldType::Int32).with_ref("Map"))
        .loc_string("Title")
        .loc_string("Description")
        .field(SchemaField::new("Category", FieldType::UInt32))
        .field(SchemaField::new("Points", FieldType::UInt32))
        .field(SchemaField::new("UiOrder", FieldType::UInt32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .field(SchemaField::new("IconID", FieldType::UInt32).with_ref("SpellIcon"))
        .loc_string("RewardText")
        .field(SchemaField::new("MinimumCriteria", FieldType::UInt32))
        .field(SchemaField::new("SharesCriteria", FieldType::UInt32).with_ref("Achievement"))
        .with_key_field("ID")
}

fn skill_line_schema() -> Schema {
    Schema::new("SkillLine")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("CategoryID", FieldType::Int32))
        .loc_string("DisplayName")
        .loc_string("Description")
        .field(SchemaField::new("SpellIconID", FieldType::UInt32).with_ref("SpellIcon"))
        .loc_string("AlternateVerb")
        .field(SchemaField::new("CanLink", FieldType::UInt32))
        .with_key_field("ID")
}

fn area_table_schema() -> Schema {
    Schema::new("AreaTable")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("MapID", FieldType::UInt32).with_ref("Map"))
        .field(SchemaField::new("ParentAreaID", FieldType::UInt32).with_ref("AreaTable"))
        .field(SchemaField::new("AreaBit", FieldType::Int32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .array_fields("SoundProviderPref", FieldType::UInt32, 2)
        .field(SchemaField::new("AmbienceID", FieldType::UInt32))
        .field(SchemaField::new("ZoneMusic", FieldType::UInt32))
        .field(SchemaField::new("IntroSound", FieldType::UInt32))
        .field(SchemaField::new("ExplorationLevel", FieldType::Int32))
        .loc_string("AreaName")
        .field(SchemaField::new("FactionGroupMask", FieldType::Flags))
        .array_fields("LiquidTypeID", FieldType::UInt32, 4)
        .field(SchemaField::new("MinElevation", FieldType::Float))
        .field(SchemaField::new("AmbientMultiplier", FieldType::Float))
        .field(SchemaField::new("LightID", FieldType::UInt32))
        .with_key_field("ID")
}

fn item_class_schema() -> Schema {
    Schema::new("ItemClass")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("SubclassMap", FieldType::UInt32))
        .field(SchemaField::new("Unknown", FieldType::UInt32))
        .loc_string("ClassName")
        .with_key_field("ID")
}

fn spell_category_schema() -> Schema {
    Schema::new("SpellCategory")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .with_key_field("ID")
}

fn spell_dispel_type_schema() -> Schema {
    Schema::new("SpellDispelType")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .loc_string("InternalName")
        .field(SchemaField::new("Mask", FieldType::Flags))
        .field(SchemaField::new("Immunity", FieldType::UInt32))
        .with_key_field("ID")
}

fn spell_mechanic_schema() -> Schema {
    Schema::new("SpellMechanic")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .loc_string("StateName")
        .with_key_field("ID")
}

fn spell_range_schema() -> Schema {
    Schema::new("SpellRange")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("MinRangeHostile", FieldType::Float))
        .field(SchemaField::new("MinRangeFriend", FieldType::Float))
        .field(SchemaField::new("MaxRangeHostile", FieldType::Float))
        .field(SchemaField::new("MaxRangeFriend", FieldType::Float))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .loc_string("DisplayName")
        .loc_string("DisplayNameShort")
        .with_key_field("ID")
}

fn spell_duration_schema() -> Schema {
    Schema::new("SpellDuration")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Duration", FieldType::Int32))
        .field(SchemaField::new("DurationPerLevel", FieldType::Int32))
        .field(SchemaField::new("MaxDuration", FieldType::Int32))
        .with_key_field("ID")
}

fn creature_type_schema() -> Schema {
    Schema::new("CreatureType")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .loc_string("Name")
        .field(SchemaField::new("Flags", FieldType::Flags))
        .with_key_field("ID")
}

fn emotes_schema() -> Schema {
    Schema::new("Emotes")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("EmoteSlashCommand", FieldType::String))
        .field(SchemaField::new("AnimID", FieldType::UInt32))
        .field(SchemaField::new("EmoteFlags", FieldType::Flags))
        .field(SchemaField::new("EmoteSpecProc", FieldType::UInt32))
        .field(SchemaField::new("EmoteSpecProcParam", FieldType::UInt32))
        .field(SchemaField::new("EventSoundID", FieldType::UInt32))
        .with_key_field("ID")
}

fn languages_schema() -> Schema {
    Schema::new("Languages")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .loc_string("Name")
        .with_key_field("ID")
}

fn char_titles_schema() -> Schema {
    Schema::new("CharTitles")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Unknown", FieldType::UInt32))
        .loc_string("Name")
        .loc_string("Name1")
        .field(SchemaField::new("Mask", FieldType::UInt32))
        .with_key_field("ID")
}

fn spell_focus_object_schema() -> Schema {
    Schema::new("SpellFocusObject")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .loc_string("Name")
        .with_key_field("ID")
}

fn spell_radius_schema() -> Schema {
    Schema::new("SpellRadius")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Radius", FieldType::Float))
        .field(SchemaField::new("RadiusPerLevel", FieldType::Float))
        .field(SchemaField::new("RadiusMax", FieldType::Float))
        .with_key_field("ID")
}

fn spell_cast_times_schema() -> Schema {
    Schema::new("SpellCastTimes")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("Base", FieldType::Int32))
        .field(SchemaField::new("PerLevel", FieldType::Int32))
        .field(SchemaField::new("Minimum", FieldType::Int32))
        .with_key_field("ID")
}

fn sound_entries_schema() -> Schema {
    Schema::new("SoundEntries")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("SoundType", FieldType::UInt32))
        .field(SchemaField::new("Name", FieldType::String))
        .array_fields("File", FieldType::String, 10)
        .array_fields("Freq", FieldType::UInt32, 10)
        .field(SchemaField::new("DirectoryBase", FieldType::String))
        .field(SchemaField::new("Volume", FieldType::Float))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .field(SchemaField::new("MinDistance", FieldType::Float))
        .field(SchemaField::new("DistanceCutoff", FieldType::Float))
        .field(SchemaField::new("EAXDef", FieldType::UInt32))
        .field(SchemaField::new("SoundEntriesAdvancedID", FieldType::UInt32))
        .with_key_field("ID")
}

fn game_object_display_info_schema() -> Schema {
    Schema::new("GameObjectDisplayInfo")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("ModelName", FieldType::String))
        .array_fields("Sound", FieldType::UInt32, 10)
        .with_key_field("ID")
}

fn spell_item_enchantment_schema() -> Schema {
    Schema::new("SpellItemEnchantment")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .array_fields("Effect", FieldType::UInt32, 3)
        .array_fields("EffectPointsMin", FieldType::UInt32, 3)
        .array_fields("EffectPointsMax", FieldType::UInt32, 3)
        .array_fields("EffectArg", FieldType::UInt32, 3)
        .loc_string("Name")
        .field(SchemaField::new("ItemVisual", FieldType::UInt32))
        .field(SchemaField::new("Flags", FieldType::Flags))
        .field(SchemaField::new("SRC_ItemID", FieldType::UInt32))
        .field(SchemaField::new("ConditionID", FieldType::UInt32))
        .field(SchemaField::new("RequiredSkillID", FieldType::UInt32))
        .field(SchemaField::new("RequiredSkillRank", FieldType::UInt32))
        .field(SchemaField::new("ItemLevel", FieldType::UInt32))
        .with_key_field("ID")
}

fn item_schema() -> Schema {
    Schema::new("Item")
        .field(SchemaField::new("ID", FieldType::UInt32))
        .field(SchemaField::new("ClassID", FieldType::UInt32).with_ref("ItemClass"))
        .field(SchemaField::new("SubclassID", FieldType::UInt32))
        .field(SchemaField::new("SoundOverrideSubclassID", FieldType::Int32))
        .field(SchemaField::new("Material", FieldType::Int32))
        .field(SchemaField::new("DisplayInfoID", FieldType::UInt32).with_ref("ItemDisplayInfo"))
        .field(SchemaField::new("InventoryType", FieldType::UInt32))
        .field(SchemaField::new("SheatheType", FieldType::UInt32))
        .with_key_field("ID")
}

fn registry_entries() -> Vec<Schema> {
    vec![
        spell_schema(),
        spell_icon_schema(),
        talent_schema(),
        talent_tab_schema(),
        chr_classes_schema(),
        chr_races_schema(),
        faction_schema(),
        map_schema(),
        achievement_schema(),
        skill_line_schema(),
        area_table_schema(),
        item_class_schema(),
        spell_category_schema(),
        spell_dispel_type_schema(),
        spell_mechanic_schema(),
        spell_range_schema(),
        spell_duration_schema(),
        creature_type_schema(),
        emotes_schema(),
        languages_schema(),
        char_titles_schema(),
        spell_focus_object_schema(),
        spell_radius_schema(),
        spell_cast_times_schema(),
        sound_entries_schema(),
        game_object_display_info_schema(),
        spell_item_enchantment_schema(),
        item_schema(),
    ]
}

fn lookup_sources() -> HashMap<&'static str, LookupSource> {
    let mut map = HashMap::new();
    map.insert(
        "SpellIcon",
        LookupSource {
            file: "SpellIcon.dbc",
            name_field: "IconPath",
        },
    );
    map.insert(
        "Faction",
        LookupSource {
            file: "Faction.dbc",
            name_field: "Name",
        },
    );
    map.insert(
        "Map",
        LookupSource {
            file: "Map.dbc",
            name_field: "MapName",
        },
    );
    map.insert(
        "AreaTable",
        LookupSource {
            file: "AreaTable.dbc",
            name_field: "AreaName",
        },
    );
    map.insert(
        "Achievement",
        LookupSource {
            file: "Achievement.dbc",
            name_field: "Title",
        },
    );
    map.insert(
        "TalentTab",
        LookupSource {
            file: "TalentTab.dbc",
            name_field: "Name",
        },
    );
    map.insert(
        "ItemClass",
        LookupSource {
            file: "ItemClass.dbc",
            name_field: "ClassName",
        },
    );
    map.insert(
        "ItemDisplayInfo",
        LookupSource {
            file: "ItemDisplayInfo.dbc",
            name_field: "ModelName",
        },
    );
    map
}

/// The process-wide, immutable `tableName → schema` mapping
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Schema>,
    lookup_sources: HashMap<&'static str, LookupSource>,
}

impl SchemaRegistry {
    /// Look up the bundled schema for `table` (e.g. `"Spell"`)
    pub fn get(&self, table: &str) -> Option<&Schema> {
        self.schemas.get(table)
    }

    /// Every bundled table name
    pub fn table_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemas.keys().copied()
    }

    /// Where to find the display name for values referencing `table`
    pub fn lookup_source(&self, table: &str) -> Option<LookupSource> {
        self.lookup_sources.get(table).copied()
    }
}

/// Access the process-wide schema registry, building it on first use
pub fn registry() -> &'static SchemaRegistry {
    static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let schemas = registry_entries()
            .into_iter()
            .map(|schema| {
                let name: &'static str = Box::leak(schema.name.clone().into_boxed_str());
                (name, schema)
            })
            .collect();
        SchemaRegistry {
            schemas,
            lookup_sources: lookup_sources(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundles_at_least_twenty_five_schemas() {
        assert!(registry_entries().len() >= 25);
    }

    #[test]
    fn spell_icon_id_lands_at_field_133() {
        let spell = spell_schema();
        let index = spell.fields.iter().position(|f| f.name == "SpellIconID").unwrap();
        assert_eq!(index, 133);
    }

    #[test]
    fn registry_resolves_spell_and_talent() {
        let registry = registry();
        assert!(registry.get("Spell").is_some());
        assert!(registry.get("Talent").is_some());
        assert!(registry.get("DoesNotExist").is_none());
    }

    #[test]
    fn spell_icon_lookup_source_points_at_icon_path() {
        let registry = registry();
        let source = registry.lookup_source("SpellIcon").unwrap();
        assert_eq!(source.file, "SpellIcon.dbc");
        assert_eq!(source.name_field, "IconPath");
    }
}
