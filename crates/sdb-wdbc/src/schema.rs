//! Schema definitions for WDBC tables
//!
//! Every field in a WDBC record is a 4-byte cell (§3.1): the schema only
//! needs to say how to *interpret* each cell, not how wide it is.

/// Interpretation of a 4-byte record cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Two's-complement 32-bit integer
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// IEEE-754 single-precision float
    Float,
    /// Byte offset into the string block, materialized to `String` on read
    String,
    /// Bitfield, stored and read identically to `UInt32`
    Flags,
}

/// One field in a table schema
#[derive(Debug, Clone)]
pub struct SchemaField {
    /// Field name, unique within the schema
    pub name: String,
    /// How to interpret the cell
    pub field_type: FieldType,
    /// Name of the table this field's value is a foreign key into, if any
    pub ref_table: Option<String>,
    /// True for locale-duplicate fields that should not surface in the UI
    pub hidden: bool,
    /// Locale tag (`enUS`, `koKR`, …) for one slot of a localized string
    pub locale: Option<String>,
}

impl SchemaField {
    /// Create a plain, non-hidden, non-localized field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            ref_table: None,
            hidden: false,
            locale: None,
        }
    }

    /// Attach a foreign-key hint to this field
    pub fn with_ref(mut self, table: impl Into<String>) -> Self {
        self.ref_table = Some(table.into());
        self
    }

    /// Mark this field as a hidden locale duplicate
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Tag this field with a locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// An ordered sequence of field descriptors for one table (§3.2)
#[derive(Debug, Clone)]
pub struct Schema {
    /// Table name, e.g. `Spell`
    pub name: String,
    /// Declared fields, in on-disk order
    pub fields: Vec<SchemaField>,
    /// Index of the field treated as the record's primary key, if any
    pub key_field_index: Option<usize>,
}

impl Schema {
    /// Start an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            key_field_index: None,
        }
    }

    /// Append a field, returning `self` for chaining
    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    /// Append `count` array-indexed fields named `base_1 .. base_count`,
    /// all sharing `field_type` (§4.2 `arrayField` helper)
    pub fn array_fields(
        mut self,
        base: &str,
        field_type: FieldType,
        count: usize,
    ) -> Self {
        for i in 1..=count {
            self.fields
                .push(SchemaField::new(format!("{base}_{i}"), field_type));
        }
        self
    }

    /// Append the 17-field localized-string expansion for `name` (§3.2,
    /// §4.2 `locString` helper): one visible `enUS` slot, 15 hidden locale
    /// slots, and a trailing `name_Flags` uint32.
    pub fn loc_string(mut self, name: &str) -> Self {
        const LOCALES: [&str; 16] = [
            "enUS", "koKR", "frFR", "deDE", "enCN", "zhCN", "enTW", "zhTW", "esES", "esMX",
            "ruRU", "jaJP", "ptPT", "itIT", "unk", "unk2",
        ];

        for (i, locale) in LOCALES.iter().enumerate() {
            let field = SchemaField::new(name, FieldType::String).with_locale(*locale);
            let field = if i == 0 { field } else { field.hidden() };
            self.fields.push(field);
        }

        self.fields
            .push(SchemaField::new(format!("{name}_Flags"), FieldType::UInt32));
        self
    }

    /// Mark the field named `name` as the record key
    ///
    /// # Panics
    /// Panics if no field with that name exists; callers build schemas at
    /// startup from literal field lists, so this indicates a bundled
    /// schema definition bug, not malformed input.
    pub fn with_key_field(mut self, name: &str) -> Self {
        let index = self
            .fields
            .iter()
            .position(|f| f.name == name)
            .unwrap_or_else(|| panic!("schema {}: no field named {name}", self.name));
        self.key_field_index = Some(index);
        self
    }

    /// Number of fields declared by this schema
    pub fn declared_field_count(&self) -> usize {
        self.fields.len()
    }

    /// Resolve this schema against an on-disk field count (§3.2)
    ///
    /// Returns descriptors for `field_count` cells: the schema's own
    /// fields for as many leading cells as it covers, then synthetic
    /// `Field_N: uint32` descriptors for any remainder. If the file has
    /// *fewer* fields than the schema declares, the schema is truncated
    /// to fit — callers should treat the dropped tail as absent.
    pub fn resolve(&self, field_count: u32) -> Vec<SchemaField> {
        let field_count = field_count as usize;
        let mut resolved: Vec<SchemaField> = self.fields.iter().take(field_count).cloned().collect();

        for i in resolved.len()..field_count {
            resolved.push(SchemaField::new(format!("Field_{i}"), FieldType::UInt32));
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loc_string_expands_to_seventeen_fields() {
        let schema = Schema::new("Spell").loc_string("SpellName");
        assert_eq!(schema.fields.len(), 17);
        assert!(!schema.fields[0].hidden);
        assert!(schema.fields[1..16].iter().all(|f| f.hidden));
        assert_eq!(schema.fields[16].name, "SpellName_Flags");
        assert_eq!(schema.fields[16].field_type, FieldType::UInt32);
    }

    #[test]
    fn resolve_pads_trailing_fields_as_uint32() {
        let schema = Schema::new("T")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .field(SchemaField::new("Name", FieldType::String));
        let resolved = schema.resolve(4);
        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved[0].name, "ID");
        assert_eq!(resolved[2].name, "Field_2");
        assert_eq!(resolved[2].field_type, FieldType::UInt32);
    }

    #[test]
    fn resolve_truncates_when_file_has_fewer_fields() {
        let schema = Schema::new("T")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .field(SchemaField::new("Name", FieldType::String));
        let resolved = schema.resolve(1);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "ID");
    }

    #[test]
    fn array_fields_are_indexed_from_one() {
        let schema = Schema::new("T").array_fields("Effect", FieldType::UInt32, 3);
        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Effect_1", "Effect_2", "Effect_3"]);
    }
}
