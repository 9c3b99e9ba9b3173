//! WDBC record parsing

use crate::{DbcHeader, FieldType, Result, Schema, SchemaField, StringBlock};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// A single decoded cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Two's-complement 32-bit integer
    Int32(i32),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// IEEE-754 float, bit pattern preserved exactly from the file
    Float(f32),
    /// Materialized string (the raw string-block offset is discarded)
    String(String),
    /// Bitfield, displayed the same as `UInt32`
    Flags(u32),
}

impl Value {
    /// The field's value as an integer key, if it is integer-typed
    pub fn as_key(&self) -> Option<u32> {
        match self {
            Value::UInt32(v) | Value::Flags(v) => Some(*v),
            Value::Int32(v) => Some(*v as u32),
            _ => None,
        }
    }

    /// The value rendered as a display string (used by CSV/diff output)
    pub fn display(&self) -> String {
        match self {
            Value::Int32(v) => v.to_string(),
            Value::UInt32(v) | Value::Flags(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::String(v) => v.clone(),
        }
    }
}

/// One decoded record
#[derive(Debug, Clone)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Wrap already-decoded cell values
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Cell at `index`, if present
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Look up a cell by field name against `fields`
    pub fn get_by_name<'a>(&'a self, fields: &[SchemaField], name: &str) -> Option<&'a Value> {
        let index = fields.iter().position(|f| f.name == name)?;
        self.values.get(index)
    }

    /// All cells in on-disk order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of cells in the record
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record carries no cells
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A parsed table: its effective field layout plus all decoded rows
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<Record>,
    fields: Vec<SchemaField>,
    key_field_index: Option<usize>,
    key_map: HashMap<u32, usize>,
}

impl RecordSet {
    fn new(records: Vec<Record>, fields: Vec<SchemaField>, key_field_index: Option<usize>) -> Self {
        let key_map = if let Some(index) = key_field_index {
            records
                .iter()
                .enumerate()
                .filter_map(|(i, record)| record.get(index)?.as_key().map(|key| (key, i)))
                .collect()
        } else {
            HashMap::new()
        };

        Self {
            records,
            fields,
            key_field_index,
            key_map,
        }
    }

    /// Record at position `index`
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Record whose key field equals `key`
    pub fn get_by_key(&self, key: u32) -> Option<&Record> {
        self.key_map.get(&key).and_then(|i| self.records.get(*i))
    }

    /// All records, in on-disk order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The effective field layout (schema fields, padded with `Field_N`
    /// synthetics as needed — see [`Schema::resolve`])
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Index of the key field, if one was declared
    pub fn key_field_index(&self) -> Option<usize> {
        self.key_field_index
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses a WDBC file's header and records
#[derive(Debug)]
pub struct DbcParser {
    header: DbcHeader,
    data: Vec<u8>,
}

impl DbcParser {
    /// Parse a WDBC file from any seekable reader
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let header = DbcHeader::parse(reader)?;

        let expected_size = header.total_size();
        reader.seek(SeekFrom::End(0))?;
        let actual_size = reader.stream_position()?;
        if actual_size < expected_size {
            return Err(crate::Error::TruncatedFile(format!(
                "expected at least {expected_size} bytes, file has {actual_size}"
            )));
        }

        reader.seek(SeekFrom::Start(0))?;
        let mut data = Vec::with_capacity(expected_size as usize);
        reader.read_to_end(&mut data)?;

        Ok(Self { header, data })
    }

    /// Parse a WDBC file held entirely in memory
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Self::parse(&mut cursor)
    }

    /// The parsed header
    pub fn header(&self) -> &DbcHeader {
        &self.header
    }

    /// Raw bytes of the whole file
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decode every record, applying `schema` where it covers the file's
    /// field count and falling back to `Field_N: uint32` for the rest
    /// (§3.2). Pass `None` to decode every field as `uint32`.
    pub fn parse_records(&self, schema: Option<&Schema>) -> Result<RecordSet> {
        let empty_schema;
        let resolved_fields = match schema {
            Some(schema) => schema.resolve(self.header.field_count),
            None => {
                empty_schema = Schema::new("");
                empty_schema.resolve(self.header.field_count)
            }
        };

        let mut cursor = Cursor::new(self.data.as_slice());
        cursor.seek(SeekFrom::Start(DbcHeader::SIZE))?;

        let mut raw_records = Vec::with_capacity(self.header.record_count as usize);
        for _ in 0..self.header.record_count {
            let mut raw = Vec::with_capacity(resolved_fields.len());
            for _ in 0..resolved_fields.len() {
                let mut buf = [0u8; 4];
                cursor.read_exact(&mut buf)?;
                raw.push(u32::from_le_bytes(buf));
            }
            raw_records.push(raw);
        }

        let string_block = StringBlock::parse(
            &mut cursor,
            self.header.string_block_offset(),
            self.header.string_block_size,
        )?;

        let records = raw_records
            .into_iter()
            .map(|raw| {
                let values = raw
                    .into_iter()
                    .zip(resolved_fields.iter())
                    .map(|(bits, field)| decode_cell(bits, field.field_type, &string_block))
                    .collect();
                Record::new(values)
            })
            .collect();

        let key_field_index = schema.and_then(|s| s.key_field_index);
        Ok(RecordSet::new(records, resolved_fields, key_field_index))
    }
}

fn decode_cell(bits: u32, field_type: FieldType, string_block: &StringBlock) -> Value {
    match field_type {
        FieldType::UInt32 => Value::UInt32(bits),
        FieldType::Int32 => Value::Int32(bits as i32),
        FieldType::Float => Value::Float(f32::from_bits(bits)),
        FieldType::Flags => Value::Flags(bits),
        FieldType::String => Value::String(string_block.get(bits).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::DbcWriter;

    fn sample_schema() -> Schema {
        Schema::new("Sample")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .field(SchemaField::new("Name", FieldType::String))
            .with_key_field("ID")
    }

    #[test]
    fn round_trips_through_writer() {
        let schema = sample_schema();
        let records = vec![
            Record::new(vec![Value::UInt32(1), Value::String("Fireball".into())]),
            Record::new(vec![Value::UInt32(2), Value::String(String::new())]),
        ];

        let bytes = DbcWriter::new(&schema).write(&records).unwrap();
        let parser = DbcParser::parse_bytes(&bytes).unwrap();
        let parsed = parser.parse_records(Some(&schema)).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.get(0).unwrap().get(1).unwrap(),
            &Value::String("Fireball".into())
        );
        assert_eq!(
            parsed.get_by_key(2).unwrap().get(1).unwrap(),
            &Value::String(String::new())
        );
    }

    #[test]
    fn mismatched_field_count_falls_back_to_synthetic_fields() {
        let schema = sample_schema();
        // three uint32 fields on disk, schema only covers two (ID, Name)
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::header::DBC_MAGIC);
        bytes.extend_from_slice(&1u32.to_le_bytes()); // record_count
        bytes.extend_from_slice(&3u32.to_le_bytes()); // field_count
        bytes.extend_from_slice(&12u32.to_le_bytes()); // record_size
        bytes.extend_from_slice(&1u32.to_le_bytes()); // string_block_size
        bytes.extend_from_slice(&7u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // Name -> offset 0 (empty)
        bytes.extend_from_slice(&42u32.to_le_bytes());
        bytes.push(0); // string block: single NUL

        let parser = DbcParser::parse_bytes(&bytes).unwrap();
        let parsed = parser.parse_records(Some(&schema)).unwrap();
        assert_eq!(parsed.fields()[2].name, "Field_2");
        assert_eq!(parsed.get(0).unwrap().get(2).unwrap(), &Value::UInt32(42));
    }

    #[test]
    fn no_schema_decodes_everything_as_uint32() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::header::DBC_MAGIC);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&99u32.to_le_bytes());
        bytes.push(0);

        let parser = DbcParser::parse_bytes(&bytes).unwrap();
        let parsed = parser.parse_records(None).unwrap();
        assert_eq!(parsed.get(0).unwrap().get(0).unwrap(), &Value::UInt32(99));
    }
}
