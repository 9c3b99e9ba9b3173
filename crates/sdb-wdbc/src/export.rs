//! Export of parsed tables to JSON and CSV

use crate::{RecordSet, Value};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::collections::HashMap;
use std::io;

/// A serializable wrapper for a record value
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SerializableValue {
    /// String value
    String(String),
    /// 32-bit signed integer
    Int32(i32),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// 32-bit floating point number
    Float(f32),
}

impl From<&Value> for SerializableValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int32(v) => SerializableValue::Int32(*v),
            Value::UInt32(v) | Value::Flags(v) => SerializableValue::UInt32(*v),
            Value::Float(v) => SerializableValue::Float(*v),
            Value::String(v) => SerializableValue::String(v.clone()),
        }
    }
}

/// A serializable record, keyed by field name
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SerializableRecord {
    /// The field values, flattened into the surrounding JSON object
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub values: HashMap<String, SerializableValue>,
}

/// Export every record in `record_set` to pretty-printed JSON
#[cfg(feature = "serde")]
pub fn export_to_json<W: io::Write>(record_set: &RecordSet, writer: W) -> Result<(), io::Error> {
    let fields = record_set.fields();
    let records: Vec<SerializableRecord> = record_set
        .records()
        .iter()
        .map(|record| {
            let values = fields
                .iter()
                .zip(record.values())
                .map(|(field, value)| (field.name.clone(), SerializableValue::from(value)))
                .collect();
            SerializableRecord { values }
        })
        .collect();

    serde_json::to_writer_pretty(writer, &records).map_err(|e| io::Error::other(e.to_string()))
}

/// Export every record in `record_set` to CSV, one column per field
#[cfg(feature = "csv_export")]
pub fn export_to_csv<W: io::Write>(record_set: &RecordSet, writer: W) -> Result<(), io::Error> {
    use csv::WriterBuilder;

    let field_names: Vec<String> = record_set.fields().iter().map(|f| f.name.clone()).collect();
    let mut csv_writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    csv_writer.write_record(&field_names)?;

    for record in record_set.records() {
        let row: Vec<String> = record.values().iter().map(Value::display).collect();
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbcParser, FieldType, Record, Schema, SchemaField};
    use crate::writer::DbcWriter;

    fn sample() -> RecordSet {
        let schema = Schema::new("T")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .field(SchemaField::new("Name", FieldType::String))
            .with_key_field("ID");
        let records = vec![Record::new(vec![
            Value::UInt32(1),
            Value::String("Fireball".into()),
        ])];
        let bytes = DbcWriter::new(&schema).write(&records).unwrap();
        let parser = DbcParser::parse_bytes(&bytes).unwrap();
        parser.parse_records(Some(&schema)).unwrap()
    }

    #[cfg(feature = "serde")]
    #[test]
    fn exports_json_with_field_names() {
        let record_set = sample();
        let mut buf = Vec::new();
        export_to_json(&record_set, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"ID\""));
        assert!(text.contains("\"Fireball\""));
    }

    #[cfg(feature = "csv_export")]
    #[test]
    fn exports_csv_with_header_row() {
        let record_set = sample();
        let mut buf = Vec::new();
        export_to_csv(&record_set, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("ID,Name"));
        assert!(text.contains("1,Fireball"));
    }
}
