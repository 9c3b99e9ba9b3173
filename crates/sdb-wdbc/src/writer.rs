//! WDBC file writing

use crate::{DbcHeader, Error, FieldType, Record, Result, Schema, StringInterner, Value};

/// Encodes records back to WDBC bytes against an explicit schema (§4.1)
///
/// Unlike reading, writing always uses the schema's own field list: a
/// record with a different cell count than the schema declares is a
/// caller bug, not a file to tolerate.
#[derive(Debug)]
pub struct DbcWriter<'a> {
    schema: &'a Schema,
}

impl<'a> DbcWriter<'a> {
    /// Create a writer bound to `schema`
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Encode `records` to a complete WDBC file
    pub fn write(&self, records: &[Record]) -> Result<Vec<u8>> {
        let field_count = self.schema.declared_field_count();
        let mut interner = StringInterner::new();

        let mut record_bytes = Vec::with_capacity(records.len() * field_count * 4);
        for record in records {
            if record.len() != field_count {
                return Err(Error::InvalidRecord(format!(
                    "record has {} cells, schema {} declares {field_count}",
                    record.len(),
                    self.schema.name
                )));
            }

            for (value, field) in record.values().iter().zip(self.schema.fields.iter()) {
                let bits = encode_cell(value, field.field_type, &mut interner)?;
                record_bytes.extend_from_slice(&bits.to_le_bytes());
            }
        }

        let string_block = interner.into_bytes();

        let header = DbcHeader {
            magic: crate::header::DBC_MAGIC,
            record_count: records.len() as u32,
            field_count: field_count as u32,
            record_size: (field_count * 4) as u32,
            string_block_size: string_block.len() as u32,
        };

        let mut out = Vec::with_capacity(DbcHeader::SIZE as usize + record_bytes.len() + string_block.len());
        header.write_to(&mut out);
        out.extend_from_slice(&record_bytes);
        out.extend_from_slice(&string_block);
        Ok(out)
    }
}

fn encode_cell(value: &Value, field_type: FieldType, interner: &mut StringInterner) -> Result<u32> {
    match (value, field_type) {
        (Value::Int32(v), FieldType::Int32) => Ok(*v as u32),
        (Value::UInt32(v), FieldType::UInt32) => Ok(*v),
        (Value::Flags(v), FieldType::Flags) => Ok(*v),
        (Value::Float(v), FieldType::Float) => Ok(v.to_bits()),
        (Value::String(v), FieldType::String) => Ok(interner.intern(v)),
        _ => Err(Error::TypeConversion(format!(
            "{value:?} is not compatible with field type {field_type:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaField;

    #[test]
    fn rejects_record_with_wrong_field_count() {
        let schema = Schema::new("T").field(SchemaField::new("ID", FieldType::UInt32));
        let writer = DbcWriter::new(&schema);
        let records = vec![Record::new(vec![Value::UInt32(1), Value::UInt32(2)])];
        assert!(writer.write(&records).is_err());
    }

    #[test]
    fn writes_header_with_expected_sizes() {
        let schema = Schema::new("T")
            .field(SchemaField::new("ID", FieldType::UInt32))
            .field(SchemaField::new("Name", FieldType::String));
        let writer = DbcWriter::new(&schema);
        let records = vec![Record::new(vec![
            Value::UInt32(1),
            Value::String("hi".into()),
        ])];

        let bytes = writer.write(&records).unwrap();
        assert_eq!(&bytes[0..4], b"WDBC");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 8);
    }
}
