//! DBC edit-store command implementations (§4.5, §6.4 `/api/dbc/*`)

use anyhow::{Context, Result};
use clap::Subcommand;
use sdb_cli_utils::{add_table_row, create_table, format_bytes};
use sdb_store::{EditStore, Source};
use sdb_wdbc::{export_to_csv, export_to_json, registry, DbcParser, Record, Value};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum DbcCommands {
    /// List every `.dbc` visible through either layer
    List,

    /// Dump a table as JSON
    Read {
        file: String,
        #[arg(long, value_enum, default_value = "auto")]
        source: SourceArg,
    },

    /// Show the base/export diff for a table
    Diff { file: String },

    /// Export a table to CSV
    ExportCsv {
        file: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a table from CSV, overwriting the export copy
    ImportCsv { file: String, csv_path: PathBuf },

    /// Inspect a `.dbc` file directly by path, bypassing the edit store
    Info { path: PathBuf },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum SourceArg {
    Auto,
    Base,
    Export,
}

impl From<SourceArg> for Source {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Auto => Source::Auto,
            SourceArg::Base => Source::Base,
            SourceArg::Export => Source::Export,
        }
    }
}

pub fn execute(store: &EditStore, command: DbcCommands) -> Result<()> {
    match command {
        DbcCommands::List => {
            let mut table = create_table(vec!["Name", "Base", "Export", "Records", "Fields"]);
            for summary in store.list()? {
                add_table_row(
                    &mut table,
                    vec![
                        summary.name,
                        summary.has_base.to_string(),
                        summary.has_export.to_string(),
                        summary.record_count.to_string(),
                        summary.field_count.to_string(),
                    ],
                );
            }
            table.printstd();
            Ok(())
        }
        DbcCommands::Read { file, source } => {
            let read = store.read(&file, source.into())?;
            let mut out = Vec::new();
            export_to_json(&read.record_set, &mut out)?;
            println!("{}", String::from_utf8(out)?);
            Ok(())
        }
        DbcCommands::Diff { file } => {
            let diff = store.diff(&file)?;
            println!(
                "{} added, {} removed, {} changed",
                diff.added.len(),
                diff.removed.len(),
                diff.modified.len()
            );
            Ok(())
        }
        DbcCommands::ExportCsv { file, output } => {
            let read = store.read(&file, Source::Auto)?;
            let mut out = Vec::new();
            export_to_csv(&read.record_set, &mut out)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &out)?;
                    println!("wrote {} ({})", path.display(), format_bytes(out.len() as u64));
                }
                None => println!("{}", String::from_utf8(out)?),
            }
            Ok(())
        }
        DbcCommands::ImportCsv { file, csv_path } => {
            let records = import_csv(&file, &csv_path)?;
            let stats = store.save(&file, &records)?;
            println!(
                "imported {} records, {} fields each",
                stats.record_count, stats.field_count
            );
            Ok(())
        }
        DbcCommands::Info { path } => {
            let record_set = parse_file(&path)?;
            println!(
                "{}: {} records, {} fields",
                path.display(),
                record_set.len(),
                record_set.fields().len()
            );
            Ok(())
        }
    }
}

/// Parse a CSV dump back into records for `file`'s schema, matching columns
/// by header name and defaulting anything missing to the field's zero value.
pub fn import_csv(file: &str, csv_path: &std::path::Path) -> Result<Vec<Record>> {
    let table_name = file.strip_suffix(".dbc").unwrap_or(file);
    let schema = registry()
        .get(table_name)
        .with_context(|| format!("no bundled schema for {file}"))?;

    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let column_for_field: Vec<Option<usize>> = schema
        .fields
        .iter()
        .map(|f| headers.iter().position(|h| h == &f.name))
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut values = Vec::with_capacity(schema.fields.len());
        for (field, column) in schema.fields.iter().zip(&column_for_field) {
            let cell = column.and_then(|i| row.get(i)).unwrap_or("");
            values.push(parse_cell(cell, field.field_type));
        }
        records.push(Record::new(values));
    }
    Ok(records)
}

fn parse_cell(cell: &str, field_type: sdb_wdbc::FieldType) -> Value {
    use sdb_wdbc::FieldType;
    match field_type {
        FieldType::Int32 => Value::Int32(cell.parse().unwrap_or(0)),
        FieldType::UInt32 => Value::UInt32(cell.parse().unwrap_or(0)),
        FieldType::Flags => Value::Flags(cell.parse().unwrap_or(0)),
        FieldType::Float => Value::Float(cell.parse().unwrap_or(0.0)),
        FieldType::String => Value::String(cell.to_string()),
    }
}

/// Parse a `.dbc` file directly (bypassing the layered store), used by the
/// `info`-style CLI output that doesn't need copy-on-write semantics. Uses
/// the bundled schema for the file's stem when one is registered, otherwise
/// falls back to raw `Field_N: uint32` decoding.
pub fn parse_file(path: &std::path::Path) -> Result<sdb_wdbc::RecordSet> {
    let bytes = std::fs::read(path)?;
    let table_name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let schema = registry().get(table_name);
    Ok(DbcParser::parse_bytes(&bytes)?.parse_records(schema)?)
}
