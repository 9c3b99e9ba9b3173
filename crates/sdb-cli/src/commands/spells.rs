//! Spell editor command implementations (§4.6, §6.4 `/api/spells/*`)

use anyhow::Result;
use clap::Subcommand;
use sdb_spells::SpellEditor;
use serde_json::Value as Json;
use std::collections::BTreeMap;

#[derive(Subcommand)]
pub enum SpellCommands {
    /// Print a spell through the editable-fields projection
    Read { id: u32 },

    /// Patch a spell's editable fields (`field=json` pairs)
    Edit {
        id: u32,
        #[arg(value_parser = parse_field_assignment)]
        fields: Vec<(String, Json)>,
    },

    /// Clone an existing spell into a new ID
    CreateFromTemplate {
        template_id: u32,
        new_id: u32,
        #[arg(value_parser = parse_field_assignment)]
        fields: Vec<(String, Json)>,
    },

    /// Suggest the next free spell ID above the highest DBC row
    SuggestFreeId,

    /// Search a foreign-key-referenced table by prefix
    Search {
        field: String,
        prefix: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn parse_field_assignment(raw: &str) -> Result<(String, Json), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got {raw}"))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Json::String(value.to_string()));
    Ok((name.to_string(), value))
}

pub async fn execute(editor: &SpellEditor, command: SpellCommands) -> Result<()> {
    match command {
        SpellCommands::Read { id } => {
            let view = editor.read(id, None).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
        SpellCommands::Edit { id, fields } => {
            let patch: BTreeMap<String, Json> = fields.into_iter().collect();
            editor.edit(id, &patch).await?;
            println!("spell {id} updated");
            Ok(())
        }
        SpellCommands::CreateFromTemplate {
            template_id,
            new_id,
            fields,
        } => {
            let patch: BTreeMap<String, Json> = fields.into_iter().collect();
            editor.create_from_template(template_id, new_id, &patch).await?;
            println!("spell {new_id} created from template {template_id}");
            Ok(())
        }
        SpellCommands::SuggestFreeId => {
            let id = editor.suggest_free_id().await?;
            println!("{id}");
            Ok(())
        }
        SpellCommands::Search { field, prefix, limit } => {
            let matches = editor.search_reference(&field, &prefix, limit)?;
            for entry in matches {
                println!("{}\t{}", entry.id, entry.label);
            }
            Ok(())
        }
    }
}
