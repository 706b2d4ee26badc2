use std::fs;
use std::path::Path;

use anyhow::Context;
use netprice_core::config::{is_known_setting, ResolvedConfig, SETTINGS};
use serde_json::json;
use toml::{Table, Value};

use crate::commands::{resolve_config, CommandResult};

pub fn run() -> CommandResult {
    let resolved = match resolve_config("config") {
        Ok(resolved) => resolved,
        Err(failure) => return failure,
    };

    let unknown_keys = match unknown_file_keys(resolved.file.as_deref()) {
        Ok(keys) => keys,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", format!("{error:#}"), 2);
        }
    };

    let fields = effective_fields(&resolved);

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string(),
    ];
    lines.extend(fields.iter().map(|(key, value, source)| render_line(key, value, source)));
    if !unknown_keys.is_empty() {
        lines.push(format!("ignored unknown file keys: {}", unknown_keys.join(", ")));
    }

    let mut data = fields
        .iter()
        .map(|(key, value, source)| {
            ((*key).to_string(), json!({ "value": value, "source": source }))
        })
        .collect::<serde_json::Map<_, _>>();
    if !unknown_keys.is_empty() {
        data.insert("unknown_keys".to_string(), json!(unknown_keys));
    }

    CommandResult::success_with_data("config", lines.join("\n"), Some(data.into()))
}

fn effective_fields(resolved: &ResolvedConfig) -> Vec<(&'static str, String, String)> {
    SETTINGS
        .iter()
        .map(|setting| {
            let value = resolved.config.value_of(setting.key).unwrap_or_default();
            (setting.key, value, resolved.source_of(setting.key).to_string())
        })
        .collect()
}

/// Dotted keys present in the config file that no setting reads.
fn unknown_file_keys(path: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let doc = raw
        .parse::<Table>()
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    let mut unknown = Vec::new();
    for (section, entries) in &doc {
        match entries {
            Value::Table(fields) => unknown.extend(
                fields
                    .keys()
                    .map(|field| format!("{section}.{field}"))
                    .filter(|key| !is_known_setting(key)),
            ),
            _ => unknown.push(section.clone()),
        }
    }
    Ok(unknown)
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}
