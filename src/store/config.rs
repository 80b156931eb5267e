//! `<root>/config.yaml`.
//!
//! The file is kept as a raw YAML mapping so keys this version does not know
//! about survive a rewrite. [`resolve_settings`] produces the typed view and
//! reports anything it had to ignore through the caller's `warn` callback.

use std::fs;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::layout::TasksRoot;
use crate::error::TaskError;

pub const DEFAULT_INTERACTIVE_ENABLED: bool = true;
pub const DEFAULT_SHOW_BANNER: bool = true;

pub const SUPPORTED_COLUMNS: [(&str, u32); 8] = [
    ("task_name", 32),
    ("task_id", 14),
    ("status", 10),
    ("priority", 8),
    ("effort", 6),
    ("spec_readiness", 14),
    ("deps", 12),
    ("created", 10),
];

const DEFAULT_COLUMNS: [&str; 5] = ["task_name", "priority", "effort", "deps", "created"];
const SETTINGS_KEYS: [&str; 3] = ["interactive_enabled", "show_banner", "list_table"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListColumn {
    pub name: String,
    pub width: u32,
}

impl ListColumn {
    pub fn default_width(name: &str) -> Option<u32> {
        SUPPORTED_COLUMNS
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, width)| *width)
    }
}

pub fn default_columns() -> Vec<ListColumn> {
    DEFAULT_COLUMNS
        .iter()
        .filter_map(|name| {
            ListColumn::default_width(name).map(|width| ListColumn {
                name: name.to_string(),
                width,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub interactive_enabled: bool,
    pub show_banner: bool,
    pub list_columns: Vec<ListColumn>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interactive_enabled: DEFAULT_INTERACTIVE_ENABLED,
            show_banner: DEFAULT_SHOW_BANNER,
            list_columns: default_columns(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWrite {
    Created,
    Updated,
}

impl ConfigWrite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Raw config document. Missing → empty; unreadable or not a mapping →
/// warning and empty.
pub fn read_config(root: &TasksRoot, warn: &dyn Fn(&str)) -> Mapping {
    let path = root.config_path();
    let Ok(text) = fs::read_to_string(&path) else {
        return Mapping::new();
    };
    match serde_yaml::from_str::<Value>(&text) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            warn(&format!(
                "Invalid config format at {}. Falling back to defaults.",
                path.display()
            ));
            Mapping::new()
        }
        Err(_) => {
            warn(&format!(
                "Unable to parse config at {}. Falling back to defaults.",
                path.display()
            ));
            Mapping::new()
        }
    }
}

pub fn write_config(root: &TasksRoot, document: &Mapping) -> Result<(), TaskError> {
    let path = root.config_path();
    let text = serde_yaml::to_string(document)
        .map_err(|e| TaskError::validation(format!("Unable to render config: {e}")))?;
    fs::write(path, text)?;
    Ok(())
}

pub fn resolve_settings(root: &TasksRoot, warn: &dyn Fn(&str)) -> Settings {
    let document = read_config(root, warn);
    settings_from_document(&document, &root.config_path().display().to_string(), warn)
}

fn settings_from_document(document: &Mapping, source: &str, warn: &dyn Fn(&str)) -> Settings {
    let mut settings = Settings::default();

    for key in document.keys() {
        if key.as_str() != Some("settings") {
            warn(&format!(
                "Unsupported config key '{}' in {source}. Ignoring.",
                key_label(key)
            ));
        }
    }

    let section = match document.get("settings") {
        None => return settings,
        Some(Value::Mapping(map)) => map,
        Some(_) => {
            warn(&format!("Invalid settings section in {source}. Using defaults."));
            return settings;
        }
    };

    for key in section.keys() {
        if !key.as_str().is_some_and(|k| SETTINGS_KEYS.contains(&k)) {
            warn(&format!(
                "Unsupported settings key '{}' in {source}. Ignoring.",
                key_label(key)
            ));
        }
    }

    settings.interactive_enabled = resolve_bool(
        section,
        "interactive_enabled",
        DEFAULT_INTERACTIVE_ENABLED,
        source,
        warn,
    );
    settings.show_banner = resolve_bool(section, "show_banner", DEFAULT_SHOW_BANNER, source, warn);
    settings.list_columns = resolve_columns(section.get("list_table"), source, warn);
    settings
}

fn resolve_bool(section: &Mapping, key: &str, default: bool, source: &str, warn: &dyn Fn(&str)) -> bool {
    match section.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(value)) => *value,
        Some(_) => {
            warn(&format!(
                "Invalid settings.{key} in {source}. Using default '{default}'."
            ));
            default
        }
    }
}

fn resolve_columns(list_table: Option<&Value>, source: &str, warn: &dyn Fn(&str)) -> Vec<ListColumn> {
    let table = match list_table {
        None | Some(Value::Null) => return default_columns(),
        Some(Value::Mapping(map)) => map,
        Some(_) => {
            warn(&format!(
                "Invalid settings.list_table section in {source}. Using defaults."
            ));
            return default_columns();
        }
    };

    for key in table.keys() {
        if key.as_str() != Some("columns") {
            warn(&format!(
                "Unsupported settings.list_table key '{}' in {source}. Ignoring.",
                key_label(key)
            ));
        }
    }

    let columns = match table.get("columns") {
        None | Some(Value::Null) => return default_columns(),
        Some(Value::Sequence(seq)) => seq,
        Some(_) => {
            warn(&format!(
                "Invalid settings.list_table.columns in {source}. Using defaults."
            ));
            return default_columns();
        }
    };

    let mut validated: Vec<ListColumn> = Vec::new();
    for (index, raw) in columns.iter().enumerate() {
        let Value::Mapping(entry) = raw else {
            warn(&format!(
                "Invalid column entry at settings.list_table.columns[{}] in {source}. Ignoring.",
                index + 1
            ));
            continue;
        };

        let name = entry.get("name").and_then(Value::as_str).unwrap_or_default();
        if ListColumn::default_width(name).is_none() {
            warn(&format!(
                "Unsupported list column '{}' in {source}. Ignoring.",
                entry.get("name").map(key_label).unwrap_or_default()
            ));
            continue;
        }
        if validated.iter().any(|column| column.name == name) {
            warn(&format!(
                "Duplicate list column '{name}' in {source}. Keeping first occurrence."
            ));
            continue;
        }
        let width = entry
            .get("width")
            .and_then(Value::as_u64)
            .filter(|width| *width > 0)
            .and_then(|width| u32::try_from(width).ok());
        let Some(width) = width else {
            warn(&format!(
                "Invalid width for list column '{name}' in {source}. Expected a positive integer."
            ));
            continue;
        };

        validated.push(ListColumn {
            name: name.to_string(),
            width,
        });
    }

    if validated.is_empty() {
        warn(&format!(
            "No valid settings.list_table.columns in {source}. Using defaults."
        ));
        return default_columns();
    }
    validated
}

fn key_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// The `settings` block this tool owns.
pub fn managed_settings(settings: &Settings) -> Mapping {
    let columns: Vec<Value> = settings
        .list_columns
        .iter()
        .map(|column| {
            let mut entry = Mapping::new();
            entry.insert("name".into(), column.name.clone().into());
            entry.insert("width".into(), Value::from(column.width));
            Value::Mapping(entry)
        })
        .collect();

    let mut list_table = Mapping::new();
    list_table.insert("columns".into(), Value::Sequence(columns));

    let mut managed = Mapping::new();
    managed.insert("interactive_enabled".into(), settings.interactive_enabled.into());
    managed.insert("show_banner".into(), settings.show_banner.into());
    managed.insert("list_table".into(), Value::Mapping(list_table));
    managed
}

/// Overlays the managed settings onto `existing`, leaving every other key
/// in place.
pub fn merge_managed_config(existing: &Mapping, settings: &Settings) -> Mapping {
    let mut merged = existing.clone();
    let mut section = match existing.get("settings") {
        Some(Value::Mapping(map)) => map.clone(),
        _ => Mapping::new(),
    };
    for (key, value) in managed_settings(settings) {
        section.insert(key, value);
    }
    merged.insert("settings".into(), Value::Mapping(section));
    merged
}

pub fn upsert_init_config(
    root: &TasksRoot,
    settings: &Settings,
    warn: &dyn Fn(&str),
) -> Result<ConfigWrite, TaskError> {
    let exists = root.config_path().exists();
    let existing = if exists { read_config(root, warn) } else { Mapping::new() };
    write_config(root, &merge_managed_config(&existing, settings))?;
    Ok(if exists {
        ConfigWrite::Updated
    } else {
        ConfigWrite::Created
    })
}

/// Returns whether a file was written.
pub fn write_default_config_if_missing(root: &TasksRoot) -> Result<bool, TaskError> {
    if root.config_path().exists() {
        return Ok(false);
    }
    let mut document = Mapping::new();
    document.insert(
        "settings".into(),
        Value::Mapping(managed_settings(&Settings::default())),
    );
    write_config(root, &document)?;
    Ok(true)
}
