//! Aggregation plan: group name → folders under the structure root

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{ArchitectumError, Result};

/// Top-level key holding the group table.
pub const GROUPS_KEY: &str = "xml_groups";

/// One aggregation group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanGroup {
    pub name: String,
    /// Folder names relative to the structure root, in aggregation order.
    pub folders: Vec<String>,
}

/// Declarative group → folder mapping driving aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    pub groups: Vec<PlanGroup>,
}

impl Plan {
    /// Load a plan from a YAML file.
    pub fn load(path: &Path) -> Result<Plan> {
        let text = fs::read_to_string(path)
            .map_err(|e| ArchitectumError::config(path, format!("cannot read plan: {e}")))?;
        Plan::from_yaml_str(&text, path)
    }

    /// Parse a plan. `origin` only labels errors.
    ///
    /// The group table may be a mapping (`core: [a, b]`) or a list of
    /// single-entry mappings (`- core: [a, b]`). Group order is preserved.
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Plan> {
        let fail = |message: String| ArchitectumError::config(origin, message);

        let doc: Value = serde_yaml::from_str(text).map_err(|e| fail(e.to_string()))?;
        let table = doc
            .as_mapping()
            .ok_or_else(|| fail("plan must be a mapping".to_string()))?
            .get(GROUPS_KEY)
            .ok_or_else(|| fail(format!("missing top-level '{GROUPS_KEY}' key")))?;

        let mut entries: Vec<(&Value, &Value)> = Vec::new();
        match table {
            Value::Mapping(map) => entries.extend(map.iter()),
            Value::Sequence(items) => {
                for item in items {
                    match item.as_mapping() {
                        Some(map) if map.len() == 1 => entries.extend(map.iter()),
                        _ => {
                            return Err(fail(format!(
                                "each '{GROUPS_KEY}' list entry must be a single `group: [folders]` pair"
                            )));
                        }
                    }
                }
            }
            Value::Null => {}
            _ => {
                return Err(fail(format!(
                    "'{GROUPS_KEY}' must map group names to folder lists"
                )));
            }
        }

        let mut groups: Vec<PlanGroup> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let name = key
                .as_str()
                .ok_or_else(|| fail(format!("group name {key:?} is not a string")))?;
            validate_group_name(name).map_err(fail)?;
            if groups.iter().any(|g| g.name == name) {
                return Err(fail(format!("group '{name}' is declared twice")));
            }

            let folders = match value {
                Value::Sequence(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            fail(format!("group '{name}' lists a non-string folder {item:?}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
                Value::Null => Vec::new(),
                _ => return Err(fail(format!("group '{name}' must list its folders"))),
            };

            groups.push(PlanGroup {
                name: name.to_string(),
                folders,
            });
        }

        Ok(Plan { groups })
    }

    pub fn group(&self, name: &str) -> Option<&PlanGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl PlanGroup {
    /// Absolute folder paths under `structure_root`, in plan order.
    pub fn folder_paths(&self, structure_root: &Path) -> Vec<PathBuf> {
        self.folders
            .iter()
            .map(|folder| structure_root.join(folder))
            .collect()
    }
}

/// Group names become file names, so they must stay a single path component.
fn validate_group_name(name: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("group names must not be empty".to_string());
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(format!("group name '{name}' must not contain path separators"));
    }
    Ok(())
}
