use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Keys the organizer persists under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub component_groups: String,
    pub collapsed_groups: String,
    pub ungrouped_collapsed: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            component_groups: "componentGroups".to_string(),
            collapsed_groups: "componentGroupsCollapsedGroups".to_string(),
            ungrouped_collapsed: "componentGroupsIsUngroupedCollapsed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganizerConfig {
    pub component_route_prefix: String,
    pub storage_keys: StorageKeys,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            component_route_prefix: "/components".to_string(),
            storage_keys: StorageKeys::default(),
        }
    }
}

impl OrganizerConfig {
    /// Route of a component demo, e.g. `/components/todolist`.
    pub fn component_route(&self, slug: &str) -> String {
        format!(
            "{}/{}",
            self.component_route_prefix.trim_end_matches('/'),
            slug.trim_start_matches('/')
        )
    }

    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("[Settings] Failed to parse config: {}, returning defaults", e);
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let tmp_path = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        // Write to tmp then rename so a crash never leaves a half-written file.
        fs::write(&tmp_path, json).map_err(|e| e.to_string())?;
        fs::rename(tmp_path, path).map_err(|e| e.to_string())?;

        Ok(())
    }
}
