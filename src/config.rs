//! Dashboard configuration.
//!
//! The trend cutoff year and the default-visible timeline series look like
//! dataset artifacts rather than permanent business rules, so they live here
//! instead of inline in the report engine. Values come from an optional JSON
//! file next to the database; compiled defaults match the original dataset
//! (2010-2025 collection window).

use serde::Deserialize;
use std::path::Path;

use crate::charts::Theme;

/// File name looked up next to the database.
pub const CONFIG_FILE: &str = "hazardboard.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// How many countries the type-by-country breakdown keeps.
    pub top_country_count: usize,
    /// Timeline series shown by default; everything else starts hidden.
    pub default_visible_types: Vec<String>,
    /// Year excluded from the yearly trend (collection cutoff).
    pub trend_cutoff_year: i64,
    pub theme: Theme,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_country_count: 7,
            default_visible_types: ["Flood", "Storm", "Drought", "Volcanic activity"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trend_cutoff_year: 2025,
            theme: Theme::default(),
        }
    }
}

impl DashboardConfig {
    /// Read the config file if present, falling back to defaults. A broken
    /// file is reported and ignored rather than aborting the dashboard.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring invalid config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
