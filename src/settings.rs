use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::stats::ChartPolicy;

/// Process-wide configuration, loaded once at start and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Chat-transport credential. Unused by the CLI driver; reserved for a
    /// real bot transport.
    #[serde(default)]
    pub bot_token: String,
    /// The single allow-listed identity. Entries and queries run as this id.
    #[serde(default)]
    pub allowed_user_id: i64,
    #[serde(default = "default_chart_min_span_days")]
    pub chart_min_span_days: i64,
    #[serde(default = "default_chart_max_span_days")]
    pub chart_max_span_days: i64,
}

fn default_chart_min_span_days() -> i64 {
    6
}

fn default_chart_max_span_days() -> i64 {
    31
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            bot_token: String::new(),
            allowed_user_id: 0,
            chart_min_span_days: default_chart_min_span_days(),
            chart_max_span_days: default_chart_max_span_days(),
        }
    }
}

impl Settings {
    pub fn chart_policy(&self) -> ChartPolicy {
        ChartPolicy {
            min_span_days: self.chart_min_span_days,
            max_span_days: self.chart_max_span_days,
        }
    }
}

/// Static identity check. Authorization happens at the flow boundary; the
/// store and statistics functions treat the id as opaque.
pub fn is_allowed(settings: &Settings, user_id: i64) -> bool {
    user_id == settings.allowed_user_id
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Data directory, honoring the TALLY_DATA_DIR override (used by the
/// integration tests to stay out of the real home directory).
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TALLY_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(&load_settings().data_dir)
}
