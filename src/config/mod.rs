use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::ConfigError;
use crate::survey::session::{AdvanceGate, NumericInputPolicy, SessionOptions};
use crate::utils::app_data_dir;

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Keys accepted by [`Config::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "advance_gate",
    "numeric_input_policy",
    "ui_color_enabled",
    "quiet_mode",
];

/// User preferences for the questionnaire front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub advance_gate: AdvanceGate,
    #[serde(default)]
    pub numeric_input_policy: NumericInputPolicy,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub quiet_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            advance_gate: AdvanceGate::default(),
            numeric_input_policy: NumericInputPolicy::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            quiet_mode: false,
        }
    }
}

impl Config {
    fn default_ui_color_enabled() -> bool {
        true
    }

    /// Session behaviour derived from these preferences.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            advance_gate: self.advance_gate,
            numeric_policy: self.numeric_input_policy,
        }
    }

    /// Updates a single preference from its textual form.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let raw = value.trim();
        match key {
            "advance_gate" => {
                self.advance_gate = AdvanceGate::parse(raw).ok_or_else(|| {
                    invalid(key, raw, &["deferred", "whole_form", "current_section"])
                })?;
            }
            "numeric_input_policy" => {
                self.numeric_input_policy = NumericInputPolicy::parse(raw)
                    .ok_or_else(|| invalid(key, raw, &["reject", "store"]))?;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = parse_bool(raw).ok_or_else(|| invalid(key, raw, BOOLS))?;
            }
            "quiet_mode" => {
                self.quiet_mode = parse_bool(raw).ok_or_else(|| invalid(key, raw, BOOLS))?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Key/value pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("advance_gate", self.advance_gate.as_str().to_string()),
            (
                "numeric_input_policy",
                self.numeric_input_policy.as_str().to_string(),
            ),
            ("ui_color_enabled", self.ui_color_enabled.to_string()),
            ("quiet_mode", self.quiet_mode.to_string()),
        ]
    }
}

const BOOLS: &[&str] = &["true", "false"];

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str, expected: &[&str]) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.join(", "),
    }
}

/// Loads and persists [`Config`] under the application data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            path: config_dir.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.advance_gate, AdvanceGate::Deferred);
        assert_eq!(config.numeric_input_policy, NumericInputPolicy::Reject);
    }

    #[test]
    fn save_then_load_preserves_preferences() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set_value("advance_gate", "whole_form").unwrap();
        config.set_value("quiet_mode", "yes").unwrap();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.advance_gate, AdvanceGate::WholeForm);
        assert!(loaded.quiet_mode);
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_file_fills_missing_keys() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "numeric_input_policy": "store" }"#).unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.numeric_input_policy, NumericInputPolicy::Store);
        assert!(config.ui_color_enabled);
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_value("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set_value("advance_gate", "sometimes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(config, Config::default());
    }
}
