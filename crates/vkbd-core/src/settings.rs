// Vkbd Settings Module
// Loads keyboard engine options from a TOML settings file

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::key::key_from_name;
use crate::modifier::ModifierError;
use crate::transform::KeyboardConfig;
use crate::KeyCode;

/// Settings for the virtual keyboard engine
///
/// Loaded from a TOML file (default: ~/.config/vkbd/settings.toml):
///
/// ```toml
/// [keyboard]
/// shift_modifier = "Shift"
/// alt_modifier = "AltGr"
/// auto_shifting = true
/// dead_keys = true
/// caps_lock = false
/// ```
#[derive(Debug, Clone, Default)]
pub struct Settings {
    config: KeyboardConfig,

    /// Path to the settings file (for reload)
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Modifier(#[from] ModifierError),

    #[error("No source path set")]
    NoSource,
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    keyboard: Option<KeyboardSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct KeyboardSettings {
    shift_modifier: Option<String>,
    alt_modifier: Option<String>,
    auto_shifting: Option<bool>,
    dead_keys: Option<bool>,
    caps_lock: Option<bool>,
}

fn parse_key(name: &str) -> Result<KeyCode, SettingsError> {
    let trimmed = name.trim();
    key_from_name(trimmed).ok_or_else(|| SettingsError::InvalidKey(trimmed.to_string()))
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut config = KeyboardConfig::default();
        if let Some(keyboard) = toml_settings.keyboard {
            let shift = keyboard
                .shift_modifier
                .as_deref()
                .map(parse_key)
                .transpose()?
                .unwrap_or(config.shift_modifier());
            let alt = keyboard
                .alt_modifier
                .as_deref()
                .map(parse_key)
                .transpose()?
                .unwrap_or(config.alt_modifier());
            // Both roles are checked together so swapping them in one file works
            config = KeyboardConfig::new(shift, alt)?
                .with_auto_shifting(keyboard.auto_shifting.unwrap_or(config.auto_shifting))
                .with_dead_keys(keyboard.dead_keys.unwrap_or(config.dead_keys))
                .with_caps_lock(keyboard.caps_lock.unwrap_or(config.caps_lock));
        }

        Ok(Self {
            config,
            source_path: None,
        })
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vkbd").join("settings.toml"))
    }

    /// Load from default location (~/.config/vkbd/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        log::debug!("No settings file found, using defaults");
        Ok(Self::new())
    }

    /// Reload settings from the original file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        let path = self.source_path.clone().ok_or(SettingsError::NoSource)?;
        *self = Self::from_file(path)?;
        Ok(())
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    pub fn into_config(self) -> KeyboardConfig {
        self.config
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_are_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.config(), &KeyboardConfig::default());
        assert!(settings.source_path().is_none());
    }

    #[test]
    fn test_keyboard_table() {
        let settings = Settings::from_toml(
            r#"
[keyboard]
shift_modifier = "Key_Shift"
alt_modifier = "Alt"
auto_shifting = false
caps_lock = false
"#,
        )
        .unwrap();

        let config = settings.config();
        assert_eq!(config.shift_modifier(), KeyCode::Shift);
        assert_eq!(config.alt_modifier(), KeyCode::Alt);
        assert!(!config.auto_shifting);
        assert!(config.dead_keys);
        assert!(!config.caps_lock);
    }

    #[test]
    fn test_roles_can_be_swapped() {
        let settings =
            Settings::from_toml("[keyboard]\nshift_modifier = \"AltGr\"\nalt_modifier = \"Shift\"\n")
                .unwrap();
        assert_eq!(settings.config().shift_modifier(), KeyCode::AltGr);
        assert_eq!(settings.config().alt_modifier(), KeyCode::Shift);
    }

    #[test]
    fn test_conflicting_roles() {
        let err = Settings::from_toml("[keyboard]\nalt_modifier = \"Shift\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Modifier(_)));
    }

    #[test]
    fn test_invalid_key_and_unknown_field() {
        let err = Settings::from_toml("[keyboard]\nshift_modifier = \"Hyper\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidKey(ref k) if k == "Hyper"));

        let err = Settings::from_toml("[keyboard]\nsticky = true\n").unwrap_err();
        assert!(matches!(err, SettingsError::TomlParse(_)));
    }

    #[test]
    fn test_from_file_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[keyboard]\ndead_keys = false\n").unwrap();

        let mut settings = Settings::from_file(&path).unwrap();
        assert!(!settings.config().dead_keys);
        assert_eq!(settings.source_path(), Some(path.as_path()));

        std::fs::write(&path, "[keyboard]\ndead_keys = true\n").unwrap();
        settings.reload().unwrap();
        assert!(settings.config().dead_keys);

        assert!(matches!(Settings::new().reload(), Err(SettingsError::NoSource)));
    }
}
