// Tab rail Settings Engine
// Manages coordinator settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::{CoordinatorSettings, MAX_DEBOUNCE_MS};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TABRAIL_CONFIG";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<CoordinatorSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &CoordinatorSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: CoordinatorSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: CoordinatorSettings::default(),
        }
    }

    /// Creates a SettingsEngine honouring `TABRAIL_CONFIG` when set.
    pub fn from_env() -> Self {
        Self::new(std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
    }
}

/// Rejects settings the coordinator cannot run with.
pub fn validate(settings: &CoordinatorSettings) -> Result<(), SettingsError> {
    if settings.debounce_ms > MAX_DEBOUNCE_MS {
        return Err(SettingsError::InvalidValue(format!(
            "debounce_ms must be at most {}, got {}",
            MAX_DEBOUNCE_MS, settings.debounce_ms
        )));
    }
    if settings.overlay.script.trim().is_empty() || settings.overlay.style.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "overlay script and style must not be empty".to_string(),
        ));
    }
    if settings.overlay.marker_element_id.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "overlay marker_element_id must not be empty".to_string(),
        ));
    }
    if settings.bridge.request_timeout_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "bridge request_timeout_ms must be positive".to_string(),
        ));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed or invalid, returns an error and
    /// keeps the previous in-memory settings.
    fn load(&mut self) -> Result<CoordinatorSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            self.settings = CoordinatorSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: CoordinatorSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Sets one leaf setting by dotted key (`"debounce_ms"`,
    /// `"overlay.script"`), validates the result and persists it. Sections
    /// cannot be replaced wholesale.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.split('.').any(str::is_empty) || key.contains(['/', '~']) {
            return Err(SettingsError::InvalidKey(format!("malformed key '{}'", key)));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        let pointer = format!("/{}", key.replace('.', "/"));
        match tree.pointer_mut(&pointer) {
            Some(slot) if slot.is_object() => {
                return Err(SettingsError::InvalidKey(format!("'{}' is a section, not a setting", key)));
            }
            Some(slot) => *slot = value,
            None => return Err(SettingsError::InvalidKey(format!("unknown setting '{}'", key))),
        }

        let updated: CoordinatorSettings = serde_json::from_value(tree)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        validate(&updated)?;

        self.settings = updated;
        self.save()
    }

    /// Resets all settings to factory defaults and saves to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = CoordinatorSettings::default();
        self.save()?;
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
