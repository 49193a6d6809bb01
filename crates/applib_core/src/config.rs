//! Application settings.
//!
//! # Responsibility
//! - Carry the knobs the application object needs at construction time.
//! - Parse them from JSON with per-field defaults.
//!
//! # Invariants
//! - `name` and `version` are never blank after validation.
//! - `preferences_node` follows preference naming rules.

use crate::dispatch::FaultPolicy;
use crate::prefs::is_valid_name;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_APPLICATION_NAME: &str = "applib";
const DEFAULT_PREFERENCES_NODE: &str = "applib";
const DEFAULT_APPLICATION_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Display name, also used in log records.
    pub name: String,
    /// Application version, free-form and independent of the library version.
    pub version: String,
    /// Preference node the application reads and writes.
    pub preferences_node: String,
    pub auto_unregister_models: bool,
    pub auto_unregister_views: bool,
    /// Persist window geometry between `STOPPING` and `STOPPED`.
    pub save_preferences_on_exit: bool,
    /// Fault policy for every dispatcher the application owns.
    pub listener_faults: FaultPolicy,
    /// Value returned by `Application::exit`.
    pub exit_code: i32,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_APPLICATION_NAME.to_string(),
            version: DEFAULT_APPLICATION_VERSION.to_string(),
            preferences_node: DEFAULT_PREFERENCES_NODE.to_string(),
            auto_unregister_models: false,
            auto_unregister_views: false,
            save_preferences_on_exit: true,
            listener_faults: FaultPolicy::Propagate,
            exit_code: 0,
        }
    }
}

impl ApplicationConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }
        if !is_valid_name(self.preferences_node.as_str()) {
            return Err(ConfigError::InvalidPreferencesNode(
                self.preferences_node.clone(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyName,
    EmptyVersion,
    InvalidPreferencesNode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid application config: {err}"),
            Self::EmptyName => write!(f, "application name must not be empty"),
            Self::EmptyVersion => write!(f, "application version must not be empty"),
            Self::InvalidPreferencesNode(value) => {
                write!(f, "preferences node is invalid: `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
