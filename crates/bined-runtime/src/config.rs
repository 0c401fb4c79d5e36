#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! [`EditorConfig`] collects the presentation, history and macro settings an
//! editor is created with. With the `persistence` feature it loads from TOML
//! or JSON; every field is optional in the file.
//!
//! ```toml
//! code_type = "hexadecimal"
//! edit_operation = "insert"
//! bytes_per_row = 8
//!
//! [history]
//! max_depth = 500
//!
//! [macros]
//! name_prefix = "Recording "
//! ```

#[cfg(feature = "persistence")]
use std::path::Path;

#[cfg(feature = "persistence")]
use serde::{Deserialize, Serialize};

use bined_core::{CodeCharactersCase, CodeType, EditOperation};

use crate::undo::HistoryConfig;

/// Undo history limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persistence", serde(default))]
pub struct HistorySettings {
    pub max_depth: usize,
    /// Total bytes held by undo commands; 0 disables the limit.
    pub max_bytes: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        let defaults = HistoryConfig::default();
        Self {
            max_depth: defaults.max_depth,
            max_bytes: defaults.max_bytes,
        }
    }
}

impl From<HistorySettings> for HistoryConfig {
    fn from(settings: HistorySettings) -> Self {
        Self::new(settings.max_depth, settings.max_bytes)
    }
}

/// Macro manager settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persistence", serde(default))]
pub struct MacroSettings {
    /// Prefix of generated macro names, followed by a running number.
    pub name_prefix: String,
    /// Maximum number of macros listed in a menu.
    pub menu_limit: usize,
}

impl Default for MacroSettings {
    fn default() -> Self {
        Self {
            name_prefix: "Macro ".to_string(),
            menu_limit: 10,
        }
    }
}

/// Settings an editor is created with.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persistence", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "persistence", serde(default))]
pub struct EditorConfig {
    pub code_type: CodeType,
    pub characters_case: CodeCharactersCase,
    pub edit_operation: EditOperation,
    pub read_only: bool,
    pub bytes_per_row: u64,
    pub rows_per_page: u64,
    pub history: HistorySettings,
    pub macros: MacroSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            code_type: CodeType::default(),
            characters_case: CodeCharactersCase::default(),
            edit_operation: EditOperation::default(),
            read_only: false,
            bytes_per_row: 16,
            rows_per_page: 16,
            history: HistorySettings::default(),
            macros: MacroSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    #[cfg(feature = "persistence")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "persistence")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "persistence")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "persistence")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "persistence")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Validation(vec![e.to_string()]))
    }

    /// Check value ranges. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.bytes_per_row == 0 {
            errors.push("bytes_per_row must be at least 1".to_string());
        }
        if self.rows_per_page == 0 {
            errors.push("rows_per_page must be at least 1".to_string());
        }
        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be at least 1".to_string());
        }
        if self.macros.menu_limit == 0 {
            errors.push("macros.menu_limit must be at least 1".to_string());
        }
        errors
    }

    /// Validate, turning any problems into an error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading an [`EditorConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    #[cfg(feature = "persistence")]
    Toml(toml::de::Error),
    #[cfg(feature = "persistence")]
    Json(serde_json::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "persistence")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "persistence")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "persistence")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "persistence")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
