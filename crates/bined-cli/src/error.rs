use std::path::PathBuf;

use bined_runtime::{CommandError, ConfigError, MacroExecutionError, PreferencesError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("macro failed: {0}")]
    Macro(#[from] MacroExecutionError),

    #[error("edit failed: {0}")]
    Command(#[from] CommandError),

    #[error("no macros stored in {path}")]
    NoMacro { path: PathBuf },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => 2,
            Self::Macro(_) | Self::NoMacro { .. } => 3,
            Self::Command(_) => 4,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use bined_runtime::MacroExecutionError;

    #[test]
    fn exit_codes_distinguish_usage_and_macro_failures() {
        assert_eq!(CliError::invalid("x").exit_code(), 2);
        let macro_error = CliError::from(MacroExecutionError::UnknownMacro { index: 4, count: 1 });
        assert_eq!(macro_error.exit_code(), 3);
        let io = CliError::from(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 1);
        assert_eq!(io.to_string(), "I/O error: disk");
    }
}
