use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeftoversError {
    #[error("{0}")]
    Validation(String),

    #[error("Notification permission denied; reminders are saved but will not fire")]
    PermissionDenied,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Notification failed: {0}")]
    NotificationError(String),

    #[error("Meal not found: {0}")]
    MealNotFound(String),
}

impl LeftoversError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            LeftoversError::Validation(_) => Some(
                "Give the meal a name and a time like 18:30:\n  leftovers add \"Tuna casserole\" --at 18:30"
            ),
            LeftoversError::PermissionDenied => Some(
                "Set `notifications_enabled = true` in the config file (see `leftovers config`)"
            ),
            LeftoversError::MealNotFound(_) => Some(
                "Run `leftovers list` to see registered meals"
            ),
            LeftoversError::NotificationError(_) => Some(
                "Check `notify_command` in the config file (see `leftovers config`)"
            ),
            LeftoversError::Storage(_) | LeftoversError::JsonError(_) => Some(
                "The data file may be corrupt; `leftovers config` shows where it lives"
            ),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LeftoversError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, LeftoversError>;
