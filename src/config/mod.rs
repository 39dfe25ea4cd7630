pub mod types;

pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Failed to read config file {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
