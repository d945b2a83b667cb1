//! Error types for the mediagrab application.

use thiserror::Error;

use crate::snapsave::DecodeError;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Input errors
    #[error("Invalid link: {0}")]
    InvalidRequest(String),

    // Transport errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Upstream errors
    #[error("{upstream} returned HTTP {status}")]
    UpstreamStatus { upstream: &'static str, status: u16 },

    #[error("{0}")]
    Upstream(String),

    #[error("No media found: {0}")]
    NoMedia(String),

    #[error("SnapSave decode failed: {0}")]
    Decode(#[from] DecodeError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes for the CLI.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const RESOLVE_FAILED: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const INVALID_INPUT: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
