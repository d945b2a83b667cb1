//! Configuration module for mediagrab.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Download mode definitions
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{
    user_config_path, Config, HttpConfig, ProvidersConfig, RequestConfig, CONFIG_FILE_NAME,
};
pub use modes::DownloadMode;
pub use validation::validate_config;
