//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};
use crate::providers::PROVIDER_NAMES;
use regex::Regex;
use url::Url;

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 20;

/// Upper bound for any per-request timeout, in seconds.
const MAX_TIMEOUT_SECONDS: u64 = 120;

/// Upper bound for followed redirects.
const MAX_REDIRECTS: usize = 20;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_user_agent(&config.http.user_agent)?;
    validate_timeouts(
        config.http.timeout_seconds,
        config.http.connect_timeout_seconds,
    )?;
    validate_redirects(config.http.max_redirects)?;
    validate_quality(&config.request.quality)?;
    validate_cobalt_instances(&config.providers.cobalt_instances)?;
    validate_disabled_providers(&config.providers.disabled)?;

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("http.user_agent".to_string()));
    }

    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "http.user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    // Check for placeholder values
    let ua_lower = user_agent.to_lowercase();
    if ua_lower.contains("replaceme") || ua_lower.contains("your_user_agent") {
        return Err(Error::ConfigValidation {
            field: "http.user_agent".to_string(),
            message:
                "User agent appears to be a placeholder. Please provide a browser user agent."
                    .to_string(),
        });
    }

    Ok(())
}

/// Validate request and connect timeouts.
pub fn validate_timeouts(timeout: u64, connect_timeout: u64) -> Result<()> {
    for (field, value) in [
        ("http.timeout_seconds", timeout),
        ("http.connect_timeout_seconds", connect_timeout),
    ] {
        if value == 0 || value > MAX_TIMEOUT_SECONDS {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: format!(
                    "Timeout must be between 1 and {} seconds (got {})",
                    MAX_TIMEOUT_SECONDS, value
                ),
            });
        }
    }

    if connect_timeout > timeout {
        return Err(Error::ConfigValidation {
            field: "http.connect_timeout_seconds".to_string(),
            message: format!(
                "Connect timeout ({}s) cannot exceed the request timeout ({}s)",
                connect_timeout, timeout
            ),
        });
    }

    Ok(())
}

/// Validate the redirect limit.
pub fn validate_redirects(max_redirects: usize) -> Result<()> {
    if max_redirects > MAX_REDIRECTS {
        return Err(Error::ConfigValidation {
            field: "http.max_redirects".to_string(),
            message: format!(
                "At most {} redirects may be followed (got {})",
                MAX_REDIRECTS, max_redirects
            ),
        });
    }

    Ok(())
}

/// Validate the video quality hint: `max` or a pixel height such as `720`.
pub fn validate_quality(quality: &str) -> Result<()> {
    let quality_pattern = Regex::new(r"^(max|\d{3,4})$").unwrap();

    if !quality_pattern.is_match(quality.trim()) {
        return Err(Error::ConfigValidation {
            field: "request.quality".to_string(),
            message: format!(
                "Invalid quality '{}'. Use 'max' or a height like 360, 720, 1080.",
                quality
            ),
        });
    }

    Ok(())
}

/// Validate Cobalt instance base URLs.
pub fn validate_cobalt_instances<S: AsRef<str>>(instances: &[S]) -> Result<()> {
    for instance in instances {
        let instance = instance.as_ref();
        let parsed = Url::parse(instance).map_err(|e| Error::ConfigValidation {
            field: "providers.cobalt_instances".to_string(),
            message: format!("'{}' is not a valid URL: {}", instance, e),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(Error::ConfigValidation {
                field: "providers.cobalt_instances".to_string(),
                message: format!("'{}' must be an absolute http(s) URL", instance),
            });
        }
    }

    Ok(())
}

/// Validate that every disabled provider name is one we know about.
pub fn validate_disabled_providers<S: AsRef<str>>(disabled: &[S]) -> Result<()> {
    for name in disabled {
        let name = name.as_ref();
        if !PROVIDER_NAMES.iter().any(|known| known.eq_ignore_ascii_case(name)) {
            return Err(Error::ConfigValidation {
                field: "providers.disabled".to_string(),
                message: format!(
                    "Unknown provider '{}'. Known providers: {}",
                    name,
                    PROVIDER_NAMES.join(", ")
                ),
            });
        }
    }

    Ok(())
}
