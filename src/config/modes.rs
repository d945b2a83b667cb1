//! Download mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the caller wants out of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Video when the post has one (default).
    #[default]
    Auto,
    /// Audio track only.
    Audio,
}

impl DownloadMode {
    /// Whether the caller asked for audio.
    pub fn is_audio(&self) -> bool {
        matches!(self, DownloadMode::Audio)
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadMode::Auto => write!(f, "auto"),
            DownloadMode::Audio => write!(f, "audio"),
        }
    }
}

impl FromStr for DownloadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DownloadMode::Auto),
            "audio" => Ok(DownloadMode::Audio),
            _ => Err(format!("Unknown download mode: {}", s)),
        }
    }
}
