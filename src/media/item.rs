//! Request and result types.

use serde::Serialize;
use url::Url;

use crate::config::DownloadMode;
use crate::error::{Error, Result};

/// Default quality hint when the caller gives none.
pub const DEFAULT_QUALITY: &str = "720";

/// One resolution attempt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    source_url: String,
    mode: DownloadMode,
    quality: String,
}

impl DownloadRequest {
    /// Validate and build a request.
    ///
    /// The URL must be an absolute http or https URL.
    pub fn new(source_url: &str, mode: DownloadMode, quality: &str) -> Result<Self> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(Error::InvalidRequest("URL required".into()));
        }

        let parsed = Url::parse(source_url)
            .map_err(|e| Error::InvalidRequest(format!("'{}': {}", source_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(Error::InvalidRequest(format!(
                "'{}' is not an http(s) link",
                source_url
            )));
        }

        let quality = quality.trim();
        Ok(Self {
            source_url: source_url.to_string(),
            mode,
            quality: if quality.is_empty() {
                DEFAULT_QUALITY.to_string()
            } else {
                quality.to_string()
            },
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn mode(&self) -> DownloadMode {
        self.mode
    }

    pub fn quality(&self) -> &str {
        &self.quality
    }
}

/// Kind of a downloadable stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    VideoHd,
    VideoSd,
    VideoWatermarked,
    Audio,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::VideoHd => "video-hd",
            VariantKind::VideoSd => "video-sd",
            VariantKind::VideoWatermarked => "video-watermarked",
            VariantKind::Audio => "audio",
        }
    }
}

/// One concrete downloadable stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaVariant {
    pub kind: VariantKind,
    pub label: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl MediaVariant {
    /// Build a variant, rejecting anything that is not an absolute http(s) URL.
    pub fn new(kind: VariantKind, label: impl Into<String>, url: &str) -> Option<Self> {
        is_absolute_http(url).then(|| Self {
            kind,
            label: label.into(),
            url: url.to_string(),
            size_bytes: None,
        })
    }

    pub fn with_size(mut self, size_bytes: Option<u64>) -> Self {
        self.size_bytes = size_bytes;
        self
    }
}

/// A resolved single media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaResult {
    #[serde(rename = "url")]
    pub primary_url: String,
    pub filename: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "thumb", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub variants: Vec<MediaVariant>,
}

/// Kind of an entry in a multi-item post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerKind {
    Video,
    Photo,
    Gif,
}

impl PickerKind {
    /// Map an upstream type name; unknown names are treated as video.
    pub fn from_upstream(name: Option<&str>) -> Self {
        match name.map(|n| n.to_lowercase()).as_deref() {
            Some("photo") | Some("image") => PickerKind::Photo,
            Some("gif") => PickerKind::Gif,
            _ => PickerKind::Video,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PickerKind::Video => "video",
            PickerKind::Photo => "photo",
            PickerKind::Gif => "gif",
        }
    }
}

/// One independent item of a carousel-style post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerItem {
    pub kind: PickerKind,
    pub label: String,
    pub url: String,
    #[serde(rename = "thumb", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// What a successful provider produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Media(MediaResult),
    Picker(Vec<PickerItem>),
}

/// Final answer handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResolutionResult {
    Success(MediaResult),
    Picker {
        items: Vec<PickerItem>,
    },
    #[serde(rename = "error")]
    Failure {
        #[serde(rename = "text")]
        message: String,
    },
}

impl ResolutionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ResolutionResult::Failure { .. })
    }
}

impl From<Resolved> for ResolutionResult {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::Media(media) => ResolutionResult::Success(media),
            Resolved::Picker(items) => ResolutionResult::Picker { items },
        }
    }
}

/// Whether `url` is an absolute http or https URL.
pub fn is_absolute_http(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Join a possibly relative upstream URL onto the upstream's base.
pub fn absolutize(base: &str, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if is_absolute_http(url) {
        return Some(url.to_string());
    }

    let joined = Url::parse(base).ok()?.join(url).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}
