//! mediagrab - resolve social media post links into direct media URLs.
//!
//! Given a TikTok, Instagram, Facebook, YouTube, or Twitter/X link, the
//! resolver classifies the platform and walks an ordered chain of upstream
//! providers until one returns something downloadable.
//!
//! # Features
//!
//! - Platform classification from the link host
//! - Ordered provider fallback with per-provider diagnostics
//! - SnapSave packed-script decoding and HTML link extraction
//! - HD, SD, audio, and watermarked stream variants
//! - Multi-item posts returned as a picker
//! - Multi-instance Cobalt support with error translation
//!
//! # Example
//!
//! ```no_run
//! use mediagrab::{Config, DownloadMode, DownloadRequest, Resolver, ResolutionResult};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = Resolver::from_config(&Config::default())?;
//!     let request = DownloadRequest::new(
//!         "https://www.tiktok.com/@user/video/7234567890123456789",
//!         DownloadMode::Auto,
//!         "720",
//!     )?;
//!
//!     if let ResolutionResult::Success(media) = resolver.resolve_url(&request).await {
//!         println!("{} -> {}", media.filename, media.primary_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod output;
pub mod providers;
pub mod resolve;
pub mod snapsave;

// Re-exports for convenience
pub use config::{Config, DownloadMode};
pub use error::{Error, Result};
pub use media::{classify, DownloadRequest, MediaResult, Platform, ResolutionResult};
pub use providers::{Provider, ProviderOutcome, ProviderRegistry};
pub use resolve::{Diagnostics, Resolver};
