//! Media module for request/result types and platform classification.

pub mod item;
pub mod naming;
pub mod platform;
pub mod variants;

pub use item::{
    DownloadRequest, MediaResult, MediaVariant, PickerItem, PickerKind, ResolutionResult,
    Resolved, VariantKind,
};
pub use platform::{classify, Platform};
pub use variants::{build_media, MediaMeta, Stream, StreamSet};
