//! The HD / SD / audio normalization every provider reports through.

use crate::config::DownloadMode;
use crate::error::{Error, Result};
use crate::media::item::{MediaResult, MediaVariant, VariantKind};
use crate::media::naming::{replace_extension, sanitize_filename};

pub const LABEL_HD: &str = "HD NO WATERMARK (MP4)";
pub const LABEL_SD: &str = "NO WATERMARK (MP4)";
pub const LABEL_AUDIO: &str = "MP3 AUDIO";
pub const LABEL_WATERMARKED: &str = "WITH WATERMARK (MP4)";

/// One upstream stream URL with its size, if reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub url: String,
    pub size_bytes: Option<u64>,
}

impl Stream {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size_bytes: None,
        }
    }

    pub fn sized(url: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            url: url.into(),
            size_bytes,
        }
    }
}

/// Streams an upstream reported, before normalization.
#[derive(Debug, Clone, Default)]
pub struct StreamSet {
    pub hd: Option<Stream>,
    pub sd: Option<Stream>,
    pub audio: Option<Stream>,
    pub watermarked: Option<Stream>,
}

impl StreamSet {
    /// HD and SD from scrape results, each falling back to the other.
    pub fn from_video(hd: Option<String>, sd: Option<String>) -> Self {
        Self {
            hd: hd.map(Stream::new),
            sd: sd.map(Stream::new),
            ..Default::default()
        }
    }

    /// Whether there is anything to offer at all.
    pub fn is_empty(&self) -> bool {
        self.hd.is_none() && self.sd.is_none() && self.audio.is_none() && self.watermarked.is_none()
    }

    /// Normalize into the ordered variant list.
    ///
    /// HD falls back to SD and vice versa; audio falls back to the video URL
    /// (players can play audio from an MP4) without a size. A watermarked
    /// stream, if any, is appended last.
    pub fn into_variants(self) -> Vec<MediaVariant> {
        let hd = self.hd.clone().or_else(|| self.sd.clone());
        let sd = self.sd.or(self.hd);
        let audio = self.audio.or_else(|| {
            hd.as_ref()
                .or(sd.as_ref())
                .map(|video| Stream::new(video.url.clone()))
        });

        [
            (VariantKind::VideoHd, LABEL_HD, hd),
            (VariantKind::VideoSd, LABEL_SD, sd),
            (VariantKind::Audio, LABEL_AUDIO, audio),
            (VariantKind::VideoWatermarked, LABEL_WATERMARKED, self.watermarked),
        ]
        .into_iter()
        .filter_map(|(kind, label, stream)| {
            let stream = stream?;
            MediaVariant::new(kind, label, &stream.url).map(|v| v.with_size(stream.size_bytes))
        })
        .collect()
    }
}

/// Descriptive fields that accompany a stream set.
#[derive(Debug, Clone)]
pub struct MediaMeta {
    pub filename: String,
    pub title: String,
    pub author: Option<String>,
    pub thumbnail: Option<String>,
}

impl MediaMeta {
    pub fn new(filename: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: title.into(),
            author: None,
            thumbnail: None,
        }
    }

    pub fn author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

/// Build a media result from streams.
///
/// The primary URL is HD, then SD, then watermarked, then audio. In audio mode a
/// dedicated audio stream is the primary instead and the filename becomes `.mp3`.
pub fn build_media(streams: StreamSet, meta: MediaMeta, mode: DownloadMode) -> Result<MediaResult> {
    let dedicated_audio = streams.audio.as_ref().map(|s| s.url.clone());
    let variants = streams.into_variants();

    if variants.is_empty() {
        return Err(Error::NoMedia(format!("no usable stream for '{}'", meta.title)));
    }

    let video_primary = [
        VariantKind::VideoHd,
        VariantKind::VideoSd,
        VariantKind::VideoWatermarked,
        VariantKind::Audio,
    ]
    .iter()
    .find_map(|kind| variants.iter().find(|v| v.kind == *kind))
    .map(|v| v.url.clone());

    let audio_primary = dedicated_audio
        .filter(|url| mode.is_audio() && variants.iter().any(|v| &v.url == url));

    let (primary_url, filename) = match audio_primary {
        Some(url) => (url, replace_extension(&meta.filename, "mp3")),
        None => (video_primary.unwrap_or_default(), meta.filename.clone()),
    };

    Ok(MediaResult {
        primary_url,
        filename: sanitize_filename(&filename),
        title: meta.title,
        author: meta.author,
        thumbnail: meta.thumbnail,
        variants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(variants: &[MediaVariant]) -> Vec<VariantKind> {
        variants.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_three_slots_from_full_set() {
        let streams = StreamSet {
            hd: Some(Stream::sized("https://cdn/a.mp4", Some(10))),
            sd: Some(Stream::sized("https://cdn/b.mp4", Some(5))),
            audio: Some(Stream::new("https://cdn/c.mp3")),
            watermarked: None,
        };

        let variants = streams.into_variants();
        assert_eq!(
            kinds(&variants),
            vec![VariantKind::VideoHd, VariantKind::VideoSd, VariantKind::Audio]
        );
        assert_eq!(variants[0].size_bytes, Some(10));
        assert_eq!(variants[2].url, "https://cdn/c.mp3");
    }

    #[test]
    fn test_single_url_fills_every_slot() {
        let variants =
            StreamSet::from_video(Some("https://cdn/only.mp4".into()), None).into_variants();

        assert_eq!(variants.len(), 3);
        assert!(variants.iter().all(|v| v.url == "https://cdn/only.mp4"));
        assert_eq!(variants[1].kind, VariantKind::VideoSd);
    }

    #[test]
    fn test_watermarked_is_appended() {
        let streams = StreamSet {
            sd: Some(Stream::new("https://cdn/b.mp4")),
            watermarked: Some(Stream::new("https://cdn/wm.mp4")),
            ..Default::default()
        };
        let variants = streams.into_variants();
        assert_eq!(variants.len(), 4);
        assert_eq!(variants[0].url, "https://cdn/b.mp4");
        assert_eq!(variants[3].kind, VariantKind::VideoWatermarked);
    }

    #[test]
    fn test_relative_urls_are_dropped() {
        let variants = StreamSet::from_video(Some("/relative.mp4".into()), None).into_variants();
        assert!(variants.is_empty());
    }

    #[test]
    fn test_build_media_primary_selection() {
        let streams = StreamSet {
            hd: Some(Stream::new("https://cdn/a.mp4")),
            audio: Some(Stream::new("https://cdn/c.mp3")),
            ..Default::default()
        };
        let meta = MediaMeta::new("tiktok_1.mp4", "Clip");

        let auto = build_media(streams.clone(), meta.clone(), DownloadMode::Auto).unwrap();
        assert_eq!(auto.primary_url, "https://cdn/a.mp4");
        assert_eq!(auto.filename, "tiktok_1.mp4");

        let audio = build_media(streams, meta, DownloadMode::Audio).unwrap();
        assert_eq!(audio.primary_url, "https://cdn/c.mp3");
        assert_eq!(audio.filename, "tiktok_1.mp3");
        assert_eq!(audio.variants[0].kind, VariantKind::VideoHd);
    }

    #[test]
    fn test_build_media_audio_mode_without_dedicated_audio() {
        let streams = StreamSet::from_video(Some("https://cdn/a.mp4".into()), None);
        let media =
            build_media(streams, MediaMeta::new("v.mp4", "Clip"), DownloadMode::Audio).unwrap();
        assert_eq!(media.primary_url, "https://cdn/a.mp4");
        assert_eq!(media.filename, "v.mp4");
    }

    #[test]
    fn test_build_media_empty_is_no_media() {
        let err = build_media(
            StreamSet::default(),
            MediaMeta::new("v.mp4", "Clip"),
            DownloadMode::Auto,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoMedia(_)));
    }
}
