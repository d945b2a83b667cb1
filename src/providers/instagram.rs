//! Instagram providers: the SnapSave/embed/GraphQL chain and Medsoss.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::api::client::encode_form;
use crate::api::{HttpClient, HttpRequest, InstagramGraphQlResponse, MedsossResponse};
use crate::error::{Error, Result};
use crate::media::naming::sanitize_filename;
use crate::media::variants::{LABEL_AUDIO, LABEL_SD};
use crate::media::{DownloadRequest, MediaResult, MediaVariant, Platform, Resolved, VariantKind};
use crate::providers::{parse_json, require_ok, scraped_media, Provider};
use crate::resolve::Diagnostics;
use crate::snapsave;
use crate::snapsave::extractor::decode_entities;

pub const INSTAGRAM: &str = "instagram";
pub const MEDSOSS: &str = "medsoss";

const GRAPHQL_QUERY_HASH: &str = "b3055c01b4b222b8a47dc12b090e4e64";
const MEDSOSS_API: &str = "https://medsoss-downloader.vercel.app/api/index";
const MEDSOSS_ORIGIN: &str = "https://medsoss-downloader.vercel.app";

const TITLE: &str = "Instagram Video";

/// Post shortcode from a `/p/`, `/reel/`, `/reels/` or `/tv/` link.
pub fn shortcode(url: &str) -> Option<String> {
    let re = Regex::new(r"/(?:p|reels?|tv)/([A-Za-z0-9_-]+)").unwrap();
    re.captures(url).map(|caps| caps[1].to_string())
}

/// Video URL from an embed page, by the markers the page has used over time.
fn find_embed_video(html: &str) -> Option<String> {
    let json_string = Regex::new(r#""video_url"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap();
    if let Some(caps) = json_string.captures(html) {
        if let Ok(url) = serde_json::from_str::<String>(&format!("\"{}\"", &caps[1])) {
            return Some(url);
        }
    }

    [
        r#"data-video-url="([^"]+)""#,
        r#"(?i)property="og:video"\s+content="([^"]+)""#,
        r#"(?i)<video[^>]*>\s*<source\s+src="([^"]+)""#,
    ]
    .iter()
    .find_map(|pattern| {
        let re = Regex::new(pattern).unwrap();
        re.captures(html).map(|caps| decode_entities(&caps[1]))
    })
}

/// Instagram reels and posts, trying SnapSave, the embed page, then GraphQL.
pub struct InstagramProvider {
    http: Arc<dyn HttpClient>,
}

impl InstagramProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    async fn embed_scrape(&self, shortcode: &str) -> Result<Option<String>> {
        let url = format!("https://www.instagram.com/p/{}/embed/", shortcode);
        let request = HttpRequest::get(url)
            .header("Accept", "text/html")
            .header("Accept-Language", "en-US,en;q=0.9");

        let response = self.http.call(request).await?;
        require_ok("Instagram embed", &response)?;

        Ok(find_embed_video(&response.body))
    }

    async fn graphql(
        &self,
        shortcode: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<String>> {
        let variables = json!({ "shortcode": shortcode }).to_string();
        let url = format!(
            "https://www.instagram.com/graphql/query/?query_hash={}&{}",
            GRAPHQL_QUERY_HASH,
            encode_form(&[("variables", variables.as_str())])
        );
        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");

        let response = self.http.call(request).await?;
        require_ok("Instagram GraphQL", &response)?;

        let data: InstagramGraphQlResponse = parse_json("Instagram GraphQL", &response, diagnostics)?;
        Ok(data
            .data
            .and_then(|d| d.shortcode_media)
            .and_then(|m| m.video_url))
    }
}

#[async_trait]
impl Provider for InstagramProvider {
    fn name(&self) -> &'static str {
        INSTAGRAM
    }

    fn supports(&self, platform: Platform) -> bool {
        platform == Platform::Instagram
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        match snapsave::fetch_media_urls(self.http.as_ref(), request.source_url(), diagnostics).await {
            Ok(urls) => {
                tracing::info!("Instagram resolved through SnapSave");
                return scraped_media(&urls, TITLE, request.mode());
            }
            Err(e) => {
                tracing::warn!("Instagram SnapSave strategy failed: {}", e);
                diagnostics.record(INSTAGRAM, format!("SnapSave: {}", e));
            }
        }

        let Some(code) = shortcode(request.source_url()) else {
            return Err(Error::NoMedia(
                "SnapSave failed and the link has no post shortcode".into(),
            ));
        };

        match self.embed_scrape(&code).await {
            Ok(Some(url)) => match scraped_media(&[url], TITLE, request.mode()) {
                Ok(resolved) => {
                    tracing::info!("Instagram resolved through the embed page");
                    return Ok(resolved);
                }
                Err(e) => diagnostics.record(INSTAGRAM, format!("embed: {}", e)),
            },
            Ok(None) => diagnostics.record(INSTAGRAM, "embed: no video found"),
            Err(e) => {
                tracing::warn!("Instagram embed strategy failed: {}", e);
                diagnostics.record(INSTAGRAM, format!("embed: {}", e));
            }
        }

        match self.graphql(&code, diagnostics).await {
            Ok(Some(url)) => {
                tracing::info!("Instagram resolved through GraphQL");
                scraped_media(&[url], TITLE, request.mode())
            }
            Ok(None) => Err(Error::NoMedia("no Instagram strategy found a video".into())),
            Err(e) => {
                diagnostics.record(INSTAGRAM, format!("GraphQL: {}", e));
                Err(Error::NoMedia("no Instagram strategy found a video".into()))
            }
        }
    }
}

/// Medsoss downloader API (Instagram and Facebook).
pub struct MedsossProvider {
    http: Arc<dyn HttpClient>,
}

impl MedsossProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Provider for MedsossProvider {
    fn name(&self) -> &'static str {
        MEDSOSS
    }

    fn supports(&self, platform: Platform) -> bool {
        matches!(platform, Platform::Instagram | Platform::Facebook)
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let call = HttpRequest::post(MEDSOSS_API)
            .json(&json!({ "url": request.source_url() }))
            .header("Accept", "*/*")
            .header("Origin", MEDSOSS_ORIGIN)
            .header("Referer", format!("{}/", MEDSOSS_ORIGIN));

        let response = self.http.call(call).await?;
        require_ok("Medsoss", &response)?;

        let data: MedsossResponse = parse_json("Medsoss", &response, diagnostics)?;
        if !data.succeeded() {
            return Err(Error::Upstream("Medsoss reported failure".into()));
        }

        let mut variants: Vec<MediaVariant> = data
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let url = item.url?;
                let media_type = item.media_type.unwrap_or_else(|| "video".to_string());
                let quality = item.quality.or(item.label).unwrap_or_else(|| "HD".to_string());
                let kind = if media_type.eq_ignore_ascii_case("audio") {
                    VariantKind::Audio
                } else {
                    VariantKind::VideoHd
                };

                let label = format!("{} {}", quality, media_type).to_uppercase();
                MediaVariant::new(kind, label, &url).map(|v| v.with_size(item.size))
            })
            .collect();

        if variants.is_empty() {
            return Err(Error::NoMedia("Medsoss returned no usable links".into()));
        }

        let first_video = variants
            .iter()
            .find(|v| v.kind != VariantKind::Audio)
            .map(|v| v.url.clone());
        let first_audio = variants
            .iter()
            .find(|v| v.kind == VariantKind::Audio)
            .map(|v| v.url.clone());

        // Keep the SD and audio slots populated
        if let Some(video) = &first_video {
            if !variants.iter().any(|v| v.kind == VariantKind::VideoSd) {
                variants.extend(MediaVariant::new(VariantKind::VideoSd, LABEL_SD, video));
            }
            if first_audio.is_none() {
                variants.extend(MediaVariant::new(VariantKind::Audio, LABEL_AUDIO, video));
            }
        }

        let audio_first = first_audio.clone().filter(|_| request.mode().is_audio());
        let Some((primary_url, extension)) = audio_first
            .map(|url| (url, "mp3"))
            .or_else(|| first_video.map(|url| (url, "mp4")))
            .or_else(|| first_audio.map(|url| (url, "mp3")))
        else {
            return Err(Error::NoMedia("Medsoss returned no usable links".into()));
        };

        let title = match platform {
            Platform::Facebook => "Facebook Video",
            _ => TITLE,
        };
        let filename = format!(
            "{}_video_{}.{}",
            platform.as_str(),
            chrono::Utc::now().timestamp(),
            extension
        );

        Ok(Resolved::Media(MediaResult {
            primary_url,
            filename: sanitize_filename(&filename),
            title: title.to_string(),
            author: None,
            thumbnail: None,
            variants,
        }))
    }
}
