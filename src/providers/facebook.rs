//! Facebook provider: SnapSave, then the mbasic page, then the desktop page.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::api::{HttpClient, HttpRequest};
use crate::error::{Error, Result};
use crate::media::{build_media, DownloadRequest, MediaMeta, Platform, Resolved, StreamSet};
use crate::providers::{require_ok, scraped_media, Provider};
use crate::resolve::Diagnostics;
use crate::snapsave;
use crate::snapsave::extractor::decode_entities;

pub const FACEBOOK: &str = "facebook";

const TITLE: &str = "Facebook Video";

/// mbasic serves simpler markup to mobile browsers.
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";

/// Rewrite a facebook.com link onto mbasic. `fb.watch` links are left to redirect.
pub fn mbasic_url(url: &str) -> String {
    if url.contains("fb.watch") {
        return url.to_string();
    }

    let re = Regex::new(r"^https?://(?:www\.|m\.|web\.)?facebook\.com").unwrap();
    re.replace(url, "https://mbasic.facebook.com").into_owned()
}

/// Undo JSON string escaping (`\/`, `%`, stray backslashes).
fn unescape_json_url(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw))
        .unwrap_or_else(|_| raw.replace("\\/", "/").replace('\\', ""))
}

fn first_capture(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).unwrap();
    re.captures(html).map(|caps| caps[1].to_string())
}

/// SD stream from an mbasic page. Later markers are more reliable and win.
fn scan_mbasic(html: &str) -> StreamSet {
    let td_video = first_capture(html, r#"td_video_url":"([^"]+)""#).map(|u| unescape_json_url(&u));
    let video_src = first_capture(html, r#"(?i)<video[^>]*src="([^"]+)""#).map(|u| decode_entities(&u));
    let mp4_href =
        first_capture(html, r#"(?i)href="([^"]*video[^"]*\.mp4[^"]*)""#).map(|u| decode_entities(&u));

    StreamSet::from_video(None, td_video.or(video_src).or(mp4_href))
}

/// HD and SD streams from the desktop page's embedded JSON.
fn scan_desktop(html: &str) -> StreamSet {
    let json_field = |field: &str| {
        first_capture(html, &format!(r#"(?i)"{}"\s*:\s*"([^"]+)""#, field)).map(|u| unescape_json_url(&u))
    };

    let hd = json_field("hd_src")
        .or_else(|| json_field("browser_native_hd_url"))
        .or_else(|| json_field("playable_url_quality_hd"));
    let mut sd = json_field("sd_src")
        .or_else(|| json_field("browser_native_sd_url"))
        .or_else(|| json_field("playable_url"));

    if hd.is_none() && sd.is_none() {
        sd = first_capture(html, r#"(?i)property="og:video"\s+content="([^"]+)""#)
            .map(|u| decode_entities(&u));
    }

    StreamSet::from_video(hd, sd)
}

/// Facebook videos and reels.
pub struct FacebookProvider {
    http: Arc<dyn HttpClient>,
}

impl FacebookProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    async fn scrape(
        &self,
        upstream: &'static str,
        url: String,
        user_agent: Option<&str>,
    ) -> Result<String> {
        let mut request = HttpRequest::get(url)
            .header("Accept", "text/html")
            .header("Accept-Language", "en-US,en;q=0.9");
        if let Some(agent) = user_agent {
            request = request.header("User-Agent", agent);
        }

        let response = self.http.call(request).await?;
        require_ok(upstream, &response)?;
        Ok(response.body)
    }
}

#[async_trait]
impl Provider for FacebookProvider {
    fn name(&self) -> &'static str {
        FACEBOOK
    }

    fn supports(&self, platform: Platform) -> bool {
        platform == Platform::Facebook
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let source = request.source_url();

        match snapsave::fetch_media_urls(self.http.as_ref(), source, diagnostics).await {
            Ok(urls) => {
                tracing::info!("Facebook resolved through SnapSave");
                return scraped_media(&urls, TITLE, request.mode());
            }
            Err(e) => {
                tracing::warn!("Facebook SnapSave strategy failed: {}", e);
                diagnostics.record(FACEBOOK, format!("SnapSave: {}", e));
            }
        }

        let strategies: [(&'static str, String, Option<&str>, fn(&str) -> StreamSet); 2] = [
            ("Facebook mbasic", mbasic_url(source), Some(MOBILE_USER_AGENT), scan_mbasic),
            ("Facebook page", source.to_string(), None, scan_desktop),
        ];

        for (upstream, url, user_agent, scan) in strategies {
            let streams = match self.scrape(upstream, url, user_agent).await {
                Ok(html) => scan(&html),
                Err(e) => {
                    tracing::warn!("{} strategy failed: {}", upstream, e);
                    diagnostics.record(FACEBOOK, format!("{}: {}", upstream, e));
                    continue;
                }
            };

            if streams.is_empty() {
                diagnostics.record(FACEBOOK, format!("{}: no video found", upstream));
                continue;
            }

            // Relative links are dropped here, which can leave nothing usable
            match build_media(
                streams,
                MediaMeta::new("video_download.mp4", TITLE),
                request.mode(),
            ) {
                Ok(media) => {
                    tracing::info!("Facebook resolved through {}", upstream);
                    return Ok(Resolved::Media(media));
                }
                Err(e) => {
                    tracing::warn!("{} strategy found no usable link: {}", upstream, e);
                    diagnostics.record(FACEBOOK, format!("{}: {}", upstream, e));
                }
            }
        }

        Err(Error::NoMedia("no Facebook strategy found a video".into()))
    }
}
