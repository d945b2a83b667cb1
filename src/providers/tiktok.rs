//! TikTok JSON providers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::client::encode_form;
use crate::api::{
    DouyinResponse, HttpClient, HttpRequest, LoveTikLinks, LoveTikResponse, TikFailResponse,
    TikWmResponse,
};
use crate::error::{Error, Result};
use crate::media::item::absolutize;
use crate::media::{build_media, DownloadRequest, MediaMeta, Platform, Resolved, Stream, StreamSet};
use crate::providers::{parse_json, Provider};
use crate::resolve::Diagnostics;

pub const TIKWM: &str = "tikwm";
pub const TIKFAIL: &str = "tikfail";
pub const DOUYIN: &str = "douyin";
pub const LOVETIK: &str = "lovetik";

const TIKWM_API: &str = "https://www.tikwm.com/api/";
const TIKWM_BASE: &str = "https://www.tikwm.com";
const TIKFAIL_API: &str = "https://api.tik.fail/api/grab";
const DOUYIN_API: &str = "https://api.douyin.wtf/api";
const LOVETIK_API: &str = "https://lovetik.com/api/ajax/search";
const LOVETIK_ORIGIN: &str = "https://lovetik.com";

const DEFAULT_TITLE: &str = "TikTok Video";
const DEFAULT_AUTHOR: &str = "TikTok User";

fn tiktok_filename(id: Option<&str>) -> String {
    format!("tiktok_{}.mp4", id.unwrap_or("video"))
}

// ---------------------------------------------------------------------------
// TikWM
// ---------------------------------------------------------------------------

/// TikWM: the richest TikTok upstream (HD, SD, watermarked, and audio).
pub struct TikWmProvider {
    http: Arc<dyn HttpClient>,
}

impl TikWmProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// One call, noting why it produced nothing usable.
    async fn attempt(
        &self,
        request: HttpRequest,
        diagnostics: &mut Diagnostics,
    ) -> Option<TikWmResponse> {
        match self.http.call(request).await {
            Ok(response) => parse_json("TikWM", &response, diagnostics).ok(),
            Err(e) => {
                diagnostics.record(TIKWM, e.to_string());
                None
            }
        }
    }
}

#[async_trait]
impl Provider for TikWmProvider {
    fn name(&self) -> &'static str {
        TIKWM
    }

    fn supports(&self, platform: Platform) -> bool {
        platform == Platform::TikTok
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let fields = [("url", request.source_url()), ("hd", "1")];

        let post = HttpRequest::post(TIKWM_API)
            .form(&fields)
            .header("Accept", "application/json");
        let mut response = self.attempt(post, diagnostics).await;

        // POST sometimes fails where GET works
        if !response.as_ref().is_some_and(|r| r.code == Some(0)) {
            let msg = response
                .as_ref()
                .and_then(|r| r.msg.clone())
                .unwrap_or_else(|| "no data".to_string());
            diagnostics.record(TIKWM, format!("POST failed: {}. Trying GET", msg));

            let get = HttpRequest::get(format!("{}?{}", TIKWM_API, encode_form(&fields)))
                .header("Accept", "application/json");
            if let Some(retry) = self.attempt(get, diagnostics).await {
                response = Some(retry);
            }
        }

        let response = response.ok_or_else(|| Error::Upstream("TikWM no response".into()))?;
        if response.code != Some(0) {
            return Err(Error::Upstream(format!(
                "TikWM error: {}",
                response.msg.as_deref().unwrap_or("Unknown")
            )));
        }

        let not_found = || Error::Upstream("Video URL not found in TikWM".into());
        let video = response.data.ok_or_else(not_found)?;

        let join = |url: Option<String>| url.and_then(|u| absolutize(TIKWM_BASE, &u));
        let streams = StreamSet {
            hd: join(video.hdplay).map(|u| Stream::sized(u, video.hd_size.or(video.size))),
            sd: join(video.play).map(|u| Stream::sized(u, video.size.or(video.hd_size))),
            audio: join(video.music)
                .map(|u| Stream::sized(u, video.music_info.as_ref().and_then(|m| m.size))),
            watermarked: join(video.wmplay).map(|u| Stream::sized(u, video.wm_size)),
        };

        let meta = MediaMeta::new(
            tiktok_filename(video.id.as_deref()),
            video.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        )
        .author(Some(
            video
                .author
                .and_then(|a| a.nickname)
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        ))
        .thumbnail(join(video.cover.or(video.origin_cover)));

        let media = build_media(streams, meta, request.mode()).map_err(|_| not_found())?;
        tracing::info!("TikWM resolved {} variants", media.variants.len());

        Ok(Resolved::Media(media))
    }
}

// ---------------------------------------------------------------------------
// tik.fail
// ---------------------------------------------------------------------------

/// tik.fail grabber: a single watermark-free URL.
pub struct TikFailProvider {
    http: Arc<dyn HttpClient>,
}

impl TikFailProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Provider for TikFailProvider {
    fn name(&self) -> &'static str {
        TIKFAIL
    }

    fn supports(&self, platform: Platform) -> bool {
        platform == Platform::TikTok
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let call = HttpRequest::post(TIKFAIL_API)
            .form(&[("url", request.source_url())])
            .header("Accept", "application/json");

        let response = self.http.call(call).await?;
        let data: TikFailResponse = parse_json("tik.fail", &response, diagnostics)?;

        if data.status.as_deref() != Some("success") {
            return Err(Error::Upstream(format!(
                "tik.fail error: {}",
                data.status.as_deref().unwrap_or("Unknown")
            )));
        }

        let url = data
            .video
            .or(data.nwm_video_url)
            .ok_or_else(|| Error::Upstream("Video URL not found in tik.fail".into()))?;

        let meta = MediaMeta::new(
            tiktok_filename(None),
            data.desc.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        );
        build_media(StreamSet::from_video(Some(url), None), meta, request.mode()).map(Resolved::Media)
    }
}

// ---------------------------------------------------------------------------
// Douyin
// ---------------------------------------------------------------------------

/// douyin.wtf public API.
pub struct DouyinProvider {
    http: Arc<dyn HttpClient>,
}

impl DouyinProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Provider for DouyinProvider {
    fn name(&self) -> &'static str {
        DOUYIN
    }

    fn supports(&self, platform: Platform) -> bool {
        platform == Platform::TikTok
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let url = format!(
            "{}?{}",
            DOUYIN_API,
            encode_form(&[("url", request.source_url())])
        );

        let response = self.http.call(HttpRequest::get(url)).await?;
        let data: DouyinResponse = parse_json("Douyin", &response, diagnostics)?;

        if data.status.as_deref() == Some("failed") {
            return Err(Error::Upstream("Douyin reported failure".into()));
        }

        let video_url = data
            .video_data
            .and_then(|v| v.nwm_video_url)
            .ok_or_else(|| Error::Upstream("Video URL not found in Douyin".into()))?;

        let meta = MediaMeta::new(
            tiktok_filename(data.aweme_id.as_deref()),
            data.desc.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        );
        build_media(
            StreamSet::from_video(Some(video_url), None),
            meta,
            request.mode(),
        )
        .map(Resolved::Media)
    }
}

// ---------------------------------------------------------------------------
// LoveTik
// ---------------------------------------------------------------------------

/// LoveTik search endpoint, the last TikTok-specific fallback.
pub struct LoveTikProvider {
    http: Arc<dyn HttpClient>,
}

impl LoveTikProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Provider for LoveTikProvider {
    fn name(&self) -> &'static str {
        LOVETIK
    }

    fn supports(&self, platform: Platform) -> bool {
        platform == Platform::TikTok
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let call = HttpRequest::post(LOVETIK_API)
            .form(&[("query", request.source_url())])
            .header("Accept", "*/*")
            .header("Origin", LOVETIK_ORIGIN)
            .header("Referer", format!("{}/", LOVETIK_ORIGIN));

        let response = self.http.call(call).await?;
        let data: LoveTikResponse = parse_json("LoveTik", &response, diagnostics)?;

        if data.status.as_deref() != Some("ok") {
            return Err(Error::Upstream(format!(
                "LoveTik error: {}",
                data.mess
                    .as_deref()
                    .or(data.status.as_deref())
                    .unwrap_or("Unknown")
            )));
        }
        if let Some(message) = &data.mess {
            diagnostics.record(LOVETIK, format!("message: {}", message));
        }

        let streams = match data.links {
            Some(LoveTikLinks::Keyed { no_watermark, mp3 }) => StreamSet {
                sd: no_watermark.map(Stream::new),
                audio: mp3.map(Stream::new),
                ..Default::default()
            },
            Some(LoveTikLinks::List(links)) => StreamSet::from_video(
                None,
                links.into_iter().next().and_then(|link| link.a),
            ),
            None => StreamSet::default(),
        };

        if streams.is_empty() {
            return Err(Error::Upstream("Video URL not found in LoveTik".into()));
        }

        let meta = MediaMeta::new(
            tiktok_filename(data.vid.as_deref()),
            data.desc.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        );
        build_media(streams, meta, request.mode()).map(Resolved::Media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubHttp;
    use crate::api::Method;
    use crate::config::DownloadMode;
    use crate::media::VariantKind;

    fn request(mode: DownloadMode) -> DownloadRequest {
        DownloadRequest::new("https://www.tiktok.com/@user/video/123", mode, "720").unwrap()
    }

    fn media(resolved: Resolved) -> crate::media::MediaResult {
        match resolved {
            Resolved::Media(media) => media,
            other => panic!("expected media, got {:?}", other),
        }
    }

    const TIKWM_OK: &str = r#"{"code":0,"msg":"success","data":{
        "id":"123","title":"dance","hdplay":"https://cdn/a.mp4","play":"https://cdn/b.mp4",
        "music":"https://cdn/c.mp3","hd_size":900,"size":500,"cover":"/cover/123.jpg",
        "author":{"nickname":"someone"}}}"#;

    #[tokio::test]
    async fn test_tikwm_three_variants() {
        let http = Arc::new(StubHttp::new().respond_to(Method::Post, "tikwm.com/api", 200, TIKWM_OK));
        let provider = TikWmProvider::new(http.clone());
        let mut diagnostics = Diagnostics::new();

        let media = media(
            provider
                .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
                .await
                .unwrap(),
        );

        let kinds: Vec<_> = media.variants.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![VariantKind::VideoHd, VariantKind::VideoSd, VariantKind::Audio]
        );
        assert_eq!(media.primary_url, "https://cdn/a.mp4");
        assert_eq!(media.variants[0].size_bytes, Some(900));
        assert_eq!(media.variants[1].url, "https://cdn/b.mp4");
        assert_eq!(media.variants[2].url, "https://cdn/c.mp3");
        assert_eq!(media.filename, "tiktok_123.mp4");
        assert_eq!(media.author.as_deref(), Some("someone"));
        assert_eq!(media.thumbnail.as_deref(), Some("https://www.tikwm.com/cover/123.jpg"));
        assert_eq!(http.count("tikwm.com"), 1);
    }

    #[tokio::test]
    async fn test_tikwm_retries_with_get() {
        let http = Arc::new(
            StubHttp::new()
                .respond_to(Method::Post, "tikwm.com/api", 200, r#"{"code":-1,"msg":"Url parsing is failed!"}"#)
                .respond_to(Method::Get, "tikwm.com/api", 200, TIKWM_OK),
        );
        let provider = TikWmProvider::new(http.clone());
        let mut diagnostics = Diagnostics::new();

        let resolved = provider
            .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
            .await
            .unwrap();

        assert_eq!(media(resolved).primary_url, "https://cdn/a.mp4");
        let calls = http.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].method, Method::Get);
        assert!(calls[1].url.contains("hd=1"));
    }

    #[tokio::test]
    async fn test_tikwm_error_message() {
        let http = Arc::new(StubHttp::new().respond("tikwm.com/api", 200, r#"{"code":-1,"msg":"Url parsing is failed!"}"#));
        let provider = TikWmProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "TikWM error: Url parsing is failed!");
    }

    #[tokio::test]
    async fn test_tikwm_no_response() {
        let http = Arc::new(StubHttp::new().fail("tikwm.com", "connection reset"));
        let provider = TikWmProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "TikWM no response");
        assert!(diagnostics.len() >= 2);
    }

    #[tokio::test]
    async fn test_tikwm_audio_mode_uses_music() {
        let http = Arc::new(StubHttp::new().respond("tikwm.com/api", 200, TIKWM_OK));
        let provider = TikWmProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let media = media(
            provider
                .fetch(&request(DownloadMode::Audio), Platform::TikTok, &mut diagnostics)
                .await
                .unwrap(),
        );

        assert_eq!(media.primary_url, "https://cdn/c.mp3");
        assert_eq!(media.filename, "tiktok_123.mp3");
    }

    #[tokio::test]
    async fn test_tikfail_success() {
        let http = Arc::new(StubHttp::new().respond(
            "tik.fail",
            200,
            r#"{"status":"success","nwm_video_url":"https://cdn/nwm.mp4","desc":"clip"}"#,
        ));
        let provider = TikFailProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let media = media(
            provider
                .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
                .await
                .unwrap(),
        );

        assert_eq!(media.primary_url, "https://cdn/nwm.mp4");
        assert_eq!(media.variants.len(), 3);
        assert_eq!(media.title, "clip");
    }

    #[tokio::test]
    async fn test_douyin_failed_status() {
        let http = Arc::new(StubHttp::new().respond("douyin.wtf", 200, r#"{"status":"failed"}"#));
        let provider = DouyinProvider::new(http.clone());
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Douyin reported failure");
        assert!(http.calls()[0].url.starts_with("https://api.douyin.wtf/api?url=https%3A%2F%2F"));
    }

    #[tokio::test]
    async fn test_douyin_success() {
        let http = Arc::new(StubHttp::new().respond(
            "douyin.wtf",
            200,
            r#"{"status":"success","aweme_id":"777","video_data":{"nwm_video_url":"https://cdn/d.mp4"}}"#,
        ));
        let provider = DouyinProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let media = media(
            provider
                .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
                .await
                .unwrap(),
        );

        assert_eq!(media.filename, "tiktok_777.mp4");
        assert_eq!(media.title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_lovetik_keyed_links_in_audio_mode() {
        let http = Arc::new(StubHttp::new().respond(
            "lovetik.com",
            200,
            r#"{"status":"ok","vid":"42","desc":"song","links":{"no_watermark":"https://cdn/v.mp4","mp3":"https://cdn/a.mp3"}}"#,
        ));
        let provider = LoveTikProvider::new(http.clone());
        let mut diagnostics = Diagnostics::new();

        let media = media(
            provider
                .fetch(&request(DownloadMode::Audio), Platform::TikTok, &mut diagnostics)
                .await
                .unwrap(),
        );

        assert_eq!(media.primary_url, "https://cdn/a.mp3");
        assert_eq!(media.filename, "tiktok_42.mp3");
        assert_eq!(media.variants[0].url, "https://cdn/v.mp4");
        assert_eq!(http.calls()[0].header_value("Origin"), Some(LOVETIK_ORIGIN));
    }

    #[tokio::test]
    async fn test_lovetik_list_links() {
        let http = Arc::new(StubHttp::new().respond(
            "lovetik.com",
            200,
            r#"{"status":"ok","links":[{"a":"https://cdn/first.mp4"},{"a":"https://cdn/second.mp4"}]}"#,
        ));
        let provider = LoveTikProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let media = media(
            provider
                .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
                .await
                .unwrap(),
        );

        assert_eq!(media.primary_url, "https://cdn/first.mp4");
        assert_eq!(media.filename, "tiktok_video.mp4");
    }

    #[tokio::test]
    async fn test_lovetik_rejects_bad_status() {
        let http = Arc::new(StubHttp::new().respond(
            "lovetik.com",
            200,
            r#"{"status":"error","mess":"Invalid link"}"#,
        ));
        let provider = LoveTikProvider::new(http);
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Auto), Platform::TikTok, &mut diagnostics)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "LoveTik error: Invalid link");
    }

    #[test]
    fn test_tiktok_providers_only_support_tiktok() {
        let http: Arc<dyn HttpClient> = Arc::new(StubHttp::new());
        let providers: Vec<Box<dyn Provider>> = vec![
            Box::new(TikWmProvider::new(http.clone())),
            Box::new(TikFailProvider::new(http.clone())),
            Box::new(DouyinProvider::new(http.clone())),
            Box::new(LoveTikProvider::new(http)),
        ];

        for provider in providers {
            assert!(provider.supports(Platform::TikTok));
            assert!(!provider.supports(Platform::Instagram));
            assert!(!provider.supports(Platform::YouTube));
        }
    }
}
