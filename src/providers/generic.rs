//! Generic providers that accept links from every known platform.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::api::client::encode_form;
use crate::api::{CobaltPickerItem, CobaltResponse, HttpClient, HttpRequest, HttpResponse, OceanSaverResponse};
use crate::error::{Error, Result};
use crate::media::item::is_absolute_http;
use crate::media::{
    build_media, DownloadRequest, MediaMeta, PickerItem, PickerKind, Platform, Resolved, Stream,
    StreamSet,
};
use crate::providers::{parse_json, Provider};
use crate::resolve::Diagnostics;

pub const OCEANSAVER: &str = "oceansaver";
pub const COBALT: &str = "cobalt";

const OCEANSAVER_API: &str = "https://p.oceansaver.in/ajax/download.php";
const OCEANSAVER_ORIGIN: &str = "https://ssyoutube.com";

// ---------------------------------------------------------------------------
// OceanSaver
// ---------------------------------------------------------------------------

/// OceanSaver download endpoint.
pub struct OceanSaverProvider {
    http: Arc<dyn HttpClient>,
    api_key: String,
}

impl OceanSaverProvider {
    pub fn new(http: Arc<dyn HttpClient>, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Provider for OceanSaverProvider {
    fn name(&self) -> &'static str {
        OCEANSAVER
    }

    fn supports(&self, platform: Platform) -> bool {
        platform.is_known()
    }

    fn is_generic(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let audio = request.mode().is_audio();
        let extension = if audio { "mp3" } else { "mp4" };

        let query = encode_form(&[
            ("copyright", "0"),
            ("format", extension),
            ("url", request.source_url()),
            ("api", self.api_key.as_str()),
        ]);
        let call = HttpRequest::get(format!("{}?{}", OCEANSAVER_API, query))
            .header("Accept", "application/json")
            .header("Origin", OCEANSAVER_ORIGIN)
            .header("Referer", format!("{}/", OCEANSAVER_ORIGIN));

        let response = self.http.call(call).await?;
        let data: OceanSaverResponse = parse_json("OceanSaver", &response, diagnostics)?;

        if !data.succeeded() {
            return Err(Error::Upstream(format!(
                "OceanSaver error: {}",
                data.text.as_deref().unwrap_or("Unknown")
            )));
        }

        let url = data
            .url
            .or(data.download_url)
            .ok_or_else(|| Error::Upstream("Download URL not found in OceanSaver".into()))?;

        let title = data
            .meta
            .and_then(|m| m.title)
            .unwrap_or_else(|| "Video".to_string());

        let streams = if audio {
            StreamSet {
                audio: Some(Stream::new(url)),
                ..Default::default()
            }
        } else {
            StreamSet::from_video(Some(url), None)
        };

        let meta = MediaMeta::new(format!("{}.{}", title, extension), title);
        build_media(streams, meta, request.mode()).map(Resolved::Media)
    }
}

// ---------------------------------------------------------------------------
// Cobalt
// ---------------------------------------------------------------------------

/// Human-readable text for a Cobalt error code. Unknown codes pass through.
pub fn translate_cobalt_error(code: &str) -> String {
    let message = match code {
        "error.api.link.invalid" => "The link is invalid or not supported.",
        "error.api.link.unsupported" => "This platform is not supported yet.",
        "error.api.fetch.fail" => "Could not fetch the post. It may be private or deleted.",
        "error.api.fetch.rate" => "Too many requests. Wait a moment and try again.",
        "error.api.content.video.unavailable" => "The video is unavailable or was removed.",
        "error.api.content.video.live" => "Live streams cannot be downloaded.",
        "error.api.content.post.age" => "The post is too old to be downloaded.",
        "error.api.unreachable" => "Every API server is unavailable. Try again later.",
        "error.api.rate_exceeded" => "Rate limit reached. Wait a few minutes.",
        "error.api.authentication" => "The API server requires authentication.",
        other => return other.to_string(),
    };

    message.to_string()
}

/// What to do after asking one instance.
enum InstanceOutcome {
    /// Final answer for this provider (success or a definitive upstream error).
    Done(Result<Resolved>),
    /// This instance is unusable; try the next one.
    Next,
}

/// Cobalt API across a list of community instances.
pub struct CobaltProvider {
    http: Arc<dyn HttpClient>,
    instances: Vec<String>,
    user_agent: String,
}

impl CobaltProvider {
    pub fn new(http: Arc<dyn HttpClient>, instances: Vec<String>, user_agent: String) -> Self {
        Self {
            http,
            instances,
            user_agent,
        }
    }

    fn post(&self, url: String, body: &serde_json::Value) -> HttpRequest {
        HttpRequest::post(url)
            .json(body)
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str())
    }

    /// Root path first, then the legacy `/api/json` path when the root is missing.
    async fn call_instance(&self, base: &str, body: &serde_json::Value) -> Result<HttpResponse> {
        let response = self.http.call(self.post(format!("{}/", base), body)).await?;
        if response.status != 404 {
            return Ok(response);
        }

        tracing::debug!("Cobalt {} has no root endpoint, trying /api/json", base);
        self.http.call(self.post(format!("{}/api/json", base), body)).await
    }

    async fn ask_instance(
        &self,
        base: &str,
        body: &serde_json::Value,
        request: &DownloadRequest,
        diagnostics: &mut Diagnostics,
    ) -> InstanceOutcome {
        let response = match self.call_instance(base, body).await {
            Ok(response) => response,
            Err(e) => {
                diagnostics.record(COBALT, format!("{}: {}", base, e));
                return InstanceOutcome::Next;
            }
        };

        let overloaded = response.status == 429 || response.status >= 500;

        let data: CobaltResponse = match response.json() {
            Ok(data) => data,
            Err(_) => {
                diagnostics.record(
                    COBALT,
                    format!("{}: invalid JSON (HTTP {})", base, response.status),
                );
                return InstanceOutcome::Next;
            }
        };

        match data.status.as_deref() {
            Some("error") | Some("rate-limit") => {
                let code = data
                    .error
                    .and_then(|e| e.code)
                    .or(data.text)
                    .unwrap_or_else(|| "unknown error".to_string());

                if code.contains("auth") || code.contains("jwt") {
                    diagnostics.record(
                        COBALT,
                        format!("{}: authentication required ({})", base, code),
                    );
                    return InstanceOutcome::Next;
                }
                if overloaded || data.status.as_deref() == Some("rate-limit") {
                    diagnostics.record(
                        COBALT,
                        format!("{}: HTTP {} ({})", base, response.status, code),
                    );
                    return InstanceOutcome::Next;
                }

                diagnostics.record(COBALT, format!("{}: {}", base, code));
                InstanceOutcome::Done(Err(Error::Upstream(translate_cobalt_error(&code))))
            }
            Some("tunnel") | Some("redirect") | Some("stream") => match data.url {
                Some(url) => {
                    let filename = data
                        .filename
                        .unwrap_or_else(|| "video_download.mp4".to_string());
                    let meta = MediaMeta::new(filename, "Video");
                    InstanceOutcome::Done(
                        build_media(StreamSet::from_video(Some(url), None), meta, request.mode())
                            .map(Resolved::Media),
                    )
                }
                None => {
                    diagnostics.record(COBALT, format!("{}: success without a URL", base));
                    InstanceOutcome::Next
                }
            },
            Some("picker") => {
                let items = picker_items(data.picker.unwrap_or_default());
                if items.is_empty() {
                    diagnostics.record(COBALT, format!("{}: empty picker", base));
                    InstanceOutcome::Next
                } else {
                    InstanceOutcome::Done(Ok(Resolved::Picker(items)))
                }
            }
            other => {
                diagnostics.record(
                    COBALT,
                    format!(
                        "{}: unexpected status {:?} (HTTP {})",
                        base, other, response.status
                    ),
                );
                InstanceOutcome::Next
            }
        }
    }
}

fn picker_items(entries: Vec<CobaltPickerItem>) -> Vec<PickerItem> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.url.filter(|u| is_absolute_http(u))?;
            Some((PickerKind::from_upstream(entry.item_type.as_deref()), url, entry.thumb))
        })
        .enumerate()
        .map(|(index, (kind, url, thumbnail))| PickerItem {
            kind,
            label: format!("{} {}", kind.as_str().to_uppercase(), index + 1),
            url,
            thumbnail,
        })
        .collect()
}

#[async_trait]
impl Provider for CobaltProvider {
    fn name(&self) -> &'static str {
        COBALT
    }

    fn supports(&self, platform: Platform) -> bool {
        platform.is_known()
    }

    fn is_generic(&self) -> bool {
        true
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        _platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved> {
        let download_mode = if request.mode().is_audio() { "audio" } else { "auto" };
        let body = json!({
            "url": request.source_url(),
            "videoQuality": request.quality(),
            "audioFormat": "mp3",
            "filenameStyle": "basic",
            "downloadMode": download_mode,
        });

        for instance in &self.instances {
            let base = instance.trim_end_matches('/');
            tracing::info!("Trying Cobalt instance {}", base);

            match self.ask_instance(base, &body, request, diagnostics).await {
                InstanceOutcome::Done(result) => return result,
                InstanceOutcome::Next => continue,
            }
        }

        Err(Error::Upstream("no Cobalt instance could process this link".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubHttp;
    use crate::config::DownloadMode;
    use crate::media::VariantKind;

    fn request(mode: DownloadMode) -> DownloadRequest {
        DownloadRequest::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", mode, "1080").unwrap()
    }

    fn cobalt(http: Arc<StubHttp>, instances: &[&str]) -> CobaltProvider {
        CobaltProvider::new(
            http,
            instances.iter().map(|s| s.to_string()).collect(),
            "MediaGrab/1.0".to_string(),
        )
    }

    #[tokio::test]
    async fn test_oceansaver_success() {
        let http = Arc::new(StubHttp::new().respond(
            "oceansaver.in",
            200,
            r#"{"success":1,"download_url":"https://dl.example/file.mp4","meta":{"title":"My: Song"}}"#,
        ));
        let provider = OceanSaverProvider::new(http.clone(), "key123".into());
        let mut diagnostics = Diagnostics::new();

        let Resolved::Media(media) = provider
            .fetch(&request(DownloadMode::Auto), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap()
        else {
            panic!("expected media");
        };

        assert_eq!(media.primary_url, "https://dl.example/file.mp4");
        assert_eq!(media.filename, "My_ Song.mp4");
        assert_eq!(media.variants.len(), 3);

        let url = &http.calls()[0].url;
        assert!(url.contains("format=mp4"));
        assert!(url.contains("api=key123"));
        assert!(url.contains("copyright=0"));
    }

    #[tokio::test]
    async fn test_oceansaver_audio() {
        let http = Arc::new(StubHttp::new().respond(
            "oceansaver.in",
            200,
            r#"{"success":true,"url":"https://dl.example/file.mp3"}"#,
        ));
        let provider = OceanSaverProvider::new(http.clone(), "key".into());
        let mut diagnostics = Diagnostics::new();

        let Resolved::Media(media) = provider
            .fetch(&request(DownloadMode::Audio), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap()
        else {
            panic!("expected media");
        };

        assert_eq!(media.primary_url, "https://dl.example/file.mp3");
        assert_eq!(media.filename, "Video.mp3");
        assert_eq!(media.variants[0].kind, VariantKind::Audio);
        assert!(http.calls()[0].url.contains("format=mp3"));
    }

    #[tokio::test]
    async fn test_oceansaver_failure_text() {
        let http = Arc::new(StubHttp::new().respond(
            "oceansaver.in",
            200,
            r#"{"success":false,"text":"Invalid url"}"#,
        ));
        let provider = OceanSaverProvider::new(http, "key".into());
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Auto), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OceanSaver error: Invalid url");
    }

    #[tokio::test]
    async fn test_cobalt_tunnel_and_body() {
        let http = Arc::new(StubHttp::new().respond(
            "cobalt.one",
            200,
            r#"{"status":"tunnel","url":"https://cobalt.one/tunnel?id=1","filename":"clip.mp4"}"#,
        ));
        let provider = cobalt(http.clone(), &["https://cobalt.one/"]);
        let mut diagnostics = Diagnostics::new();

        let Resolved::Media(media) = provider
            .fetch(&request(DownloadMode::Auto), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap()
        else {
            panic!("expected media");
        };

        assert_eq!(media.primary_url, "https://cobalt.one/tunnel?id=1");
        assert_eq!(media.filename, "clip.mp4");
        assert_eq!(media.variants.len(), 3);

        let call = &http.calls()[0];
        assert_eq!(call.url, "https://cobalt.one/");
        assert_eq!(call.header_value("User-Agent"), Some("MediaGrab/1.0"));
        let body: serde_json::Value = serde_json::from_str(call.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["videoQuality"], "1080");
        assert_eq!(body["downloadMode"], "auto");
        assert_eq!(body["filenameStyle"], "basic");
    }

    #[tokio::test]
    async fn test_cobalt_legacy_path_on_404() {
        let http = Arc::new(
            StubHttp::new()
                .respond("cobalt.one/api/json", 200, r#"{"status":"redirect","url":"https://cdn/v.mp4"}"#)
                .respond("cobalt.one/", 404, "Not Found"),
        );
        let provider = cobalt(http.clone(), &["https://cobalt.one"]);
        let mut diagnostics = Diagnostics::new();

        let resolved = provider
            .fetch(&request(DownloadMode::Auto), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap();

        assert!(matches!(resolved, Resolved::Media(ref m) if m.primary_url == "https://cdn/v.mp4"));
        assert_eq!(http.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_cobalt_skips_broken_instances() {
        let http = Arc::new(
            StubHttp::new()
                .fail("down.example", "could not connect to down.example")
                .respond("auth.example", 200, r#"{"status":"error","error":{"code":"error.api.auth.jwt.missing"}}"#)
                .respond("busy.example", 503, r#"{"status":"error","error":{"code":"error.api.fetch.fail"}}"#)
                .respond("html.example", 200, "<html>hello</html>")
                .respond("good.example", 200, r#"{"status":"redirect","url":"https://cdn/ok.mp4"}"#),
        );
        let provider = cobalt(
            http.clone(),
            &[
                "https://down.example",
                "https://auth.example",
                "https://busy.example",
                "https://html.example",
                "https://good.example",
            ],
        );
        let mut diagnostics = Diagnostics::new();

        let resolved = provider
            .fetch(&request(DownloadMode::Auto), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap();

        assert!(matches!(resolved, Resolved::Media(ref m) if m.primary_url == "https://cdn/ok.mp4"));
        assert_eq!(diagnostics.len(), 4);
    }

    #[tokio::test]
    async fn test_cobalt_definitive_error_stops() {
        let http = Arc::new(
            StubHttp::new()
                .respond("first.example", 400, r#"{"status":"error","error":{"code":"error.api.content.video.unavailable"}}"#)
                .respond("second.example", 200, r#"{"status":"redirect","url":"https://cdn/never.mp4"}"#),
        );
        let provider = cobalt(http.clone(), &["https://first.example", "https://second.example"]);
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Auto), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "The video is unavailable or was removed.");
        assert_eq!(http.count("second.example"), 0);
    }

    #[tokio::test]
    async fn test_cobalt_picker() {
        let http = Arc::new(StubHttp::new().respond(
            "cobalt.one",
            200,
            r#"{"status":"picker","picker":[
                {"type":"photo","url":"https://cdn/1.jpg"},
                {"type":"video","url":"https://cdn/2.mp4","thumb":"https://cdn/2.jpg"},
                {"type":"video","url":"/relative.mp4"}
            ]}"#,
        ));
        let provider = cobalt(http, &["https://cobalt.one"]);
        let mut diagnostics = Diagnostics::new();

        let Resolved::Picker(items) = provider
            .fetch(&request(DownloadMode::Auto), Platform::Instagram, &mut diagnostics)
            .await
            .unwrap()
        else {
            panic!("expected picker");
        };

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "PHOTO 1");
        assert_eq!(items[1].label, "VIDEO 2");
        assert_eq!(items[1].thumbnail.as_deref(), Some("https://cdn/2.jpg"));
    }

    #[tokio::test]
    async fn test_cobalt_exhausted() {
        let http = Arc::new(StubHttp::new());
        let provider = cobalt(http, &["https://a.example", "https://b.example"]);
        let mut diagnostics = Diagnostics::new();

        let err = provider
            .fetch(&request(DownloadMode::Audio), Platform::YouTube, &mut diagnostics)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no Cobalt instance could process this link");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_translate_cobalt_error() {
        assert_eq!(
            translate_cobalt_error("error.api.fetch.rate"),
            "Too many requests. Wait a moment and try again."
        );
        assert_eq!(translate_cobalt_error("error.api.brand.new"), "error.api.brand.new");
    }

    #[test]
    fn test_generic_providers_cover_known_platforms() {
        let http: Arc<dyn HttpClient> = Arc::new(StubHttp::new());
        let ocean = OceanSaverProvider::new(http.clone(), "k".into());
        let cobalt = CobaltProvider::new(http, vec![], "ua".into());

        let providers: [&dyn Provider; 2] = [&ocean, &cobalt];
        for provider in providers {
            assert!(provider.is_generic());
            assert!(provider.supports(Platform::Twitter));
            assert!(!provider.supports(Platform::Unknown));
        }
    }
}
