//! SnapSave client: fetch, unpack, and scan the packed HTML response.

pub mod decoder;
pub mod extractor;

pub use decoder::{decode, DecodeError, DecoderParameters};
pub use extractor::extract_media_urls;

use crate::api::{HttpClient, HttpRequest};
use crate::error::{Error, Result};
use crate::resolve::Diagnostics;

const ACTION_URL: &str = "https://snapsave.app/action.php";
const ORIGIN: &str = "https://snapsave.app";

const SOURCE: &str = "snapsave";

/// Ask SnapSave for the media behind `url`.
///
/// Requires HTTP 200, a decodable payload, and at least one extracted link.
pub async fn fetch_media_urls(
    http: &dyn HttpClient,
    url: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<String>> {
    let request = HttpRequest::post(ACTION_URL)
        .form(&[("url", url)])
        .header("Accept", "*/*")
        .header("Origin", ORIGIN)
        .header("Referer", format!("{}/", ORIGIN));

    let response = http.call(request).await?;
    if response.status != 200 {
        diagnostics.record(SOURCE, format!("HTTP {}", response.status));
        return Err(Error::UpstreamStatus {
            upstream: "SnapSave",
            status: response.status,
        });
    }

    let html = decode(&response.body).map_err(|e| {
        diagnostics.record(SOURCE, format!("decode failed: {}", e));
        e
    })?;
    diagnostics.record(SOURCE, format!("decoded {} chars", html.chars().count()));

    let urls = extract_media_urls(&html);
    if urls.is_empty() {
        diagnostics.record(SOURCE, "no URLs in decoded HTML");
        return Err(Error::NoMedia("SnapSave returned no download links".into()));
    }

    diagnostics.record(SOURCE, format!("extracted {} URLs", urls.len()));
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubHttp;
    use crate::api::Method;

    #[tokio::test]
    async fn test_fetch_decodes_and_extracts() {
        let packed = decoder::pack(
            r#"<a href="https://cdn.example/video123.mp4">Download</a>"#,
            "kVuhqDpMsY",
            31,
            7,
        );
        let http = StubHttp::new().respond_to(Method::Post, "snapsave.app", 200, &packed);
        let mut diagnostics = Diagnostics::new();

        let urls = fetch_media_urls(&http, "https://www.instagram.com/reel/abc/", &mut diagnostics)
            .await
            .unwrap();

        assert_eq!(urls, vec!["https://cdn.example/video123.mp4"]);
        let calls = http.calls();
        assert_eq!(calls[0].header_value("Origin"), Some("https://snapsave.app"));
        assert_eq!(
            calls[0].body.as_deref(),
            Some("url=https%3A%2F%2Fwww.instagram.com%2Freel%2Fabc%2F")
        );
        assert!(!diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_200() {
        let http = StubHttp::new().respond("snapsave.app", 403, "denied");
        let mut diagnostics = Diagnostics::new();

        let err = fetch_media_urls(&http, "https://fb.watch/x/", &mut diagnostics)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UpstreamStatus { status: 403, .. }));
        assert_eq!(diagnostics.entries()[0].message, "HTTP 403");
    }

    #[tokio::test]
    async fn test_fetch_unpacked_page_is_decode_error() {
        let http = StubHttp::new().respond("snapsave.app", 200, "<html>Please try again</html>");
        let mut diagnostics = Diagnostics::new();

        let err = fetch_media_urls(&http, "https://fb.watch/x/", &mut diagnostics)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(DecodeError::NoPayload)));
    }

    #[tokio::test]
    async fn test_fetch_without_links_is_no_media() {
        let packed = decoder::pack("<p>Private video</p>", "kVuhqDpMsY", 31, 7);
        let http = StubHttp::new().respond("snapsave.app", 200, &packed);
        let mut diagnostics = Diagnostics::new();

        let err = fetch_media_urls(&http, "https://fb.watch/x/", &mut diagnostics)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoMedia(_)));
    }
}
