//! Platform classification.

use std::fmt;

use regex::Regex;
use serde::Serialize;
use url::Url;

/// Social-media service a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    Instagram,
    Facebook,
    Twitter,
    YouTube,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::YouTube => "youtube",
            Platform::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Platform::Unknown)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered domain table. First match wins; the domains are disjoint.
const DOMAINS: &[(Platform, &[&str])] = &[
    (Platform::TikTok, &["tiktok.com"]),
    (
        Platform::YouTube,
        &["youtube.com", "youtu.be", "youtube-nocookie.com"],
    ),
    (Platform::Instagram, &["instagram.com"]),
    (Platform::Twitter, &["twitter.com", "x.com"]),
    (Platform::Facebook, &["facebook.com", "fb.watch", "fb.com"]),
];

/// Classify a link. Total: anything unrecognized is `Unknown`.
pub fn classify(url: &str) -> Platform {
    if let Some(host) = Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    {
        return classify_host(&host);
    }

    classify_text(url)
}

fn classify_host(host: &str) -> Platform {
    DOMAINS
        .iter()
        .find(|(_, domains)| domains.iter().any(|d| host_matches(host, d)))
        .map(|(platform, _)| *platform)
        .unwrap_or(Platform::Unknown)
}

/// `host` is `domain` or a subdomain of it.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Fallback for inputs that do not parse as URLs (e.g. `tiktok.com/@user/video/1`).
fn classify_text(text: &str) -> Platform {
    let patterns: [(Platform, &str); 5] = [
        (Platform::TikTok, r"(?i)tiktok\.com"),
        (Platform::YouTube, r"(?i)youtube\.com|youtu\.be"),
        (Platform::Instagram, r"(?i)instagram\.com"),
        (Platform::Twitter, r"(?i)twitter\.com|(?:^|[^a-z0-9-])x\.com"),
        (Platform::Facebook, r"(?i)facebook\.com|fb\.watch"),
    ];

    for (platform, pattern) in patterns {
        let re = Regex::new(pattern).unwrap();
        if re.is_match(text) {
            return platform;
        }
    }

    Platform::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(classify("https://vt.tiktok.com/abc"), Platform::TikTok);
        assert_eq!(
            classify("https://www.instagram.com/reel/xyz/"),
            Platform::Instagram
        );
        assert_eq!(classify("https://example.com/foo"), Platform::Unknown);
    }

    #[test]
    fn test_classify_hosts() {
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ"), Platform::YouTube);
        assert_eq!(
            classify("https://m.youtube.com/watch?v=dQw4w9WgXcQ"),
            Platform::YouTube
        );
        assert_eq!(classify("https://x.com/user/status/1"), Platform::Twitter);
        assert_eq!(
            classify("https://mobile.twitter.com/user/status/1"),
            Platform::Twitter
        );
        assert_eq!(classify("https://fb.watch/abc/"), Platform::Facebook);
        assert_eq!(
            classify("https://web.facebook.com/watch?v=1"),
            Platform::Facebook
        );
    }

    #[test]
    fn test_classify_lookalike_domains() {
        assert_eq!(classify("https://box.com/file"), Platform::Unknown);
        assert_eq!(classify("https://nottiktok.com/video"), Platform::Unknown);
        // The platform name in the path does not count.
        assert_eq!(
            classify("https://example.com/?next=instagram.com"),
            Platform::Unknown
        );
    }

    #[test]
    fn test_classify_non_urls() {
        assert_eq!(classify("tiktok.com/@user/video/1"), Platform::TikTok);
        assert_eq!(classify("see x.com/user"), Platform::Twitter);
        assert_eq!(classify("dropbox.com/x"), Platform::Unknown);
    }

    #[test]
    fn test_classify_is_total() {
        for input in ["", " ", "\0", "💥", "http://", "::::", "https://[::1]/", "a".repeat(4096).as_str()] {
            let _ = classify(input);
        }
    }
}
