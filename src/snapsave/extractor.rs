//! Media URL extraction from decoded HTML.

use regex::Regex;

/// Passes in priority order. A later pass only runs when every earlier one found nothing.
const PASSES: [&str; 3] = [
    // Structured download links
    r#"(?i)href="(https?://[^"]*(?:\.mp4|\.mp3|video|reel|content)[^"]*)""#,
    // Attribute links
    r#"(?i)(?:data-href|src)="(https?://[^"]*(?:\.mp4|\.mp3|video|reel|content)[^"]*)""#,
    // Loose CDN-looking URLs
    r#"(?i)(https?://[^\s"'<>]+(?:\.mp4|\.mp3|scontent|fbcdn|cdninstagram)[^\s"'<>]*)"#,
];

/// Find candidate media URLs, deduplicated, in document order.
pub fn extract_media_urls(text: &str) -> Vec<String> {
    for (pass, pattern) in PASSES.iter().enumerate() {
        let re = Regex::new(pattern).unwrap();
        let urls = collect_unique(&re, text);

        if !urls.is_empty() {
            tracing::debug!("Extracted {} URLs in pass {}", urls.len(), pass + 1);
            return urls;
        }
    }

    Vec::new()
}

fn collect_unique(re: &Regex, text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for caps in re.captures_iter(text) {
        let url = normalize_url(&caps[1]);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}

fn normalize_url(raw: &str) -> String {
    decode_entities(raw)
        .replace("\\/", "/")
        .replace("\\u0026", "&")
}

/// Decode HTML character references.
///
/// Handles the named entities upstream markup uses plus decimal and hex numeric
/// references. Anything unrecognized is left as-is.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match decode_entity(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode the reference at the start of `tail`, returning it and its byte length.
fn decode_entity(tail: &str) -> Option<(char, usize)> {
    let end = tail.find(';')?;
    if end > 10 {
        return None;
    }

    let ch = match &tail[1..end] {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        name => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };

    Some((ch, end + 1))
}
