//! Filename generation and manipulation.

/// Stem used when nothing usable is left after sanitizing.
const FALLBACK_STEM: &str = "video_download";

/// Longest stem kept, in characters.
const MAX_STEM_CHARS: usize = 120;

/// Make an upstream-supplied name safe to use as a filename.
///
/// Path separators, reserved characters, and control characters become `_`,
/// traversal sequences are collapsed, and overly long stems are cut.
pub fn sanitize_filename(name: &str) -> String {
    let (stem, ext) = split_extension(name.trim());

    let cleaned: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Collapse traversal sequences
    let mut cleaned = cleaned;
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }

    let cleaned = cleaned.trim().trim_matches('.').trim();
    let stem: String = if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned.chars().take(MAX_STEM_CHARS).collect::<String>().trim_end().to_string()
    };

    match ext {
        Some(ext) => format!("{}.{}", stem, ext.to_lowercase()),
        None => stem,
    }
}

/// Replace (or add) a filename extension.
pub fn replace_extension(filename: &str, ext: &str) -> String {
    let (stem, _) = split_extension(filename);
    format!("{}.{}", stem, ext)
}

/// Split `name.ext`, accepting only short alphanumeric extensions.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_valid() {
        assert_eq!(sanitize_filename("tiktok_123.mp4"), "tiktok_123.mp4");
        assert_eq!(sanitize_filename("file:name.MP4"), "file_name.mp4");
        assert_eq!(
            sanitize_filename("what? a *clip*.mp3"),
            "what_ a _clip_.mp3"
        );
    }

    #[test]
    fn test_sanitize_filename_path_traversal() {
        assert_eq!(sanitize_filename("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_filename("..\\windows\\x.mp4"), "_windows_x.mp4");
        assert!(!sanitize_filename("a/../b.mp4").contains(".."));
    }

    #[test]
    fn test_sanitize_filename_control_chars() {
        assert_eq!(sanitize_filename("a\0b\nc.mp4"), "a_b_c.mp4");
    }

    #[test]
    fn test_sanitize_filename_empty() {
        assert_eq!(sanitize_filename(""), FALLBACK_STEM);
        assert_eq!(sanitize_filename("   "), FALLBACK_STEM);
        assert_eq!(sanitize_filename("...."), FALLBACK_STEM);
    }

    #[test]
    fn test_sanitize_filename_truncates_long_titles() {
        let long = format!("{}.mp4", "x".repeat(500));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), MAX_STEM_CHARS + 4);
        assert!(sanitized.ends_with(".mp4"));
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("tiktok_1.mp4", "mp3"), "tiktok_1.mp3");
        assert_eq!(replace_extension("no_extension", "mp3"), "no_extension.mp3");
        assert_eq!(replace_extension("My caption. Part 2", "mp3"), "My caption. Part 2.mp3");
    }
}
