//! Upstream response type definitions.
//!
//! Every upstream is third-party and drifts independently, so all fields are
//! optional. The fallback rule for each absent field lives with the provider
//! that reads it.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a size as a JSON number or a numeric string; anything else is `None`.
fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Whether a flag that arrives as `true`, `1`, or `"1"`/`"true"` is set.
fn truthy(value: &Option<Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Treat empty strings as absent.
fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// TikWM
// ---------------------------------------------------------------------------

/// `https://www.tikwm.com/api/` envelope. Success is `code == 0`.
#[derive(Debug, Deserialize)]
pub struct TikWmResponse {
    pub code: Option<i64>,
    #[serde(default, deserialize_with = "non_empty")]
    pub msg: Option<String>,
    pub data: Option<TikWmVideo>,
}

/// TikWM video payload.
///
/// `hdplay` absent → `play`; `play` absent → `hdplay`; `music` absent → video URL;
/// `hd_size` absent → `size`; `size` absent → `hd_size`.
#[derive(Debug, Default, Deserialize)]
pub struct TikWmVideo {
    #[serde(default, deserialize_with = "non_empty")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub origin_cover: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub play: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub hdplay: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub wmplay: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub music: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub hd_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub wm_size: Option<u64>,
    pub music_info: Option<TikWmMusic>,
    pub author: Option<TikWmAuthor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TikWmMusic {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TikWmAuthor {
    #[serde(default, deserialize_with = "non_empty")]
    pub nickname: Option<String>,
}

// ---------------------------------------------------------------------------
// tik.fail
// ---------------------------------------------------------------------------

/// `https://api.tik.fail/api/grab`. Success is `status == "success"`;
/// `video` absent → `nwm_video_url`.
#[derive(Debug, Deserialize)]
pub struct TikFailResponse {
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub video: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub nwm_video_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub desc: Option<String>,
}

// ---------------------------------------------------------------------------
// Douyin
// ---------------------------------------------------------------------------

/// `https://api.douyin.wtf/api`. Failure is `status == "failed"`.
#[derive(Debug, Deserialize)]
pub struct DouyinResponse {
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub aweme_id: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub desc: Option<String>,
    pub video_data: Option<DouyinVideo>,
}

#[derive(Debug, Deserialize)]
pub struct DouyinVideo {
    #[serde(default, deserialize_with = "non_empty")]
    pub nwm_video_url: Option<String>,
}

// ---------------------------------------------------------------------------
// LoveTik
// ---------------------------------------------------------------------------

/// `https://lovetik.com/api/ajax/search`. Success is `status == "ok"`.
#[derive(Debug, Deserialize)]
pub struct LoveTikResponse {
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub mess: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub vid: Option<String>,
    pub links: Option<LoveTikLinks>,
}

/// LoveTik has shipped both a keyed object and a list of link entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoveTikLinks {
    // List must come first: a keyed struct would also accept a sequence.
    List(Vec<LoveTikLink>),
    Keyed {
        #[serde(default, deserialize_with = "non_empty")]
        no_watermark: Option<String>,
        #[serde(default, deserialize_with = "non_empty")]
        mp3: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct LoveTikLink {
    #[serde(default, deserialize_with = "non_empty")]
    pub a: Option<String>,
}

// ---------------------------------------------------------------------------
// Instagram
// ---------------------------------------------------------------------------

/// Public GraphQL query response: `data.shortcode_media.video_url`.
#[derive(Debug, Deserialize)]
pub struct InstagramGraphQlResponse {
    pub data: Option<InstagramGraphQlData>,
}

#[derive(Debug, Deserialize)]
pub struct InstagramGraphQlData {
    pub shortcode_media: Option<InstagramMedia>,
}

#[derive(Debug, Deserialize)]
pub struct InstagramMedia {
    #[serde(default, deserialize_with = "non_empty")]
    pub video_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Medsoss
// ---------------------------------------------------------------------------

/// `https://medsoss-downloader.vercel.app/api/index`. Success is
/// `success == true` with a non-empty `data` list.
#[derive(Debug, Deserialize)]
pub struct MedsossResponse {
    #[serde(default)]
    pub success: Option<Value>,
    pub data: Option<Vec<MedsossItem>>,
}

impl MedsossResponse {
    pub fn succeeded(&self) -> bool {
        truthy(&self.success)
    }
}

/// One Medsoss entry. `quality` absent → `label` → `HD`; `type` absent → `video`.
#[derive(Debug, Deserialize)]
pub struct MedsossItem {
    #[serde(default, deserialize_with = "non_empty")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub label: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "non_empty")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
}

// ---------------------------------------------------------------------------
// OceanSaver
// ---------------------------------------------------------------------------

/// `https://p.oceansaver.in/ajax/download.php`. `url` absent → `download_url`.
#[derive(Debug, Deserialize)]
pub struct OceanSaverResponse {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default, deserialize_with = "non_empty")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub text: Option<String>,
    pub meta: Option<OceanSaverMeta>,
}

impl OceanSaverResponse {
    /// `success` arrives as `true`, `1`, or `"1"` depending on the day.
    pub fn succeeded(&self) -> bool {
        truthy(&self.success)
    }
}

#[derive(Debug, Deserialize)]
pub struct OceanSaverMeta {
    #[serde(default, deserialize_with = "non_empty")]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// Cobalt
// ---------------------------------------------------------------------------

/// Cobalt API response (v7 `/api/json` and v10 root share these fields).
#[derive(Debug, Deserialize)]
pub struct CobaltResponse {
    #[serde(default, deserialize_with = "non_empty")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub filename: Option<String>,
    pub picker: Option<Vec<CobaltPickerItem>>,
    pub error: Option<CobaltError>,
    /// v7 reports errors as free text.
    #[serde(default, deserialize_with = "non_empty")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CobaltPickerItem {
    #[serde(rename = "type", default, deserialize_with = "non_empty")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CobaltError {
    #[serde(default, deserialize_with = "non_empty")]
    pub code: Option<String>,
}
