//! Static unpacker for the `eval(function(h,u,n,t,e,r){...})` script wrapper.
//!
//! Nothing is executed. The literal arguments are pulled out of the wrapper text
//! and the unpacking arithmetic is reimplemented directly.

use regex::Regex;
use thiserror::Error;

/// Symbols used to read a digit string in base `e`.
const DIGIT_SYMBOLS: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+/";

/// Full wrapper with all six positional literals.
const STRICT_PATTERN: &str = r#"(?s)eval\(function\(h,u,n,t,e,r\)\{.*?\}\(\s*"([^"]+)"\s*,\s*(\d+)\s*,\s*"([^"]+)"\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)\)"#;

/// Just the argument list, tolerating drift in the wrapper around it.
const FALLBACK_PATTERN: &str = r#"\}\("([^"]+)",\s*(\d+)\s*,\s*"([^"]+)"\s*,\s*(\d+)\s*,\s*(\d+)"#;

/// Why a payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no decodable payload found")]
    NoPayload,

    #[error("decoded payload is empty")]
    Empty,
}

/// Literal arguments of one packed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderParameters {
    /// `h`
    pub payload: String,
    /// `n`
    pub alphabet: String,
    /// `t`
    pub subtract_offset: i64,
    /// `e`
    pub base: u32,
}

/// Pull the packer arguments out of `text`.
///
/// The strict pattern is tried first; the first pattern that matches wins.
pub fn parse_parameters(text: &str) -> Option<DecoderParameters> {
    [STRICT_PATTERN, FALLBACK_PATTERN]
        .iter()
        .find_map(|pattern| {
            let re = Regex::new(pattern).unwrap();
            let caps = re.captures(text)?;

            // Group 2 (`u`) and group 6 (`r`) are not used by the unpacking.
            Some(DecoderParameters {
                payload: caps[1].to_string(),
                alphabet: caps[3].to_string(),
                subtract_offset: caps[4].parse().ok()?,
                base: caps[5].parse().ok()?,
            })
        })
}

/// Run the unpacking arithmetic over every segment of the payload.
pub fn unpack(params: &DecoderParameters) -> String {
    let alphabet: Vec<char> = params.alphabet.chars().collect();
    let payload = params.payload.as_str();

    let segments: Box<dyn Iterator<Item = &str> + '_> =
        match alphabet.get(params.base as usize).copied() {
            Some(separator) => Box::new(payload.split(separator)),
            None => Box::new(
                payload
                    .char_indices()
                    .map(move |(i, c)| &payload[i..i + c.len_utf8()]),
            ),
        };

    segments
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| decode_segment(segment, &alphabet, params))
        .collect()
}

fn decode_segment(segment: &str, alphabet: &[char], params: &DecoderParameters) -> Option<char> {
    // Characters missing from the alphabet are dropped, not read as zero
    let digits: String = segment
        .chars()
        .filter_map(|c| alphabet.iter().position(|&a| a == c))
        .map(|index| index.to_string())
        .collect();

    if digits.is_empty() {
        return None;
    }

    let code_point = base_to_dec(&digits, params.base)?.checked_sub(params.subtract_offset)?;
    if code_point <= 0 || code_point >= 0x110000 {
        return None;
    }

    char::from_u32(u32::try_from(code_point).ok()?)
}

/// Read `digits` as a number in `base`. `None` on overflow.
pub fn base_to_dec(digits: &str, base: u32) -> Option<i64> {
    digits.chars().try_fold(0i64, |value, c| {
        let digit = DIGIT_SYMBOLS
            .find(c)
            .map(|pos| pos as i64)
            .unwrap_or_else(|| c.to_digit(10).map_or(0, i64::from));

        value.checked_mul(i64::from(base))?.checked_add(digit)
    })
}

/// Decode a packed script into its plain text (normally HTML).
pub fn decode(text: &str) -> Result<String, DecodeError> {
    let params = parse_parameters(text).ok_or(DecodeError::NoPayload)?;

    tracing::debug!(
        "Packed payload: {} chars, alphabet {} chars, offset {}, base {}",
        params.payload.chars().count(),
        params.alphabet.chars().count(),
        params.subtract_offset,
        params.base
    );

    let decoded = unpack(&params);
    if decoded.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(decoded)
}

/// Inverse of [`unpack`], wrapped the way the upstream serves it.
///
/// Needs `base <= 10` so every digit maps to one alphabet character, and an
/// alphabet with more than `base` distinct characters.
#[cfg(test)]
pub(crate) fn pack(plaintext: &str, alphabet: &str, offset: i64, base: u32) -> String {
    let symbols: Vec<char> = alphabet.chars().collect();
    let separator = symbols[base as usize];

    let payload: String = plaintext
        .chars()
        .map(|c| {
            let mut value = i64::from(u32::from(c)) + offset;
            let mut digits = Vec::new();
            while value > 0 {
                digits.push(symbols[(value % i64::from(base)) as usize]);
                value /= i64::from(base);
            }
            digits.iter().rev().collect::<String>()
        })
        .map(|segment| format!("{}{}", segment, separator))
        .collect();

    format!(
        r#"<script>eval(function(h,u,n,t,e,r){{r="";for(var i=0,len=h.length;i<len;i++){{var s="";while(h[i]!==n[e]){{s+=h[i];i++}}r+=String.fromCharCode(_0xe(s,e,10)-t)}}return decodeURIComponent(escape(r))}}("{}",{},"{}",{},{},{}))</script>"#,
        payload, 57, alphabet, offset, base, 23
    )
}
