//! Conversion between numeric media ids and shortcodes.
//!
//! A shortcode is the media id written in base 64 using the URL-safe alphabet,
//! most significant digit first, without leading zero digits (`A`).

use thiserror::Error;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Longest shortcode that can encode a media id.
pub const MAX_SHORTCODE_LEN: usize = 11;

/// Errors from shortcode decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcodeError {
    #[error("Wrong shortcode \"{0}\", unable to convert to mediaid.")]
    TooLong(String),

    #[error("Wrong shortcode \"{shortcode}\": invalid character {ch:?}")]
    InvalidCharacter { shortcode: String, ch: char },

    #[error("Wrong shortcode \"{0}\": media id does not fit in 64 bits")]
    Overflow(String),

    #[error("Empty shortcode")]
    Empty,
}

/// Encode a media id as a shortcode.
pub fn media_id_to_shortcode(media_id: u64) -> String {
    if media_id == 0 {
        return "A".to_string();
    }

    let mut digits = Vec::with_capacity(MAX_SHORTCODE_LEN);
    let mut rest = media_id;
    while rest > 0 {
        digits.push(ALPHABET[(rest % 64) as usize]);
        rest /= 64;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

/// Decode a shortcode into its media id.
pub fn shortcode_to_media_id(shortcode: &str) -> Result<u64, ShortcodeError> {
    if shortcode.is_empty() {
        return Err(ShortcodeError::Empty);
    }
    if shortcode.len() > MAX_SHORTCODE_LEN {
        return Err(ShortcodeError::TooLong(shortcode.to_string()));
    }

    let mut value: u64 = 0;
    for ch in shortcode.chars() {
        let digit = digit_value(ch).ok_or_else(|| ShortcodeError::InvalidCharacter {
            shortcode: shortcode.to_string(),
            ch,
        })?;
        value = value
            .checked_mul(64)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| ShortcodeError::Overflow(shortcode.to_string()))?;
    }

    Ok(value)
}

fn digit_value(ch: char) -> Option<u64> {
    let byte = u8::try_from(ch).ok()?;
    ALPHABET.iter().position(|&c| c == byte).map(|p| p as u64)
}
