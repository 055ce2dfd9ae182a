//! Filename derivation for uploaded photos.
//!
//! A photo is stored as `<version>_<sievefraction>_<class>_<comment>_<timestamp>.jpg`.
//! The comment is free text and always goes through [`sanitize_comment`]; the
//! labels are taken as given unless the caller sanitizes them first.

use chrono::{DateTime, SecondsFormat, Utc};

pub const PHOTO_EXTENSION: &str = "jpg";

/// Classification labels submitted with a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoLabels {
    pub version: String,
    pub sieve_fraction: String,
    pub class: String,
}

impl PhotoLabels {
    /// Labels with every field run through the comment sanitizer.
    pub fn sanitized(&self) -> PhotoLabels {
        PhotoLabels {
            version: sanitize_comment(&self.version),
            sieve_fraction: sanitize_comment(&self.sieve_fraction),
            class: sanitize_comment(&self.class),
        }
    }

    /// True when every label is already made of filename-safe characters.
    pub fn is_filename_safe(&self) -> bool {
        is_filename_safe(&self.version)
            && is_filename_safe(&self.sieve_fraction)
            && is_filename_safe(&self.class)
    }
}

/// Map arbitrary text to a token made of `[A-Za-z0-9_-]`.
///
/// German umlauts and ß become their ASCII digraphs, every other character
/// outside letters, digits, `_`, `-` and space is dropped, spaces become
/// underscores and runs of underscores collapse to one. Other accented letters
/// (é, ñ, ...) are dropped rather than transliterated.
pub fn sanitize_comment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            'Ä' => out.push_str("Ae"),
            'Ö' => out.push_str("Oe"),
            'Ü' => out.push_str("Ue"),
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' => out.push(c),
            // Stripped characters never separate two underscores, so checking
            // the tail is enough to collapse runs.
            '_' | ' ' => {
                if !out.ends_with('_') {
                    out.push('_');
                }
            }
            _ => {}
        }
    }
    out
}

/// True if `s` only contains `[A-Za-z0-9_-]`.
pub fn is_filename_safe(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// ISO-8601 UTC timestamp at second precision with colons replaced by hyphens.
pub fn filename_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
        .replace(':', "-")
}

/// Compose the stored filename for a photo.
///
/// `comment` is expected to be sanitized already; labels are used verbatim.
pub fn build_filename(labels: &PhotoLabels, comment: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}_{}_{}.{}",
        labels.version,
        labels.sieve_fraction,
        labels.class,
        comment,
        filename_timestamp(at),
        PHOTO_EXTENSION
    )
}
