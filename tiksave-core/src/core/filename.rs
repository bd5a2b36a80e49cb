use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

pub const MAX_NAME_CHARS: usize = 150;

/// Map an arbitrary title to a name that is safe on common filesystems.
///
/// Strips `\ / : * ? " < > |` and control characters, then joins the remaining
/// words with `_`. Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| !FORBIDDEN.contains(c) && (c.is_whitespace() || !c.is_control()))
        .nfc()
        .collect();
    let name = WS_RE.replace_all(name.trim(), "_");

    let truncated: String = name.chars().take(MAX_NAME_CHARS).collect();
    truncated.trim_matches('_').to_string()
}

/// Sanitize a `stem.ext` name, keeping the extension out of the length cap.
pub fn sanitize_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}.{}", sanitize(stem), sanitize(ext))
        }
        _ => sanitize(file_name),
    }
}

/// `sanitize(title)`, or `fallback` when nothing usable is left.
pub fn file_stem(title: &str, fallback: &str) -> String {
    let stem = sanitize(title);
    if stem.is_empty() {
        sanitize(fallback)
    } else {
        stem
    }
}
