use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z0-9_.]+$").unwrap());

static MUSIC_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9%_.\-]+)-(\d+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentVariant {
    Video,
    PhotoCarousel,
    AudioTrack,
}

impl ContentVariant {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::PhotoCarousel => "photo",
            Self::AudioTrack => "music",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUrl {
    pub variant: ContentVariant,
    pub url: String,
    pub content_id: String,
    /// `@handle` for posts, the track slug for music pages.
    pub owner: String,
}

/// Classify a resolved URL. `None` means the URL is not a supported page.
pub fn classify(url_str: &str) -> Option<ContentVariant> {
    parse_url(url_str).map(|p| p.variant)
}

pub fn parse_url(url_str: &str) -> Option<ParsedUrl> {
    let parsed = url::Url::parse(url_str.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || !is_tiktok_host(&parsed) {
        return None;
    }

    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let (variant, content_id, owner) = match segments.as_slice() {
        [handle, kind, id] if HANDLE_RE.is_match(handle) && is_numeric(id) => {
            let variant = match *kind {
                "video" => ContentVariant::Video,
                "photo" => ContentVariant::PhotoCarousel,
                _ => return None,
            };
            (variant, id.to_string(), handle.to_string())
        }
        ["music", slug_id] => {
            let caps = MUSIC_SLUG_RE.captures(slug_id)?;
            (
                ContentVariant::AudioTrack,
                caps[2].to_string(),
                caps[1].to_string(),
            )
        }
        _ => return None,
    };

    Some(ParsedUrl {
        variant,
        url: url_str.trim().to_string(),
        content_id,
        owner,
    })
}

fn is_tiktok_host(url: &url::Url) -> bool {
    match url.host_str() {
        Some(host) => {
            let host = host.to_lowercase();
            host == "tiktok.com" || host.ends_with(".tiktok.com")
        }
        None => false,
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
