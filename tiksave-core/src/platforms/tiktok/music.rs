use regex::Regex;
use std::sync::LazyLock;

use super::ExtractContext;
use crate::core::error::{ExtractError, PageError};
use crate::core::filename::file_stem;
use crate::core::http_client::HttpClient;
use crate::core::session::PageSession;
use crate::models::media::{MusicAuthor, MusicResult};

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"url\((.*?)\)").unwrap());

pub async fn extract<S, H>(ctx: &mut ExtractContext<'_, S, H>) -> Result<MusicResult, ExtractError>
where
    S: PageSession,
    H: HttpClient + ?Sized,
{
    let settings = ctx.settings;
    let selectors = &settings.selectors;
    let page_url = ctx.page.url.clone();

    ctx.session
        .navigate(&page_url)
        .await
        .map_err(ExtractError::page("open music page"))?;

    let author_link = ctx.wait(&selectors.music_author_link, "music author").await?;
    let author_name = ctx
        .session
        .read_text(&author_link)
        .await
        .map_err(ExtractError::page("music author"))?
        .trim()
        .to_string();
    let author_url = ctx
        .attribute(&author_link, "href", "music author")
        .await?
        .map(|href| ctx.absolutize(&href));
    tracing::debug!("TikTok: music author found: {} ({:?})", author_name, author_url);

    let clip_count_el = ctx
        .session
        .find_element(&selectors.music_clip_count)
        .await
        .map_err(ExtractError::page("clip count"))?
        .ok_or_else(|| ExtractError::Page {
            step: "clip count",
            source: PageError::ElementNotFound(selectors.music_clip_count.clone()),
        })?;
    let clip_count_text = ctx
        .session
        .read_text(&clip_count_el)
        .await
        .map_err(ExtractError::page("clip count"))?;
    let clip_count = parse_clip_count(&clip_count_text).ok_or_else(|| ExtractError::Parse {
        step: "clip count",
        value: clip_count_text.clone(),
    })?;
    tracing::debug!("TikTok: music clip count found: {}", clip_count);

    let clip_links = ctx
        .session
        .find_all_elements(&selectors.music_clip_link)
        .await
        .map_err(ExtractError::page("clip links"))?;
    let mut clip_urls = Vec::with_capacity(clip_links.len());
    for link in &clip_links {
        if let Some(href) = ctx.attribute(link, "href", "clip links").await? {
            clip_urls.push(ctx.absolutize(&href));
        }
    }
    tracing::debug!("TikTok: music clip URLs found: {}", clip_urls.len());

    let thumbnail_url = ctx
        .optional_attribute(&selectors.music_thumbnail, "style", "music thumbnail")
        .await
        .and_then(|style| extract_thumbnail_url(&style))
        .map(|thumb| ctx.absolutize(&thumb));
    tracing::debug!("TikTok: music thumbnail URL found: {:?}", thumbnail_url);

    let media = ctx.wait(&selectors.video, "music media element").await?;
    let music_url = ctx
        .required_url(&media, &selectors.video, "src", "music media element")
        .await?;
    tracing::debug!("TikTok: music URL found: {}", music_url);

    let file_name = format!("{}.mp3", file_stem(&author_name, &ctx.page.owner));
    let path = ctx.fetch(&music_url, &file_name).await?;

    Ok(MusicResult {
        author: MusicAuthor {
            name: author_name,
            url: author_url,
        },
        thumbnail_url,
        clip_count,
        clip_urls,
        music_url,
        files: vec![path],
        source_url: page_url,
    })
}

/// Leading count token of texts like `"5 videos"`, `"1,234 videos"` or `"1.2K videos"`.
pub fn parse_clip_count(text: &str) -> Option<u64> {
    let token = text.split_whitespace().next()?.replace(',', "");

    let (number, multiplier) = match token.chars().last()? {
        'k' | 'K' => (&token[..token.len() - 1], 1_000.0),
        'm' | 'M' => (&token[..token.len() - 1], 1_000_000.0),
        'b' | 'B' => (&token[..token.len() - 1], 1_000_000_000.0),
        _ => return token.parse().ok(),
    };

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

/// First `url(...)` of an inline style, unquoted and made absolute if it is
/// protocol-relative.
pub fn extract_thumbnail_url(style: &str) -> Option<String> {
    let raw = CSS_URL_RE.captures(style)?.get(1)?.as_str();
    let cleaned = raw
        .replace("&quot;", "")
        .replace(['"', '\''], "")
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return None;
    }
    if cleaned.starts_with("//") {
        return Some(format!("https:{}", cleaned));
    }
    Some(cleaned)
}
