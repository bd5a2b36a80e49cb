use std::collections::HashSet;

use super::ExtractContext;
use crate::core::error::ExtractError;
use crate::core::filename::file_stem;
use crate::core::http_client::HttpClient;
use crate::core::session::PageSession;
use crate::models::media::PhotoResult;

/// Slide URLs already handled during one carousel extraction.
#[derive(Debug, Default)]
pub struct SeenResources {
    urls: HashSet<String>,
}

impl SeenResources {
    /// Returns the 1-based sequence index for a new URL, `None` for a repeat.
    pub fn insert(&mut self, url: &str) -> Option<usize> {
        if self.urls.insert(url.to_string()) {
            Some(self.urls.len())
        } else {
            None
        }
    }
}

pub async fn extract<S, H>(ctx: &mut ExtractContext<'_, S, H>) -> Result<PhotoResult, ExtractError>
where
    S: PageSession,
    H: HttpClient + ?Sized,
{
    let settings = ctx.settings;
    let selectors = &settings.selectors;

    let meta = ctx.wait(&selectors.description_meta, "photo description").await?;
    let title = ctx
        .attribute(&meta, "content", "photo description")
        .await?
        .unwrap_or_default();
    let stem = file_stem(&title, &ctx.page.content_id);

    let slides = ctx
        .session
        .wait_for_all_elements(&selectors.photo_slide, settings.browser.element_timeout())
        .await
        .map_err(ExtractError::page("slide images"))?;
    tracing::debug!("TikTok: found {} slide elements", slides.len());

    let author_username = ctx
        .optional_text(&selectors.author_handle, "author handle")
        .await;
    let music_uri = ctx
        .optional_url(&selectors.music_link, "href", "music link")
        .await;

    let mut files = Vec::with_capacity(slides.len() + 1);
    let mut seen = SeenResources::default();

    for slide in &slides {
        let Some(src) = ctx.attribute(slide, "src", "slide image").await? else {
            tracing::warn!("TikTok: slide without src, skipping");
            continue;
        };
        let photo_url = ctx.absolutize(&src);
        let Some(index) = seen.insert(&photo_url) else {
            tracing::debug!("TikTok: skipping repeated slide {}", photo_url);
            continue;
        };

        let photo_file_name = format!("{}_{}.jpg", index, stem);
        tracing::debug!("TikTok: downloading photo {} from {}", photo_file_name, photo_url);
        files.push(ctx.fetch(&photo_url, &photo_file_name).await?);
    }

    let audio = ctx.wait(&selectors.audio, "audio element").await?;
    let audio_url = ctx
        .required_url(&audio, &selectors.audio, "src", "audio element")
        .await?;
    let audio_file_name = format!("{}.mp3", stem);
    tracing::debug!("TikTok: downloading audio {} from {}", audio_file_name, audio_url);
    files.push(ctx.fetch(&audio_url, &audio_file_name).await?);

    tracing::debug!("TikTok: photo and audio download completed");
    Ok(PhotoResult {
        author_username,
        music_uri,
        files,
        source_url: ctx.page.url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_resources_numbers_new_urls() {
        let mut seen = SeenResources::default();
        assert_eq!(seen.insert("https://cdn/1.jpg"), Some(1));
        assert_eq!(seen.insert("https://cdn/2.jpg"), Some(2));
        assert_eq!(seen.insert("https://cdn/1.jpg"), None);
        assert_eq!(seen.insert("https://cdn/3.jpg"), Some(3));
    }
}
