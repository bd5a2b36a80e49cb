use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;

use super::ExtractContext;
use crate::core::error::ExtractError;
use crate::core::fetcher::absolute;
use crate::core::filename::{file_stem, sanitize_file_name};
use crate::core::http_client::HttpClient;
use crate::core::session::PageSession;
use crate::models::media::VideoResult;

const DOWNLOAD_SCRIPT: &str = r#"(() => {
    const video = document.querySelector('video');
    if (!video) {
        throw new Error('no <video> element on the page');
    }
    const source = video.querySelector('source');
    const src = source ? source.src : (video.currentSrc || video.src);
    if (!src) {
        throw new Error('the <video> element has no source');
    }
    const link = document.createElement('a');
    link.href = src;
    link.download = __FILE_NAME__;
    document.body.appendChild(link);
    link.click();
    document.body.removeChild(link);
})();"#;

/// Script that makes the browser save the media it is showing as `file_name`.
pub fn download_script(file_name: &str) -> String {
    let literal = serde_json::to_string(file_name).unwrap_or_else(|_| "\"video.mp4\"".into());
    DOWNLOAD_SCRIPT.replace("__FILE_NAME__", &literal)
}

pub async fn extract<S, H>(ctx: &mut ExtractContext<'_, S, H>) -> Result<VideoResult, ExtractError>
where
    S: PageSession,
    H: HttpClient + ?Sized,
{
    let settings = ctx.settings;
    let selectors = &settings.selectors;

    let video = ctx.wait(&selectors.video, "video element").await?;
    let video_url = ctx
        .required_url(&video, &selectors.video, "src", "video element")
        .await?;
    tracing::debug!("TikTok: video URL found: {}", video_url);

    let meta = ctx.wait(&selectors.description_meta, "video description").await?;
    let description = ctx
        .attribute(&meta, "content", "video description")
        .await?
        .unwrap_or_default();
    let file_name = sanitize_file_name(&format!(
        "{}.mp4",
        file_stem(&description, &ctx.page.content_id)
    ));
    tracing::debug!("TikTok: video file name: {}", file_name);

    let author_username = ctx
        .optional_text(&selectors.author_handle, "author handle")
        .await;
    let music_uri = ctx
        .optional_url(&selectors.music_link, "href", "music link")
        .await;

    let target = absolute(&ctx.dir.join(&file_name));
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        tracing::debug!("TikTok: file already exists: {}", target.display());
    } else {
        tracing::debug!("TikTok: downloading video {} from {}", file_name, video_url);
        ctx.session
            .navigate(&video_url)
            .await
            .map_err(ExtractError::page("open video"))?;
        ctx.session
            .run_script(&download_script(&file_name))
            .await
            .map_err(ExtractError::page("download script"))?;

        let timeout = settings.download.download_timeout();
        if !wait_for_file(&target, timeout, settings.download.poll_interval()).await {
            return Err(ExtractError::DownloadTimeout {
                file_name,
                dir: ctx.dir.to_path_buf(),
                timeout,
            });
        }
        ctx.written.record(&target);
        tracing::info!("TikTok: saved {}", target.display());
    }

    Ok(VideoResult {
        author_username,
        music_uri,
        files: vec![target],
        source_url: ctx.page.url.clone(),
    })
}

/// Poll until `path` exists. Returns `false` once `timeout` has passed.
pub(crate) async fn wait_for_file(path: &Path, timeout: Duration, interval: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_embeds_quoted_file_name() {
        let script = download_script("Hello_World.mp4");
        assert!(script.contains(r#"link.download = "Hello_World.mp4";"#));
        assert!(!script.contains("__FILE_NAME__"));
    }

    #[test]
    fn script_escapes_quotes() {
        let script = download_script("it's \"quoted\".mp4");
        assert!(script.contains(r#""it's \"quoted\".mp4""#));
    }

    #[tokio::test]
    async fn wait_for_file_sees_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp4");
        std::fs::write(&path, b"x").unwrap();
        assert!(wait_for_file(&path, Duration::from_millis(10), Duration::from_millis(5)).await);
    }

    #[tokio::test]
    async fn wait_for_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.mp4");
        let started = std::time::Instant::now();
        assert!(!wait_for_file(&path, Duration::from_millis(100), Duration::from_millis(20)).await);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn wait_for_file_sees_late_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.mp4");
        let writer_path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tokio::fs::write(writer_path, b"x").await.unwrap();
        });
        assert!(wait_for_file(&path, Duration::from_secs(5), Duration::from_millis(10)).await);
    }
}
