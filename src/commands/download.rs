use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::bail;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tiksave_core::{AppSettings, Error, ExtractionResult, MediaRequest, RollbackPolicy};

use crate::storage::config;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// TikTok video, photo or music URL (short links are followed)
    pub url: String,

    /// Directory to save into [default: current directory]
    pub dir: Option<PathBuf>,

    /// Show the browser window and log every step
    #[arg(long)]
    pub debug: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file to use instead of the per-user one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do with already saved files when a download fails
    #[arg(long, value_enum)]
    pub rollback: Option<RollbackArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RollbackArg {
    Keep,
    Remove,
}

impl From<RollbackArg> for RollbackPolicy {
    fn from(arg: RollbackArg) -> Self {
        match arg {
            RollbackArg::Keep => RollbackPolicy::KeepPartial,
            RollbackArg::Remove => RollbackPolicy::RemoveWritten,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(args: DownloadArgs) -> anyhow::Result<ExitCode> {
    crate::init_logging(args.debug);

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(rollback) = args.rollback {
        settings.download.rollback = rollback.into();
    }

    let cwd = std::env::current_dir()?;
    let dir = resolve_directory(args.dir.as_deref(), &settings, &cwd);
    if !dir.is_dir() {
        bail!("download directory {} does not exist", dir.display());
    }

    let request = build_request(&args, dir);
    let outcome = crate::download(&request, settings).await;

    if args.json {
        println!("{}", render_json(&outcome)?);
    } else {
        match &outcome {
            Ok(result) => print!("{}", render_text(result)),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Explicit argument first, then the configured default, then `cwd`.
pub fn resolve_directory(arg: Option<&Path>, settings: &AppSettings, cwd: &Path) -> PathBuf {
    let dir = arg
        .map(Path::to_path_buf)
        .or_else(|| settings.download.default_output_dir.clone())
        .unwrap_or_else(|| cwd.to_path_buf());
    if dir.is_absolute() {
        dir
    } else {
        cwd.join(dir)
    }
}

/// `--debug` shows the browser window in addition to the DEBUG log level.
pub fn build_request(args: &DownloadArgs, dir: PathBuf) -> MediaRequest {
    MediaRequest::new(args.url.clone(), dir).with_debug(args.debug)
}

pub fn render_text(result: &ExtractionResult) -> String {
    let mut out = format!("Downloaded {} files:\n", result.type_name());
    for file in result.files() {
        out.push_str(&format!(" - {}\n", file.display()));
    }
    out
}

fn render_json(outcome: &Result<ExtractionResult, Error>) -> anyhow::Result<String> {
    let report = match outcome {
        Ok(result) => Report {
            ok: true,
            result: Some(result),
            error: None,
        },
        Err(e) => Report {
            ok: false,
            result: None,
            error: Some(e.to_string()),
        },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    use tiksave_core::models::media::PhotoResult;

    fn parse(args: &[&str]) -> DownloadArgs {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Download(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn photo_result() -> ExtractionResult {
        ExtractionResult::Photo(PhotoResult {
            author_username: None,
            music_uri: None,
            files: vec![PathBuf::from("/out/1_Trip.jpg"), PathBuf::from("/out/Trip.mp3")],
            source_url: "https://www.tiktok.com/@alice/photo/1".into(),
        })
    }

    #[test]
    fn parses_minimal_download() {
        let args = parse(&["tiksave", "download", "https://vm.tiktok.com/x/"]);
        assert_eq!(args.url, "https://vm.tiktok.com/x/");
        assert_eq!(args.dir, None);
        assert!(!args.debug && !args.json);
        assert_eq!(args.rollback, None);
    }

    #[test]
    fn parses_all_flags() {
        let args = parse(&[
            "tiksave",
            "download",
            "https://www.tiktok.com/@a/video/1",
            "/tmp/out",
            "--debug",
            "--json",
            "--config",
            "/etc/tiksave.json",
            "--rollback",
            "remove",
        ]);
        assert_eq!(args.dir, Some(PathBuf::from("/tmp/out")));
        assert!(args.debug && args.json);
        assert_eq!(args.config, Some(PathBuf::from("/etc/tiksave.json")));
        assert_eq!(
            RollbackPolicy::from(args.rollback.unwrap()),
            RollbackPolicy::RemoveWritten
        );
    }

    #[test]
    fn rejects_unknown_rollback() {
        assert!(Cli::try_parse_from(["tiksave", "download", "u", "--rollback", "maybe"]).is_err());
    }

    #[test]
    fn parses_version() {
        let cli = Cli::try_parse_from(["tiksave", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn directory_precedence() {
        let cwd = Path::new("/work");
        let mut settings = AppSettings::default();
        assert_eq!(resolve_directory(None, &settings, cwd), PathBuf::from("/work"));

        settings.download.default_output_dir = Some(PathBuf::from("/saved"));
        assert_eq!(resolve_directory(None, &settings, cwd), PathBuf::from("/saved"));
        assert_eq!(
            resolve_directory(Some(Path::new("clips")), &settings, cwd),
            PathBuf::from("/work/clips")
        );
    }

    #[test]
    fn debug_flag_reaches_request() {
        let args = parse(&["tiksave", "download", "https://vm.tiktok.com/x/", "--debug"]);
        let request = build_request(&args, PathBuf::from("/out"));
        assert!(request.debug_enabled);
        assert_eq!(request.download_directory, PathBuf::from("/out"));

        let quiet = parse(&["tiksave", "download", "https://vm.tiktok.com/x/"]);
        assert!(!build_request(&quiet, PathBuf::from("/out")).debug_enabled);
    }

    #[test]
    fn text_output_lists_files() {
        assert_eq!(
            render_text(&photo_result()),
            "Downloaded photo files:\n - /out/1_Trip.jpg\n - /out/Trip.mp3\n"
        );
    }

    #[test]
    fn json_output_carries_result_or_error() {
        let ok: serde_json::Value =
            serde_json::from_str(&render_json(&Ok(photo_result())).unwrap()).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["result"]["type"], "photo");
        assert!(ok.get("error").is_none());

        let failed: serde_json::Value =
            serde_json::from_str(&render_json(&Err(Error::UnsupportedUrl("u".into()))).unwrap())
                .unwrap();
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["error"], "unsupported URL: u");
    }
}
