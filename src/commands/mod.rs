use clap::{Parser, Subcommand};

pub mod download;

#[derive(Parser, Debug)]
#[command(
    name = "tiksave",
    about = "Save TikTok videos, photo carousels and music tracks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the media behind a TikTok URL
    Download(download::DownloadArgs),
    /// Print the version and exit
    Version,
}
