use std::process::ExitCode;

use clap::Parser;
use tiksave_lib::commands::{download, Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download(args) => match download::run(args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Version => {
            println!("tiksave {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    }
}
