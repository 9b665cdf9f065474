mod cli;
mod config;
mod currency;
mod dictionary;
mod error;
mod http;
mod logging;
mod metrics;
mod motion;
mod proposals;
mod puzzle;
mod reliability;
mod storage;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod weather;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_tracing(args.verbose);
    let is_json = args.json;

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if is_json {
                // Keep stdout machine-readable on failure too.
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
                std::process::exit(1);
            } else {
                Err(e)
            }
        }
    }
}
