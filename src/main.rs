mod cli;
mod client;
mod error;
mod logging;
mod model;
#[cfg(feature = "tui")]
mod orchestrator;
mod router;
mod session;
mod store;
mod templates;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod workflow;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let interactive = args.command.is_none() && !args.json;

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) if !interactive => {
            // One readable line per cause instead of the debug dump.
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}
