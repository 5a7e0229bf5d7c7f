//! signdrill binary entry point.

use clap::Parser;
use tracing::{error, info};

use signdrill_client::{run, Cli};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_format = cli.log_format.into();
    if let Err(e) = signdrill_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format)
    {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), api_url = %cli.api_url, "signdrill starting");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    match rt.block_on(run(&cli)) {
        Ok(outcome) => {
            info!(?outcome, "signdrill finished");
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("signdrill: {}", e);
            std::process::exit(1);
        }
    }
}
