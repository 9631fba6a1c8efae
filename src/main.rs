//! specomp - spec-driven command-line completion
//!
//! Resolves a partially typed command line against a declarative grammar and
//! prints ranked candidates.
//!
//! # Usage
//!
//! ```bash
//! specomp complete --line "jenv global 17"
//! specomp complete --index 2 -- jenv local ""
//! specomp check specs/jenv.toml
//! ```

use tracing::Level;

use specomp::cli::CliInterface;
use specomp::error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the selected subcommand
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);
    cli.run().await
}

/// Initialize logging to stderr, keeping stdout for candidates
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(cli.config().display.color_output);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
