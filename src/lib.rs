//! Spec-driven command-line completion
//!
//! This library resolves a partially typed command line against a
//! declarative grammar of a tool (its subcommands, options, positional
//! arguments and dynamic value generators) and produces ranked completion
//! candidates.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: Resolution, generator execution, ranking and sessions
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//! - `spec`: Grammar model and loading
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use specomp::completion::{CompletionEngine, CompletionRequest};
//! use specomp::{Config, Spec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = Arc::new(Spec::from_file("specs/jenv.toml")?);
//!     let engine = CompletionEngine::from_config(spec, &Config::default());
//!
//!     for candidate in engine
//!         .complete(CompletionRequest::from_line("jenv gl", 7))
//!         .await
//!     {
//!         println!("{}", candidate.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod formatter;
pub mod spec;

// Re-export commonly used types
pub use completion::{Candidate, CompletionEngine, CompletionRequest, CompletionSession};
pub use config::Config;
pub use error::{Result, SpecompError};
pub use formatter::Formatter;
pub use spec::Spec;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
