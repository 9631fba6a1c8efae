//! Command-line interface for specomp
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and argument overrides
//! - Dispatch of the `complete`, `check`, `completion` and `version` commands

mod completion;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::completion::{CompletionEngine, CompletionRequest};
use crate::config::{Config, LogLevel, OutputFormat};
use crate::error::{ConfigError, Result, SpecompError};
use crate::formatter::Formatter;
use crate::spec::Spec;

pub use completion::generate_completion;

/// Spec-driven command-line completion engine
#[derive(Parser, Debug)]
#[command(
    name = "specomp",
    version,
    about = "Spec-driven command-line completion engine",
    long_about = "Resolves a partially typed command line against a declarative CLI grammar
and prints ranked completion candidates, running generator commands for dynamic values."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Output format (text, json, table)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Generator timeout in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub timeout: Option<u64>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for specomp
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print completion candidates for a command line
    Complete {
        /// Spec file (.toml or .json); the bundled jenv spec when omitted
        #[arg(short = 's', long, value_name = "FILE")]
        spec: Option<PathBuf>,

        /// Raw command line
        #[arg(long, value_name = "LINE", conflicts_with = "words")]
        line: Option<String>,

        /// Cursor byte offset into --line (defaults to its end)
        #[arg(long, value_name = "BYTES", requires = "line")]
        cursor: Option<usize>,

        /// Index of the active word (defaults to the last word)
        #[arg(long, value_name = "N")]
        index: Option<usize>,

        /// Working directory generators run in
        #[arg(long, value_name = "DIR")]
        cwd: Option<PathBuf>,

        /// Maximum number of candidates (0 for no limit)
        #[arg(long, value_name = "N")]
        max: Option<usize>,

        /// Pre-split words, command word first
        #[arg(last = true, value_name = "WORDS")]
        words: Vec<String>,
    },

    /// Load a spec and print a summary
    Check {
        /// Spec file (.toml or .json); the bundled jenv spec when omitted
        #[arg(value_name = "FILE")]
        spec: Option<PathBuf>,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show version information
    Version,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(args: CliArgs) -> Result<Self> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, &args)?;
        config.validate()?;
        Ok(Self { args, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        if let Some(format_str) = &args.format {
            config.display.format = Self::parse_output_format(format_str)?;
        }
        if args.no_color {
            config.display.color_output = false;
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };

        if let Some(timeout) = args.timeout {
            config.generator.timeout_ms = timeout;
        }
        if let Commands::Complete { max: Some(max), .. } = &args.command {
            config.ranking.max_results = *max;
        }
        Ok(())
    }

    /// Parse output format string
    fn parse_output_format(format_str: &str) -> Result<OutputFormat> {
        match format_str.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: format_str.to_string(),
            }
            .into()),
        }
    }

    /// Run the selected subcommand
    pub async fn run(&self) -> Result<()> {
        match &self.args.command {
            Commands::Complete {
                spec,
                line,
                cursor,
                index,
                cwd,
                words,
                ..
            } => {
                let spec = Self::load_spec(spec.as_deref())?;
                let request = Self::build_request(line.as_deref(), *cursor, *index, words)?;
                let request = match cwd {
                    Some(dir) => request.with_cwd(dir),
                    None => request,
                };
                self.complete(spec, request).await
            }
            Commands::Check { spec } => {
                let spec = Self::load_spec(spec.as_deref())?;
                println!("{}", Formatter::from_config(&self.config).format_spec_summary(&spec));
                Ok(())
            }
            Commands::Completion { shell } => generate_completion(shell),
            Commands::Version => {
                self.show_version();
                Ok(())
            }
        }
    }

    async fn complete(&self, spec: Spec, request: CompletionRequest) -> Result<()> {
        let engine = CompletionEngine::from_config(Arc::new(spec), &self.config);
        let candidates = engine.complete(request).await;
        let output = Formatter::from_config(&self.config).format(&candidates)?;
        if !output.is_empty() {
            println!("{}", output);
        }
        Ok(())
    }

    /// Load a spec file, or the bundled jenv spec
    fn load_spec(path: Option<&Path>) -> Result<Spec> {
        match path {
            Some(path) => Spec::from_file(path),
            None => Spec::jenv(),
        }
    }

    fn build_request(
        line: Option<&str>,
        cursor: Option<usize>,
        index: Option<usize>,
        words: &[String],
    ) -> Result<CompletionRequest> {
        if let Some(line) = line {
            let cursor = cursor.unwrap_or(line.len());
            return Ok(CompletionRequest::from_line(line, cursor));
        }
        if words.is_empty() {
            return Err(SpecompError::Generic(
                "nothing to complete: pass --line or words after --".to_string(),
            ));
        }
        let active = index.unwrap_or(words.len() - 1);
        Ok(CompletionRequest::from_words(words.iter().cloned(), active))
    }

    /// Show version information
    fn show_version(&self) {
        println!("specomp version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }
}
