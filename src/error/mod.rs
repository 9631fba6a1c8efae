//! Error handling for specomp.
//!
//! Only two kinds of failure ever reach a caller: a spec that cannot be
//! loaded and a configuration that cannot be read. Everything that happens
//! while serving a completion request (grammar dead-ends, failing or slow
//! generators) is absorbed inside the engine and shows up as fewer
//! candidates.
//!
//! # Example
//!
//! ```rust,no_run
//! use specomp::error::Result;
//! use specomp::spec::Spec;
//!
//! fn load() -> Result<Spec> {
//!     let spec = Spec::from_file("specs/jenv.toml")?;
//!     Ok(spec)
//! }
//! ```

pub mod kinds;

pub use kinds::{ConfigError, GeneratorError, Result, SpecError, SpecompError};
