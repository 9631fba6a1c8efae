//! Spec model
//!
//! In-memory representation of a tool's grammar: a tree of subcommands, each
//! with options, positional arguments and nested subcommands. A [`Spec`] is
//! built once, validated, and immutable afterwards.
//!
//! # Examples
//!
//! ```no_run
//! use specomp::spec::Spec;
//!
//! # fn main() -> specomp::Result<()> {
//! let spec = Spec::from_file("specs/jenv.toml")?;
//! assert!(spec.root().subcommand("global").is_some());
//! # Ok(())
//! # }
//! ```

mod loader;
mod model;

use std::path::Path;

pub use model::{
    Aliases, Argument, Choice, DEFAULT_PRIORITY, FilterStrategy, Generator, LineMapper,
    OptionSpec, PathTemplate, SpecNode, ValueSource,
};

use crate::error::Result;

/// Grammar bundled for the Java environment manager
const JENV_SPEC: &str = include_str!("../../specs/jenv.toml");

/// A validated grammar tree plus its ambient option set
#[derive(Debug, Clone)]
pub struct Spec {
    root: SpecNode,
    /// Options applicable at every depth (the root's options)
    ambient: Vec<OptionSpec>,
}

impl Spec {
    /// Validate a node tree and build a spec from it
    pub fn new(root: SpecNode) -> Result<Self> {
        loader::validate(&root)?;
        let ambient = root.options.clone();
        Ok(Self { root, ambient })
    }

    /// Load a spec from a `.toml` or `.json` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(loader::read_file(path.as_ref())?)
    }

    /// Parse a spec from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::new(loader::parse_toml(text)?)
    }

    /// Parse a spec from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::new(loader::parse_json(text)?)
    }

    /// The bundled `jenv` grammar
    pub fn jenv() -> Result<Self> {
        Self::from_toml_str(JENV_SPEC)
    }

    /// Root node (the tool itself)
    pub fn root(&self) -> &SpecNode {
        &self.root
    }

    /// Options merged into every node's lookup
    pub fn ambient_options(&self) -> &[OptionSpec] {
        &self.ambient
    }

    /// Count of subcommand nodes below the root
    pub fn subcommand_count(&self) -> usize {
        fn count(node: &SpecNode) -> usize {
            node.subcommands.iter().map(|sub| 1 + count(sub)).sum()
        }
        count(&self.root)
    }

    /// Count of generator-backed arguments anywhere in the tree
    pub fn generator_count(&self) -> usize {
        fn is_generator(arg: &Argument) -> bool {
            matches!(arg.source, Some(ValueSource::Generator(_)))
        }
        fn count(node: &SpecNode) -> usize {
            let own = node.args.iter().filter(|a| is_generator(a)).count()
                + node
                    .options
                    .iter()
                    .filter_map(|o| o.args.as_ref())
                    .filter(|a| is_generator(a))
                    .count();
            own + node.subcommands.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}
