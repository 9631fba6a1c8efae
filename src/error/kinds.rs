use std::{fmt, io};
use std::time::Duration;

/// Crate-wide `Result` type using [`SpecompError`] as the error.
pub type Result<T> = std::result::Result<T, SpecompError>;

/// Top-level error type for specomp operations.
#[derive(Debug)]
pub enum SpecompError {
    /// The completion spec could not be loaded.
    Spec(SpecError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Malformed spec at load time. Fatal: no completion can be served
/// without a valid grammar.
#[derive(Debug)]
pub enum SpecError {
    /// Spec file not found or unreadable.
    Read { path: String, source: io::Error },

    /// The file is not valid TOML/JSON or does not match the spec shape.
    Parse(String),

    /// Unsupported spec file extension.
    UnknownFormat(String),

    /// A node, option or argument has an empty name.
    EmptyName { path: String },

    /// Two sibling subcommands share a name.
    DuplicateSubcommand { path: String, name: String },

    /// Two options of one node share an alias.
    DuplicateOption { path: String, alias: String },

    /// Option alias does not look like a flag.
    InvalidOptionAlias { path: String, alias: String },

    /// Variadic argument is not the last positional argument.
    VariadicNotLast { path: String, argument: String },

    /// A required argument follows an optional one.
    RequiredAfterOptional { path: String, argument: String },

    /// Generator declared without a command.
    EmptyGeneratorCommand { path: String, argument: String },
}

/// Failure of a single generator invocation.
///
/// Never surfaces to the end user: the executor logs it and treats the
/// generator as having produced no candidates.
#[derive(Debug)]
pub enum GeneratorError {
    /// The process could not be spawned or its output could not be read.
    Spawn(io::Error),

    /// The process exited unsuccessfully.
    ExitStatus(Option<i32>),

    /// The process did not finish in time.
    Timeout(Duration),

    /// The owning request was superseded.
    Cancelled,
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found or unreadable.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for SpecompError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecompError::Spec(e) => write!(f, "Spec error: {e}"),
            SpecompError::Config(e) => write!(f, "Configuration error: {e}"),
            SpecompError::Io(e) => write!(f, "I/O error: {e}"),
            SpecompError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::Read { path, source } => write!(f, "cannot read {path}: {source}"),
            SpecError::Parse(msg) => write!(f, "invalid spec: {msg}"),
            SpecError::UnknownFormat(path) => {
                write!(f, "unknown spec format for {path} (expected .toml or .json)")
            }
            SpecError::EmptyName { path } => write!(f, "empty name under '{path}'"),
            SpecError::DuplicateSubcommand { path, name } => {
                write!(f, "duplicate subcommand '{name}' under '{path}'")
            }
            SpecError::DuplicateOption { path, alias } => {
                write!(f, "duplicate option '{alias}' under '{path}'")
            }
            SpecError::InvalidOptionAlias { path, alias } => {
                write!(f, "option '{alias}' under '{path}' must start with '-'")
            }
            SpecError::VariadicNotLast { path, argument } => {
                write!(f, "variadic argument '{argument}' under '{path}' must be last")
            }
            SpecError::RequiredAfterOptional { path, argument } => {
                write!(
                    f,
                    "required argument '{argument}' under '{path}' follows an optional one"
                )
            }
            SpecError::EmptyGeneratorCommand { path, argument } => {
                write!(f, "generator for '{argument}' under '{path}' has no command")
            }
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Spawn(e) => write!(f, "failed to run generator: {e}"),
            GeneratorError::ExitStatus(Some(code)) => {
                write!(f, "generator exited with status {code}")
            }
            GeneratorError::ExitStatus(None) => write!(f, "generator terminated by signal"),
            GeneratorError::Timeout(limit) => {
                write!(f, "generator timed out after {}ms", limit.as_millis())
            }
            GeneratorError::Cancelled => write!(f, "generator cancelled"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for SpecompError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpecompError::Spec(e) => Some(e),
            SpecompError::Config(e) => Some(e),
            SpecompError::Io(e) => Some(e),
            SpecompError::Generic(_) => None,
        }
    }
}

impl std::error::Error for SpecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpecError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for GeneratorError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to SpecompError ========================= */

impl From<io::Error> for SpecompError {
    fn from(err: io::Error) -> Self {
        SpecompError::Io(err)
    }
}

impl From<SpecError> for SpecompError {
    fn from(err: SpecError) -> Self {
        SpecompError::Spec(err)
    }
}

impl From<ConfigError> for SpecompError {
    fn from(err: ConfigError) -> Self {
        SpecompError::Config(err)
    }
}

impl From<String> for SpecompError {
    fn from(msg: String) -> Self {
        SpecompError::Generic(msg)
    }
}

impl From<&str> for SpecompError {
    fn from(msg: &str) -> Self {
        SpecompError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_error_display() {
        let err = SpecError::DuplicateSubcommand {
            path: "jenv".to_string(),
            name: "global".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate subcommand 'global' under 'jenv'");

        let wrapped: SpecompError = err.into();
        assert!(wrapped.to_string().starts_with("Spec error: "));
    }

    #[test]
    fn test_generator_error_display() {
        assert_eq!(
            GeneratorError::ExitStatus(Some(1)).to_string(),
            "generator exited with status 1"
        );
        assert_eq!(
            GeneratorError::Timeout(Duration::from_millis(250)).to_string(),
            "generator timed out after 250ms"
        );
    }

    #[test]
    fn test_source_chain() {
        let err = SpecompError::from(SpecError::Read {
            path: "missing.toml".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        });
        let source = std::error::Error::source(&err).expect("spec error source");
        assert!(std::error::Error::source(source).is_some());
    }
}
