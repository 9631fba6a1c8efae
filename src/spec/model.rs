//! Spec model types
//!
//! The grammar of a completed tool as plain, serialisable data. Dynamic
//! behaviour is expressed through the tagged [`ValueSource`] variants so that
//! the executor dispatches on a tag instead of calling embedded closures.

use serde::{Deserialize, Serialize};

use crate::completion::{Candidate, CandidateKind, CandidateSource};

/// Priority given to entries that do not declare one
pub const DEFAULT_PRIORITY: i32 = 50;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn default_true() -> bool {
    true
}

/// A subcommand, or the root tool itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecNode {
    /// Name, unique among siblings
    pub name: String,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Nested subcommands, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SpecNode>,

    /// Options accepted by this node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,

    /// Positional arguments, in binding order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,

    /// Whether options of ancestor nodes apply below this node
    #[serde(default = "default_true")]
    pub inherit_options: bool,

    /// Ranking priority when suggested as a subcommand
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Display icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl SpecNode {
    /// Create an empty node with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            subcommands: Vec::new(),
            options: Vec::new(),
            args: Vec::new(),
            inherit_options: true,
            priority: DEFAULT_PRIORITY,
            icon: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a subcommand
    pub fn with_subcommand(mut self, node: SpecNode) -> Self {
        self.subcommands.push(node);
        self
    }

    /// Add an option
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Add a positional argument
    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    /// Look up a direct child by exact name
    pub fn subcommand(&self, name: &str) -> Option<&SpecNode> {
        self.subcommands.iter().find(|sub| sub.name == name)
    }

    /// Look up an option declared on this node by any of its aliases
    pub fn option(&self, alias: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|opt| opt.matches(alias))
    }

    /// Positional argument that binds the `index`-th positional token.
    ///
    /// A trailing variadic argument absorbs every index past its own.
    pub fn argument(&self, index: usize) -> Option<&Argument> {
        match self.args.get(index) {
            Some(arg) => Some(arg),
            None => self.args.last().filter(|arg| arg.is_variadic),
        }
    }

    /// A node without subcommands is a leaf command
    pub fn is_leaf(&self) -> bool {
        self.subcommands.is_empty()
    }
}

/// A flag or option, with one or more spellings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionSpec {
    /// Accepted spellings, e.g. `["--help", "-h"]`
    pub name: Aliases,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value taken by the option; `None` makes it a boolean flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Argument>,

    /// May appear more than once on a command line
    #[serde(default)]
    pub is_repeatable: bool,

    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl OptionSpec {
    /// Create a boolean flag from a list of aliases
    pub fn flag<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Aliases(aliases.into_iter().map(Into::into).collect()),
            description: None,
            args: None,
            is_repeatable: false,
            priority: DEFAULT_PRIORITY,
            icon: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Make the option take a value
    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.args = Some(arg);
        self
    }

    /// Allow the option to be given more than once
    pub fn repeatable(mut self) -> Self {
        self.is_repeatable = true;
        self
    }

    /// Check whether `alias` is one of this option's spellings
    pub fn matches(&self, alias: &str) -> bool {
        self.name.0.iter().any(|name| name == alias)
    }

    /// First declared spelling
    pub fn primary_name(&self) -> &str {
        self.name.0.first().map(String::as_str).unwrap_or_default()
    }

    /// All spellings
    pub fn aliases(&self) -> &[String] {
        &self.name.0
    }

    /// An option without an argument is a boolean flag
    pub fn is_flag(&self) -> bool {
        self.args.is_none()
    }
}

/// Option spellings; deserialises from a single string or an array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "AliasRepr", into = "Vec<String>")]
pub struct Aliases(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum AliasRepr {
    One(String),
    Many(Vec<String>),
}

impl From<AliasRepr> for Aliases {
    fn from(repr: AliasRepr) -> Self {
        match repr {
            AliasRepr::One(name) => Aliases(vec![name]),
            AliasRepr::Many(names) => Aliases(names),
        }
    }
}

impl From<Aliases> for Vec<String> {
    fn from(aliases: Aliases) -> Self {
        aliases.0
    }
}

/// A positional argument or an option's value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Argument {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_optional: bool,

    /// Consumes every remaining positional token
    #[serde(default)]
    pub is_variadic: bool,

    /// How the partial token is matched against this argument's candidates
    #[serde(default)]
    pub filter_strategy: FilterStrategy,

    /// Where candidate values come from; `None` means free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ValueSource>,
}

impl Argument {
    /// Create a free-text argument
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_optional: false,
            is_variadic: false,
            filter_strategy: FilterStrategy::default(),
            source: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn with_strategy(mut self, strategy: FilterStrategy) -> Self {
        self.filter_strategy = strategy;
        self
    }

    pub fn with_source(mut self, source: ValueSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// Matching strategy applied to one argument's candidates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FilterStrategy {
    /// Case-insensitive prefix match
    #[default]
    Prefix,
    /// Case-sensitive prefix match
    PrefixCaseSensitive,
    /// Ordered subsequence match
    Fuzzy,
}

/// Origin of an argument's candidate values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValueSource {
    /// Fixed list of choices
    Static { choices: Vec<Choice> },
    /// Entries of the filesystem
    Template { template: PathTemplate },
    /// Output of an external command
    Generator(Generator),
}

/// Filesystem listing kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PathTemplate {
    /// Files and directories
    Filepaths,
    /// Directories only
    Folders,
}

/// One static choice; deserialises from a bare string or a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "ChoiceRepr")]
pub struct Choice {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub priority: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default = "default_priority")]
        priority: i32,
    },
}

impl From<ChoiceRepr> for Choice {
    fn from(repr: ChoiceRepr) -> Self {
        match repr {
            ChoiceRepr::Name(name) => Choice::new(name),
            ChoiceRepr::Full {
                name,
                description,
                icon,
                priority,
            } => Choice {
                name,
                description,
                icon,
                priority,
            },
        }
    }
}

impl Choice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: None,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Convert to a static candidate
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            value: self.name.clone(),
            label: None,
            description: self.description.clone(),
            icon: self.icon.clone(),
            priority: self.priority,
            kind: CandidateKind::Argument,
            source: CandidateSource::Static,
        }
    }
}

/// A dynamic value source backed by a shell command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Generator {
    /// Shell command, executed with the configured shell
    pub command: String,

    /// Environment variables whose values influence the output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,

    /// Per-generator wait limit, overriding the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Mapping from output lines to candidates
    #[serde(default)]
    pub post_process: LineMapper,
}

impl Generator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: Vec::new(),
            timeout_ms: None,
            post_process: LineMapper::default(),
        }
    }

    pub fn with_post_process(mut self, mapper: LineMapper) -> Self {
        self.post_process = mapper;
        self
    }
}

/// Declarative post-processing of generator output.
///
/// Each trimmed, non-empty line is considered independently; lines that do
/// not have the expected shape are dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineMapper {
    /// Keep only lines starting with this text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_prefix: Option<String>,

    /// Drop lines equal to any of these
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Keep only the last `/`-separated segment
    #[serde(default)]
    pub basename: bool,

    /// Order mapped values by name instead of output order
    #[serde(default)]
    pub sort: bool,

    /// Description template; `{}` is replaced by the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display label template; `{}` is replaced by the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl Default for LineMapper {
    fn default() -> Self {
        Self {
            require_prefix: None,
            exclude: Vec::new(),
            basename: false,
            sort: false,
            description: None,
            label: None,
            icon: None,
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl LineMapper {
    /// Map raw command output to candidates, in output order unless sorted
    pub fn apply(&self, output: &str) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> =
            output.lines().filter_map(|line| self.map_line(line)).collect();
        if self.sort {
            candidates.sort_by(|a, b| a.value.cmp(&b.value));
        }
        candidates
    }

    /// Map a single output line, or drop it
    pub fn map_line(&self, line: &str) -> Option<Candidate> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(prefix) = &self.require_prefix {
            if !line.starts_with(prefix.as_str()) {
                return None;
            }
        }
        if self.exclude.iter().any(|excluded| excluded == line) {
            return None;
        }

        let value = if self.basename {
            line.rsplit('/').next().unwrap_or(line)
        } else {
            line
        };
        if value.is_empty() {
            return None;
        }

        Some(Candidate {
            value: value.to_string(),
            label: self.label.as_deref().map(|t| fill_template(t, value)),
            description: self.description.as_deref().map(|t| fill_template(t, value)),
            icon: self.icon.clone(),
            priority: self.priority,
            kind: CandidateKind::Argument,
            source: CandidateSource::Generated,
        })
    }
}

fn fill_template(template: &str, value: &str) -> String {
    template.replace("{}", value)
}
