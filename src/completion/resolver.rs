//! Path resolution against the spec tree
//!
//! Walks the tokens before the cursor from the root node, descending into
//! subcommands, binding options and their values, and assigning the rest to
//! positional arguments. The outcome says what the active token is expected
//! to be. The walk is a single pass and always terminates.

use std::fmt;

use tracing::debug;

use super::token_stream::Token;
use crate::spec::{Argument, OptionSpec, Spec, SpecNode};

/// What the active token is expected to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expectation<'a> {
    /// A subcommand name, an option name, or a positional value
    Name {
        /// Subcommands of the current node may still appear
        subcommands: bool,
        /// Options are still being parsed (no `--` seen)
        options: bool,
        /// The next unconsumed positional argument, if any
        argument: Option<&'a Argument>,
    },
    /// The value of an option that takes an argument
    OptionValue {
        option: &'a OptionSpec,
        argument: &'a Argument,
    },
}

/// Successful resolution of the tokens before the cursor
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Nodes from the root to the currently open node
    pub path: Vec<&'a SpecNode>,
    /// Options already present on the line
    pub used_options: Vec<&'a OptionSpec>,
    pub expectation: Expectation<'a>,
}

impl<'a> Resolution<'a> {
    /// The currently open node
    pub fn node(&self) -> &'a SpecNode {
        self.path[self.path.len() - 1]
    }

    /// Names along the path, root first
    pub fn path_names(&self) -> Vec<String> {
        self.path.iter().map(|node| node.name.clone()).collect()
    }

    /// Whether an option was already given on the line
    pub fn is_used(&self, option: &OptionSpec) -> bool {
        self.used_options
            .iter()
            .any(|used| used.primary_name() == option.primary_name())
    }
}

/// A token that nothing in the current branch can consume.
///
/// Not an error for the user: the branch simply yields no suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMismatch {
    /// Index of the offending token in the stream
    pub index: usize,
    pub token: String,
    /// Name of the node that rejected it
    pub node: String,
}

impl fmt::Display for GrammarMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token '{}' at {} cannot be bound under '{}'",
            self.token, self.index, self.node
        )
    }
}

/// Walks a token sequence against a [`Spec`]
pub struct PathResolver<'a> {
    spec: &'a Spec,
}

impl<'a> PathResolver<'a> {
    pub fn new(spec: &'a Spec) -> Self {
        Self { spec }
    }

    /// Resolve the tokens before the cursor.
    ///
    /// `tokens[0]` is the command word and is never bound.
    pub fn resolve(&self, tokens: &[Token]) -> Result<Resolution<'a>, GrammarMismatch> {
        let mut path: Vec<&'a SpecNode> = vec![self.spec.root()];
        let mut used_options: Vec<&'a OptionSpec> = Vec::new();
        let mut pending: Option<&'a OptionSpec> = None;
        let mut positional = 0usize;
        let mut options_ended = false;

        for (index, token) in tokens.iter().enumerate().skip(1) {
            let text = token.text.as_str();
            let node = path[path.len() - 1];

            if let Some(option) = pending.take() {
                let optional = option.args.as_ref().is_some_and(|a| a.is_optional);
                if !(optional && text.starts_with('-')) {
                    continue;
                }
            }

            if !options_ended && text == "--" {
                options_ended = true;
                continue;
            }

            // Grammar before data: a subcommand name wins over a positional
            // value that happens to spell the same.
            if positional == 0 && !options_ended {
                if let Some(child) = node.subcommand(text) {
                    path.push(child);
                    continue;
                }
            }

            if !options_ended && is_option_like(text) {
                let (name, inline_value) = split_inline_value(text);
                if let Some(option) = self.lookup_option(&path, name) {
                    used_options.push(option);
                    if option.args.is_some() && inline_value.is_none() {
                        pending = Some(option);
                    }
                    continue;
                }
            }

            if node.argument(positional).is_some() {
                positional += 1;
                continue;
            }

            let mismatch = GrammarMismatch {
                index,
                token: text.to_string(),
                node: node.name.clone(),
            };
            debug!("Resolution dead-end: {}", mismatch);
            return Err(mismatch);
        }

        let node = path[path.len() - 1];
        let expectation = match pending.and_then(|o| o.args.as_ref().map(|a| (o, a))) {
            Some((option, argument)) => Expectation::OptionValue { option, argument },
            None => Expectation::Name {
                subcommands: positional == 0 && !options_ended && !node.is_leaf(),
                options: !options_ended,
                argument: node.argument(positional),
            },
        };

        Ok(Resolution {
            path,
            used_options,
            expectation,
        })
    }

    /// Options applicable at the end of `path`, nearest first.
    ///
    /// The node's own options, then ancestors' options up to the first node
    /// that does not inherit, then the ambient (root) set.
    pub fn applicable_options(&self, path: &[&'a SpecNode]) -> Vec<&'a OptionSpec> {
        let mut options: Vec<&'a OptionSpec> = Vec::new();
        let push = |option: &'a OptionSpec, options: &mut Vec<&'a OptionSpec>| {
            if !options
                .iter()
                .any(|seen| seen.primary_name() == option.primary_name())
            {
                options.push(option);
            }
        };

        for node in path.iter().rev() {
            for option in &node.options {
                push(option, &mut options);
            }
            if !node.inherit_options {
                break;
            }
        }
        for option in self.spec.ambient_options() {
            push(option, &mut options);
        }
        options
    }

    fn lookup_option(&self, path: &[&'a SpecNode], alias: &str) -> Option<&'a OptionSpec> {
        self.applicable_options(path)
            .into_iter()
            .find(|option| option.matches(alias))
    }
}

fn is_option_like(text: &str) -> bool {
    text.len() > 1 && text.starts_with('-')
}

/// Split `--name=value` into its parts
fn split_inline_value(text: &str) -> (&str, Option<&str>) {
    match text.split_once('=') {
        Some((name, value)) if name.starts_with("--") => (name, Some(value)),
        _ => (text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::TokenStream;
    use crate::spec::{Choice, ValueSource};

    fn resolve<'a>(spec: &'a Spec, line: &str) -> Result<Resolution<'a>, GrammarMismatch> {
        let stream = TokenStream::tokenize(line, line.len());
        PathResolver::new(spec).resolve(stream.tokens_before_cursor())
    }

    fn test_spec() -> Spec {
        Spec::new(
            SpecNode::new("tool")
                .with_option(OptionSpec::flag(["--help", "-h"]))
                .with_subcommand(
                    SpecNode::new("remote")
                        .with_option(OptionSpec::flag(["--verbose", "-v"]))
                        .with_subcommand(
                            SpecNode::new("add")
                                .with_option(
                                    OptionSpec::flag(["--track", "-t"])
                                        .with_arg(Argument::new("branch"))
                                        .repeatable(),
                                )
                                .with_arg(Argument::new("name"))
                                .with_arg(Argument::new("url")),
                        )
                        .with_subcommand({
                            let mut isolated = SpecNode::new("isolated");
                            isolated.inherit_options = false;
                            isolated
                        }),
                )
                .with_subcommand(
                    SpecNode::new("exec")
                        .with_arg(Argument::new("command"))
                        .with_arg(Argument::new("args").optional().variadic()),
                )
                .with_subcommand(SpecNode::new("doctor"))
                .with_subcommand(SpecNode::new("pick").with_arg(
                    Argument::new("item").with_source(ValueSource::Static {
                        choices: vec![Choice::new("exec"), Choice::new("other")],
                    }),
                )),
        )
        .unwrap()
    }

    #[test]
    fn test_root_expects_names() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool ").unwrap();

        assert_eq!(resolution.node().name, "tool");
        assert_eq!(
            resolution.expectation,
            Expectation::Name {
                subcommands: true,
                options: true,
                argument: None
            }
        );
    }

    #[test]
    fn test_descend_into_nested_subcommand() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool remote add ").unwrap();

        assert_eq!(resolution.path_names(), vec!["tool", "remote", "add"]);
        match resolution.expectation {
            Expectation::Name {
                subcommands,
                argument,
                ..
            } => {
                assert!(!subcommands);
                assert_eq!(argument.map(|a| a.name.as_str()), Some("name"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_option_value_binding() {
        let spec = test_spec();

        let resolution = resolve(&spec, "tool remote add --track ").unwrap();
        assert!(matches!(
            resolution.expectation,
            Expectation::OptionValue { argument, .. } if argument.name == "branch"
        ));

        // The value is consumed, so "origin" binds the first positional
        let resolution = resolve(&spec, "tool remote add -t main origin ").unwrap();
        match resolution.expectation {
            Expectation::Name { argument, .. } => {
                assert_eq!(argument.map(|a| a.name.as_str()), Some("url"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_inline_option_value() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool remote add --track=main ").unwrap();

        assert!(matches!(resolution.expectation, Expectation::Name { .. }));
        assert_eq!(resolution.used_options.len(), 1);
    }

    #[test]
    fn test_ancestor_and_ambient_options() {
        let spec = test_spec();

        let resolution = resolve(&spec, "tool remote add -v --help ").unwrap();
        assert_eq!(resolution.used_options.len(), 2);

        let resolver = PathResolver::new(&spec);
        let names: Vec<&str> = resolver
            .applicable_options(&resolution.path)
            .iter()
            .map(|o| o.primary_name())
            .collect();
        assert_eq!(names, vec!["--track", "--verbose", "--help"]);
    }

    #[test]
    fn test_non_inheriting_node_keeps_ambient_only() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool remote isolated ").unwrap();

        let resolver = PathResolver::new(&spec);
        let names: Vec<&str> = resolver
            .applicable_options(&resolution.path)
            .iter()
            .map(|o| o.primary_name())
            .collect();
        assert_eq!(names, vec!["--help"]);

        // --verbose belongs to the parent and is not accepted here
        assert!(resolve(&spec, "tool remote isolated --verbose ").is_err());
    }

    #[test]
    fn test_variadic_absorbs_everything() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool exec java -jar app.jar --debug ").unwrap();

        match resolution.expectation {
            Expectation::Name {
                subcommands,
                argument,
                ..
            } => {
                assert!(!subcommands);
                assert_eq!(argument.map(|a| a.name.as_str()), Some("args"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_double_dash_ends_options() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool exec -- ").unwrap();

        assert_eq!(
            resolution.expectation,
            Expectation::Name {
                subcommands: false,
                options: false,
                argument: spec.root().subcommand("exec").unwrap().argument(0),
            }
        );
    }

    #[test]
    fn test_grammar_mismatch() {
        let spec = test_spec();

        let err = resolve(&spec, "tool doctor extra ").unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.token, "extra");
        assert_eq!(err.node, "doctor");

        assert!(resolve(&spec, "tool nonsense ").is_err());
    }

    #[test]
    fn test_subcommand_wins_over_static_choice() {
        let spec = test_spec();

        // "pick" has no subcommands, so "exec" binds as its argument
        let resolution = resolve(&spec, "tool pick exec ").unwrap();
        assert_eq!(resolution.path_names(), vec!["tool", "pick"]);

        // At the root "exec" is a subcommand
        let resolution = resolve(&spec, "tool exec ").unwrap();
        assert_eq!(resolution.path_names(), vec!["tool", "exec"]);
    }

    #[test]
    fn test_unknown_dash_token_binds_positional() {
        let spec = test_spec();
        let resolution = resolve(&spec, "tool exec -weird ").unwrap();

        match resolution.expectation {
            Expectation::Name { argument, .. } => {
                assert_eq!(argument.map(|a| a.name.as_str()), Some("args"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_command_word_only() {
        let spec = test_spec();
        let stream = TokenStream::tokenize("", 0);
        let resolution = PathResolver::new(&spec)
            .resolve(stream.tokens_before_cursor())
            .unwrap();
        assert_eq!(resolution.path_names(), vec!["tool"]);
    }
}
