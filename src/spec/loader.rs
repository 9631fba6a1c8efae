//! Spec loading and validation

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::model::{Argument, SpecNode, ValueSource};
use crate::error::{Result, SpecError};

/// Read and parse a spec file, choosing the format by extension
pub(super) fn read_file(path: &Path) -> Result<SpecNode> {
    let shown = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| SpecError::Read {
        path: shown.clone(),
        source,
    })?;

    debug!("Loaded spec file {} ({} bytes)", shown, text.len());

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml(&text),
        Some("json") => parse_json(&text),
        _ => Err(SpecError::UnknownFormat(shown).into()),
    }
}

pub(super) fn parse_toml(text: &str) -> Result<SpecNode> {
    toml::from_str(text).map_err(|e| SpecError::Parse(e.to_string()).into())
}

pub(super) fn parse_json(text: &str) -> Result<SpecNode> {
    serde_json::from_str(text).map_err(|e| SpecError::Parse(e.to_string()).into())
}

/// Check the structural invariants of a node tree
pub(super) fn validate(root: &SpecNode) -> Result<()> {
    validate_node(root, &root.name)?;
    Ok(())
}

fn validate_node(node: &SpecNode, path: &str) -> std::result::Result<(), SpecError> {
    if node.name.trim().is_empty() {
        return Err(SpecError::EmptyName {
            path: path.to_string(),
        });
    }

    let mut names = HashSet::new();
    for sub in &node.subcommands {
        if !names.insert(sub.name.as_str()) {
            return Err(SpecError::DuplicateSubcommand {
                path: path.to_string(),
                name: sub.name.clone(),
            });
        }
    }

    let mut aliases = HashSet::new();
    for option in &node.options {
        if option.aliases().is_empty() {
            return Err(SpecError::EmptyName {
                path: path.to_string(),
            });
        }
        for alias in option.aliases() {
            if !alias.starts_with('-') || alias.len() < 2 {
                return Err(SpecError::InvalidOptionAlias {
                    path: path.to_string(),
                    alias: alias.clone(),
                });
            }
            if !aliases.insert(alias.as_str()) {
                return Err(SpecError::DuplicateOption {
                    path: path.to_string(),
                    alias: alias.clone(),
                });
            }
        }
        if let Some(arg) = &option.args {
            validate_argument(arg, &format!("{path} {}", option.primary_name()))?;
        }
    }

    validate_positionals(&node.args, path)?;

    for sub in &node.subcommands {
        validate_node(sub, &format!("{path} {}", sub.name))?;
    }

    Ok(())
}

fn validate_positionals(args: &[Argument], path: &str) -> std::result::Result<(), SpecError> {
    let mut seen_optional = false;
    for (index, arg) in args.iter().enumerate() {
        validate_argument(arg, path)?;

        // A variadic argument must be the last one, which also caps the
        // count at one per node.
        if arg.is_variadic && index + 1 != args.len() {
            return Err(SpecError::VariadicNotLast {
                path: path.to_string(),
                argument: arg.name.clone(),
            });
        }
        if seen_optional && !arg.is_optional {
            return Err(SpecError::RequiredAfterOptional {
                path: path.to_string(),
                argument: arg.name.clone(),
            });
        }
        seen_optional |= arg.is_optional;
    }
    Ok(())
}

fn validate_argument(arg: &Argument, path: &str) -> std::result::Result<(), SpecError> {
    if arg.name.trim().is_empty() {
        return Err(SpecError::EmptyName {
            path: path.to_string(),
        });
    }
    if let Some(ValueSource::Generator(generator)) = &arg.source {
        if generator.command.trim().is_empty() {
            return Err(SpecError::EmptyGeneratorCommand {
                path: path.to_string(),
                argument: arg.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecompError;
    use crate::spec::{Generator, OptionSpec};
    use std::io::Write;

    fn spec_error(root: &SpecNode) -> SpecError {
        match validate(root) {
            Err(SpecompError::Spec(e)) => e,
            other => panic!("expected spec error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_tree() {
        let root = SpecNode::new("tool")
            .with_option(OptionSpec::flag(["--help", "-h"]))
            .with_subcommand(
                SpecNode::new("exec")
                    .with_arg(Argument::new("command"))
                    .with_arg(Argument::new("args").optional().variadic()),
            );
        assert!(validate(&root).is_ok());
    }

    #[test]
    fn test_variadic_must_be_last() {
        let root = SpecNode::new("tool")
            .with_arg(Argument::new("files").variadic())
            .with_arg(Argument::new("dest"));
        assert!(matches!(spec_error(&root), SpecError::VariadicNotLast { .. }));
    }

    #[test]
    fn test_two_variadics_rejected() {
        let root = SpecNode::new("tool")
            .with_arg(Argument::new("a").variadic())
            .with_arg(Argument::new("b").variadic());
        assert!(matches!(spec_error(&root), SpecError::VariadicNotLast { .. }));
    }

    #[test]
    fn test_required_after_optional() {
        let root = SpecNode::new("tool")
            .with_arg(Argument::new("a").optional())
            .with_arg(Argument::new("b"));
        assert!(matches!(
            spec_error(&root),
            SpecError::RequiredAfterOptional { .. }
        ));
    }

    #[test]
    fn test_duplicate_option_alias() {
        let root = SpecNode::new("tool")
            .with_option(OptionSpec::flag(["--verbose", "-v"]))
            .with_option(OptionSpec::flag(["--version", "-v"]));
        assert!(matches!(spec_error(&root), SpecError::DuplicateOption { .. }));
    }

    #[test]
    fn test_option_alias_needs_dash() {
        let root = SpecNode::new("tool").with_option(OptionSpec::flag(["help"]));
        assert!(matches!(
            spec_error(&root),
            SpecError::InvalidOptionAlias { .. }
        ));
    }

    #[test]
    fn test_nested_duplicate_reports_path() {
        let root = SpecNode::new("tool").with_subcommand(
            SpecNode::new("remote")
                .with_subcommand(SpecNode::new("add"))
                .with_subcommand(SpecNode::new("add")),
        );
        match spec_error(&root) {
            SpecError::DuplicateSubcommand { path, name } => {
                assert_eq!(path, "tool remote");
                assert_eq!(name, "add");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_generator_command() {
        let root = SpecNode::new("tool").with_arg(
            Argument::new("version").with_source(ValueSource::Generator(Generator::new("  "))),
        );
        assert!(matches!(
            spec_error(&root),
            SpecError::EmptyGeneratorCommand { .. }
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_toml("name = "),
            Err(SpecompError::Spec(SpecError::Parse(_)))
        ));
        assert!(matches!(
            parse_json("{\"description\": \"no name\"}"),
            Err(SpecompError::Spec(SpecError::Parse(_)))
        ));
    }

    #[test]
    fn test_read_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "name = \"tool\"").unwrap();
        let node = read_file(file.path()).unwrap();
        assert_eq!(node.name, "tool");

        let other = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            read_file(other.path()),
            Err(SpecompError::Spec(SpecError::UnknownFormat(_)))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_file(Path::new("/nonexistent/specomp/tool.toml")),
            Err(SpecompError::Spec(SpecError::Read { .. }))
        ));
    }
}
