//! Output formatting for completion results
//!
//! Candidate lists render as plain text (one per line, description dimmed),
//! JSON, or a table. Spec summaries for `check` are formatted here too.

mod table;

use nu_ansi_term::{Color, Style};

pub use table::TableFormatter;

use crate::completion::Candidate;
use crate::config::{Config, OutputFormat};
use crate::error::{Result, SpecompError};
use crate::spec::{Spec, SpecNode};

/// Main formatter for candidate lists
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,

    /// Enable colored output
    use_colors: bool,
}

impl Formatter {
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            use_colors,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.display.format, config.display.color_output)
    }

    /// Format candidates according to the configured format
    pub fn format(&self, candidates: &[Candidate]) -> Result<String> {
        match self.format_type {
            OutputFormat::Text => Ok(self.format_text(candidates)),
            OutputFormat::Json => self.format_json(candidates),
            OutputFormat::Table => Ok(TableFormatter::new(self.use_colors).format(candidates)),
        }
    }

    /// One candidate per line: `value<TAB>description`.
    ///
    /// The value comes first and alone in its column so shell glue can cut it.
    pub fn format_text(&self, candidates: &[Candidate]) -> String {
        let description_style = Style::new().dimmed();
        candidates
            .iter()
            .map(|candidate| {
                let value = candidate.value.clone();
                match &candidate.description {
                    Some(description) if self.use_colors => {
                        format!("{}\t{}", value, description_style.paint(description))
                    }
                    Some(description) => format!("{}\t{}", value, description),
                    None => value,
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// JSON array of candidate objects
    pub fn format_json(&self, candidates: &[Candidate]) -> Result<String> {
        serde_json::to_string_pretty(candidates)
            .map_err(|e| SpecompError::Generic(format!("cannot serialize candidates: {e}")))
    }

    /// Summary of a loaded spec: counts plus the subcommand tree
    pub fn format_spec_summary(&self, spec: &Spec) -> String {
        let heading = if self.use_colors {
            Style::new().bold().fg(Color::Green).paint(&spec.root().name).to_string()
        } else {
            spec.root().name.clone()
        };

        let mut lines = vec![format!(
            "{}: {} subcommands, {} generators, {} global options",
            heading,
            spec.subcommand_count(),
            spec.generator_count(),
            spec.ambient_options().len()
        )];
        for child in &spec.root().subcommands {
            self.push_tree(child, 1, &mut lines);
        }
        lines.join("\n")
    }

    fn push_tree(&self, node: &SpecNode, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let line = match &node.description {
            Some(description) if self.use_colors => format!(
                "{}{}  {}",
                indent,
                node.name,
                Style::new().fg(Color::DarkGray).paint(description)
            ),
            Some(description) => format!("{}{}  {}", indent, node.name, description),
            None => format!("{}{}", indent, node.name),
        };
        lines.push(line);
        for child in &node.subcommands {
            self.push_tree(child, depth + 1, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CandidateKind;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new("17.0.1", CandidateKind::Argument)
                .with_description(Some("Java Version 17.0.1".into()))
                .with_icon(Some("☕️".into())),
            Candidate::new("--help", CandidateKind::Option)
                .with_icon(Some("fig://icon?type=option".into())),
        ]
    }

    #[test]
    fn test_text_without_colors() {
        let output = Formatter::new(OutputFormat::Text, false).format(&candidates()).unwrap();
        assert_eq!(output, "17.0.1\tJava Version 17.0.1\n--help");
    }

    #[test]
    fn test_text_with_colors_dims_description() {
        let output = Formatter::new(OutputFormat::Text, true).format_text(&candidates());
        assert!(output.contains("\x1b[2m"));
        assert!(output.contains("Java Version 17.0.1"));
    }

    #[test]
    fn test_json_output() {
        let output = Formatter::new(OutputFormat::Json, false).format(&candidates()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["value"], "17.0.1");
        assert_eq!(parsed[0]["kind"], "argument");
        assert_eq!(parsed[1]["kind"], "option");
        assert!(parsed[1].get("description").is_none());
    }

    #[test]
    fn test_spec_summary() {
        let spec = Spec::jenv().unwrap();
        let output = Formatter::new(OutputFormat::Text, false).format_spec_summary(&spec);

        assert!(output.starts_with("jenv: "));
        assert!(output.contains("  global  Sets the global Java version"));
    }
}
