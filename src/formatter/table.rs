//! Table formatting for candidate lists using tabled

use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use crate::completion::{Candidate, CandidateKind, CandidateSource};

/// Maximum width for the description column (characters)
const DEFAULT_MAX_DESCRIPTION_WIDTH: usize = 60;

const HEADERS: [&str; 5] = ["value", "description", "kind", "source", "priority"];

/// Table formatter for candidate lists
pub struct TableFormatter {
    /// Maximum description width
    max_description_width: usize,

    /// Enable colored output
    use_colors: bool,
}

impl TableFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self {
            max_description_width: DEFAULT_MAX_DESCRIPTION_WIDTH,
            use_colors,
        }
    }

    /// Format candidates as a table
    pub fn format(&self, candidates: &[Candidate]) -> String {
        if candidates.is_empty() {
            return "(no candidates)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(HEADERS.map(String::from));
        for candidate in candidates {
            builder.push_record([
                candidate.display().to_string(),
                candidate.description.clone().unwrap_or_default(),
                kind_name(candidate.kind).to_string(),
                source_name(candidate.source).to_string(),
                candidate.priority.to_string(),
            ]);
        }

        let mut table: Table = builder.build();
        table.with(Style::modern());
        table.with(Modify::new(Columns::new(1..=1)).with(Width::wrap(self.max_description_width)));
        table.with(Modify::new(Rows::first()).with(Alignment::center()));
        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }

        table.to_string()
    }
}

fn kind_name(kind: CandidateKind) -> &'static str {
    match kind {
        CandidateKind::Subcommand => "subcommand",
        CandidateKind::Option => "option",
        CandidateKind::Argument => "argument",
        CandidateKind::Path => "path",
    }
}

fn source_name(source: CandidateSource) -> &'static str {
    match source {
        CandidateSource::Static => "static",
        CandidateSource::Generated => "generated",
    }
}
