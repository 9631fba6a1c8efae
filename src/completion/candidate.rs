//! Candidate records produced by every suggestion source

use serde::Serialize;

/// Grammar role of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Subcommand,
    Option,
    Argument,
    Path,
}

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Declared in the spec
    Static,
    /// Produced at request time (generator output, filesystem listing)
    Generated,
}

/// One proposed completion value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Token inserted into the command line
    pub value: String,
    /// Display text, when different from `value`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Higher ranks earlier
    pub priority: i32,
    pub kind: CandidateKind,
    pub source: CandidateSource,
}

impl Candidate {
    /// Create a static candidate with default priority
    pub fn new(value: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            value: value.into(),
            label: None,
            description: None,
            icon: None,
            priority: crate::spec::DEFAULT_PRIORITY,
            kind,
            source: CandidateSource::Static,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    pub fn generated(mut self) -> Self {
        self.source = CandidateSource::Generated;
        self
    }

    /// Text to show in a list
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}
