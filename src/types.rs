/// Core data structures shared across the report pipeline
///
/// This module defines the table record handed to the renderer, the
/// descriptors used to invoke the external profiler, and the status
/// surface returned to the runner.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Header plus data rows, every row aligned to the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Record {
    /// Build a record, dropping rows whose field count does not match the header.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        let rows = rows.into_iter().filter(|r| r.len() == width).collect();
        Self { header, rows }
    }

    /// Cells of one column across all data rows.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(move |r| r.get(index).map(String::as_str))
    }
}

/// Output format requested from the profiler, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Delimited output (CSV), parsed directly.
    Delimited,
    /// Self-describing output (JSON), converted to CSV first.
    Structured,
    /// The command's own table layout, used verbatim.
    Native,
}

impl Tier {
    pub const ORDER: [Tier; 3] = [Tier::Delimited, Tier::Structured, Tier::Native];

    pub fn index(&self) -> usize {
        match self {
            Tier::Delimited => 1,
            Tier::Structured => 2,
            Tier::Native => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Delimited => "csv",
            Tier::Structured => "json",
            Tier::Native => "native table",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {} ({})", self.index(), self.label())
    }
}

/// Per-tier format flags appended to the profiler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatFlags {
    pub delimited: String,
    pub structured: String,
    pub native: String,
}

impl Default for FormatFlags {
    fn default() -> Self {
        Self {
            delimited: "--format=csv".to_string(),
            structured: "--format=json".to_string(),
            native: "--format=table".to_string(),
        }
    }
}

impl FormatFlags {
    pub fn flag_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Delimited => &self.delimited,
            Tier::Structured => &self.structured,
            Tier::Native => &self.native,
        }
    }
}

/// Base command and arguments for one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Same command with one extra trailing argument.
    pub fn with_arg(&self, arg: &str) -> Self {
        let mut args = self.args.clone();
        if !arg.is_empty() {
            args.push(arg.to_string());
        }
        Self { program: self.program.clone(), args }
    }

    /// One-line rendering for logs and notes; embedded whitespace runs collapse to a space.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .flat_map(|part| part.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A titled profile section: the arguments that select what to profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSection {
    pub title: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ProfileSection {
    pub fn new(title: &str, args: &[&str]) -> Self {
        Self { title: title.to_string(), args: args.iter().map(|s| s.to_string()).collect() }
    }
}

/// Outcome of one external invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn spawn_failure(message: String, duration: Duration) -> Self {
        Self { success: false, stdout: String::new(), stderr: message, duration, timed_out: false }
    }

    /// Non-whitespace stdout, if any.
    pub fn non_empty_stdout(&self) -> Option<&str> {
        if self.stdout.trim().is_empty() { None } else { Some(&self.stdout) }
    }
}

/// One tier's attempt, kept only until a winner is chosen.
#[derive(Debug, Clone)]
pub struct AcquisitionAttempt {
    pub tier: Tier,
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

/// Status surface returned by table acquisition.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome {
    Success { tier: Tier, table_text: String },
    Failure { error_text: Option<String> },
}

/// Severity badge for a label/value line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

/// A pre-formatted label/value/status triple from a check.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub label: String,
    pub value: String,
    pub status: Status,
}

impl StatusLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: Status) -> Self {
        Self { label: label.into(), value: value.into(), status }
    }
}

/// Per-section result kept for the closing summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResult {
    pub title: String,
    pub tier: Option<Tier>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub sections: Vec<SectionResult>,
    pub warnings: usize,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.sections.iter().filter(|s| s.tier.is_some()).count()
    }

    pub fn degraded(&self) -> usize {
        self.sections.iter().filter(|s| s.tier.is_none()).count()
    }
}
