//! Error taxonomy for a report run.
//!
//! Acquisition and render failures are recovered by the runner (one warning,
//! the run continues). Persistence failures degrade to the strip-only
//! finalizer before surfacing. Nothing here aborts a run once it has started.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Every acquisition tier was exhausted without usable output.
    #[error("{check}: no usable output from any format{}", detail_suffix(.detail))]
    Acquisition { check: String, detail: Option<String> },

    /// Acquired data could not be shaped into header + rows.
    #[error("could not render table: {reason}")]
    Render { reason: String },

    /// The archival report could not be written.
    #[error("could not write report to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file or option combination.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" ({})", d),
        _ => String::new(),
    }
}

impl ReportError {
    pub fn render(reason: impl Into<String>) -> Self {
        ReportError::Render { reason: reason.into() }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        ReportError::Config { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
