/// Configuration resolution module
///
/// This module handles:
/// - Loading the optional TOML configuration file
/// - Merging file settings with CLI arguments (CLI wins)
/// - Building the immutable RunPlan handed to the runner
use crate::cli::{self, CliArgs};
use crate::error::{ReportError, Result};
use crate::numeric::{DEFAULT_EXCLUDED_SUBSTRINGS, SummabilityRule};
use crate::types::{CommandSpec, FormatFlags, ProfileSection};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_COMMAND: &str = "wp";
pub const DEFAULT_TOOL_NAME: &str = "probe-report";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings read from the configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub command: Option<String>,
    pub base_args: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub tool_name: Option<String>,
    pub color: Option<bool>,
    pub formats: Option<FormatFlags>,
    pub summation: Option<SummationConfig>,
    #[serde(rename = "section")]
    pub sections: Vec<ProfileSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummationConfig {
    pub exclude: Vec<String>,
}

/// Everything one run needs, fully resolved before it starts
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub tool_name: String,
    pub command: CommandSpec,
    pub sections: Vec<ProfileSection>,
    pub formats: FormatFlags,
    pub summability: SummabilityRule,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub use_colors: bool,
    pub write_report: bool,
}

impl RunPlan {
    /// Full command for one section: base command, base args, section args
    pub fn section_command(&self, section: &ProfileSection) -> CommandSpec {
        let mut args = self.command.args.clone();
        args.extend(section.args.iter().cloned());
        CommandSpec::new(self.command.program.clone(), args)
    }
}

/// Sections profiled when neither the CLI nor the config file names any
pub fn default_sections() -> Vec<ProfileSection> {
    vec![
        ProfileSection::new("Load stages", &["profile", "stage"]),
        ProfileSection::new("Bootstrap stage", &["profile", "stage", "bootstrap"]),
        ProfileSection::new("Main query stage", &["profile", "stage", "main_query"]),
        ProfileSection::new("Template stage", &["profile", "stage", "template"]),
    ]
}

/// Parse configuration file text
pub fn parse_config(text: &str) -> Result<FileConfig> {
    toml::from_str(text).map_err(|e| ReportError::config(format!("invalid config file: {}", e)))
}

/// Load the config file named on the CLI, or the default one if it exists
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match cli::default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file, using defaults");
                return Ok(FileConfig::default());
            }
        },
    };

    debug!("Loading config from {}", path.display());
    let text = fs::read_to_string(&path)
        .map_err(|e| ReportError::config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_config(&text)
}

/// Build a complete RunPlan from CLI arguments and file settings
pub fn build_run_plan(args: &CliArgs, file: FileConfig) -> Result<RunPlan> {
    let program = args.command.clone().or(file.command).unwrap_or_else(|| DEFAULT_COMMAND.to_string());

    let mut base_args = file.base_args;
    base_args.extend(args.base_args.iter().cloned());

    let sections = if !args.sections.is_empty() {
        args.sections
            .iter()
            .map(|s| cli::parse_section_arg(s).map(|(title, args)| ProfileSection { title, args }))
            .collect::<std::result::Result<Vec<_>, String>>()
            .map_err(ReportError::config)?
    } else if !file.sections.is_empty() {
        file.sections
    } else {
        default_sections()
    };

    if let Some(untitled) = sections.iter().find(|s| s.title.trim().is_empty()) {
        return Err(ReportError::config(format!("section with args {:?} has no title", untitled.args)));
    }

    let summability = if !args.exclude_columns.is_empty() {
        SummabilityRule::with_excluded(args.exclude_columns.clone())
    } else if let Some(summation) = file.summation {
        SummabilityRule::with_excluded(summation.exclude)
    } else {
        SummabilityRule::with_excluded(DEFAULT_EXCLUDED_SUBSTRINGS.iter().map(|s| s.to_string()).collect())
    };

    let timeout_secs = args.timeout.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ReportError::config("timeout must be at least 1 second"));
    }

    let use_colors = args.colors_enabled() && file.color.unwrap_or(true);

    let plan = RunPlan {
        tool_name: args.tool_name.clone().or(file.tool_name).unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string()),
        command: CommandSpec::new(program, base_args),
        sections,
        formats: file.formats.unwrap_or_default(),
        summability,
        timeout: Duration::from_secs(timeout_secs),
        output_dir: args.output_dir.clone().or(file.output_dir).unwrap_or_else(|| PathBuf::from(".")),
        use_colors,
        write_report: !args.no_report,
    };

    debug!("Run plan: {} section(s) via `{}`", plan.sections.len(), plan.command.display());
    Ok(plan)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
