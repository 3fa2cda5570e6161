use clap::Parser;
use std::path::PathBuf;

/// Get the default config file location
/// Uses platform-specific config directories:
/// - Linux: ~/.config/probe-report/config.toml
/// - macOS: ~/Library/Application Support/probe-report/config.toml
/// - Windows: %APPDATA%/probe-report/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("probe-report").join("config.toml"))
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "probe-report")]
#[command(about = "Profile a running site with its command-line profiler and save a plain-text report")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file (TOML). Defaults to the platform config directory if present
    #[arg(long, short = 'C', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Profiler executable to run (default: wp)
    #[arg(long, value_name = "BIN")]
    pub command: Option<String>,

    /// Arguments passed to the profiler before each section's own arguments
    /// Example: --arg --path=/var/www/html --arg --skip-plugins
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub base_args: Vec<String>,

    /// Profile sections to run, replacing the configured list
    /// Format: "Title=arg arg ...", e.g. --section "Hooks=profile stage --all"
    #[arg(long = "section", value_name = "TITLE=ARGS")]
    pub sections: Vec<String>,

    /// Seconds allowed for each external invocation
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory where the archived report is written
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Tool name used as the report file prefix
    #[arg(long, value_name = "NAME")]
    pub tool_name: Option<String>,

    /// Column header substrings never summed in Total rows (replaces the default ratio/rate/pct)
    #[arg(long, value_name = "SUBSTR", num_args = 1.., value_delimiter = ',')]
    pub exclude_columns: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show results live only; do not write the archived report
    #[arg(long)]
    pub no_report: bool,

    /// Override console width for banners (default: auto-detect)
    #[arg(long, value_name = "COLUMNS")]
    pub console_width: Option<usize>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref command) = self.command
            && command.trim().is_empty()
        {
            return Err("--command cannot be empty".to_string());
        }

        if self.timeout == Some(0) {
            return Err("--timeout must be at least 1 second".to_string());
        }

        for section in &self.sections {
            parse_section_arg(section)?;
        }

        if let Some(ref path) = self.config
            && !path.exists()
        {
            return Err(format!("Config file not found: {}", path.display()));
        }

        Ok(())
    }

    /// Should colors be used? Honours --no-color and the NO_COLOR convention
    pub fn colors_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
    }
}

/// Split a `--section` value into its title and arguments
pub fn parse_section_arg(value: &str) -> Result<(String, Vec<String>), String> {
    let (title, args) =
        value.split_once('=').ok_or_else(|| format!("Invalid --section '{}': expected TITLE=ARGS", value))?;

    let title = title.trim();
    if title.is_empty() {
        return Err(format!("Invalid --section '{}': title is empty", value));
    }

    Ok((title.to_string(), args.split_whitespace().map(str::to_string).collect()))
}
