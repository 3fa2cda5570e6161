//! Adaptive acquisition of table data from the external profiler.
//!
//! # Module Organization
//!
//! - `executor` - Bounded subprocess execution with captured output
//! - `tiers` - Ordered CSV → JSON → native fallback
//! - `transform` - JSON records to CSV

mod executor;
mod tiers;
mod transform;

pub use executor::run_command;
pub use tiers::{INTERRUPTED, acquire_with};

use crate::numeric::SummabilityRule;
use crate::types::{CommandSpec, FormatFlags, TableOutcome};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Acquire a rendered table by running the real command, each tier bounded by `timeout`.
///
/// Raising `interrupted` kills the running tier and skips the rest.
pub fn acquire_table(
    command: &CommandSpec,
    flags: &FormatFlags,
    rule: &SummabilityRule,
    timeout: Duration,
    interrupted: &AtomicBool,
) -> TableOutcome {
    acquire_with(command, flags, rule, interrupted, |spec| run_command(spec, timeout, interrupted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tier;

    fn fake_profiler(script: &str) -> CommandSpec {
        // `sh -c SCRIPT sh` receives the format flag as $1
        CommandSpec::new("sh", vec!["-c".to_string(), script.to_string(), "sh".to_string()])
    }

    #[test]
    fn test_acquire_from_real_process_falls_back_to_json() {
        let script = r#"case "$1" in
            --format=csv) exit 0 ;;
            --format=json) echo '[{"stage":"bootstrap","time":"1.23e-01"}]' ;;
            *) echo native ;;
        esac"#;
        let outcome = acquire_table(
            &fake_profiler(script),
            &FormatFlags::default(),
            &SummabilityRule::default(),
            Duration::from_secs(10),
            &AtomicBool::new(false),
        );
        match outcome {
            TableOutcome::Success { tier, table_text } => {
                assert_eq!(tier, Tier::Structured);
                assert!(table_text.contains("0.1230s"));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_acquire_total_failure_is_reported() {
        let outcome = acquire_table(
            &fake_profiler("echo 'Error: not installed' >&2; exit 1"),
            &FormatFlags::default(),
            &SummabilityRule::default(),
            Duration::from_secs(10),
            &AtomicBool::new(false),
        );
        assert_eq!(outcome, TableOutcome::Failure { error_text: Some("Error: not installed".to_string()) });
    }
}
