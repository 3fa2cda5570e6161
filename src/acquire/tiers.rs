//! Ordered fallback across output formats.
//!
//! # How Tier Fallback Works
//!
//! Profiler versions disagree on which output formats actually work, so no
//! single format is trusted:
//!
//! 1. **Delimited**: request CSV, parse and render it. Empty output, or a
//!    render that produces nothing, falls through (some versions exit
//!    successfully with no output after an internal validation failure).
//! 2. **Structured**: request JSON, convert it to CSV, parse and render it.
//! 3. **Native**: request the command's own table layout and use it verbatim.
//!
//! The first tier that yields text wins and later tiers are never invoked.
//! Attempts are discarded once a winner is adopted. An interrupted run
//! stops before the next tier.

use super::transform::json_to_csv;
use crate::numeric::SummabilityRule;
use crate::report::render_delimited;
use crate::types::{AcquisitionAttempt, CommandOutput, CommandSpec, FormatFlags, TableOutcome, Tier};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};

/// Error text for a section abandoned because the run was interrupted
pub const INTERRUPTED: &str = "interrupted";

/// Try each tier in order and return the first success.
///
/// The failure outcome carries the error text of the first attempt, which
/// may be none when that tier exited cleanly without output. Once
/// `interrupted` is raised no further tier is started.
pub fn with_fallback<F>(tiers: &[Tier], interrupted: &AtomicBool, mut attempt: F) -> TableOutcome
where
    F: FnMut(Tier) -> AcquisitionAttempt,
{
    let mut error_text: Option<Option<String>> = None;

    for &tier in tiers {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted, skipping {} and later tiers", tier);
            return TableOutcome::Failure { error_text: Some(INTERRUPTED.to_string()) };
        }

        match attempt(tier) {
            AcquisitionAttempt { tier, success: true, output: Some(table_text), .. } => {
                debug!("{} succeeded", tier);
                return TableOutcome::Success { tier, table_text };
            }
            AcquisitionAttempt { tier, error, .. } => {
                debug!("{} failed: {}", tier, error.as_deref().unwrap_or("no output"));
                error_text.get_or_insert(error);
            }
        }
    }

    if interrupted.load(Ordering::SeqCst) {
        return TableOutcome::Failure { error_text: Some(INTERRUPTED.to_string()) };
    }
    TableOutcome::Failure { error_text: error_text.flatten() }
}

/// Run one tier: invoke the command with the tier's flag and validate the result.
pub fn attempt_tier<R>(
    tier: Tier,
    command: &CommandSpec,
    flags: &FormatFlags,
    rule: &SummabilityRule,
    run: &mut R,
) -> AcquisitionAttempt
where
    R: FnMut(&CommandSpec) -> CommandOutput,
{
    let invocation = command.with_arg(flags.flag_for(tier));
    let output = run(&invocation);
    debug!("{} `{}` finished in {:?} (success={})", tier, invocation.display(), output.duration, output.success);
    let stderr = first_error_line(&output.stderr);

    let failed = |error: Option<String>| AcquisitionAttempt { tier, success: false, output: None, error };

    if !output.success {
        return failed(stderr.or_else(|| Some(format!("`{}` exited with an error", invocation.display()))));
    }

    let Some(raw) = output.non_empty_stdout() else {
        return failed(stderr);
    };

    let rendered = match tier {
        Tier::Delimited => render_delimited(raw, rule).map_err(|e| e.to_string()),
        Tier::Structured => match json_to_csv(raw) {
            Some(csv) => render_delimited(&csv, rule).map_err(|e| e.to_string()),
            None => Err("output is not a JSON array of records".to_string()),
        },
        Tier::Native => Ok(raw.to_string()),
    };

    match rendered {
        Ok(text) if !text.trim().is_empty() => AcquisitionAttempt { tier, success: true, output: Some(text), error: None },
        Ok(_) => failed(stderr),
        Err(e) => failed(stderr.or(Some(e))),
    }
}

/// Acquire a rendered table, trying every tier in order.
pub fn acquire_with<R>(
    command: &CommandSpec,
    flags: &FormatFlags,
    rule: &SummabilityRule,
    interrupted: &AtomicBool,
    mut run: R,
) -> TableOutcome
where
    R: FnMut(&CommandSpec) -> CommandOutput,
{
    with_fallback(&Tier::ORDER, interrupted, |tier| attempt_tier(tier, command, flags, rule, &mut run))
}

/// First non-blank line of subprocess stderr, for a one-line warning.
fn first_error_line(stderr: &str) -> Option<String> {
    const MAX_LEN: usize = 200;
    let line = stderr.lines().map(str::trim).find(|l| !l.is_empty())?;
    if line.chars().count() > MAX_LEN {
        Some(format!("{}...", line.chars().take(MAX_LEN).collect::<String>()))
    } else {
        Some(line.to_string())
    }
}
