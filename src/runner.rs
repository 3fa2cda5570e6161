use crate::acquire;
use crate::config::RunPlan;
use crate::console_format::{self, StyledWriter};
use crate::error::{ReportError, Result};
use crate::report::write_status_lines;
use crate::types::*;
use crate::ui;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Host and start time shared by the report header and the report file name
#[derive(Debug, Clone)]
pub struct RunContext {
    pub host: String,
    pub started: DateTime<Utc>,
}

impl RunContext {
    pub fn now() -> Self {
        let host = hostname::get().map(|h| h.to_string_lossy().into_owned()).unwrap_or_else(|_| "unknown".to_string());
        Self { host, started: Utc::now() }
    }
}

/// Run every section of the plan in order, writing to `out`
///
/// This is the main entry point for a report run. Sections are independent:
/// a section that yields no table writes one warning and the run moves on.
/// Raising `interrupted` kills the running profiler call and ends the run
/// after the current section.
pub fn run_report<W: Write>(
    plan: &RunPlan,
    ctx: &RunContext,
    out: &mut StyledWriter<W>,
    interrupted: &AtomicBool,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    write_header(plan, ctx, out)?;
    summary.warnings += preflight(plan, out, interrupted)?;

    for section in &plan.sections {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted before section '{}'", section.title);
            summary.interrupted = true;
            break;
        }

        let result = run_section(plan, section, out, interrupted)?;
        if result.tier.is_none() {
            summary.warnings += 1;
        }
        summary.sections.push(result);
        out.flush()?;
    }

    if interrupted.load(Ordering::SeqCst) {
        summary.interrupted = true;
    }

    write_summary(&summary, plan.sections.len(), out)?;
    out.flush()?;
    Ok(summary)
}

fn write_header<W: Write>(plan: &RunPlan, ctx: &RunContext, out: &mut StyledWriter<W>) -> io::Result<()> {
    // Badge, label and separator take 12 columns
    let command_width = console_format::console_width().saturating_sub(12).max(20);
    let command = console_format::truncate_with_padding(&plan.command.display(), command_width);

    out.write_banner(&format!("{} report", plan.tool_name))?;
    write_status_lines(
        out,
        &[
            StatusLine::new("Host", &ctx.host, Status::Info),
            StatusLine::new("Started", ctx.started.format("%Y-%m-%d %H:%M:%S UTC").to_string(), Status::Info),
            StatusLine::new("Command", command.trim_end(), Status::Info),
        ],
    )
}

/// Probe the profiler with `--version`; returns the number of warnings written
fn preflight<W: Write>(plan: &RunPlan, out: &mut StyledWriter<W>, interrupted: &AtomicBool) -> io::Result<usize> {
    let output = acquire::run_command(&plan.command.with_arg("--version"), plan.timeout, interrupted);
    let version = output.stdout.lines().map(str::trim).find(|l| !l.is_empty());

    let (line, warnings) = match version {
        Some(version) if output.success => (StatusLine::new("Profiler", version, Status::Ok), 0),
        _ => {
            debug!("Preflight failed: {}", output.stderr.trim());
            let detail = if output.timed_out { "timed out" } else { "not available" };
            (StatusLine::new("Profiler", format!("{} ({})", plan.command.program, detail), Status::Fail), 1)
        }
    };

    write_status_lines(out, &[line])?;
    Ok(warnings)
}

fn run_section<W: Write>(
    plan: &RunPlan,
    section: &ProfileSection,
    out: &mut StyledWriter<W>,
    interrupted: &AtomicBool,
) -> io::Result<SectionResult> {
    let command = plan.section_command(section);
    debug!("Section '{}': {}", section.title, command.display());

    out.write_banner(&section.title)?;

    let outcome = acquire::acquire_table(&command, &plan.formats, &plan.summability, plan.timeout, interrupted);
    let tier = match outcome {
        TableOutcome::Success { tier, table_text } => {
            out.write_plain(&table_text)?;
            if !table_text.ends_with('\n') {
                out.writeln()?;
            }
            out.write_note(&format!("  via {}: {}", tier, command.display()))?;
            Some(tier)
        }
        TableOutcome::Failure { error_text } if error_text.as_deref() == Some(acquire::INTERRUPTED) => {
            ui::write_warning(out, &format!("{}: interrupted", section.title))?;
            None
        }
        TableOutcome::Failure { error_text } => {
            let err = ReportError::Acquisition { check: section.title.clone(), detail: error_text };
            ui::write_warning(out, &err.to_string())?;
            None
        }
    };

    Ok(SectionResult { title: section.title.clone(), tier })
}

fn write_summary<W: Write>(summary: &RunSummary, planned: usize, out: &mut StyledWriter<W>) -> io::Result<()> {
    out.write_banner("Summary")?;

    let overall = if summary.degraded() == 0 && !summary.interrupted { Status::Ok } else { Status::Warn };
    let mut lines = vec![StatusLine::new("Sections", format!("{} of {} rendered", summary.succeeded(), planned), overall)];

    for section in &summary.sections {
        lines.push(match section.tier {
            Some(tier) => StatusLine::new(&section.title, tier.label(), Status::Ok),
            None => StatusLine::new(&section.title, "no output", Status::Fail),
        });
    }

    if summary.interrupted {
        lines.push(StatusLine::new("Run", "interrupted; remaining sections skipped", Status::Warn));
    }

    write_status_lines(out, &lines)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
