// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod acquire;
mod cli;
mod config;
mod console_format;
mod error;
mod numeric;
mod output;
mod report;
mod runner;
mod types;
mod ui;

use output::{Capture, OutputCoordinator};
use report::FinalizeMode;
use runner::RunContext;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Exit code when at least one section produced no table
const EXIT_DEGRADED: i32 = 2;
/// Exit code after Ctrl-C, following the shell convention for SIGINT
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Set console width override if specified (for testing)
    if let Some(width) = args.console_width {
        console_format::set_console_width(width);
    }

    // Resolve the run plan: CLI over config file over defaults
    let plan = match config::load_config(args.config.as_deref()).and_then(|file| config::build_run_plan(&args, file)) {
        Ok(plan) => plan,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    // Ctrl-C stops the run between sections; the partial report is still written
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst)) {
            log::warn!("Could not install Ctrl-C handler: {}", e);
        }
    }

    let ctx = RunContext::now();

    let mut coordinator = match OutputCoordinator::start(Box::new(io::stdout()), plan.use_colors) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Could not create capture file: {}", e));
            std::process::exit(1);
        }
    };

    let outcome = runner::run_report(&plan, &ctx, &mut coordinator.writer(), &interrupted);

    let capture = match coordinator.finish() {
        Ok(capture) => capture,
        Err(e) => {
            ui::print_error(&format!("Could not flush capture file: {}", e));
            std::process::exit(1);
        }
    };
    log::debug!(
        "Captured {} line(s), {} byte(s); {:?} byte(s) shown live",
        capture.lines_written,
        capture.bytes_written,
        capture.bytes_shown
    );

    if plan.write_report {
        let name = report::report_file_name(&plan.tool_name, ctx.started, &ctx.host);
        write_report(capture, &plan.output_dir.join(&name), &std::env::temp_dir().join(&name));
    } else {
        // process::exit skips destructors; remove the temporary capture now
        drop(capture);
    }

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            ui::print_error(&format!("Report output failed: {}", e));
            std::process::exit(1);
        }
    };

    // Determine exit code
    let exit_code = if summary.interrupted {
        EXIT_INTERRUPTED
    } else if summary.degraded() > 0 {
        EXIT_DEGRADED
    } else {
        0
    };

    std::process::exit(exit_code);
}

/// Archive the capture at `target`, falling back to a strip-only copy at `fallback`
///
/// Failures here never abort the run: the live output has already been shown.
fn write_report(capture: Capture, target: &Path, fallback: &Path) {
    let finalized = match report::finalize_report(capture.path(), target) {
        Ok(finalized) => finalized,
        Err(e) => {
            ui::print_warning(&format!("{}; writing an unsanitized copy instead", e));
            match report::finalize_strip_only(capture.path(), fallback) {
                Ok(finalized) => finalized,
                Err(e) => {
                    let kept = capture.keep();
                    ui::print_warning(&format!("{}; raw output kept at {}", e, kept.display()));
                    return;
                }
            }
        }
    };

    match finalized.mode {
        FinalizeMode::Sanitized => eprintln!("Report saved to {}", finalized.path.display()),
        FinalizeMode::StripOnly => eprintln!("Report saved to {} (escape sequences stripped only)", finalized.path.display()),
    }
}
