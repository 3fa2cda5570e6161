/// Tests for the report runner
///
/// The profiler is a small `sh` script that answers by format flag, so the
/// whole pipeline runs against a real child process.
use super::*;
use crate::numeric::SummabilityRule;
use chrono::TimeZone;
use std::thread;
use std::time::{Duration, Instant};

/// `sh -c SCRIPT sh <section args> <flag>`: section args arrive as $1.., the flag last
const FAKE_PROFILER: &str = r#"
for last; do :; done
case "$last" in
    --version) echo "WP-CLI 2.10.0" ;;
    --format=csv)
        case "$1" in
            stage) printf 'stage,time,cache_ratio\nbootstrap,1.23e-01,0.5\nmain_query,5.00e-03,0.25\ntemplate,2.10e-01,1\n' ;;
            hooks) exit 0 ;;
            slow) exec sleep 5 ;;
            *) echo "Error: unknown section" >&2; exit 1 ;;
        esac ;;
    --format=json)
        case "$1" in
            hooks) echo '[{"hook":"init","callback_count":"4","time":"0.0004321"},{"hook":"wp_loaded","callback_count":"2","time":"0.1234567"}]' ;;
            slow) echo '[{"stage":"from_json","time":"1"}]' ;;
            *) exit 1 ;;
        esac ;;
    *) exit 1 ;;
esac
"#;

fn plan_with(sections: Vec<ProfileSection>) -> RunPlan {
    RunPlan {
        tool_name: "probe-report".to_string(),
        command: CommandSpec::new("sh", vec!["-c".to_string(), FAKE_PROFILER.to_string(), "sh".to_string()]),
        sections,
        formats: FormatFlags::default(),
        summability: SummabilityRule::default(),
        timeout: Duration::from_secs(10),
        output_dir: std::path::PathBuf::from("."),
        use_colors: false,
        write_report: false,
    }
}

fn context() -> RunContext {
    RunContext { host: "web-01".to_string(), started: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap() }
}

fn run(plan: &RunPlan, interrupted: bool) -> (RunSummary, String) {
    let mut out = StyledWriter::new(Vec::new(), false);
    let flag = AtomicBool::new(interrupted);
    let summary = run_report(plan, &context(), &mut out, &flag).unwrap();
    (summary, String::from_utf8(out.into_inner()).unwrap())
}

#[test]
fn test_full_run_renders_each_section() {
    let plan = plan_with(vec![
        ProfileSection::new("Load stages", &["stage"]),
        ProfileSection::new("Hooks", &["hooks"]),
    ]);
    let (summary, text) = run(&plan, false);

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.warnings, 0);
    assert_eq!(summary.sections[0].tier, Some(Tier::Delimited));
    assert_eq!(summary.sections[1].tier, Some(Tier::Structured));

    assert!(text.contains("✓ Profiler: WP-CLI 2.10.0"));
    assert!(text.contains("• Host   : web-01"));
    assert!(text.contains("| Total      | 0.3380s  | -           |"));
    assert!(text.contains("| init      | 4              | 0.4321ms |"));
    assert!(text.contains("| Total     | 6              | 0.1238   |"));
    assert!(text.contains("Sections   : 2 of 2 rendered"));
}

#[test]
fn test_failed_section_warns_once_and_run_continues() {
    let plan = plan_with(vec![
        ProfileSection::new("Broken", &["nope"]),
        ProfileSection::new("Load stages", &["stage"]),
    ]);
    let (summary, text) = run(&plan, false);

    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.degraded(), 1);
    assert_eq!(summary.sections[1].tier, Some(Tier::Delimited));

    let warnings: Vec<&str> = text.lines().filter(|l| l.contains("warning:")).collect();
    assert_eq!(warnings, vec!["⚠ warning: Broken: no usable output from any format (Error: unknown section)"]);
    assert!(text.contains("✗ Broken     : no output"));
}

#[test]
fn test_missing_profiler_reported_in_preflight() {
    let mut plan = plan_with(vec![ProfileSection::new("Load stages", &["profile", "stage"])]);
    plan.command = CommandSpec::new("probe-report-missing-profiler", vec![]);
    let (summary, text) = run(&plan, false);

    assert_eq!(summary.warnings, 2);
    assert!(text.contains("✗ Profiler: probe-report-missing-profiler (not available)"));
    assert_eq!(text.matches("warning:").count(), 1);
}

#[test]
fn test_interrupted_run_skips_sections() {
    let plan = plan_with(vec![ProfileSection::new("Load stages", &["stage"])]);
    let (summary, text) = run(&plan, true);

    assert!(summary.interrupted);
    assert!(summary.sections.is_empty());
    assert!(text.contains("Sections: 0 of 1 rendered"));
    assert!(text.contains("⚠ Run     : interrupted; remaining sections skipped"));
}

#[test]
fn test_interrupt_during_first_tier_ends_run() {
    let plan = plan_with(vec![
        ProfileSection::new("Slow", &["slow"]),
        ProfileSection::new("Load stages", &["stage"]),
    ]);
    let interrupted = AtomicBool::new(false);
    let mut out = StyledWriter::new(Vec::new(), false);
    let started = Instant::now();

    let summary = thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(300));
            interrupted.store(true, Ordering::SeqCst);
        });
        run_report(&plan, &context(), &mut out, &interrupted).unwrap()
    });
    let text = String::from_utf8(out.into_inner()).unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(summary.interrupted);
    assert_eq!(summary.sections, vec![SectionResult { title: "Slow".to_string(), tier: None }]);
    assert!(text.contains("⚠ warning: Slow: interrupted"));
    assert!(!text.contains("via tier"));
    assert!(!text.contains("| Total "));
}
