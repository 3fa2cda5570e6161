//! Turn the captured output stream into the archived plain-text report.
//!
//! The capture holds exactly what the terminal was sent: SGR color
//! sequences, banner rules, and status badges. The archived copy strips
//! every CSI escape sequence and maps the tool's symbol palette to ASCII.
//! A capture that is not valid UTF-8 only has its escape sequences
//! stripped; symbols stay as they are. A report is always produced if
//! the target can be written at all.

use crate::error::{ReportError, Result};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref CSI: regex::Regex = regex::Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").unwrap();
    static ref CSI_BYTES: regex::bytes::Regex = regex::bytes::Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").unwrap();
}

/// How much sanitizing was applied to the archived report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeMode {
    /// Escape sequences stripped and symbols mapped to ASCII.
    Sanitized,
    /// Escape sequences stripped only.
    StripOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedReport {
    pub path: PathBuf,
    pub mode: FinalizeMode,
}

/// ASCII replacement for a glyph from the report's symbol palette.
fn ascii_for(c: char) -> Option<&'static str> {
    let replacement = match c {
        '─' | '━' | '═' | '╌' | '┄' => "-",
        '│' | '┃' | '║' | '╎' | '┆' => "|",
        '┌' | '┐' | '└' | '┘' | '├' | '┤' | '┬' | '┴' | '┼' | '╭' | '╮' | '╯' | '╰' | '┏' | '┓' | '┗' | '┛' => "+",
        '•' | '·' => "*",
        '✓' | '✔' => "+",
        '✗' | '✘' => "x",
        '⚠' => "!",
        '→' => "->",
        '←' => "<-",
        '…' => "...",
        '×' => "x",
        '–' | '—' => "-",
        _ => return None,
    };
    Some(replacement)
}

/// Remove every CSI escape sequence.
pub fn strip_escapes(text: &str) -> String {
    CSI.replace_all(text, "").into_owned()
}

/// Map the symbol palette to ASCII; other characters pass through.
pub fn substitute_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ascii_for(c) {
            Some(ascii) => out.push_str(ascii),
            None => out.push(c),
        }
    }
    out
}

/// Sanitize captured bytes, degrading to strip-only when they are not UTF-8.
pub fn sanitize(captured: &[u8]) -> (Vec<u8>, FinalizeMode) {
    match std::str::from_utf8(captured) {
        Ok(text) => (substitute_symbols(&strip_escapes(text)).into_bytes(), FinalizeMode::Sanitized),
        Err(e) => {
            debug!("Capture is not valid UTF-8 ({}), stripping escapes only", e);
            (strip_escapes_only(captured), FinalizeMode::StripOnly)
        }
    }
}

/// Byte-level escape stripping that never interprets the text.
pub fn strip_escapes_only(captured: &[u8]) -> Vec<u8> {
    CSI_BYTES.replace_all(captured, &b""[..]).into_owned()
}

/// Read the capture and write the sanitized report to `target`.
pub fn finalize_report(capture: &Path, target: &Path) -> Result<FinalizedReport> {
    let persistence = |source: std::io::Error| ReportError::Persistence { path: target.to_path_buf(), source };

    let captured = fs::read(capture).map_err(persistence)?;
    let (content, mode) = sanitize(&captured);
    fs::write(target, content).map_err(persistence)?;

    debug!("Wrote {:?} report to {}", mode, target.display());
    Ok(FinalizedReport { path: target.to_path_buf(), mode })
}

/// Last resort when the sanitized report could not be written: strip escapes
/// only and write to `fallback`.
pub fn finalize_strip_only(capture: &Path, fallback: &Path) -> Result<FinalizedReport> {
    let persistence = |source: std::io::Error| ReportError::Persistence { path: fallback.to_path_buf(), source };

    let captured = fs::read(capture).map_err(persistence)?;
    fs::write(fallback, strip_escapes_only(&captured)).map_err(persistence)?;

    Ok(FinalizedReport { path: fallback.to_path_buf(), mode: FinalizeMode::StripOnly })
}

/// `{tool}-{UTC timestamp}-{host}.txt`
pub fn report_file_name(tool: &str, at: DateTime<Utc>, host: &str) -> String {
    format!("{}-{}-{}.txt", file_safe(tool), at.format("%Y%m%dT%H%M%SZ"), file_safe(host))
}

fn file_safe(s: &str) -> String {
    let cleaned: String =
        s.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' }).collect();
    if cleaned.is_empty() { "unknown".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_badge_and_escapes() {
        let (out, mode) = sanitize("\x1b[32m✓ OK\x1b[0m".as_bytes());
        assert_eq!(String::from_utf8(out).unwrap(), "+ OK");
        assert_eq!(mode, FinalizeMode::Sanitized);
    }

    #[test]
    fn test_strip_escapes_variants() {
        assert_eq!(strip_escapes("\x1b[1mbold\x1b[0m \x1b[38;5;200mpink\x1b[0m \x1b[2K"), "bold pink ");
        assert_eq!(strip_escapes("no escapes"), "no escapes");
    }

    #[test]
    fn test_symbol_table() {
        assert_eq!(substitute_symbols("━━━"), "---");
        assert_eq!(substitute_symbols("┌─┐│└┘"), "+-+|++");
        assert_eq!(substitute_symbols("• ✗ ⚠ → … × – —"), "* x ! -> ... x - -");
        assert_eq!(substitute_symbols("café"), "café");
    }

    #[test]
    fn test_invalid_utf8_strips_only() {
        let mut bytes = b"\x1b[31m".to_vec();
        bytes.extend_from_slice("✗ bad ".as_bytes());
        bytes.push(0xff);
        bytes.extend_from_slice(b"\x1b[0m");

        let (out, mode) = sanitize(&bytes);
        assert_eq!(mode, FinalizeMode::StripOnly);

        let mut expected = "✗ bad ".as_bytes().to_vec();
        expected.push(0xff);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_finalize_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.log");
        let target = dir.path().join("report.txt");
        fs::write(&capture, "\x1b[1mStage timings\x1b[0m\n━━━━\n\x1b[32m✓\x1b[0m Profiler: ok\n").unwrap();

        let report = finalize_report(&capture, &target).unwrap();
        assert_eq!(report.mode, FinalizeMode::Sanitized);
        assert_eq!(fs::read_to_string(&target).unwrap(), "Stage timings\n----\n+ Profiler: ok\n");
    }

    #[test]
    fn test_finalize_report_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.log");
        fs::write(&capture, "x").unwrap();
        let target = dir.path().join("missing-dir").join("report.txt");

        let err = finalize_report(&capture, &target).unwrap_err();
        assert!(matches!(err, ReportError::Persistence { .. }));

        let fallback = dir.path().join("fallback.txt");
        let report = finalize_strip_only(&capture, &fallback).unwrap();
        assert_eq!(report.mode, FinalizeMode::StripOnly);
        assert_eq!(fs::read_to_string(&fallback).unwrap(), "x");
    }

    #[test]
    fn test_report_file_name() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap();
        assert_eq!(report_file_name("probe-report", at, "web-01.example"), "probe-report-20261019T080503Z-web-01.example.txt");
        assert_eq!(report_file_name("wp profile", at, ""), "wp_profile-20261019T080503Z-unknown.txt");
    }
}
