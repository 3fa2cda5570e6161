/// User interface and status output utilities
///
/// This module handles:
/// - Warnings written into the report stream (shown live and archived)
/// - Errors and warnings printed straight to stderr, outside any capture
/// - Colored terminal text
use crate::console_format::StyledWriter;
use std::io::{self, Write};

/// Print colored text to stderr, with fallback to plain text
fn eprint_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        eprint!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stderr() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
            return true;
        }

        false
    }
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    eprintln!();
    eprint_color("error", term::color::BRIGHT_RED);
    eprintln!(": {}", msg);
    eprintln!();
}

/// Print a warning to stderr (used once the report stream is closed)
pub fn print_warning(msg: &str) {
    eprint_color("warning", term::color::YELLOW);
    eprintln!(": {}", msg);
}

/// Write a single warning line into the report stream
pub fn write_warning<W: Write>(writer: &mut StyledWriter<W>, msg: &str) -> io::Result<()> {
    writer.write_colored("⚠ warning", term::color::YELLOW)?;
    writer.write_plain(&format!(": {}", msg))?;
    writer.writeln()
}
