//! Label/value/status lines with colored badges.
//!
//! Checks hand over pre-formatted triples; this module only lays them out.

use crate::console_format::{StyledWriter, pad_to_width};
use crate::types::{Status, StatusLine};
use std::io::{self, Write};
use term::color::Color;

impl Status {
    /// Badge glyph shown before the label.
    pub fn badge(&self) -> &'static str {
        match self {
            Status::Ok => "✓",
            Status::Warn => "⚠",
            Status::Fail => "✗",
            Status::Info => "•",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Status::Ok => term::color::GREEN,
            Status::Warn => term::color::YELLOW,
            Status::Fail => term::color::BRIGHT_RED,
            Status::Info => term::color::CYAN,
        }
    }
}

/// Write aligned status lines: `<badge> <label>: <value>`.
pub fn write_status_lines<W: Write>(writer: &mut StyledWriter<W>, lines: &[StatusLine]) -> io::Result<()> {
    let label_width = lines.iter().map(|l| l.label.chars().count()).max().unwrap_or(0);

    for line in lines {
        writer.write_colored(line.status.badge(), line.status.color())?;
        writer.write_plain(&format!(" {}: {}", pad_to_width(&line.label, label_width), line.value))?;
        writer.writeln()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(lines: &[StatusLine], colors: bool) -> String {
        let mut writer = StyledWriter::new(Vec::new(), colors);
        write_status_lines(&mut writer, lines).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_labels_are_aligned() {
        let text = render(
            &[StatusLine::new("Host", "web-01", Status::Info), StatusLine::new("Profiler", "wp 2.10.0", Status::Ok)],
            false,
        );
        assert_eq!(text, "• Host    : web-01\n✓ Profiler: wp 2.10.0\n");
    }

    #[test]
    fn test_badge_is_colored() {
        let text = render(&[StatusLine::new("Profiler", "missing", Status::Fail)], true);
        assert!(text.starts_with("\x1b[91m✗\x1b[0m Profiler: missing"));
    }

    #[test]
    fn test_empty_lines_write_nothing() {
        assert_eq!(render(&[], false), "");
    }
}
