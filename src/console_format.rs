/// Console formatting module - Pure rendering concerns
///
/// This module handles all console output formatting including:
/// - Display width, padding and truncation of cells
/// - ANSI color for badges and notes
/// - Section banners sized to the console
///
/// It writes to any `std::io::Write` destination, so the same code feeds
/// the live terminal, the captured report, and test buffers.
use std::io::{self, Write};
use std::sync::OnceLock;
use term::color::Color;
use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Banners never grow wider than this, even on very wide terminals.
const MAX_BANNER_WIDTH: usize = 78;

/// Fallback when the console size cannot be detected (pipes, CI).
const DEFAULT_CONSOLE_WIDTH: usize = 80;

/// Writer for report text - configurable for color/plain text
pub struct StyledWriter<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> StyledWriter<W> {
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Write text, wrapped in an SGR color sequence when colors are enabled
    pub fn write_colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        if self.use_colors {
            write!(self.writer, "{}{}{}", sgr_foreground(color), text, SGR_RESET)
        } else {
            write!(self.writer, "{}", text)
        }
    }

    /// Write a dim note line (e.g. which format produced a table)
    pub fn write_note(&mut self, text: &str) -> io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{}{}{}", SGR_DIM, text, SGR_RESET)
        } else {
            writeln!(self.writer, "{}", text)
        }
    }

    /// Write a section banner: blank line, title, heavy rule
    pub fn write_banner(&mut self, title: &str) -> io::Result<()> {
        let width = banner_width();
        writeln!(self.writer)?;
        if self.use_colors {
            writeln!(self.writer, "{}{}{}", SGR_BOLD, title, SGR_RESET)?;
        } else {
            writeln!(self.writer, "{}", title)?;
        }
        writeln!(self.writer, "{}", "━".repeat(width))
    }

    /// Write pre-rendered text as-is
    pub fn write_plain(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    pub fn writeln(&mut self) -> io::Result<()> {
        writeln!(self.writer)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

//
// ANSI sequences
//

pub const SGR_RESET: &str = "\x1b[0m";
pub const SGR_BOLD: &str = "\x1b[1m";
pub const SGR_DIM: &str = "\x1b[2m";

/// SGR foreground sequence for a `term` palette color
pub fn sgr_foreground(color: Color) -> String {
    if color < 8 {
        format!("\x1b[{}m", 30 + color)
    } else if color < 16 {
        format!("\x1b[{}m", 90 + (color - 8))
    } else {
        format!("\x1b[38;5;{}m", color)
    }
}

//
// Console width
//

static CONSOLE_WIDTH: OnceLock<usize> = OnceLock::new();

/// Override console width (for testing and `--console-width`)
pub fn set_console_width(width: usize) {
    let _ = CONSOLE_WIDTH.set(width); // Ignore error if already initialized
}

/// Console width: override, detected terminal size, or the default
pub fn console_width() -> usize {
    *CONSOLE_WIDTH.get_or_init(|| {
        if let Some((Width(w), _)) = terminal_size() { w as usize } else { DEFAULT_CONSOLE_WIDTH }
    })
}

fn banner_width() -> usize {
    console_width().clamp(20, MAX_BANNER_WIDTH)
}

//
// Text Formatting Utilities
//

/// Count the display width of a string, accounting for wide Unicode characters
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad string with trailing spaces to reach `width`; never truncates
pub fn pad_to_width(s: &str, width: usize) -> String {
    let display_w = display_width(s);
    if display_w >= width { s.to_string() } else { format!("{}{}", s, " ".repeat(width - display_w)) }
}

/// Truncate and pad string to exact width
pub fn truncate_with_padding(s: &str, width: usize) -> String {
    let display_w = display_width(s);

    if display_w <= width {
        return pad_to_width(s, width);
    }

    let mut result = String::new();
    let mut current_width = 0;

    // Reserve space for "..."
    let target_width = if width >= 3 { width - 3 } else { width };

    for c in s.chars() {
        let c_width = UnicodeWidthChar::width(c).unwrap_or(1);
        if current_width + c_width > target_width {
            break;
        }
        result.push(c);
        current_width += c_width;
    }

    if width >= 3 {
        result.push_str("...");
        current_width += 3;
    }

    if current_width < width {
        result.push_str(&" ".repeat(width - current_width));
    }

    result
}

#[cfg(test)]
#[path = "console_format_test.rs"]
mod console_format_test;
