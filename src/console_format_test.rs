/// Tests for console formatting module
///
/// These tests ensure console output formatting remains stable.

#[cfg(test)]
mod tests {
    use crate::console_format::*;

    /// Standard width for tests to ensure reproducible output
    const TEST_CONSOLE_WIDTH: usize = 120;

    fn setup_test_width() {
        set_console_width(TEST_CONSOLE_WIDTH);
    }

    #[test]
    fn test_display_width_ascii() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width(""), 0);
        assert_eq!(display_width("test123"), 7);
    }

    #[test]
    fn test_display_width_unicode() {
        // Box drawing and badge glyphs are single width
        assert_eq!(display_width("━"), 1);
        assert_eq!(display_width("✓✗•"), 3);
        // Emoji (wide characters)
        assert_eq!(display_width("📦"), 2);
    }

    #[test]
    fn test_pad_to_width_never_truncates() {
        assert_eq!(pad_to_width("hi", 5), "hi   ");
        assert_eq!(pad_to_width("hello world", 5), "hello world");
        assert_eq!(pad_to_width("✓", 3), "✓  ");
    }

    #[test]
    fn test_truncate_with_padding_exact_fit() {
        let result = truncate_with_padding("hello", 5);
        assert_eq!(result, "hello");
    }

    #[test]
    fn test_truncate_with_padding_needs_truncation() {
        let result = truncate_with_padding("hello world", 8);
        assert_eq!(result, "hello...");
        assert_eq!(display_width(&result), 8);
    }

    #[test]
    fn test_truncate_with_padding_unicode() {
        let result = truncate_with_padding("test 📦 box", 10);
        assert_eq!(display_width(&result), 10);
    }

    #[test]
    fn test_sgr_foreground_palette() {
        assert_eq!(sgr_foreground(term::color::GREEN), "\x1b[32m");
        assert_eq!(sgr_foreground(term::color::BRIGHT_RED), "\x1b[91m");
        assert_eq!(sgr_foreground(200), "\x1b[38;5;200m");
    }

    #[test]
    fn test_colored_writer_plain_when_disabled() {
        let mut writer = StyledWriter::new(Vec::new(), false);
        writer.write_colored("OK", term::color::GREEN).unwrap();
        assert_eq!(writer.into_inner(), b"OK");
    }

    #[test]
    fn test_colored_writer_wraps_with_sgr() {
        let mut writer = StyledWriter::new(Vec::new(), true);
        writer.write_colored("OK", term::color::GREEN).unwrap();
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), "\x1b[32mOK\x1b[0m");
    }

    #[test]
    fn test_banner_is_capped() {
        setup_test_width();
        let mut writer = StyledWriter::new(Vec::new(), false);
        writer.write_banner("Stage timings").unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Stage timings");
        assert_eq!(display_width(lines[2]), 78);
    }
}
