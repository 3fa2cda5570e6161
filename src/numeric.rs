//! Numeric normalization for profiler table cells.
//!
//! Profilers mix timing notations in one table: scientific notation for
//! stage durations, long plain decimals for hook timings, integers for
//! counters, and free text for labels. Cells are classified by grammar
//! alone; anything that is not a plain decimal, an integer, or a
//! scientific-notation number is text and passes through untouched.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCIENTIFIC: Regex = Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)[eE][+-]?\d+$").unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^[+-]?\d*\.(\d+)$").unwrap();
    static ref INTEGER: Regex = Regex::new(r"^[+-]?\d+$").unwrap();
}

/// Fractional digits at which a plain decimal is treated as a high-precision duration.
pub const HIGH_PRECISION_DIGITS: usize = 6;

/// Scientific values whose decimal order of magnitude is 10^-2 or smaller print in ms.
const SCIENTIFIC_MS_BELOW: f64 = 0.1;

/// High-precision decimals below one millisecond print in ms.
const HIGH_PRECISION_MS_BELOW: f64 = 0.001;

/// Header substrings that mark a column as a derived ratio, never summed.
pub const DEFAULT_EXCLUDED_SUBSTRINGS: [&str; 3] = ["ratio", "rate", "pct"];

/// Grammar class of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellKind {
    /// `mantissa[eE][+-]exponent`, read as seconds.
    Scientific(f64),
    /// Plain decimal with at least [`HIGH_PRECISION_DIGITS`] fractional digits, read as seconds.
    HighPrecision(f64),
    /// Plain decimal with fewer fractional digits.
    Decimal { value: f64, places: usize },
    Integer(f64),
    Text,
}

impl CellKind {
    pub fn value(&self) -> Option<f64> {
        match *self {
            CellKind::Scientific(v) | CellKind::HighPrecision(v) | CellKind::Integer(v) => Some(v),
            CellKind::Decimal { value, .. } => Some(value),
            CellKind::Text => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, CellKind::Text)
    }
}

/// Classify a raw cell by grammar.
pub fn classify(raw: &str) -> CellKind {
    let s = raw.trim();
    if s.is_empty() {
        return CellKind::Text;
    }

    if INTEGER.is_match(s) {
        return s.parse::<f64>().map(CellKind::Integer).unwrap_or(CellKind::Text);
    }

    if let Some(caps) = DECIMAL.captures(s) {
        let places = caps.get(1).map_or(0, |m| m.as_str().len());
        return match s.parse::<f64>() {
            Ok(v) if places >= HIGH_PRECISION_DIGITS => CellKind::HighPrecision(v),
            Ok(value) => CellKind::Decimal { value, places },
            Err(_) => CellKind::Text,
        };
    }

    if SCIENTIFIC.is_match(s) {
        return s.parse::<f64>().map(CellKind::Scientific).unwrap_or(CellKind::Text);
    }

    CellKind::Text
}

/// Parse a cell as a number, honouring the same grammar as [`classify`].
pub fn parse_number(raw: &str) -> Option<f64> {
    classify(raw).value()
}

/// Display text for a cell.
pub fn format_cell(raw: &str) -> String {
    match classify(raw) {
        CellKind::Scientific(v) => format_scientific_duration(v),
        CellKind::HighPrecision(v) => format_high_precision(v, raw.trim()),
        _ => raw.to_string(),
    }
}

fn format_scientific_duration(seconds: f64) -> String {
    if seconds.abs() < SCIENTIFIC_MS_BELOW {
        format!("{:.4}ms", seconds * 1000.0)
    } else {
        format!("{:.4}s", seconds)
    }
}

fn format_high_precision(seconds: f64, text: &str) -> String {
    if seconds.abs() < HIGH_PRECISION_MS_BELOW {
        format!("{:.4}ms", seconds * 1000.0)
    } else {
        truncate_decimal_text(text, 4)
    }
}

/// Cut a decimal string to `places` fractional digits without rounding.
fn truncate_decimal_text(text: &str, places: usize) -> String {
    match text.find('.') {
        Some(dot) => {
            let end = (dot + 1 + places).min(text.len());
            let mut out = text[..end].to_string();
            if out.starts_with('.') {
                out.insert(0, '0');
            } else if out.starts_with("-.") || out.starts_with("+.") {
                out.insert(1, '0');
            }
            out
        }
        None => text.to_string(),
    }
}

/// Predicate deciding whether a header names a derived, non-additive column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummabilityRule {
    exclude: Vec<String>,
}

impl Default for SummabilityRule {
    fn default() -> Self {
        Self::with_excluded(DEFAULT_EXCLUDED_SUBSTRINGS.iter().map(|s| s.to_string()).collect())
    }
}

impl SummabilityRule {
    pub fn with_excluded(exclude: Vec<String>) -> Self {
        Self { exclude: exclude.into_iter().map(|s| s.to_lowercase()).filter(|s| !s.is_empty()).collect() }
    }

    /// True if the header (case-insensitive) contains an excluded substring.
    pub fn excludes_header(&self, header: &str) -> bool {
        let lower = header.to_lowercase();
        self.exclude.iter().any(|s| lower.contains(s.as_str()))
    }

    /// A column is summable when it is not the label column, its header is not
    /// excluded, and at least one cell parses as a non-negative number.
    pub fn is_summable<'a, I>(&self, column: usize, header: &str, cells: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if column == 0 || self.excludes_header(header) {
            return false;
        }
        cells.into_iter().filter_map(parse_number).any(|v| v >= 0.0)
    }
}

/// Sum of the parseable cells of a column, formatted for the Total row.
///
/// Text cells are skipped. Returns `None` when nothing parses.
pub fn column_sum<'a, I>(cells: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sum = 0.0;
    let mut seen = false;
    let mut any_scientific = false;
    let mut any_high_precision = false;
    let mut max_places = 0usize;

    for cell in cells {
        match classify(cell) {
            CellKind::Scientific(v) => {
                any_scientific = true;
                sum += v;
            }
            CellKind::HighPrecision(v) => {
                any_high_precision = true;
                sum += v;
            }
            CellKind::Decimal { value, places } => {
                max_places = max_places.max(places);
                sum += value;
            }
            CellKind::Integer(v) => sum += v,
            CellKind::Text => continue,
        }
        seen = true;
    }

    if !seen {
        return None;
    }

    let text = if any_scientific {
        format_scientific_duration(sum)
    } else if any_high_precision {
        format_high_precision(sum, &format!("{:.10}", sum))
    } else if max_places > 0 {
        format!("{:.*}", max_places, sum)
    } else {
        format!("{:.0}", sum)
    };
    Some(text)
}
