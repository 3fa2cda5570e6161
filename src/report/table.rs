//! Bordered text tables with a derived Total row.
//!
//! Layout, for N data rows:
//!
//! ```text
//! +-----------+---------+
//! | stage     | time    |     header
//! +-----------+---------+
//! | bootstrap | 0.1230s |     N data rows
//! | template  | 0.2100s |
//! +-----------+---------+     only when N >= 2
//! | Total     | 0.3330s |
//! +-----------+---------+
//! ```
//!
//! Rendering is a pure function of its input: the same record and rule
//! always produce byte-identical text.

use super::parse::parse_delimited;
use crate::console_format::{display_width, pad_to_width};
use crate::error::{ReportError, Result};
use crate::numeric::{self, SummabilityRule};
use crate::types::Record;

/// Label written in the first column of the Total row.
pub const TOTAL_LABEL: &str = "Total";

/// Cell written for columns that are not summed.
pub const TOTAL_PLACEHOLDER: &str = "-";

/// Display text of every line of the table, before borders are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: Option<Vec<String>>,
    pub widths: Vec<usize>,
}

impl TableLayout {
    pub fn build(record: &Record, rule: &SummabilityRule) -> Result<Self> {
        if record.header.is_empty() {
            return Err(ReportError::render("table has no columns"));
        }

        let header: Vec<String> = record.header.iter().map(|h| single_line(h)).collect();
        let rows: Vec<Vec<String>> =
            record.rows.iter().map(|row| row.iter().map(|c| single_line(&numeric::format_cell(c))).collect()).collect();
        let total = if record.rows.len() >= 2 { Some(total_row(record, rule)) } else { None };

        let mut widths: Vec<usize> = header.iter().map(|h| display_width(h)).collect();
        for line in rows.iter().chain(total.iter()) {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(display_width(cell));
            }
        }

        Ok(Self { header, rows, total, widths })
    }

    fn rule_line(&self) -> String {
        let mut line = String::from("+");
        for width in &self.widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    }

    fn cell_line(&self, cells: &[String]) -> String {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(&self.widths) {
            line.push(' ');
            line.push_str(&pad_to_width(cell, *width));
            line.push_str(" |");
        }
        line
    }

    /// Borders and cells as text, one trailing newline per line.
    pub fn render(&self) -> String {
        let rule = self.rule_line();
        let mut out = String::new();
        let mut push = |line: &str| {
            out.push_str(line);
            out.push('\n');
        };

        push(&rule);
        push(&self.cell_line(&self.header));
        push(&rule);
        for row in &self.rows {
            push(&self.cell_line(row));
        }
        if let Some(total) = &self.total {
            push(&rule);
            push(&self.cell_line(total));
        }
        if !self.rows.is_empty() {
            push(&rule);
        }
        out
    }
}

fn total_row(record: &Record, rule: &SummabilityRule) -> Vec<String> {
    record
        .header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == 0 {
                TOTAL_LABEL.to_string()
            } else if rule.is_summable(i, name, record.column(i)) {
                numeric::column_sum(record.column(i)).unwrap_or_else(|| TOTAL_PLACEHOLDER.to_string())
            } else {
                TOTAL_PLACEHOLDER.to_string()
            }
        })
        .collect()
}

/// Cells must not break the line structure of the table.
fn single_line(cell: &str) -> String {
    if cell.contains(['\n', '\r', '\t']) {
        cell.split(['\n', '\r', '\t']).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
    } else {
        cell.to_string()
    }
}

/// Render a record as a bordered table.
pub fn render_table(record: &Record, rule: &SummabilityRule) -> Result<String> {
    Ok(TableLayout::build(record, rule)?.render())
}

/// Parse delimited text and render it.
pub fn render_delimited(text: &str, rule: &SummabilityRule) -> Result<String> {
    render_table(&parse_delimited(text)?, rule)
}

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;
