//! Delimited text to [`Record`].
//!
//! The first line is the header. Quoted and escaped cells are unescaped by
//! the CSV reader. Rows whose field count differs from the header are
//! dropped rather than failing the whole table.

use crate::error::{ReportError, Result};
use crate::types::Record;
use log::debug;

/// Parse CSV text into a header and aligned rows.
pub fn parse_delimited(text: &str) -> Result<Record> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(text.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| ReportError::render(format!("unreadable header: {}", e)))?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    if header.iter().all(|h| h.is_empty()) {
        return Err(ReportError::render("no header row"));
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) if record.len() == header.len() => rows.push(record.iter().map(String::from).collect()),
            Ok(record) => {
                debug!("Dropping row with {} fields (header has {})", record.len(), header.len());
                dropped += 1;
            }
            Err(e) => {
                debug!("Dropping unreadable row: {}", e);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} malformed row(s)", dropped);
    }

    Ok(Record::new(header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let record = parse_delimited("stage,time\nbootstrap,1.23e-01\nmain_query,5.00e-03\n").unwrap();
        assert_eq!(record.header, vec!["stage", "time"]);
        assert_eq!(record.rows.len(), 2);
        assert_eq!(record.rows[1], vec!["main_query", "5.00e-03"]);
    }

    #[test]
    fn test_parse_unescapes_quotes() {
        let record = parse_delimited("hook,callback\n\"init\",\"say \"\"hi\"\", then leave\"\n").unwrap();
        assert_eq!(record.rows[0][1], "say \"hi\", then leave");
    }

    #[test]
    fn test_parse_drops_malformed_rows() {
        let record = parse_delimited("a,b\n1,2\n3\n4,5,6\n7,8\n").unwrap();
        assert_eq!(record.rows, vec![vec!["1".to_string(), "2".to_string()], vec!["7".into(), "8".into()]]);
    }

    #[test]
    fn test_parse_header_only() {
        let record = parse_delimited("stage,time\n").unwrap();
        assert!(record.rows.is_empty());
        assert_eq!(record.header.len(), 2);
    }

    #[test]
    fn test_parse_empty_is_render_error() {
        assert!(matches!(parse_delimited(""), Err(ReportError::Render { .. })));
        assert!(matches!(parse_delimited("\n\n"), Err(ReportError::Render { .. })));
    }
}
