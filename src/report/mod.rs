//! Report generation module - table rendering, status lines, archiving.
//!
//! This module handles:
//! - Parsing delimited profiler output into records
//! - Rendering records as bordered tables with a Total row
//! - Laying out label/value/status lines
//! - Sanitizing the captured output into the archived report
//!
//! Console concerns (widths, colors, banners) live in `console_format`.
//!
//! # Module Organization
//!
//! - `parse` - CSV text to `Record`
//! - `table` - Bordered table layout and Total row
//! - `status` - Badge lines for check results
//! - `finalize` - Escape stripping, glyph substitution, report file naming

mod finalize;
pub(crate) mod parse;
mod status;
mod table;

pub use finalize::{FinalizeMode, finalize_report, finalize_strip_only, report_file_name};
pub use status::write_status_lines;
pub use table::render_delimited;
