//! Plain-text rendering of the headline table for the terminal.

use crate::models::ResultTable;
use crate::outputs::csv::HeaderVariant;
use std::fmt::Write;

/// Render the table as two aligned columns with a header and separator line.
pub fn render(table: &ResultTable, header: HeaderVariant) -> String {
    let [source_col, text_col] = header.columns();
    let width = table
        .records()
        .iter()
        .map(|r| r.source.chars().count())
        .chain(std::iter::once(source_col.chars().count()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{source_col:<width$}  {text_col}");
    let _ = writeln!(out, "{}  {}", "-".repeat(width), "-".repeat(text_col.len()));
    for record in table.records() {
        let _ = writeln!(out, "{:<width$}  {}", record.source, record.text);
    }
    out
}
