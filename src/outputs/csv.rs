//! CSV export of the headline table.
//!
//! UTF-8, comma separated, one record per line, header `Fuente,Titular` (or
//! `Fuente,Headline`). Fields containing a comma, quote, or line break are
//! quoted, with embedded quotes doubled.

use crate::models::ResultTable;
use clap::ValueEnum;
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Name of the headline column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HeaderVariant {
    /// `Fuente,Titular`
    #[default]
    Titular,
    /// `Fuente,Headline`
    Headline,
}

impl HeaderVariant {
    pub fn columns(self) -> [&'static str; 2] {
        match self {
            HeaderVariant::Titular => ["Fuente", "Titular"],
            HeaderVariant::Headline => ["Fuente", "Headline"],
        }
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

/// Write the header line and every record.
pub fn write_table<W: Write>(mut w: W, table: &ResultTable, header: HeaderVariant) -> io::Result<()> {
    write_row(&mut w, &header.columns())?;
    for record in table.records() {
        write_row(&mut w, &[record.source.as_str(), record.text.as_str()])?;
    }
    Ok(())
}

/// The whole table as a CSV string.
pub fn to_csv_string(table: &ResultTable, header: HeaderVariant) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_table(&mut buf, table, header);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write the table to `path` as UTF-8 CSV, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_csv(
    path: &Path,
    table: &ResultTable,
    header: HeaderVariant,
) -> Result<(), Box<dyn Error>> {
    let csv = to_csv_string(table, header);
    fs::write(path, csv).await?;
    info!(rows = table.len(), "Wrote CSV export");
    Ok(())
}
