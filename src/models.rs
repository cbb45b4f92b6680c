//! Data models for collected headlines and run results.
//!
//! - [`HeadlineRecord`]: one headline tagged with the source it came from
//! - [`ResultTable`]: every record of a run, in collection order
//! - [`SourceFailure`]: a source (or one of its selectors) that could not be scraped
//! - [`RunReport`]: the table plus the failures of one run
//! - [`Snapshot`]: a dated copy of a run, serialized to JSON

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single headline.
///
/// `text` is always trimmed and non-empty. Repeated headlines from the same
/// source are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeadlineRecord {
    /// Display name of the source, as written in the registry.
    pub source: String,
    /// The headline itself.
    pub text: String,
}

impl HeadlineRecord {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Ordered collection of headlines.
///
/// Insertion order is source order, then selector order, then document order
/// within a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    records: Vec<HeadlineRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the headlines of one source, skipping blank entries.
    pub fn extend_from_source<I>(&mut self, source: &str, headlines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.records.extend(
            headlines
                .into_iter()
                .filter(|text| !text.trim().is_empty())
                .map(|text| HeadlineRecord::new(source, text)),
        );
    }

    pub fn append(&mut self, other: ResultTable) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[HeadlineRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<HeadlineRecord> for ResultTable {
    fn from_iter<T: IntoIterator<Item = HeadlineRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// A source, or one selector of a source, that produced an error instead of headlines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub url: String,
    pub selector: String,
    pub message: String,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub table: ResultTable,
    pub failures: Vec<SourceFailure>,
}

/// A timestamped record of one run.
#[derive(Debug, Deserialize, Serialize)]
pub struct Snapshot {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the run, `HH:MM:SS`.
    pub local_time: String,
    /// Headlines in collection order.
    pub headlines: ResultTable,
    /// Sources that could not be scraped.
    pub failures: Vec<SourceFailure>,
}

impl Snapshot {
    pub fn new(at: DateTime<Local>, report: &RunReport) -> Self {
        Self {
            local_date: at.format("%Y-%m-%d").to_string(),
            local_time: at.format("%H:%M:%S").to_string(),
            headlines: report.table.clone(),
            failures: report.failures.clone(),
        }
    }

    /// File name for this snapshot inside its date directory, e.g. `143005.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.local_time.replace(':', ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_skips_blank_headlines() {
        let mut table = ResultTable::new();
        table.extend_from_source(
            "Ole",
            vec!["Boca gana".to_string(), "   ".to_string(), "Boca gana".to_string()],
        );

        assert_eq!(table.len(), 2);
        assert!(table.records().iter().all(|r| r.source == "Ole"));
        assert_eq!(table.records()[0], table.records()[1]);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut first: ResultTable = vec![HeadlineRecord::new("Ole", "A")].into_iter().collect();
        let second: ResultTable = vec![HeadlineRecord::new("As", "B")].into_iter().collect();
        first.append(second);

        let sources: Vec<&str> = first.records().iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["Ole", "As"]);
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = Snapshot {
            local_date: "2025-05-06".to_string(),
            local_time: "20:30:00".to_string(),
            headlines: vec![HeadlineRecord::new("Marca", "El Madrid gana")]
                .into_iter()
                .collect(),
            failures: vec![],
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("2025-05-06"));
        assert!(json.contains(r#""headlines":[{"source":"Marca","text":"El Madrid gana"}]"#));
    }

    #[test]
    fn test_snapshot_from_report_is_timestamped() {
        use chrono::TimeZone;

        let at = Local.with_ymd_and_hms(2025, 5, 6, 14, 30, 5).unwrap();
        let report = RunReport {
            table: vec![HeadlineRecord::new("Ole", "Boca gana")].into_iter().collect(),
            failures: vec![],
        };

        let snapshot = Snapshot::new(at, &report);
        assert_eq!(snapshot.local_date, "2025-05-06");
        assert_eq!(snapshot.local_time, "14:30:05");
        assert_eq!(snapshot.file_name(), "143005.json");
        assert_eq!(snapshot.headlines, report.table);
    }

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{
            "local_date": "2025-05-06",
            "local_time": "08:00:00",
            "headlines": [{"source": "As", "text": "Real gana"}],
            "failures": [{"source": "Ole", "url": "https://www.ole.com.ar/", "selector": "h2", "message": "timeout"}]
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.file_name(), "080000.json");
        assert_eq!(snapshot.headlines.len(), 1);
        assert_eq!(snapshot.failures[0].source, "Ole");
    }
}
