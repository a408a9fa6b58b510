//! Export the aggregate summary to JSON.
//!
//! The export is meant to be easy to consume in dashboards or downstream
//! scripts; revenue amounts are serialized as decimal strings.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::aggregate::LedgerSummary;
use crate::error::AppError;

/// Write the summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &LedgerSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        ))
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::io::ingest::{IngestOptions, read_ledger};

    #[test]
    fn summary_json_round_trips_revenue_as_strings() {
        let csv = "Date,Product,Revenue\n2023-01-02,Widget,100.25\n2023-02-02,Gadget,30\n";
        let ingest = read_ledger(csv.as_bytes(), IngestOptions::default()).unwrap();
        let summary = summarize(&ingest, 5);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_summary_json(&path, &summary).unwrap();

        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["total_revenue"], "130.25");
        assert_eq!(value["monthly"][0]["label"], "2023-01");
        assert_eq!(value["top_products"][0]["label"], "Widget");
        assert_eq!(value["rows_used"], 2);
    }
}
