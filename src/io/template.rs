//! The empty CSV users fill in before uploading.

use std::path::Path;

use crate::error::AppError;

/// Header row of the upload template.
pub const TEMPLATE_COLUMNS: [&str; 4] = ["Date", "Product", "Quantity_Sold", "Revenue"];

/// Write a header-only CSV template to `path`, creating parent directories.
pub fn write_upload_template(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(TEMPLATE_COLUMNS)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::io::ingest::{IngestOptions, load_ledger};

    #[test]
    fn template_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sales_upload_template.csv");
        write_upload_template(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Date,Product,Quantity_Sold,Revenue\n");

        // The template satisfies the schema; it just has no rows yet.
        let err = load_ledger(&path, IngestOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyLedger { dropped: 0 })
        ));
    }
}
