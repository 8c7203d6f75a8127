//! CSV serialization for extracted tables.
//!
//! The engine hands back plain ordered tables; this module owns the
//! file format.

use std::path::Path;

use anyhow::{Context, Result};

use gsc_extract::ReportTable;

/// Write one table as a CSV file with a header row.
pub fn write_csv(table: &ReportTable, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;

    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
