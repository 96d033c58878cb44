use crate::table::RecordTable;
use crate::CoreError;

/// File name offered when the user leaves the name blank.
pub const DEFAULT_EXPORT_NAME: &str = "dados";

/// Serializes `table` as UTF-8 CSV with a header row.
///
/// # Errors
///
/// Returns [`CoreError::Csv`] if the writer fails.
pub fn to_csv(table: &RecordTable) -> Result<Vec<u8>, CoreError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(table.headers())?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.into_inner()
        .map_err(|e| CoreError::Csv(csv::Error::from(e.into_error())))
}

/// The download file name: the user-supplied stem plus `.csv`.
#[must_use]
pub fn export_file_name(stem: Option<&str>) -> String {
    let stem = stem
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EXPORT_NAME);
    let stem = stem.strip_suffix(".csv").unwrap_or(stem);
    // Path separators and quotes would break the Content-Disposition header.
    let stem: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '"') { '_' } else { c })
        .collect();
    format!("{stem}.csv")
}
