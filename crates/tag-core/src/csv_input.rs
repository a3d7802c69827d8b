//! CSV import for batch runs.
//!
//! Headers are matched case-insensitively. Rows without a product name or
//! part number are reported as diagnostics and left out of the import.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::{Result, TagError};

/// Columns every batch CSV must have.
pub const REQUIRED_COLUMNS: [&str; 3] = ["product_name", "part_number", "qc_status"];

/// One CSV row keyed by lower-cased header name.
pub type RawRow = BTreeMap<String, String>;

/// A row that was rejected during import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RowDiagnostic {
    /// 1-based line in the file; the header is row 1.
    pub row: usize,
    pub message: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

/// Accepted rows and per-row diagnostics of one CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvImport {
    pub rows: Vec<RawRow>,
    pub errors: Vec<RowDiagnostic>,
}

/// Read and parse a CSV file.
pub fn read_csv(path: &Path) -> Result<CsvImport> {
    let file = File::open(path).map_err(|e| TagError::Csv(format!("{}: {e}", path.display())))?;
    let import = parse_csv(file)?;
    debug!(
        path = %path.display(),
        rows = import.rows.len(),
        rejected = import.errors.len(),
        "Read CSV"
    );
    Ok(import)
}

/// Parse CSV text. A leading UTF-8 BOM is ignored.
pub fn parse_csv<R: Read>(reader: R) -> Result<CsvImport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| TagError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == col))
        .collect();
    if !missing.is_empty() {
        return Err(TagError::Csv(format!(
            "CSV missing required headers: {}",
            missing.join(", ")
        )));
    }

    let mut import = CsvImport::default();
    for (idx, record) in rdr.records().enumerate() {
        let row = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                import.errors.push(RowDiagnostic {
                    row,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let fields: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.trim().to_string()))
            .collect();

        let has = |key: &str| fields.get(key).is_some_and(|v| !v.is_empty());
        if !has("product_name") || !has("part_number") {
            warn!(row, "Skipping CSV row without product_name or part_number");
            import.errors.push(RowDiagnostic {
                row,
                message: "missing product_name or part_number".into(),
            });
            continue;
        }
        import.rows.push(fields);
    }
    Ok(import)
}
