//! Error types for plan extraction

use thiserror::Error;

/// Result type for plan operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Structural failures that abort a whole parse or export.
///
/// Data-quality problems on single rows or cells never end up here; they are
/// absorbed by the pipeline (see [`crate::filter`] and [`crate::cell`]).
#[derive(Error, Debug)]
pub enum PlanError {
    /// No row mentions both the product-name and product-code labels
    #[error("Header row not found (looking for {product} and {code} columns)")]
    HeaderNotFound { product: String, code: String },

    /// The input could not be read at all
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes were read but are not a workbook calamine understands
    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook has no worksheet to read from
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    /// A report date that is neither `yyyy-MM-dd` nor `dd/MM/yyyy`
    #[error("Invalid report date '{0}' (expected yyyy-MM-dd or dd/MM/yyyy)")]
    InvalidReportDate(String),

    /// Serialising one of the export encodings failed
    #[error("Export error: {0}")]
    Export(String),

    /// A concurrent day parse did not finish
    #[error("Parse task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<csv::Error> for PlanError {
    fn from(e: csv::Error) -> Self {
        PlanError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(e: serde_json::Error) -> Self {
        PlanError::Export(e.to_string())
    }
}
