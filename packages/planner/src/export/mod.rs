//! Export encodings of the extracted rows.

pub mod json;
pub mod tabular;

pub use json::{
    FlatEntry, PlanJsonDocument, PlanJsonEntry, ReportDate, group_entries, report_date_iso,
    to_flat_entries, to_flat_json, to_grouped_document, to_grouped_json,
};
pub use tabular::{TABULAR_COLUMNS, to_csv, to_xlsx, week_to_xlsx};
