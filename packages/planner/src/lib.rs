//! Production plan extraction
//!
//! Reads a human-authored production planning workbook and extracts the
//! entries that are active for one shift on one day:
//! - locate the header row inside an irregular sheet
//! - resolve the program columns of the requested date
//! - filter rows by shift, activity and validity
//! - aggregate work orders, headcount and daily program
//! - export as CSV/XLSX, flat JSON or JSON grouped by line and shift
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prod_plan::{PlanConfig, PlanRequest, parse_plan_file};
//!
//! let request = PlanRequest::new(Some(date), Some("1"));
//! let plan = parse_plan_file("plano.xlsx", request, PlanConfig::default()).await?;
//! println!("{} OPs, {} programmed", plan.stats.op_list.len(), plan.stats.total_prog);
//! ```

pub mod cell;
pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod filter;
pub mod header;
pub mod parser;
pub mod rows;
pub mod sheet;
pub mod stats;
pub mod summary;
pub mod week;

pub use cell::Cell;
pub use config::{ColumnLabels, CsvOptions, PlanConfig};
pub use error::{PlanError, PlanResult};
pub use filter::StageCounts;
pub use parser::{
    ParsedPlan, PlanRequest, PlanWarning, load_sheet, parse_plan, parse_plan_bytes,
    parse_plan_file,
};
pub use rows::ProductRow;
pub use sheet::RawSheet;
pub use stats::PlanStats;
pub use summary::{LineSummary, summarize_lines};
pub use week::{DayPlan, day_label, export_file_name, parse_week, work_week};
