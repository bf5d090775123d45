use crate::config::PlanConfig;
use crate::dates::resolve_date_columns;
use crate::error::PlanResult;
use crate::filter::{StageCounts, apply_filters};
use crate::header::locate_header;
use crate::rows::{ProductRow, extract_rows};
use crate::sheet::RawSheet;
use crate::stats::{PlanStats, enrich_and_aggregate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to extract: the day whose program decides activity, and the shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Only day and month are matched against the sheet; the year is ignored
    pub date: Option<NaiveDate>,
    /// Compared verbatim against the trimmed `TURNO` cell
    pub shift: Option<String>,
}

impl PlanRequest {
    pub fn new(date: Option<NaiveDate>, shift: Option<impl Into<String>>) -> Self {
        Self {
            date,
            shift: shift.map(Into::into),
        }
    }
}

/// Conditions that degraded a parse without failing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// The requested date has no column in the sheet; rows were not filtered by activity
    DateNotFound { date: NaiveDate },
}

/// Result bundle of one parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPlan {
    pub headers: Vec<String>,
    pub header_row: usize,
    /// Header columns resolved for the requested date
    pub date_columns: Vec<usize>,
    pub rows: Vec<ProductRow>,
    pub stats: PlanStats,
    pub counts: StageCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanWarning>,
}

/// Run the extraction pipeline over an already-read sheet.
pub fn parse_plan(sheet: &RawSheet, request: &PlanRequest, cfg: &PlanConfig) -> PlanResult<ParsedPlan> {
    let labels = &cfg.labels;
    let (header_row, headers) = locate_header(sheet, labels)?;

    let mut warnings = Vec::new();
    let date_columns = match request.date {
        Some(date) => {
            let date_row = header_row
                .checked_sub(1)
                .and_then(|i| sheet.row(i))
                .unwrap_or(&[]);
            let cols = resolve_date_columns(date, &headers, date_row, &labels.program, cfg.sibling_window);
            if cols.is_empty() {
                tracing::warn!(%date, "No columns found for target date, activity filter skipped");
                warnings.push(PlanWarning::DateNotFound { date });
            }
            cols
        }
        None => Vec::new(),
    };

    let rows = extract_rows(sheet, header_row, &headers, labels);
    let (mut rows, counts) = apply_filters(
        rows,
        request.shift.as_deref(),
        &date_columns,
        &headers,
        &labels.program,
    );
    let stats = enrich_and_aggregate(&mut rows, &headers, &date_columns, labels);

    tracing::info!(
        date = ?request.date,
        shift = ?request.shift,
        rows = rows.len(),
        ops = stats.op_list.len(),
        total_prog = stats.total_prog,
        "Parsed production plan"
    );

    Ok(ParsedPlan {
        headers,
        header_row,
        date_columns,
        rows,
        stats,
        counts,
        warnings,
    })
}

/// Read the first worksheet from workbook bytes and parse it.
pub fn parse_plan_bytes(data: &[u8], request: &PlanRequest, cfg: &PlanConfig) -> PlanResult<ParsedPlan> {
    let sheet = RawSheet::from_bytes(data)?;
    parse_plan(&sheet, request, cfg)
}

/// Read a workbook from disk; the decode runs on the blocking pool.
pub async fn load_sheet(path: impl AsRef<Path>) -> PlanResult<RawSheet> {
    let data = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || RawSheet::from_bytes(&data)).await?
}

/// Read a workbook from disk and parse it for one request.
pub async fn parse_plan_file(
    path: impl AsRef<Path>,
    request: PlanRequest,
    cfg: PlanConfig,
) -> PlanResult<ParsedPlan> {
    let sheet = load_sheet(path).await?;
    tokio::task::spawn_blocking(move || parse_plan(&sheet, &request, &cfg)).await?
}
