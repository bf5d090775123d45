use crate::cell::normalize_int;
use crate::config::ColumnLabels;
use crate::filter::program_columns;
use crate::rows::ProductRow;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Aggregates over the filtered rows of one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    /// Distinct non-empty work orders, first-seen order
    pub op_list: Vec<String>,
    /// Sheet-wide headcount: the sum over every returned row
    #[serde(rename = "totalHCs")]
    pub total_hcs: u64,
    /// Sum of the day's program quantity over every returned row
    pub total_prog: u64,
}

/// Work-order and headcount column positions in the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatColumns {
    pub op: Option<usize>,
    pub hc: Option<usize>,
}

impl StatColumns {
    pub fn detect(headers: &[String], labels: &ColumnLabels) -> Self {
        Self {
            op: find_column(headers, &labels.op),
            hc: find_column(headers, &labels.hc),
        }
    }
}

/// Exact match on upper-cased trimmed headers first, then substring.
fn find_column(headers: &[String], candidates: &[String]) -> Option<usize> {
    let upper: Vec<String> = headers.iter().map(|h| h.trim().to_uppercase()).collect();
    let wanted: Vec<String> = candidates.iter().map(|c| c.to_uppercase()).collect();

    upper
        .iter()
        .position(|h| wanted.iter().any(|w| h == w))
        .or_else(|| {
            upper.iter().position(|h| {
                !h.is_empty() && wanted.iter().any(|w| h.contains(w.as_str()))
            })
        })
}

/// Fill each row's `OP`, `HCs` and `PROG_DIA`, then aggregate.
pub fn enrich_and_aggregate(
    rows: &mut [ProductRow],
    headers: &[String],
    date_columns: &[usize],
    labels: &ColumnLabels,
) -> PlanStats {
    let cols = StatColumns::detect(headers, labels);
    let prog_cols: Vec<usize> = program_columns(date_columns, headers, &labels.program).collect();
    tracing::debug!(op = ?cols.op, hc = ?cols.hc, prog = ?prog_cols, "Stat columns");

    let mut stats = PlanStats::default();
    let mut seen_ops: AHashSet<String> = AHashSet::new();

    for row in rows.iter_mut() {
        row.op = cols
            .op
            .and_then(|c| row.cell(c))
            .map(|c| c.trimmed())
            .unwrap_or_default();
        row.hcs = cols
            .hc
            .and_then(|c| row.cell(c))
            .map(normalize_int)
            .unwrap_or(0);
        row.prog_dia = prog_cols
            .iter()
            .filter_map(|&c| row.cell(c))
            .map(normalize_int)
            .fold(0u64, u64::saturating_add);

        if !row.op.is_empty() && seen_ops.insert(row.op.clone()) {
            stats.op_list.push(row.op.clone());
        }
        stats.total_hcs = stats.total_hcs.saturating_add(row.hcs);
        stats.total_prog = stats.total_prog.saturating_add(row.prog_dia);
    }
    stats
}
