//! Shift, date-activity and validity filters.
//!
//! Each stage is total: rows are kept or dropped, nothing fails. Rows are
//! never deduplicated by line; several SKUs may share a line on one day.

use crate::cell::normalize_int;
use crate::rows::ProductRow;
use serde::{Deserialize, Serialize};

/// Row counts after each stage, always non-increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub extracted: usize,
    pub after_shift: usize,
    pub after_date: usize,
    pub after_validity: usize,
}

/// Keep rows whose trimmed shift equals `shift`. A missing or blank shift
/// keeps everything.
pub fn filter_shift(rows: Vec<ProductRow>, shift: Option<&str>) -> Vec<ProductRow> {
    let Some(shift) = shift.filter(|s| !s.is_empty()) else {
        return rows;
    };
    rows.into_iter()
        .filter(|row| row.turno.trim() == shift)
        .collect()
}

/// Whether any resolved `PROG` column of the row holds a positive quantity.
pub fn is_active(
    row: &ProductRow,
    columns: &[usize],
    headers: &[String],
    program_label: &str,
) -> bool {
    program_columns(columns, headers, program_label)
        .any(|col| row.cell(col).map(normalize_int).unwrap_or(0) > 0)
}

/// Resolved columns whose header is exactly the program label.
pub fn program_columns<'a>(
    columns: &'a [usize],
    headers: &'a [String],
    program_label: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    columns
        .iter()
        .copied()
        .filter(move |&col| headers.get(col).is_some_and(|h| h == program_label))
}

/// Keep rows active on the resolved day. With no resolved column the
/// activity is unknown and every row passes.
pub fn filter_active(
    rows: Vec<ProductRow>,
    columns: &[usize],
    headers: &[String],
    program_label: &str,
) -> Vec<ProductRow> {
    if columns.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| {
            let active = is_active(row, columns, headers, program_label);
            tracing::trace!(linha = %row.linha, produto = %row.produto, active, "Activity check");
            active
        })
        .collect()
}

/// Drop rows without a line or a product.
pub fn filter_valid(rows: Vec<ProductRow>) -> Vec<ProductRow> {
    rows.into_iter()
        .filter(|row| !row.linha.is_empty() && !row.produto.is_empty())
        .collect()
}

/// Run the three stages in order, recording the count after each.
pub fn apply_filters(
    rows: Vec<ProductRow>,
    shift: Option<&str>,
    columns: &[usize],
    headers: &[String],
    program_label: &str,
) -> (Vec<ProductRow>, StageCounts) {
    let extracted = rows.len();
    let rows = filter_shift(rows, shift);
    let after_shift = rows.len();
    let rows = filter_active(rows, columns, headers, program_label);
    let after_date = rows.len();
    let rows = filter_valid(rows);
    let counts = StageCounts {
        extracted,
        after_shift,
        after_date,
        after_validity: rows.len(),
    };
    tracing::debug!(?counts, "Filtered plan rows");
    (rows, counts)
}
