use crate::cell::Cell;
use crate::config::ColumnLabels;
use crate::error::{PlanError, PlanResult};
use crate::sheet::RawSheet;

/// Locate the header row and return its index with the trimmed header labels.
pub fn locate_header(sheet: &RawSheet, labels: &ColumnLabels) -> PlanResult<(usize, Vec<String>)> {
    let product = labels.header_product.to_uppercase();
    let codes: Vec<String> = labels.header_code.iter().map(|c| c.to_uppercase()).collect();

    let idx = sheet
        .rows()
        .iter()
        .position(|row| is_header_row(row, &product, &codes))
        .ok_or_else(|| PlanError::HeaderNotFound {
            product: labels.header_product.clone(),
            code: labels.header_code.join("/"),
        })?;

    let headers = sheet.rows()[idx].iter().map(Cell::trimmed).collect();
    tracing::debug!(header_row = idx, "Located header row");
    Ok((idx, headers))
}

fn is_header_row(row: &[Cell], product: &str, codes: &[String]) -> bool {
    let upper: Vec<String> = row
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.display().to_uppercase())
        .collect();
    let has_product = upper.iter().any(|c| c.contains(product));
    let has_code = upper
        .iter()
        .any(|c| codes.iter().any(|code| c.contains(code.as_str())));
    has_product && has_code
}
