use crate::rows::ProductRow;
use serde::Serialize;

/// Rows of one production line, as shown grouped in a day view.
#[derive(Debug, Clone, Serialize)]
pub struct LineSummary<'a> {
    pub linha: &'a str,
    pub rows: Vec<&'a ProductRow>,
    /// Sum of `PROG_DIA` across the line's rows
    pub total_prog: u64,
    /// Largest headcount among the line's rows; rows of a line share their crew
    pub peak_hcs: u64,
}

/// Group rows by line in first-seen order.
pub fn summarize_lines(rows: &[ProductRow]) -> Vec<LineSummary<'_>> {
    let mut groups: Vec<LineSummary<'_>> = Vec::new();
    for row in rows {
        let idx = match groups.iter().position(|g| g.linha == row.linha) {
            Some(idx) => idx,
            None => {
                groups.push(LineSummary {
                    linha: &row.linha,
                    rows: Vec::new(),
                    total_prog: 0,
                    peak_hcs: 0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.rows.push(row);
        group.total_prog = group.total_prog.saturating_add(row.prog_dia);
        group.peak_hcs = group.peak_hcs.max(row.hcs);
    }
    groups
}
