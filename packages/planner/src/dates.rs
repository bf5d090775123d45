//! Resolution of the header columns that hold the program quantity for one
//! calendar day.
//!
//! The row above the header carries the dates, usually as a merged cell that
//! spans a whole date group (`PROG`, `REAL`, `SET-UP`, `RAMP`). Only the
//! anchor cell of a merge has a value, so a matching date cell is followed
//! by a bounded lookahead for its `PROG` sibling.

use crate::cell::Cell;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static PT_SHORT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)/(\w+)").expect("valid pt date regex"));
static EN_SHORT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)-(\w+)").expect("valid en date regex"));

const PT_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Day and month a date-row cell stands for. The year never takes part in
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMonth {
    pub day: u32,
    pub month: u32,
}

impl From<NaiveDate> for DayMonth {
    fn from(d: NaiveDate) -> Self {
        Self {
            day: d.day(),
            month: d.month(),
        }
    }
}

/// Interpret a date-row cell.
///
/// Native dates are used as-is. Text is tried as `23/out` (Portuguese
/// month abbreviations, any case) and then as `23-Oct` (English
/// abbreviations, title case). Impossible combinations such as `31/fev`
/// yield `None`.
pub fn parse_date_cell(cell: &Cell, year: i32) -> Option<DayMonth> {
    match cell {
        Cell::Date(dt) => Some(dt.date().into()),
        Cell::Text(s) => {
            let s = s.trim();
            parse_short(&PT_SHORT_DATE_RE, s, year, |m| {
                month_index(&PT_MONTHS, &m.to_lowercase())
            })
            .or_else(|| parse_short(&EN_SHORT_DATE_RE, s, year, |m| month_index(&EN_MONTHS, m)))
        }
        Cell::Empty | Cell::Number(_) => None,
    }
}

fn parse_short(
    re: &Regex,
    s: &str,
    year: i32,
    month_of: impl Fn(&str) -> Option<u32>,
) -> Option<DayMonth> {
    let caps = re.captures(s)?;
    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let month = month_of(caps.get(2)?.as_str())?;
    NaiveDate::from_ymd_opt(year, month, day).map(DayMonth::from)
}

fn month_index(table: &[&str; 12], name: &str) -> Option<u32> {
    table
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

/// Search `headers[anchor..=anchor + window]` for a header equal to `label`.
pub fn find_sibling_column(
    headers: &[String],
    anchor: usize,
    window: usize,
    label: &str,
) -> Option<usize> {
    let end = anchor.saturating_add(window).min(headers.len().checked_sub(1)?);
    (anchor..=end).find(|&j| headers.get(j).is_some_and(|h| h == label))
}

/// Columns that carry the program quantity for `target`.
///
/// Every date-row cell matching the target's day and month contributes its
/// nearest `program_label` sibling within `window`, or itself when no
/// sibling exists. The result is deduplicated and keeps discovery order; it
/// is empty when the date does not appear in the sheet.
pub fn resolve_date_columns(
    target: NaiveDate,
    headers: &[String],
    date_row: &[Cell],
    program_label: &str,
    window: usize,
) -> Vec<usize> {
    let wanted = DayMonth::from(target);
    let mut columns: Vec<usize> = Vec::new();

    for (i, cell) in date_row.iter().enumerate() {
        if cell.is_empty() {
            continue;
        }
        if parse_date_cell(cell, target.year()) != Some(wanted) {
            continue;
        }
        let col = find_sibling_column(headers, i, window, program_label).unwrap_or(i);
        tracing::debug!(
            date_cell = i,
            column = col,
            header = headers.get(col).map(String::as_str).unwrap_or(""),
            "Matched target date"
        );
        if !columns.contains(&col) {
            columns.push(col);
        }
    }
    columns
}
