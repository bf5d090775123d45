//! Cell values as read from the first worksheet, and the normalisers that
//! turn them into canonical strings and integers.

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// First numeric token: digit groups joined by `.` or whitespace thousands
/// separators, or a plain digit run. A trailing group must be exactly three
/// digits.
static NUMERIC_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}(?:[.\s]\d{3})+\b|\d+").expect("valid numeric token regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Canonical display string, untrimmed.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) => format_number(*f),
            Cell::Date(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
                }
            }
        }
    }

    /// Display string with surrounding whitespace removed.
    pub fn trimmed(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            other => other.display(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(v: &Data) -> Self {
        match v {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
            // as_datetime honours the workbook's 1900/1904 date system
            Data::DateTime(serial) => match serial.as_datetime() {
                Some(dt) if !serial.is_duration() => Cell::Date(dt),
                _ => Cell::Number(serial.as_f64()),
            },
            Data::DateTimeIso(s) => parse_iso_datetime(s)
                .map(Cell::Date)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(format!("#ERROR:{:?}", e)),
        }
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && (-9_007_199_254_740_992.0..=9_007_199_254_740_992.0).contains(&f) {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Normalise a cell to a non-negative integer.
///
/// Numbers are rounded. Text yields its first numeric token, where `.` or
/// whitespace between groups of three digits counts as a thousands
/// separator; anything without a digit is 0. Negative numbers clamp to 0.
pub fn normalize_int(cell: &Cell) -> u64 {
    match cell {
        Cell::Number(f) => round_non_negative(*f),
        Cell::Text(s) => normalize_int_str(s),
        Cell::Empty | Cell::Date(_) => 0,
    }
}

pub fn normalize_int_str(s: &str) -> u64 {
    let Some(token) = NUMERIC_TOKEN_RE.find(s) else {
        return 0;
    };
    let digits: String = token
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn round_non_negative(f: f64) -> u64 {
    if !f.is_finite() || f <= 0.0 {
        return 0;
    }
    let rounded = f.round();
    if rounded >= u64::MAX as f64 {
        u64::MAX
    } else {
        rounded as u64
    }
}
