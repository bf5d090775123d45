use crate::error::{PlanError, PlanResult};
use crate::rows::ProductRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the flat JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub linha: String,
    pub sku: String,
    /// Shift as a number, 0 when the cell is not an integer
    pub turno: i64,
    pub hcs: u64,
}

fn parse_shift(turno: &str) -> i64 {
    turno.trim().parse().unwrap_or(0)
}

/// One entry per row that has a product code.
pub fn to_flat_entries(rows: &[ProductRow]) -> Vec<FlatEntry> {
    rows.iter()
        .filter(|row| !row.codigo.is_empty())
        .map(|row| FlatEntry {
            linha: row.linha.clone(),
            sku: row.codigo.clone(),
            turno: parse_shift(&row.turno),
            hcs: row.hcs,
        })
        .collect()
}

pub fn to_flat_json(rows: &[ProductRow]) -> PlanResult<String> {
    Ok(serde_json::to_string_pretty(&to_flat_entries(rows))?)
}

/// SKUs of one (line, shift) pair; `codigo`, `programado_dia` and `rate`
/// are index-aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanJsonEntry {
    pub linha: String,
    pub turno: i64,
    pub codigo: Vec<String>,
    /// Largest headcount among the group's rows, not their sum
    #[serde(rename = "hcs")]
    pub peak_hcs: u64,
    pub programado_dia: Vec<u64>,
    pub rate: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanJsonDocument {
    /// `yyyy-MM-dd`
    pub report_date: String,
    pub entries: Vec<PlanJsonEntry>,
}

/// Date accepted for the grouped document's `reportDate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDate {
    /// `yyyy-MM-dd` or `dd/MM/yyyy`
    Text(String),
    Date(NaiveDate),
}

impl From<NaiveDate> for ReportDate {
    fn from(d: NaiveDate) -> Self {
        ReportDate::Date(d)
    }
}

impl From<&str> for ReportDate {
    fn from(s: &str) -> Self {
        ReportDate::Text(s.to_string())
    }
}

/// Resolve a report date to ISO form; `None` means today.
pub fn report_date_iso(date: Option<&ReportDate>) -> PlanResult<String> {
    let date = match date {
        None => chrono::Local::now().date_naive(),
        Some(ReportDate::Date(d)) => *d,
        Some(ReportDate::Text(s)) => {
            let t = s.trim();
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(t, "%d/%m/%Y"))
                .map_err(|_| PlanError::InvalidReportDate(s.clone()))?
        }
    };
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Group rows by (line, shift) keeping at most `max_skus` distinct SKUs per group.
///
/// Groups are keyed on the trimmed shift text, so shifts `A` and `B` stay
/// apart even though both serialise as `turno: 0`. A repeated SKU sums its
/// program and keeps its first non-empty rate. SKUs past the cap are dropped.
/// Rows without a code still count towards the group's headcount.
pub fn group_entries(rows: &[ProductRow], max_skus: usize) -> Vec<PlanJsonEntry> {
    let mut entries: Vec<PlanJsonEntry> = Vec::new();
    let mut keys: Vec<(&str, &str)> = Vec::new();

    for row in rows {
        let key = (row.linha.as_str(), row.turno.trim());
        let idx = match keys.iter().position(|k| *k == key) {
            Some(idx) => idx,
            None => {
                keys.push(key);
                entries.push(PlanJsonEntry {
                    linha: row.linha.clone(),
                    turno: parse_shift(&row.turno),
                    codigo: Vec::new(),
                    peak_hcs: 0,
                    programado_dia: Vec::new(),
                    rate: Vec::new(),
                });
                entries.len() - 1
            }
        };
        let entry = &mut entries[idx];
        entry.peak_hcs = entry.peak_hcs.max(row.hcs);

        if row.codigo.is_empty() {
            continue;
        }
        match entry.codigo.iter().position(|c| *c == row.codigo) {
            Some(sku) => {
                entry.programado_dia[sku] = entry.programado_dia[sku].saturating_add(row.prog_dia);
                if entry.rate[sku].is_empty() {
                    entry.rate[sku] = row.rate.clone();
                }
            }
            None if entry.codigo.len() < max_skus => {
                entry.codigo.push(row.codigo.clone());
                entry.programado_dia.push(row.prog_dia);
                entry.rate.push(row.rate.clone());
            }
            None => {
                tracing::debug!(linha = %row.linha, sku = %row.codigo, "SKU cap reached, dropping");
            }
        }
    }
    entries
}

pub fn to_grouped_document(
    rows: &[ProductRow],
    report_date: Option<&ReportDate>,
    max_skus: usize,
) -> PlanResult<PlanJsonDocument> {
    Ok(PlanJsonDocument {
        report_date: report_date_iso(report_date)?,
        entries: group_entries(rows, max_skus),
    })
}

pub fn to_grouped_json(
    rows: &[ProductRow],
    report_date: Option<&ReportDate>,
    max_skus: usize,
) -> PlanResult<String> {
    Ok(serde_json::to_string_pretty(&to_grouped_document(
        rows,
        report_date,
        max_skus,
    )?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(linha: &str, turno: &str, codigo: &str, prog: u64, hcs: u64, rate: &str) -> ProductRow {
        ProductRow {
            linha: linha.into(),
            turno: turno.into(),
            codigo: codigo.into(),
            produto: format!("Produto {}", codigo),
            prog_dia: prog,
            hcs,
            rate: rate.into(),
            ..ProductRow::default()
        }
    }

    #[test]
    fn flat_export_skips_rows_without_code() {
        let rows = vec![
            row("PD01", "1", "SKU1", 10, 3, ""),
            row("PD01", "1", "", 10, 3, ""),
            row("PD02", "B", "SKU2", 10, 5, ""),
        ];
        let entries = to_flat_entries(&rows);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].turno, 1);
        assert_eq!(entries[1].turno, 0);
        assert_eq!(entries[1].sku, "SKU2");
        let v: serde_json::Value = serde_json::from_str(&to_flat_json(&rows).unwrap()).unwrap();
        assert_eq!(v[0]["linha"], "PD01");
        assert_eq!(v[0]["hcs"], 3);
    }

    #[test]
    fn sixth_sku_is_dropped() {
        let rows: Vec<ProductRow> = (1..=6)
            .map(|i| row("PD01", "1", &format!("SKU{}", i), 10 * i, 2, ""))
            .collect();
        let entries = group_entries(&rows, 5);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].codigo.len(), 5);
        assert!(!entries[0].codigo.contains(&"SKU6".to_string()));
        assert_eq!(entries[0].programado_dia, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn group_headcount_is_max_not_sum() {
        let rows = vec![
            row("PD01", "1", "SKU1", 10, 10, ""),
            row("PD01", "1", "SKU2", 10, 15, ""),
        ];
        let entries = group_entries(&rows, 5);
        assert_eq!(entries[0].peak_hcs, 15);
    }

    #[test]
    fn repeated_sku_sums_program_and_keeps_first_rate() {
        let rows = vec![
            row("PD01", "1", "SKU1", 100, 1, ""),
            row("PD01", "1", "SKU1", 50, 1, "80/h"),
            row("PD01", "1", "SKU1", 5, 1, "90/h"),
            row("PD01", "2", "SKU1", 7, 1, "10/h"),
        ];
        let entries = group_entries(&rows, 5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].codigo, vec!["SKU1"]);
        assert_eq!(entries[0].programado_dia, vec![155]);
        assert_eq!(entries[0].rate, vec!["80/h"]);
        assert_eq!(entries[1].turno, 2);
        assert_eq!(entries[1].programado_dia, vec![7]);
    }

    #[test]
    fn non_numeric_shifts_stay_in_separate_groups() {
        let rows = vec![
            row("PD01", "A", "SKU1", 10, 2, ""),
            row("PD01", "B", "SKU1", 20, 3, ""),
            row("PD01", " A ", "SKU1", 5, 1, ""),
        ];
        let entries = group_entries(&rows, 5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].turno, 0);
        assert_eq!(entries[1].turno, 0);
        assert_eq!(entries[0].programado_dia, vec![15]);
        assert_eq!(entries[1].programado_dia, vec![20]);
        assert_eq!(entries[1].peak_hcs, 3);
    }

    #[test]
    fn codeless_rows_only_count_headcount() {
        let rows = vec![
            row("PD01", "1", "SKU1", 10, 2, ""),
            row("PD01", "1", "", 99, 9, ""),
        ];
        let entries = group_entries(&rows, 5);
        assert_eq!(entries[0].codigo, vec!["SKU1"]);
        assert_eq!(entries[0].peak_hcs, 9);
    }

    #[test]
    fn report_date_forms() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 23).unwrap();
        assert_eq!(report_date_iso(Some(&d.into())).unwrap(), "2025-10-23");
        assert_eq!(report_date_iso(Some(&"2025-10-23".into())).unwrap(), "2025-10-23");
        assert_eq!(report_date_iso(Some(&"23/10/2025".into())).unwrap(), "2025-10-23");
        assert!(matches!(
            report_date_iso(Some(&"23.10.2025".into())),
            Err(PlanError::InvalidReportDate(_))
        ));
        let today = report_date_iso(None).unwrap();
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn grouped_document_shape() {
        let rows = vec![row("PD01", "1", "SKU1", 200, 4, "100/h")];
        let d: ReportDate = "23/10/2025".into();
        let json = to_grouped_json(&rows, Some(&d), 5).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["reportDate"], "2025-10-23");
        let e = &v["entries"][0];
        assert_eq!(e["linha"], "PD01");
        assert_eq!(e["turno"], 1);
        assert_eq!(e["codigo"][0], "SKU1");
        assert_eq!(e["hcs"], 4);
        assert_eq!(e["programado_dia"][0], 200);
        assert_eq!(e["rate"][0], "100/h");
    }
}
