use crate::error::PlanResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for plan extraction and export
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanConfig {
    /// Header spellings the engine looks for
    #[serde(default)]
    pub labels: ColumnLabels,
    /// How many columns after a date cell are searched for the program-quantity sibling
    #[serde(default = "default_sibling_window")]
    pub sibling_window: usize,
    /// Maximum distinct SKUs kept per (line, shift) group in the grouped JSON export
    #[serde(default = "default_max_skus_per_linha")]
    pub max_skus_per_linha: usize,
    /// CSV rendering options
    #[serde(default)]
    pub csv: CsvOptions,
    /// Sheet name used for single-day XLSX exports
    #[serde(default = "default_xlsx_sheet_name")]
    pub xlsx_sheet_name: String,
}

fn default_sibling_window() -> usize {
    6
}
fn default_max_skus_per_linha() -> usize {
    5
}
fn default_xlsx_sheet_name() -> String {
    "Plan".to_string()
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            labels: ColumnLabels::default(),
            sibling_window: default_sibling_window(),
            max_skus_per_linha: default_max_skus_per_linha(),
            csv: CsvOptions::default(),
            xlsx_sheet_name: default_xlsx_sheet_name(),
        }
    }
}

impl PlanConfig {
    /// Load a config from a JSON file; missing fields fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PlanResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Header labels, matched against trimmed header cells.
///
/// Lists are aliases tried in order; the first header present wins.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnLabels {
    #[serde(default = "default_line")]
    pub line: Vec<String>,
    #[serde(default = "default_shift")]
    pub shift: Vec<String>,
    #[serde(default = "default_code")]
    pub code: Vec<String>,
    #[serde(default = "default_product")]
    pub product: Vec<String>,
    #[serde(default = "default_rate")]
    pub rate: Vec<String>,
    /// Exact header of the per-day program-quantity column
    #[serde(default = "default_program")]
    pub program: String,
    /// Substring identifying the header row's product-name cell (case-insensitive)
    #[serde(default = "default_header_product")]
    pub header_product: String,
    /// Substrings identifying the header row's product-code cell (case-insensitive)
    #[serde(default = "default_header_code")]
    pub header_code: Vec<String>,
    /// Work-order column: exact names first, then substrings
    #[serde(default = "default_op")]
    pub op: Vec<String>,
    /// Headcount column: exact names first, then substrings
    #[serde(default = "default_hc")]
    pub hc: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_line() -> Vec<String> {
    strings(&["LINHA"])
}
fn default_shift() -> Vec<String> {
    strings(&["TURNO"])
}
fn default_code() -> Vec<String> {
    strings(&["CÓDIGO", "CODIGO"])
}
fn default_product() -> Vec<String> {
    strings(&["PRODUTO", "Produto"])
}
fn default_rate() -> Vec<String> {
    strings(&["RATE"])
}
fn default_program() -> String {
    "PROG".to_string()
}
fn default_header_product() -> String {
    "PRODUTO".to_string()
}
fn default_header_code() -> Vec<String> {
    strings(&["CÓDIGO", "CODIGO"])
}
fn default_op() -> Vec<String> {
    strings(&["OP", "O.P.", "ORDEM DE PRODUÇÃO", "ORDEM DE PRODUCAO", "WORK ORDER"])
}
fn default_hc() -> Vec<String> {
    strings(&["HC", "HCS", "HC'S", "HEADCOUNT"])
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            line: default_line(),
            shift: default_shift(),
            code: default_code(),
            product: default_product(),
            rate: default_rate(),
            program: default_program(),
            header_product: default_header_product(),
            header_code: default_header_code(),
            op: default_op(),
            hc: default_hc(),
        }
    }
}

/// CSV output options
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CsvOptions {
    /// Field delimiter (`,` or `;` typical)
    #[serde(default = "default_delimiter")]
    pub delimiter: u8,
    /// Write a UTF-8 BOM (Excel-friendly on Windows)
    #[serde(default)]
    pub bom: bool,
    /// Use CRLF line endings instead of LF
    #[serde(default)]
    pub crlf: bool,
    /// Prefix a single quote to fields starting with `=`, `+`, `-` or `@`
    #[serde(default = "default_injection_hardening")]
    pub injection_hardening: bool,
}

fn default_delimiter() -> u8 {
    b','
}
fn default_injection_hardening() -> bool {
    true
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            bom: false,
            crlf: false,
            injection_hardening: default_injection_hardening(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: PlanConfig = serde_json::from_str(r#"{"max_skus_per_linha": 3}"#).unwrap();
        assert_eq!(cfg.max_skus_per_linha, 3);
        assert_eq!(cfg.sibling_window, 6);
        assert_eq!(cfg.labels.program, "PROG");
        assert_eq!(cfg.labels.code, vec!["CÓDIGO", "CODIGO"]);
        assert_eq!(cfg.csv.delimiter, b',');
    }

    #[test]
    fn from_json_file_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, r#"{"labels": {"program": "PROGRAMA"}, "csv": {"bom": true}}"#)
            .unwrap();
        let cfg = PlanConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.labels.program, "PROGRAMA");
        assert_eq!(cfg.labels.line, vec!["LINHA"]);
        assert!(cfg.csv.bom);
        assert!(cfg.csv.injection_hardening);
    }
}
