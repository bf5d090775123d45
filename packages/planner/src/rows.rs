use crate::cell::Cell;
use crate::config::ColumnLabels;
use crate::sheet::RawSheet;
use serde::{Deserialize, Serialize};

/// One production entry below the header row.
///
/// Named fields are read through [`ProductRow::field`], which mirrors a
/// header→value map where a repeated header keeps its last value. Columns
/// whose header repeats (one `PROG` per day) must be read positionally
/// through [`ProductRow::cell`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductRow {
    #[serde(rename = "LINHA")]
    pub linha: String,
    #[serde(rename = "TURNO")]
    pub turno: String,
    #[serde(rename = "CÓDIGO")]
    pub codigo: String,
    #[serde(rename = "PRODUTO")]
    pub produto: String,
    #[serde(rename = "RATE")]
    pub rate: String,
    /// Work order, filled in by the stats pass
    #[serde(rename = "OP")]
    pub op: String,
    /// Headcount, filled in by the stats pass
    #[serde(rename = "HCs")]
    pub hcs: u64,
    /// Program quantity for the resolved day, filled in by the stats pass
    #[serde(rename = "PROG_DIA")]
    pub prog_dia: u64,
    /// Header→trimmed value, in header order; last duplicate wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
    #[serde(skip)]
    pub(crate) cells: Vec<Cell>,
}

impl ProductRow {
    /// Build the name-keyed and positional views of one sheet row.
    pub fn from_cells(headers: &[String], cells: Vec<Cell>, labels: &ColumnLabels) -> Self {
        let mut fields: Vec<(String, String)> = Vec::with_capacity(headers.len());
        for (col, header) in headers.iter().enumerate() {
            let value = cells.get(col).map(Cell::trimmed).unwrap_or_default();
            match fields.iter_mut().find(|(name, _)| name == header) {
                Some(slot) => slot.1 = value,
                None => fields.push((header.clone(), value)),
            }
        }

        let mut row = Self {
            fields,
            cells,
            ..Self::default()
        };
        row.linha = row.first_field(&labels.line).to_string();
        row.turno = row.first_field(&labels.shift).to_string();
        row.codigo = row.first_field(&labels.code).to_string();
        row.produto = row.first_field(&labels.product).to_string();
        row.rate = row.first_field(&labels.rate).to_string();
        row
    }

    /// Name-keyed value; `None` when the header does not exist.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value among header aliases, or `""`.
    pub fn first_field(&self, aliases: &[String]) -> &str {
        aliases
            .iter()
            .filter_map(|a| self.field(a))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    /// Raw cell at a column index.
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Materialise every row below the header, dropping rows without a product name.
pub fn extract_rows(
    sheet: &RawSheet,
    header_row: usize,
    headers: &[String],
    labels: &ColumnLabels,
) -> Vec<ProductRow> {
    sheet
        .rows()
        .iter()
        .skip(header_row + 1)
        .map(|cells| ProductRow::from_cells(headers, cells.clone(), labels))
        .filter(|row| !row.produto.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(items: &[&str]) -> Vec<Cell> {
        items
            .iter()
            .map(|s| if s.is_empty() { Cell::Empty } else { Cell::text(*s) })
            .collect()
    }

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn repeated_headers_keep_last_value_but_cells_keep_all() {
        let h = headers(&["LINHA", "PRODUTO", "PROG", "PROG"]);
        let row = ProductRow::from_cells(
            &h,
            cells(&["PD01", "Tampa", "100", "250"]),
            &ColumnLabels::default(),
        );
        assert_eq!(row.field("PROG"), Some("250"));
        assert_eq!(row.cell(2), Some(&Cell::text("100")));
        assert_eq!(row.cell(3), Some(&Cell::text("250")));
        assert_eq!(row.fields.len(), 3);
    }

    #[test]
    fn aliases_fill_named_fields() {
        let h = headers(&["LINHA", "TURNO", "CODIGO", "Produto", "RATE"]);
        let row = ProductRow::from_cells(
            &h,
            vec![
                Cell::text(" PD02 "),
                Cell::Number(1.0),
                Cell::text("SKU-9"),
                Cell::text("Base"),
            ],
            &ColumnLabels::default(),
        );
        assert_eq!(row.linha, "PD02");
        assert_eq!(row.turno, "1");
        assert_eq!(row.codigo, "SKU-9");
        assert_eq!(row.produto, "Base");
        assert_eq!(row.rate, "");
        assert_eq!(row.field("RATE"), Some(""));
        assert_eq!(row.field("MISSING"), None);
    }

    #[test]
    fn hand_built_rows_have_no_positional_cells() {
        let row = ProductRow {
            linha: "PD01".into(),
            produto: "Tampa".into(),
            prog_dia: 10,
            ..ProductRow::default()
        };
        assert!(row.cells().is_empty());
        assert_eq!(row.cell(0), None);
        assert_eq!(row.field("LINHA"), None);
    }

    #[test]
    fn rows_without_product_are_dropped() {
        let sheet = RawSheet::new(vec![
            cells(&["LINHA", "PRODUTO"]),
            cells(&["PD01", "Tampa"]),
            cells(&["PD01", "   "]),
            cells(&[]),
            cells(&["", "Corpo"]),
        ]);
        let h = headers(&["LINHA", "PRODUTO"]);
        let rows = extract_rows(&sheet, 0, &h, &ColumnLabels::default());
        let names: Vec<&str> = rows.iter().map(|r| r.produto.as_str()).collect();
        assert_eq!(names, vec!["Tampa", "Corpo"]);
    }
}
