use crate::config::CsvOptions;
use crate::error::{PlanError, PlanResult};
use crate::rows::ProductRow;
use crate::week::DayPlan;
use csv::WriterBuilder;
use std::io::Cursor;

/// Fixed column set of the tabular exports.
pub const TABULAR_COLUMNS: [&str; 8] = [
    "LINHA", "TURNO", "CÓDIGO", "PRODUTO", "OP", "HCs", "PROG_DIA", "RATE",
];

fn tabular_record(row: &ProductRow) -> [String; 8] {
    [
        row.linha.clone(),
        row.turno.clone(),
        row.codigo.clone(),
        row.produto.clone(),
        row.op.clone(),
        row.hcs.to_string(),
        row.prog_dia.to_string(),
        row.rate.clone(),
    ]
}

/// Render rows as delimited text with the tabular column set.
pub fn to_csv(rows: &[ProductRow], opts: &CsvOptions) -> PlanResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    if opts.bom {
        buf.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    }
    let mut wtr = WriterBuilder::new()
        .delimiter(opts.delimiter)
        .terminator(if opts.crlf {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(b'\n')
        })
        .from_writer(vec![]);

    wtr.write_record(TABULAR_COLUMNS)?;
    for row in rows {
        let mut record = tabular_record(row);
        harden_fields(&mut record, opts.injection_hardening);
        wtr.write_record(&record)?;
    }
    let mut inner = wtr
        .into_inner()
        .map_err(|e| PlanError::Export(e.to_string()))?;
    buf.append(&mut inner);
    String::from_utf8(buf).map_err(|e| PlanError::Export(format!("CSV not UTF-8: {}", e)))
}

fn harden_fields(fields: &mut [String], enable: bool) {
    if !enable {
        return;
    }
    for f in fields {
        let s = f.trim_start();
        if let Some(ch) = s.chars().next()
            && matches!(ch, '=' | '+' | '-' | '@')
        {
            f.insert(0, '\'');
        }
    }
}

/// One-sheet XLSX workbook with the tabular column set.
pub fn to_xlsx(rows: &[ProductRow], sheet_name: &str) -> PlanResult<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file();
    let ws = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| PlanError::Export("Default worksheet missing".to_string()))?;
    ws.set_name(sheet_name_for(sheet_name, &[]));
    write_rows(ws, rows);
    write_book(&book)
}

/// One sheet per day, named after the day's label.
pub fn week_to_xlsx(days: &[DayPlan]) -> PlanResult<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let mut taken: Vec<String> = Vec::with_capacity(days.len());
    for day in days {
        let name = sheet_name_for(&day.label, &taken);
        let ws = book
            .new_sheet(&name)
            .map_err(|e| PlanError::Export(format!("Failed to create sheet '{}': {}", name, e)))?;
        write_rows(ws, &day.plan.rows);
        taken.push(name);
    }
    if taken.is_empty() {
        book.new_sheet("Plan")
            .map_err(|e| PlanError::Export(format!("Failed to create sheet: {}", e)))?;
    }
    write_book(&book)
}

fn write_rows(ws: &mut umya_spreadsheet::Worksheet, rows: &[ProductRow]) {
    for (c, header) in TABULAR_COLUMNS.iter().enumerate() {
        ws.get_cell_mut((c as u32 + 1, 1)).set_value_string(*header);
    }
    for (r, row) in rows.iter().enumerate() {
        let line = r as u32 + 2;
        let record = tabular_record(row);
        for (c, value) in record.into_iter().enumerate() {
            let cell = ws.get_cell_mut((c as u32 + 1, line));
            match TABULAR_COLUMNS[c] {
                "HCs" => cell.set_value_number(row.hcs as f64),
                "PROG_DIA" => cell.set_value_number(row.prog_dia as f64),
                _ => cell.set_value_string(value),
            };
        }
    }
}

fn write_book(book: &umya_spreadsheet::Spreadsheet) -> PlanResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::<u8>::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut out)
        .map_err(|e| PlanError::Export(format!("Failed to serialize workbook: {}", e)))?;
    Ok(out.into_inner())
}

const SHEET_NAME_MAX: usize = 31;

/// Excel-safe sheet name for a label such as a day's `dd/MM/yyyy`.
///
/// Slashes become `-` so dates read `dd-MM-yyyy`, other characters Excel
/// rejects are dropped, and a name already in `taken` gets a ` (n)` suffix.
/// Names compare case-insensitively, as in Excel.
fn sheet_name_for(label: &str, taken: &[String]) -> String {
    let base: String = label
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' => Some('-'),
            ':' | '?' | '*' | '[' | ']' => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .trim_matches('\'')
        .chars()
        .take(SHEET_NAME_MAX)
        .collect();
    let base = if base.is_empty() { "Plan".to_string() } else { base };

    let is_taken = |name: &str| taken.iter().any(|t| t.eq_ignore_ascii_case(name));
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let suffix = format!(" ({})", n);
        let stem: String = base.chars().take(SHEET_NAME_MAX - suffix.len()).collect();
        let name = stem + &suffix;
        if !is_taken(&name) {
            return name;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::sheet::RawSheet;

    fn sample() -> Vec<ProductRow> {
        vec![
            ProductRow {
                linha: "PD01".into(),
                turno: "1".into(),
                codigo: "SKU1".into(),
                produto: "Tampa, azul".into(),
                op: "OP-1".into(),
                hcs: 4,
                prog_dia: 1200,
                rate: "120/h".into(),
                ..ProductRow::default()
            },
            ProductRow {
                linha: "PD02".into(),
                turno: "1".into(),
                codigo: "SKU2".into(),
                produto: "=cmd".into(),
                ..ProductRow::default()
            },
        ]
    }

    #[test]
    fn csv_has_fixed_columns_and_quotes() {
        let out = to_csv(&sample(), &CsvOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "LINHA,TURNO,CÓDIGO,PRODUTO,OP,HCs,PROG_DIA,RATE");
        assert_eq!(lines[1], "PD01,1,SKU1,\"Tampa, azul\",OP-1,4,1200,120/h");
        assert_eq!(lines[2], "PD02,1,SKU2,'=cmd,,0,0,");
    }

    #[test]
    fn csv_options_are_honoured() {
        let opts = CsvOptions {
            delimiter: b';',
            bom: true,
            crlf: true,
            injection_hardening: false,
        };
        let out = to_csv(&sample(), &opts).unwrap();
        assert!(out.starts_with('\u{feff}'));
        assert!(out.contains("\r\n"));
        assert!(out.contains("PD02;1;SKU2;=cmd;;0;0;"));
    }

    #[test]
    fn xlsx_round_trips_through_reader() {
        let bytes = to_xlsx(&sample(), "Plan").unwrap();
        let sheet = RawSheet::from_bytes(&bytes).unwrap();
        let header = sheet.row(0).unwrap();
        assert_eq!(header[2], Cell::text("CÓDIGO"));
        let first = sheet.row(1).unwrap();
        assert_eq!(first[0], Cell::text("PD01"));
        assert_eq!(first[5], Cell::Number(4.0));
        assert_eq!(first[6], Cell::Number(1200.0));
        assert_eq!(sheet.len(), 3);
    }

    #[test]
    fn sheet_names_follow_excel_rules() {
        let none: Vec<String> = Vec::new();
        assert_eq!(sheet_name_for("23/10/2025", &none), "23-10-2025");
        assert_eq!(sheet_name_for("23/10/2025 - 1° Turno", &none), "23-10-2025 - 1° Turno");
        assert_eq!(sheet_name_for(" [a]:b? ", &none), "ab");
        assert_eq!(sheet_name_for("***", &none), "Plan");
        assert_eq!(sheet_name_for(&"x".repeat(40), &none).chars().count(), 31);
    }

    #[test]
    fn repeated_day_labels_get_a_suffix() {
        let taken = vec!["23-10-2025".to_string(), "23-10-2025 (2)".to_string()];
        assert_eq!(sheet_name_for("23/10/2025", &taken[..1]), "23-10-2025 (2)");
        assert_eq!(sheet_name_for("23/10/2025", &taken), "23-10-2025 (3)");
        let long = vec!["x".repeat(31)];
        let name = sheet_name_for(&"x".repeat(40), &long);
        assert_eq!(name.chars().count(), 31);
        assert!(name.ends_with(" (2)"));
    }
}
