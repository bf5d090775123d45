use crate::cell::Cell;
use crate::error::{PlanError, PlanResult};
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

/// Row-major grid of the first worksheet, anchored at A1.
///
/// Column indices are sheet columns: a used range starting at `C4` is padded
/// with leading empty rows and cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Read the first worksheet of a workbook (xlsx, xlsm, xlsb, xls or ods).
    pub fn from_bytes(data: &[u8]) -> PlanResult<Self> {
        if data.is_empty() {
            return Err(PlanError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input data is empty",
            )));
        }
        let mut wb = open_workbook_auto_from_rs(Cursor::new(data))?;
        let range = wb.worksheet_range_at(0).ok_or(PlanError::EmptyWorkbook)??;
        Ok(Self::from_range(&range))
    }

    fn from_range(range: &Range<Data>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self::default();
        };
        let (height, width) = range.get_size();
        let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(start_row as usize + height);
        rows.resize_with(start_row as usize, Vec::new);

        let pad = start_col as usize;
        for row in range.rows() {
            let mut cells = Vec::with_capacity(pad + width);
            cells.resize(pad, Cell::Empty);
            cells.extend(row.iter().map(Cell::from));
            rows.push(cells);
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Vec<Cell>>> for RawSheet {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_an_io_error() {
        assert!(matches!(RawSheet::from_bytes(&[]), Err(PlanError::Io(_))));
    }

    #[test]
    fn garbage_is_a_workbook_error() {
        let res = RawSheet::from_bytes(b"definitely not a spreadsheet");
        assert!(matches!(res, Err(PlanError::Workbook(_))));
    }

    #[test]
    fn offset_ranges_are_padded_to_a1() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("PRODUTO".into()));
        range.set_value((3, 2), Data::Float(5.0));
        let sheet = RawSheet::from_range(&range);
        assert_eq!(sheet.len(), 4);
        assert!(sheet.row(0).unwrap().is_empty());
        assert_eq!(sheet.row(2).unwrap()[1], Cell::text("PRODUTO"));
        assert_eq!(sheet.row(3).unwrap()[2], Cell::Number(5.0));
        assert_eq!(sheet.row(3).unwrap()[0], Cell::Empty);
    }
}
