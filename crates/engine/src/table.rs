use crate::cell::{CellValue, ValueError};

/// Typed selected-output table for one run.
///
/// Fields accumulate into a pending row until the engine closes it. The
/// first closed row fixes the column count and becomes row 0, holding the
/// column headings as text cells; every later row is normalized to that
/// width (short rows padded with `Empty`, over-wide rows truncated).
#[derive(Debug, Default)]
pub struct SelectedOutput {
    rows: Vec<Vec<CellValue>>,
    pending: Vec<(String, CellValue)>,
    width: usize,
    header_closed: bool,
}

impl SelectedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one field for the current row. Pending fields are invisible to
    /// row and value queries until the row is closed.
    pub fn push_field(&mut self, heading: &str, value: CellValue) -> Result<(), ValueError> {
        self.pending
            .try_reserve(1)
            .map_err(|_| ValueError::OutOfMemory)?;
        self.pending.push((heading.to_string(), value));
        Ok(())
    }

    pub fn push_text(&mut self, heading: &str, text: &str) -> Result<(), ValueError> {
        self.push_field(heading, CellValue::Text(text.to_string()))
    }

    pub fn push_real(&mut self, heading: &str, value: f64) -> Result<(), ValueError> {
        self.push_field(heading, CellValue::Real(value))
    }

    pub fn push_integer(&mut self, heading: &str, value: i64) -> Result<(), ValueError> {
        self.push_field(heading, CellValue::Integer(value))
    }

    /// Close the pending row. The first close freezes the header; later
    /// closes append a data row normalized to the header width. Returns how
    /// many over-wide fields were dropped (always 0 for the header row).
    pub fn end_row(&mut self) -> usize {
        if !self.header_closed {
            self.header_closed = true;
            self.width = self.pending.len();
            let header: Vec<CellValue> = self
                .pending
                .drain(..)
                .map(|(heading, _)| CellValue::Text(heading))
                .collect();
            self.rows.push(header);
            return 0;
        }
        let mut row: Vec<CellValue> = self.pending.drain(..).map(|(_, value)| value).collect();
        let dropped = row.len().saturating_sub(self.width);
        row.resize(self.width, CellValue::Empty);
        self.rows.push(row);
        dropped
    }

    /// Rows closed so far, the header row included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count fixed by the header row; 0 before the first close.
    pub fn column_count(&self) -> usize {
        self.width
    }

    /// The cell at (`row`, `col`), 0-based with the header at row 0. The row
    /// bound is checked before the column bound.
    pub fn value(&self, row: usize, col: usize) -> Result<&CellValue, ValueError> {
        self.rows
            .get(row)
            .ok_or(ValueError::InvalidRow)?
            .get(col)
            .ok_or(ValueError::InvalidColumn)
    }

    pub fn row(&self, n: usize) -> Option<&[CellValue]> {
        self.rows.get(n).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop all rows, pending fields, and the frozen header width.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.pending.clear();
        self.width = 0;
        self.header_closed = false;
    }
}
