use super::cell::CellValue;

/// Read access to one worksheet. Rows and columns are 1-based; anything
/// outside the used area reads as [`CellValue::Empty`].
pub trait SheetAccess {
    fn max_row(&self) -> usize;

    fn max_column(&self) -> usize;

    fn cell(&self, row: usize, column: usize) -> CellValue;

    fn row(&self, row: usize) -> Vec<CellValue> {
        (1..=self.max_column())
            .map(|column| self.cell(row, column))
            .collect()
    }
}

/// In-memory sheet backed by a row-major grid.
#[derive(Debug, Clone, Default)]
pub struct GridSheet {
    rows: Vec<Vec<CellValue>>,
}

impl GridSheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn from_text(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|text| CellValue::from(*text)).collect())
                .collect(),
        )
    }

    pub fn set(&mut self, row: usize, column: usize, value: CellValue) {
        if row == 0 || column == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < column {
            cells.resize(column, CellValue::Empty);
        }
        cells[column - 1] = value;
    }
}

impl SheetAccess for GridSheet {
    fn max_row(&self) -> usize {
        self.rows.len()
    }

    fn max_column(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, column: usize) -> CellValue {
        if row == 0 || column == 0 {
            return CellValue::Empty;
        }
        self.rows
            .get(row - 1)
            .and_then(|cells| cells.get(column - 1))
            .cloned()
            .unwrap_or_default()
    }
}
