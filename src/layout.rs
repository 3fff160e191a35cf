//! Grouping of a flat cell sequence into chart rows.
//!
//! A chart row holds at most [`ROW_CELLS`] cells. A cell with a non-zero
//! `spacer` always starts a new row, and the row carries that spacer height.

use serde::Serialize;

use crate::model::Cell;

/// Cells per chart row.
pub const ROW_CELLS: usize = 16;

/// A contiguous run of cells rendered on one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Row<'a> {
    /// Vertical spacer units above the row.
    pub spacer: u32,
    pub cells: &'a [Cell],
}

/// Split `cells` into rows.
pub fn rows(cells: &[Cell]) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    let mut start = 0;
    for (index, cell) in cells.iter().enumerate() {
        let full = index - start == ROW_CELLS;
        if index > start && (full || cell.spacer > 0) {
            rows.push(Row {
                spacer: cells[start].spacer,
                cells: &cells[start..index],
            });
            start = index;
        }
    }
    if start < cells.len() {
        rows.push(Row {
            spacer: cells[start].spacer,
            cells: &cells[start..],
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(count: usize) -> Vec<Cell> {
        vec![Cell::default(); count]
    }

    #[test]
    fn test_sixteen_per_row() {
        let cells = blank(40);
        let lengths: Vec<usize> = rows(&cells).iter().map(|row| row.cells.len()).collect();
        assert_eq!(lengths, vec![16, 16, 8]);
    }

    #[test]
    fn test_spacer_starts_row() {
        let mut cells = blank(20);
        cells[5].spacer = 2;
        let rows = rows(&cells);
        let lengths: Vec<usize> = rows.iter().map(|row| row.cells.len()).collect();
        assert_eq!(lengths, vec![5, 15]);
        assert_eq!(rows[0].spacer, 0);
        assert_eq!(rows[1].spacer, 2);
    }

    #[test]
    fn test_spacer_on_first_cell() {
        let mut cells = blank(3);
        cells[0].spacer = 1;
        let rows = rows(&cells);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spacer, 1);
    }

    #[test]
    fn test_no_cells_no_rows() {
        assert!(rows(&[]).is_empty());
    }
}
