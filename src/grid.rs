//! Grid module - the playfield of locked cells
//!
//! Row-major flat storage. Rows grow downward: row 0 is the top, row
//! `height - 1` the floor. Space above row 0 is never stored and always free.

use crate::piece::Shape;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Shape),
}

impl Cell {
    pub fn is_filled(self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "cell ({row}, {col}) outside {}x{} grid",
            self.width,
            self.height
        );
        row * self.width + col
    }

    #[inline]
    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.width;
        start..start + self.width
    }

    pub fn is_inside_columns(&self, col: i16) -> bool {
        col >= 0 && (col as usize) < self.width
    }

    /// True when `row` lies at or past the floor.
    pub fn is_below_bottom(&self, row: i16) -> bool {
        row >= 0 && row as usize >= self.height
    }

    /// Rows above the grid (`row < 0`) are always free.
    ///
    /// # Panics
    ///
    /// Panics if `row >= 0` and the cell lies outside the grid.
    pub fn is_occupied(&self, row: i16, col: i16) -> bool {
        if row < 0 {
            return false;
        }
        assert!(self.is_inside_columns(col), "column {col} outside grid");
        self.cells[self.index(row as usize, col as usize)].is_filled()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn set_cell(&mut self, row: usize, col: usize, shape: Shape) {
        let idx = self.index(row, col);
        self.cells[idx] = Cell::Filled(shape);
    }

    pub fn clear_cell(&mut self, row: usize, col: usize) {
        let idx = self.index(row, col);
        self.cells[idx] = Cell::Empty;
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        row < self.height && self.cells[self.row_range(row)].iter().all(|c| c.is_filled())
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        row >= self.height || self.cells[self.row_range(row)].iter().all(|c| !c.is_filled())
    }

    pub fn filled_in_row(&self, row: usize) -> usize {
        if row >= self.height {
            return 0;
        }
        self.cells[self.row_range(row)]
            .iter()
            .filter(|c| c.is_filled())
            .count()
    }

    /// Removes `row`: every row above it moves down by one and row 0 is
    /// cleared.
    pub fn collapse_row(&mut self, row: usize) {
        if row >= self.height {
            return;
        }
        let width = self.width;
        for r in (1..=row).rev() {
            let src = (r - 1) * width;
            self.cells.copy_within(src..src + width, r * width);
        }
        for cell in &mut self.cells[..width] {
            *cell = Cell::Empty;
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;

    pub fn fill_row(grid: &mut Grid, row: usize) {
        for col in 0..grid.width() {
            grid.set_cell(row, col, Shape::T);
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, row: usize, gap_col: usize) {
        for col in 0..grid.width() {
            if col != gap_col {
                grid.set_cell(row, col, Shape::T);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(10, 20);
        assert_eq!(grid.occupied_count(), 0);
        assert!((0..20).all(|r| grid.is_row_empty(r)));
    }

    #[test]
    fn boundary_predicates() {
        let grid = Grid::new(10, 20);
        assert!(grid.is_inside_columns(0));
        assert!(grid.is_inside_columns(9));
        assert!(!grid.is_inside_columns(-1));
        assert!(!grid.is_inside_columns(10));
        assert!(!grid.is_below_bottom(19));
        assert!(grid.is_below_bottom(20));
        assert!(!grid.is_below_bottom(-3));
    }

    #[test]
    fn rows_above_grid_are_never_occupied() {
        let grid = Grid::new(10, 20);
        assert!(!grid.is_occupied(-1, 4));
        // Column is not checked above the grid.
        assert!(!grid.is_occupied(-5, 42));
    }

    #[test]
    #[should_panic]
    fn occupied_query_outside_columns_panics() {
        let grid = Grid::new(10, 20);
        grid.is_occupied(3, 10);
    }

    #[test]
    fn set_and_clear_cell() {
        let mut grid = Grid::new(10, 20);
        grid.set_cell(5, 3, Shape::L);
        assert!(grid.is_occupied(5, 3));
        assert_eq!(grid.get(5, 3), Some(Cell::Filled(Shape::L)));

        grid.clear_cell(5, 3);
        assert!(!grid.is_occupied(5, 3));
        assert_eq!(grid.get(20, 0), None);
    }

    #[test]
    fn row_scans() {
        let mut grid = Grid::new(10, 20);
        fill_row_with_gap(&mut grid, 19, 4);
        assert!(!grid.is_row_full(19));
        assert!(!grid.is_row_empty(19));
        assert_eq!(grid.filled_in_row(19), 9);

        grid.set_cell(19, 4, Shape::I);
        assert!(grid.is_row_full(19));
    }

    #[test]
    fn collapse_row_shifts_rows_above_down() {
        let mut grid = Grid::new(4, 4);
        grid.set_cell(0, 0, Shape::I);
        grid.set_cell(1, 1, Shape::O);
        fill_row(&mut grid, 2);
        grid.set_cell(3, 3, Shape::Z);

        grid.collapse_row(2);

        assert!(grid.is_row_empty(0));
        assert_eq!(grid.get(1, 0), Some(Cell::Filled(Shape::I)));
        assert_eq!(grid.get(2, 1), Some(Cell::Filled(Shape::O)));
        // Rows below the collapsed one are untouched.
        assert_eq!(grid.get(3, 3), Some(Cell::Filled(Shape::Z)));
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn collapse_top_row_just_clears_it() {
        let mut grid = Grid::new(4, 4);
        fill_row(&mut grid, 0);
        grid.collapse_row(0);
        assert_eq!(grid.occupied_count(), 0);
    }
}
