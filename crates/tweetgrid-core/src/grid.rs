use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Short weekday names, Sunday first.
pub const WEEKDAY_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Alternating weekday labels used beside the yearly calendar.
pub const WEEKDAY_SPARSE: [&str; 7] = ["", "Mon", "", "Wed", "", "Fri", ""];

pub const DAYS_PER_WEEK: usize = 7;

/// Fixed-size, row-major table of event counts. Every cell starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns false and leaves the grid untouched when the index is
    /// outside the grid.
    pub fn increment(&mut self, row: usize, col: usize) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.cells[idx] += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.index(row, col).map(|idx| self.cells[idx])
    }

    pub fn row(&self, row: usize) -> Option<&[u32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.cells[start..start + self.cols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.rows).filter_map(move |row| self.row(row))
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&count| u64::from(count)).sum()
    }

    pub fn max(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut out = Self::new(self.cols, self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.cells[col * self.rows + row] = self.cells[row * self.cols + col];
            }
        }
        out
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let cells: Vec<&[u32]> = self.iter_rows().collect();
        let mut state = serializer.serialize_struct("Grid", 3)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("cols", &self.cols)?;
        state.serialize_field("cells", &cells)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::Grid;

    #[test]
    fn out_of_bounds_increment_is_ignored() {
        let mut grid = Grid::new(7, 3);
        assert!(grid.increment(6, 2));
        assert!(!grid.increment(7, 0));
        assert!(!grid.increment(0, 3));
        assert_eq!(grid.total(), 1);
        assert_eq!(grid.get(6, 2), Some(1));
        assert_eq!(grid.get(7, 2), None);
    }

    #[test]
    fn transpose_swaps_axes() {
        let mut grid = Grid::new(2, 3);
        grid.increment(0, 2);
        grid.increment(0, 2);
        grid.increment(1, 0);

        let flipped = grid.transposed();
        assert_eq!((flipped.rows(), flipped.cols()), (3, 2));
        assert_eq!(flipped.get(2, 0), Some(2));
        assert_eq!(flipped.get(0, 1), Some(1));
        assert_eq!(flipped.max(), 2);
        assert_eq!(flipped.transposed(), grid);
    }

    #[test]
    fn serializes_as_nested_rows() {
        let mut grid = Grid::new(2, 2);
        grid.increment(1, 0);
        let json = serde_json::to_string(&grid).expect("serialize grid");
        assert_eq!(json, r#"{"rows":2,"cols":2,"cells":[[0,0],[1,0]]}"#);
    }
}
