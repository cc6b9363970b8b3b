use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on `width * height`; also keeps every coordinate within `i32`.
pub const MAX_CELLS: usize = 1 << 26;

/// A single grid square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum Cell {
    Flat,
    Hill(u32),
    Hole(u32),
}

impl Cell {
    /// Signed view: hills positive, holes negative. Saturates at the `i32` limits.
    pub fn value(self) -> i32 {
        match self {
            Cell::Flat => 0,
            Cell::Hill(height) => i32::try_from(height).unwrap_or(i32::MAX),
            Cell::Hole(depth) => i32::try_from(-i64::from(depth)).unwrap_or(i32::MIN),
        }
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        match value {
            0 => Cell::Flat,
            v if v > 0 => Cell::Hill(v.unsigned_abs()),
            v => Cell::Hole(v.unsigned_abs()),
        }
    }
}

impl From<Cell> for i32 {
    fn from(cell: Cell) -> Self {
        cell.value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerrainError {
    #[error("terrain needs at least one row")]
    NoRows,
    #[error("terrain rows need at least one column")]
    NoColumns,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("terrain of {width}x{height} exceeds {max} cells", max = MAX_CELLS)]
    TooLarge { width: usize, height: usize },
}

/// Fixed-shape grid stored row-major; only cell contents change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terrain {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Terrain {
    /// Validates a shape without allocating; returns the cell count.
    pub fn check_shape(width: usize, height: usize) -> Result<usize, TerrainError> {
        if height == 0 {
            return Err(TerrainError::NoRows);
        }
        if width == 0 {
            return Err(TerrainError::NoColumns);
        }
        width
            .checked_mul(height)
            .filter(|cells| *cells <= MAX_CELLS)
            .ok_or(TerrainError::TooLarge { width, height })
    }

    pub fn flat(width: usize, height: usize) -> Result<Self, TerrainError> {
        let cells = Self::check_shape(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Flat; cells],
        })
    }

    pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self, TerrainError> {
        let first = rows.first().ok_or(TerrainError::NoRows)?;
        let width = first.as_ref().len();
        let mut terrain = Self::flat(width, rows.len())?;

        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(TerrainError::RaggedRow {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            let start = row * width;
            for (slot, value) in terrain.cells[start..start + width].iter_mut().zip(values) {
                *slot = Cell::from(*value);
            }
        }

        Ok(terrain)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn value_at(&self, x: i32, y: i32) -> Option<i32> {
        self.cell(x, y).map(Cell::value)
    }

    /// Returns false (and writes nothing) when the coordinates are off the grid.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> Vec<Vec<i32>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|c| c.value()).collect())
            .collect()
    }

    /// One line per row, each value as `" {:2}"`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 3 + self.height);
        for row in self.cells.chunks(self.width) {
            for cell in row {
                let _ = write!(out, " {:2}", cell.value());
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_values_map_to_tagged_cells() {
        assert_eq!(Cell::from(0), Cell::Flat);
        assert_eq!(Cell::from(4), Cell::Hill(4));
        assert_eq!(Cell::from(-3), Cell::Hole(3));
        assert_eq!(Cell::Hole(3).value(), -3);
    }

    #[test]
    fn bounds_cover_half_open_ranges() {
        let terrain = Terrain::flat(3, 2).unwrap();
        assert!(terrain.in_bounds(0, 0));
        assert!(terrain.in_bounds(2, 1));
        assert!(!terrain.in_bounds(3, 0));
        assert!(!terrain.in_bounds(0, 2));
        assert!(!terrain.in_bounds(-1, 0));
        assert!(!terrain.in_bounds(0, -1));
        assert_eq!(terrain.cell(3, 0), None);
    }

    #[test]
    fn rows_are_addressed_by_y_then_x() {
        let terrain = Terrain::from_rows(&[vec![1, 2, 3], vec![-4, 0, 6]]).unwrap();
        assert_eq!(terrain.width(), 3);
        assert_eq!(terrain.height(), 2);
        assert_eq!(terrain.value_at(2, 0), Some(3));
        assert_eq!(terrain.value_at(0, 1), Some(-4));
        assert_eq!(terrain.cell(0, 1), Some(Cell::Hole(4)));
        assert_eq!(terrain.rows(), vec![vec![1, 2, 3], vec![-4, 0, 6]]);
    }

    #[test]
    fn set_cell_rejects_off_grid_writes() {
        let mut terrain = Terrain::flat(2, 2).unwrap();
        assert!(terrain.set_cell(1, 1, Cell::Hill(2)));
        assert!(!terrain.set_cell(2, 1, Cell::Hill(2)));
        assert_eq!(terrain.rows(), vec![vec![0, 0], vec![0, 2]]);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let empty: [Vec<i32>; 0] = [];
        assert_eq!(Terrain::from_rows(&empty), Err(TerrainError::NoRows));
        assert_eq!(
            Terrain::from_rows(&[Vec::<i32>::new()]),
            Err(TerrainError::NoColumns)
        );
        assert_eq!(
            Terrain::from_rows(&[vec![1, 2], vec![3]]),
            Err(TerrainError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn oversized_shapes_are_rejected_before_allocating() {
        assert_eq!(
            Terrain::flat(usize::MAX, 2),
            Err(TerrainError::TooLarge {
                width: usize::MAX,
                height: 2
            })
        );
        assert_eq!(
            Terrain::check_shape(1 << 13, 1 << 14),
            Err(TerrainError::TooLarge {
                width: 1 << 13,
                height: 1 << 14
            })
        );
        assert_eq!(Terrain::check_shape(1 << 13, 1 << 13), Ok(MAX_CELLS));
    }

    #[test]
    fn extreme_values_keep_their_sign() {
        assert_eq!(Cell::from(i32::MIN), Cell::Hole(1 << 31));
        assert_eq!(Cell::Hole(1 << 31).value(), i32::MIN);
        assert_eq!(Cell::Hole(u32::MAX).value(), i32::MIN);
        assert_eq!(Cell::Hill(u32::MAX).value(), i32::MAX);

        let terrain = Terrain::from_rows(&[vec![i32::MIN, i32::MAX]]).unwrap();
        assert_eq!(terrain.render(), " -2147483648 2147483647\n");
        assert_eq!(terrain.rows(), vec![vec![i32::MIN, i32::MAX]]);
    }

    #[test]
    fn render_uses_two_wide_fields() {
        let terrain = Terrain::from_rows(&[vec![0, 5, -3], vec![12, -10, 0]]).unwrap();
        assert_eq!(terrain.render(), "  0  5 -3\n 12 -10  0\n");
    }
}
