//! Table types.

use super::BlockId;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A table: a grid of cells, each owning a sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Number of rows in the grid
    pub rows: u32,

    /// Number of columns in the grid
    pub cols: u32,

    /// Cells in row-major source order
    pub cells: Vec<TableCell>,

    /// Table caption
    pub caption: Option<String>,
}

impl Table {
    /// Create a new empty table.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Add a cell.
    pub fn add_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    /// Check if the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.cells.iter().any(TableCell::is_merged)
    }

    /// Cell anchored at `(row, col)`.
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&TableCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    /// Rows and columns the cells reach, spans included.
    pub fn extent(&self) -> (u32, u32) {
        self.cells.iter().fold((0, 0), |(rows, cols), c| {
            (
                rows.max(c.row.saturating_add(c.row_span.max(1))),
                cols.max(c.col.saturating_add(c.col_span.max(1))),
            )
        })
    }

    /// Cells grouped by row, each row sorted by column.
    pub fn rows_of_cells(&self) -> Vec<Vec<&TableCell>> {
        let axis = self.axis(|c| (c.row, c.row_span));
        let mut rows: Vec<Vec<&TableCell>> = vec![Vec::new(); axis.len()];
        for cell in &self.cells {
            if let Ok(index) = axis.binary_search(&cell.row) {
                rows[index].push(cell);
            }
        }
        for row in &mut rows {
            row.sort_by_key(|c| c.col);
        }
        rows
    }

    /// Grid with each slot holding the cell that covers it. Spanned slots
    /// repeat the anchor cell.
    pub fn grid(&self) -> Vec<Vec<Option<&TableCell>>> {
        self.layout(true)
    }

    /// Grid with each cell in its top-left slot only.
    pub fn anchor_grid(&self) -> Vec<Vec<Option<&TableCell>>> {
        self.layout(false)
    }

    fn layout(&self, fill_spans: bool) -> Vec<Vec<Option<&TableCell>>> {
        let mut cols = self.axis(|c| (c.col, c.col_span));
        cols.truncate(MAX_GRID_SLOTS);
        let mut rows = self.axis(|c| (c.row, c.row_span));
        let row_limit = MAX_GRID_SLOTS / cols.len().max(1);
        if rows.len() > row_limit {
            log::warn!("table grid limited to {row_limit} of {} rows", rows.len());
            rows.truncate(row_limit);
        }

        let mut grid = vec![vec![None; cols.len()]; rows.len()];
        for cell in &self.cells {
            let row_range = covered(&rows, cell.row, cell.row_span);
            let col_range = covered(&cols, cell.col, cell.col_span);
            if row_range.is_empty() || col_range.is_empty() {
                continue;
            }
            if !fill_spans {
                grid[row_range.start][col_range.start] = Some(cell);
                continue;
            }
            for row in &mut grid[row_range] {
                for slot in &mut row[col_range.clone()] {
                    *slot = Some(cell);
                }
            }
        }
        grid
    }

    /// Source addresses one grid dimension stands for. Every address up to
    /// the extent while the extent stays within the cell count, otherwise
    /// only the addresses cells start at.
    fn axis(&self, position: impl Fn(&TableCell) -> (u32, u32)) -> Vec<u32> {
        let extent = self
            .cells
            .iter()
            .map(|c| {
                let (start, span) = position(c);
                start.saturating_add(span.max(1))
            })
            .max()
            .unwrap_or(0);
        if (extent as usize) <= self.cells.len() {
            return (0..extent).collect();
        }
        let mut starts: Vec<u32> = self.cells.iter().map(|c| position(c).0).collect();
        starts.sort_unstable();
        starts.dedup();
        starts
    }
}

/// Most slots a laid-out grid holds.
pub const MAX_GRID_SLOTS: usize = 1 << 20;

/// Indices of `axis` inside `start..start + span`.
fn covered(axis: &[u32], start: u32, span: u32) -> Range<usize> {
    let end = u64::from(start) + u64::from(span.max(1));
    axis.partition_point(|&a| a < start)..axis.partition_point(|&a| u64::from(a) < end)
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Zero-based row address
    pub row: u32,

    /// Zero-based column address
    pub col: u32,

    /// Number of rows this cell spans
    pub row_span: u32,

    /// Number of columns this cell spans
    pub col_span: u32,

    /// Content blocks (arena indices)
    pub blocks: Vec<BlockId>,
}

impl TableCell {
    /// Create an unmerged cell.
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            blocks: Vec::new(),
        }
    }

    /// Set spans and return self.
    pub fn span(mut self, row_span: u32, col_span: u32) -> Self {
        self.row_span = row_span.max(1);
        self.col_span = col_span.max(1);
        self
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}
