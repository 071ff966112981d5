//! Board engine — pure Connect Four rules.
//!
//! DESIGN
//! ======
//! A fixed 6x7 grid with gravity semantics: pieces fall to the lowest empty
//! row of their column. Win detection is anchored at the placed cell and
//! counts runs in all four orientations, so each move costs a handful of
//! cell reads instead of a full board scan.
//!
//! No I/O and no locking here. The board is owned exclusively by its session,
//! which serializes all mutation.

/// Board height. Row `ROWS - 1` is the floor.
pub const ROWS: usize = 6;

/// Board width. Columns are zero-based.
pub const COLS: usize = 7;

/// Wire-encodable grid: 0 = empty, 1 = seat one, 2 = seat two.
pub type Grid = [[u8; COLS]; ROWS];

// =============================================================================
// TYPES
// =============================================================================

/// One of the two fixed player slots in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    /// The opposing seat.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// Wire encoding: seat one is player 1, seat two is player 2.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }

    /// Index into per-seat arrays.
    #[must_use]
    pub(crate) fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
        }
    }
}

/// A single board cell. Cells transition `Empty -> Taken` once, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Taken(Seat),
}

/// Result of a successfully applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Game continues; the turn passes to the other seat.
    Continue,
    /// The placed piece completed four in a row.
    Won(Seat),
    /// The board is full with no winner.
    Drawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("invalid column")]
    InvalidColumn,
    #[error("column is full")]
    ColumnFull,
}

// =============================================================================
// BOARD
// =============================================================================

/// The 6x7 playing field. Mutated in place only through `apply_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

/// Run directions: horizontal, vertical, both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self { cells: [[Cell::Empty; COLS]; ROWS] }
    }

    /// Cell at (row, col). Row 0 is the top.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    #[must_use]
    pub fn is_column_full(&self, col: usize) -> bool {
        self.cells[0][col] != Cell::Empty
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Drop a piece for `seat` into `column`.
    ///
    /// The piece lands in the lowest empty row of the column. The raw wire
    /// column is taken as `i64` so negative input fails the same range check
    /// as an out-of-bounds index.
    ///
    /// # Errors
    ///
    /// `InvalidColumn` if `column` is outside `[0, 7)`; `ColumnFull` if the
    /// column has no empty cell. Neither mutates the board.
    pub fn apply_move(&mut self, seat: Seat, column: i64) -> Result<MoveOutcome, MoveError> {
        let col = usize::try_from(column)
            .ok()
            .filter(|&c| c < COLS)
            .ok_or(MoveError::InvalidColumn)?;

        let row = (0..ROWS)
            .rev()
            .find(|&r| self.cells[r][col] == Cell::Empty)
            .ok_or(MoveError::ColumnFull)?;

        self.cells[row][col] = Cell::Taken(seat);

        if self.wins_at(row, col, seat) {
            return Ok(MoveOutcome::Won(seat));
        }
        if self.is_full() {
            return Ok(MoveOutcome::Drawn);
        }
        Ok(MoveOutcome::Continue)
    }

    /// Wire encoding of the full grid.
    #[must_use]
    pub fn grid(&self) -> Grid {
        let mut grid = [[0u8; COLS]; ROWS];
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                grid[r][c] = match cell {
                    Cell::Empty => 0,
                    Cell::Taken(seat) => seat.number(),
                };
            }
        }
        grid
    }

    /// Does the piece just placed at (row, col) complete four in a row?
    fn wins_at(&self, row: usize, col: usize, seat: Seat) -> bool {
        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(row, col, dr, dc, seat) + self.run_length(row, col, -dr, -dc, seat) >= 4
        })
    }

    /// Count consecutive cells owned by `seat` stepping away from (row, col),
    /// excluding the anchor itself.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, seat: Seat) -> usize {
        let mut count = 0;
        let (mut row, mut col) = (row, col);
        loop {
            let Some(r) = row.checked_add_signed(dr) else { break };
            let Some(c) = col.checked_add_signed(dc) else { break };
            if r >= ROWS || c >= COLS || self.cells[r][c] != Cell::Taken(seat) {
                break;
            }
            (row, col) = (r, c);
            count += 1;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
