//! The grid: cells, capacities, placement and single-cell explosions.
//!
//! Cells are stored row-major in one `Vec`. Capacities are computed once
//! at construction from the cell's position and never change.

use chainforge_protocol::{BoardConfig, BoardView, CellView, ExplosionEvent, ExplosionKind, PlayerId};

use crate::{GameError, NotExplodable};

/// A cell coordinate known to be inside some board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One grid square.
///
/// Invariant: `owner` is `None` exactly when `token_count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    token_count: u32,
    owner: Option<PlayerId>,
    capacity: u32,
}

impl Cell {
    fn empty(capacity: u32) -> Self {
        Self { token_count: 0, owner: None, capacity }
    }

    pub fn token_count(&self) -> u32 {
        self.token_count
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Owned and holding at least `capacity` tokens.
    pub fn is_explodable(&self) -> bool {
        self.owner.is_some() && self.token_count >= self.capacity
    }

    pub fn view(&self) -> CellView {
        CellView {
            token_count: self.token_count,
            owner: self.owner,
            capacity: self.capacity,
        }
    }
}

/// The playing field. Dimensions are fixed for the board's lifetime.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds an empty board. The config is used as given; callers that
    /// take dimensions from clients should pass it through
    /// [`BoardConfig::validated`] first.
    pub fn new(config: BoardConfig) -> Self {
        let BoardConfig { rows, cols } = config;
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell::empty(Self::capacity_for(rows, cols, row, col))))
            .collect();
        Self { rows, cols, cells }
    }

    /// Capacity of `(row, col)` on a `rows × cols` board: 2 when both
    /// coordinates are at an extreme, 3 when exactly one is, 4 otherwise.
    pub fn capacity_for(rows: usize, cols: usize, row: usize, col: usize) -> u32 {
        let row_edge = row == 0 || row + 1 == rows;
        let col_edge = col == 0 || col + 1 == cols;
        match (row_edge, col_edge) {
            (true, true) => 2,
            (true, false) | (false, true) => 3,
            (false, false) => 4,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Turns client coordinates into a position on this board.
    pub fn locate(&self, row: i64, col: i64) -> Result<Position, GameError> {
        let out_of_bounds = GameError::OutOfBounds { row, col };
        let r = usize::try_from(row).map_err(|_| out_of_bounds.clone())?;
        let c = usize::try_from(col).map_err(|_| out_of_bounds.clone())?;
        let pos = Position::new(r, c);
        if self.contains(pos) { Ok(pos) } else { Err(out_of_bounds) }
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if self.contains(pos) {
            self.cells.get(self.index(pos))
        } else {
            None
        }
    }

    /// Every position, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Adds one token for `player` at `pos`.
    ///
    /// # Errors
    /// - `OutOfBounds` if `pos` is off the board
    /// - `CellOwnershipConflict` if another player owns the cell
    /// - `CellAtCapacity` if the cell already awaits an explosion
    pub fn place_token(&mut self, pos: Position, player: PlayerId) -> Result<&Cell, GameError> {
        if !self.contains(pos) {
            return Err(GameError::OutOfBounds {
                row: pos.row as i64,
                col: pos.col as i64,
            });
        }
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        if cell.owner.is_some_and(|owner| owner != player) {
            return Err(GameError::CellOwnershipConflict { row: pos.row, col: pos.col });
        }
        if cell.token_count >= cell.capacity {
            return Err(GameError::CellAtCapacity { row: pos.row, col: pos.col });
        }
        cell.token_count += 1;
        cell.owner = Some(player);
        Ok(cell)
    }

    /// The up-to-four orthogonal neighbours inside the board, in
    /// up, down, left, right order.
    pub fn neighbors_of(&self, pos: Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        if pos.row > 0 {
            out.push(Position::new(pos.row - 1, pos.col));
        }
        if pos.row + 1 < self.rows {
            out.push(Position::new(pos.row + 1, pos.col));
        }
        if pos.col > 0 {
            out.push(Position::new(pos.row, pos.col - 1));
        }
        if pos.col + 1 < self.cols {
            out.push(Position::new(pos.row, pos.col + 1));
        }
        out
    }

    /// Bursts the cell at `pos` on behalf of `owner`.
    ///
    /// The source cell is cleared; every neighbour gains one token and is
    /// taken over by `owner` whatever it held before. Returns the source
    /// (`Explosion`) followed by each neighbour (`Capture`) with their
    /// values after the burst.
    ///
    /// # Errors
    /// `NotExplodable` if the cell is below capacity or not owned by `owner`.
    pub fn explode(
        &mut self,
        pos: Position,
        owner: PlayerId,
    ) -> Result<Vec<ExplosionEvent>, NotExplodable> {
        let explodable = self
            .cell(pos)
            .is_some_and(|cell| cell.token_count >= cell.capacity && cell.owner == Some(owner));
        if !explodable {
            return Err(NotExplodable { row: pos.row, col: pos.col });
        }

        let neighbors = self.neighbors_of(pos);
        let mut events = Vec::with_capacity(neighbors.len() + 1);

        let idx = self.index(pos);
        self.cells[idx].token_count = 0;
        self.cells[idx].owner = None;
        events.push(ExplosionEvent {
            row: pos.row,
            col: pos.col,
            kind: ExplosionKind::Explosion,
            owner: None,
            token_count: 0,
        });

        for n in neighbors {
            let idx = self.index(n);
            let cell = &mut self.cells[idx];
            cell.token_count += 1;
            cell.owner = Some(owner);
            events.push(ExplosionEvent {
                row: n.row,
                col: n.col,
                kind: ExplosionKind::Capture,
                owner: Some(owner),
                token_count: cell.token_count,
            });
        }

        Ok(events)
    }

    /// Cells eligible to explode next: owned and at or above capacity.
    pub fn explosion_candidates(&self) -> Vec<Position> {
        self.positions()
            .filter(|&pos| self.cells[self.index(pos)].is_explodable())
            .collect()
    }

    /// Positions `player` holds with at least one token.
    pub fn cells_owned_by(&self, player: PlayerId) -> Vec<Position> {
        self.positions()
            .filter(|&pos| {
                let cell = &self.cells[self.index(pos)];
                cell.owner == Some(player) && cell.token_count > 0
            })
            .collect()
    }

    /// No cell meets or exceeds its capacity.
    pub fn is_settled(&self) -> bool {
        self.cells.iter().all(|c| c.token_count < c.capacity)
    }

    /// Empties every cell, keeping capacities.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.token_count = 0;
            cell.owner = None;
        }
    }

    pub fn view(&self) -> BoardView {
        BoardView {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .chunks(self.cols.max(1))
                .map(|row| row.iter().map(Cell::view).collect())
                .collect(),
        }
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    #[cfg(test)]
    pub(crate) fn set_cell(&mut self, pos: Position, token_count: u32, owner: Option<PlayerId>) {
        let idx = self.index(pos);
        self.cells[idx].token_count = token_count;
        self.cells[idx].owner = owner;
    }
}
