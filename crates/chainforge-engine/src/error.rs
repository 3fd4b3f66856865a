//! Error types for the engine.

use chainforge_protocol::{GameStatus, RejectionKind};

/// Ways an engine operation can be refused. The room is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("position ({row}, {col}) is off the board")]
    OutOfBounds { row: i64, col: i64 },

    #[error("cell ({row}, {col}) belongs to another player")]
    CellOwnershipConflict { row: usize, col: usize },

    /// The cell is waiting to explode and takes no more tokens until then.
    #[error("cell ({row}, {col}) is at capacity")]
    CellAtCapacity { row: usize, col: usize },

    #[error("game is not in progress (room is {0})")]
    GameNotInProgress(GameStatus),

    #[error("game already started")]
    AlreadyStarted,

    #[error("need at least 2 players to start, have {active}")]
    InsufficientPlayers { active: usize },
}

/// Raised by [`Board::explode`](crate::Board::explode) when the cell is
/// below capacity or the caller named the wrong owner.
///
/// Kept apart from [`GameError`]: only chain resolution explodes cells, so
/// this never becomes a client rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cell ({row}, {col}) cannot explode")]
pub struct NotExplodable {
    pub row: usize,
    pub col: usize,
}

impl GameError {
    /// The rejection kind reported to the acting connection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::OutOfBounds { .. } => RejectionKind::OutOfBounds,
            Self::CellOwnershipConflict { .. } => RejectionKind::CellOwnershipConflict,
            Self::CellAtCapacity { .. } => RejectionKind::CellAtCapacity,
            Self::GameNotInProgress(_) => RejectionKind::GameNotInProgress,
            Self::AlreadyStarted => RejectionKind::AlreadyStarted,
            Self::InsufficientPlayers { .. } => RejectionKind::InsufficientPlayers,
        }
    }
}
