//! Identity, configuration and view types shared across the workspace.
//!
//! The view types are read-only projections of engine state. They are
//! what clients see; the engine's own `Board` and `Player` keep their
//! fields private and produce these on demand.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Stable identity of a player within a room.
///
/// Generated once when the player first joins and independent of the
/// connection that created it. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{:016x}", self.0)
    }
}

/// Client-chosen room code, e.g. `"K7QX2M"`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Builds a room id from client input, trimming surrounding whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// BoardConfig
// ---------------------------------------------------------------------------

/// Board dimensions chosen when a room is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
}

impl BoardConfig {
    /// Smallest supported side length. Below this every cell would be a
    /// corner with no neighbours on one axis.
    pub const MIN_DIMENSION: usize = 2;
    /// Largest supported side length.
    pub const MAX_DIMENSION: usize = 32;

    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Clamps both dimensions into `MIN_DIMENSION..=MAX_DIMENSION`.
    pub fn validated(self) -> Self {
        let clamped = Self {
            rows: self.rows.clamp(Self::MIN_DIMENSION, Self::MAX_DIMENSION),
            cols: self.cols.clamp(Self::MIN_DIMENSION, Self::MAX_DIMENSION),
        };
        if clamped != self {
            tracing::warn!(
                rows = self.rows,
                cols = self.cols,
                clamped_rows = clamped.rows,
                clamped_cols = clamped.cols,
                "board dimensions out of range, clamping"
            );
        }
        clamped
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { rows: 6, cols: 10 }
    }
}

// ---------------------------------------------------------------------------
// Game status and rejection kinds
// ---------------------------------------------------------------------------

/// Lifecycle of a room's game.
///
/// ```text
/// Lobby ──(start)──→ Playing ──(winner or draw)──→ Finished
/// ```
///
/// Both transitions are one-way. A finished room is retired, never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Lobby,
    Playing,
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Why an action was refused. Sent to the acting connection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionKind {
    OutOfBounds,
    CellOwnershipConflict,
    CellAtCapacity,
    GameNotInProgress,
    AlreadyStarted,
    InsufficientPlayers,
    RoomNotFound,
    NotPlayersTurn,
    SpectatorForbidden,
    RoomFull,
    MissingField,
    /// The connection is not in the room it addressed.
    NotAMember,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One cell as clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub token_count: u32,
    pub owner: Option<PlayerId>,
    pub capacity: u32,
}

/// The whole grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<CellView>>,
}

impl BoardView {
    /// Returns the cell at `(row, col)`, if in bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellView> {
        self.cells.get(row).and_then(|r| r.get(col))
    }
}

/// A roster entry. Connection handles never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_spectator: bool,
    /// Hex colour, e.g. `"#FF6B6B"`. Spectators and late joiners have none.
    pub color: Option<String>,
    pub is_eliminated: bool,
    pub is_ready: bool,
}

/// Whether a cell in an explosion event is the one that burst or a
/// neighbour that received a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplosionKind {
    Explosion,
    Capture,
}

/// One affected cell in a resolution run, in the order it happened.
///
/// For an `Explosion` the values are the cleared source cell
/// (`token_count == 0`, no owner). For a `Capture` they are the
/// neighbour's values right after it received its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionEvent {
    pub row: usize,
    pub col: usize,
    pub kind: ExplosionKind,
    pub owner: Option<PlayerId>,
    pub token_count: u32,
}

/// Full room state, sent to a connection on join or on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub players: Vec<PlayerView>,
    pub state: GameStatus,
    pub current_player_index: usize,
    pub board: BoardView,
    pub winner: Option<PlayerId>,
}

/// Room-listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub active_player_count: usize,
    pub spectator_count: usize,
    pub state: GameStatus,
}

/// Aggregate counters across every live room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_rooms: usize,
    /// Non-spectator players, eliminated or not.
    pub total_players: usize,
    pub total_spectators: usize,
    pub games_in_progress: usize,
    pub games_finished: usize,
}

// =========================================================================
// Tests
// =========================================================================
