//! Outbound notifications and their addressing.

use serde::{Deserialize, Serialize};

use crate::{
    BoardView, ConnectionId, ExplosionEvent, GameStatus, PlayerId, PlayerView, RegistryStats,
    RejectionKind, RoomId, RoomSnapshot, RoomSummary,
};

/// Who should receive a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every connection currently in the room.
    Room(RoomId),
    /// One connection only (the actor, for replies and rejections).
    Connection(ConnectionId),
}

/// Everything the core tells clients.
///
/// Internally tagged and kebab-cased on the wire:
/// `{ "type": "roster-changed", "room_id": "R1", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// Reply to a join: who you are and the full room.
    Joined {
        player_id: PlayerId,
        is_spectator: bool,
        snapshot: RoomSnapshot,
    },

    /// The roster changed (join, leave, readiness).
    RosterChanged {
        room_id: RoomId,
        players: Vec<PlayerView>,
        current_player_index: usize,
    },

    GameStarted {
        room_id: RoomId,
        state: GameStatus,
        board: BoardView,
        current_player_index: usize,
        players: Vec<PlayerView>,
    },

    /// Sent after every accepted placement.
    GameUpdated {
        room_id: RoomId,
        board: BoardView,
        current_player_index: usize,
        players: Vec<PlayerView>,
        explosions: Vec<ExplosionEvent>,
        eliminated: Vec<PlayerId>,
        winner: Option<PlayerId>,
    },

    /// The game ended. `winner` is `None` for a draw.
    GameOver {
        room_id: RoomId,
        winner: Option<PlayerId>,
        players: Vec<PlayerView>,
    },

    ActionRejected {
        kind: RejectionKind,
        message: String,
    },

    /// Reply to a `room-state` request.
    RoomState { snapshot: RoomSnapshot },

    RoomList { rooms: Vec<RoomSummary> },

    Stats { stats: RegistryStats },
}

impl Notification {
    /// Builds a rejection from any error that knows its kind.
    pub fn rejected(kind: RejectionKind, err: &impl std::fmt::Display) -> Self {
        Self::ActionRejected { kind, message: err.to_string() }
    }

    /// The wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::RosterChanged { .. } => "roster-changed",
            Self::GameStarted { .. } => "game-started",
            Self::GameUpdated { .. } => "game-updated",
            Self::GameOver { .. } => "game-over",
            Self::ActionRejected { .. } => "action-rejected",
            Self::RoomState { .. } => "room-state",
            Self::RoomList { .. } => "room-list",
            Self::Stats { .. } => "stats",
        }
    }
}
