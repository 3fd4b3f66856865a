//! Error types for the room layer.

use chainforge_engine::GameError;
use chainforge_protocol::{RejectionKind, RoomId};

/// Errors from registry lookups, membership checks and the actor channel.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("it is not your turn")]
    NotPlayersTurn,

    #[error("spectators cannot place tokens")]
    SpectatorForbidden,

    /// Every seat is taken. Spectators are never turned away.
    #[error("room {room_id} is full ({max} players)")]
    RoomFull { room_id: RoomId, max: usize },

    #[error("not a member of room {0}")]
    NotAMember(RoomId),

    /// The engine refused the move.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The registry actor has stopped.
    #[error("room registry is unavailable")]
    Unavailable,
}

impl RoomError {
    /// The rejection kind reported to the acting connection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::RoomNotFound(_) => RejectionKind::RoomNotFound,
            Self::NotPlayersTurn => RejectionKind::NotPlayersTurn,
            Self::SpectatorForbidden => RejectionKind::SpectatorForbidden,
            Self::RoomFull { .. } => RejectionKind::RoomFull,
            Self::NotAMember(_) => RejectionKind::NotAMember,
            Self::Game(e) => e.kind(),
            // Never reaches a client: the connection is torn down instead.
            Self::Unavailable => RejectionKind::RoomNotFound,
        }
    }
}
