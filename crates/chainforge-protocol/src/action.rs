//! Inbound frames and the validated actions they become.
//!
//! Clients send JSON objects tagged by `"type"`. Every field is decoded
//! as optional so that a missing room id or name is reported as
//! `MissingField` instead of an opaque decode error; [`InboundFrame::into_action`]
//! then checks presence and produces the strict [`Action`].

use serde::{Deserialize, Serialize};

use crate::{BoardConfig, ProtocolError, RoomId};

/// Longest display name kept, in characters. Longer names are truncated.
pub const MAX_NAME_CHARS: usize = 20;

/// A frame exactly as received, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InboundFrame {
    Join {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        is_spectator: Option<bool>,
        /// Only used when the join creates the room.
        #[serde(default)]
        board: Option<BoardConfig>,
    },
    Start {
        #[serde(default)]
        room_id: Option<String>,
    },
    Place {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        row: Option<i64>,
        #[serde(default)]
        col: Option<i64>,
    },
    Ready {
        #[serde(default)]
        room_id: Option<String>,
        #[serde(default)]
        ready: Option<bool>,
    },
    RoomState {
        #[serde(default)]
        room_id: Option<String>,
    },
    ListRooms,
    Stats,
    Leave,
}

/// A validated request from one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Join (creating if needed) a room as a player or spectator.
    Join {
        room_id: RoomId,
        name: String,
        is_spectator: bool,
        board: Option<BoardConfig>,
    },
    /// Leave the lobby and deal the opening tokens.
    Start { room_id: RoomId },
    /// Put one token on `(row, col)`. Coordinates are signed so that a
    /// negative value is reported as out of bounds, not as malformed.
    Place { room_id: RoomId, row: i64, col: i64 },
    Ready { room_id: RoomId, ready: bool },
    /// Ask for a fresh snapshot of a room.
    RoomState { room_id: RoomId },
    ListRooms,
    Stats,
    /// Leave every room this connection is in. Sent implicitly on disconnect.
    Leave,
}

impl Action {
    /// The room this action addresses, if any.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::Join { room_id, .. }
            | Self::Start { room_id }
            | Self::Place { room_id, .. }
            | Self::Ready { room_id, .. }
            | Self::RoomState { room_id } => Some(room_id),
            Self::ListRooms | Self::Stats | Self::Leave => None,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Start { .. } => "start",
            Self::Place { .. } => "place",
            Self::Ready { .. } => "ready",
            Self::RoomState { .. } => "room-state",
            Self::ListRooms => "list-rooms",
            Self::Stats => "stats",
            Self::Leave => "leave",
        }
    }
}

impl InboundFrame {
    /// Checks required fields and normalises values.
    ///
    /// # Errors
    /// [`ProtocolError::MissingField`] naming the first absent or blank field.
    pub fn into_action(self) -> Result<Action, ProtocolError> {
        let action = match self {
            Self::Join { room_id, name, is_spectator, board } => Action::Join {
                room_id: require_room(room_id)?,
                name: normalize_name(name)?,
                is_spectator: is_spectator.unwrap_or(false),
                board,
            },
            Self::Start { room_id } => Action::Start { room_id: require_room(room_id)? },
            Self::Place { room_id, row, col } => Action::Place {
                room_id: require_room(room_id)?,
                row: row.ok_or(ProtocolError::MissingField("row"))?,
                col: col.ok_or(ProtocolError::MissingField("col"))?,
            },
            Self::Ready { room_id, ready } => Action::Ready {
                room_id: require_room(room_id)?,
                ready: ready.ok_or(ProtocolError::MissingField("ready"))?,
            },
            Self::RoomState { room_id } => Action::RoomState { room_id: require_room(room_id)? },
            Self::ListRooms => Action::ListRooms,
            Self::Stats => Action::Stats,
            Self::Leave => Action::Leave,
        };
        Ok(action)
    }
}

fn require_room(raw: Option<String>) -> Result<RoomId, ProtocolError> {
    raw.and_then(RoomId::new).ok_or(ProtocolError::MissingField("room_id"))
}

fn normalize_name(raw: Option<String>) -> Result<String, ProtocolError> {
    let name = raw.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ProtocolError::MissingField("name"));
    }
    Ok(name.chars().take(MAX_NAME_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Action, ProtocolError> {
        let frame: InboundFrame = serde_json::from_str(json).map_err(ProtocolError::Decode)?;
        frame.into_action()
    }

    #[test]
    fn test_join_frame_with_defaults() {
        let action = parse(r#"{"type":"join","room_id":"ROOM1","name":" alice "}"#).unwrap();
        assert_eq!(
            action,
            Action::Join {
                room_id: RoomId::new("ROOM1").unwrap(),
                name: "alice".into(),
                is_spectator: false,
                board: None,
            }
        );
    }

    #[test]
    fn test_join_frame_with_board_and_spectator() {
        let action = parse(
            r#"{"type":"join","room_id":"R","name":"bob","is_spectator":true,"board":{"rows":3,"cols":4}}"#,
        )
        .unwrap();
        match action {
            Action::Join { is_spectator, board, .. } => {
                assert!(is_spectator);
                assert_eq!(board, Some(BoardConfig::new(3, 4)));
            }
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn test_join_without_room_or_name_is_missing_field() {
        let err = parse(r#"{"type":"join","name":"alice"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("room_id")));

        let err = parse(r#"{"type":"join","room_id":"R","name":"   "}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("name")));
    }

    #[test]
    fn test_long_names_are_truncated_by_chars() {
        let long = "é".repeat(30);
        let json = format!(r#"{{"type":"join","room_id":"R","name":"{long}"}}"#);
        match parse(&json).unwrap() {
            Action::Join { name, .. } => assert_eq!(name.chars().count(), MAX_NAME_CHARS),
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn test_place_requires_coordinates_but_allows_negative() {
        let err = parse(r#"{"type":"place","room_id":"R","row":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("col")));

        let action = parse(r#"{"type":"place","room_id":"R","row":-1,"col":2}"#).unwrap();
        assert_eq!(action.name(), "place");
        assert!(matches!(action, Action::Place { row: -1, col: 2, .. }));
    }

    #[test]
    fn test_unknown_type_fails_to_decode() {
        let result: Result<InboundFrame, _> = serde_json::from_str(r#"{"type":"chat","message":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_frames() {
        assert_eq!(parse(r#"{"type":"list-rooms"}"#).unwrap(), Action::ListRooms);
        assert_eq!(parse(r#"{"type":"stats"}"#).unwrap(), Action::Stats);
        assert_eq!(parse(r#"{"type":"leave"}"#).unwrap(), Action::Leave);
        assert!(Action::Leave.room_id().is_none());
    }

    #[test]
    fn test_frame_serializes_with_kebab_case_tag() {
        let frame = InboundFrame::RoomState { room_id: Some("R".into()) };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "room-state");
        assert_eq!(json["room_id"], "R");
    }

    #[test]
    fn test_protocol_errors_map_to_missing_field_kind() {
        let err = parse(r#"{"type":"start"}"#).unwrap_err();
        assert_eq!(err.kind(), crate::RejectionKind::MissingField);
    }
}
