//! Turns one validated action into the notifications it causes.
//!
//! Dispatch is synchronous and runs against a `&mut RoomRegistry`, so an
//! action's checks, mutation and resulting notifications happen as one
//! step. Addressing is symbolic ([`Recipient::Room`]); the caller resolves
//! room recipients against the registry after dispatch returns.

use chainforge_engine::{GameError, GameOutcome};
use chainforge_protocol::{
    Action, BoardConfig, ConnectionId, GameStatus, Notification, PlayerView, Recipient, RoomId,
};
use tracing::{debug, info};

use crate::{RoomError, RoomRegistry};

/// One notification and who gets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: Recipient,
    pub notification: Notification,
}

impl Delivery {
    pub fn room(room_id: RoomId, notification: Notification) -> Self {
        Self { to: Recipient::Room(room_id), notification }
    }

    pub fn connection(connection: ConnectionId, notification: Notification) -> Self {
        Self { to: Recipient::Connection(connection), notification }
    }
}

/// Applies `action` on behalf of `connection`.
///
/// A refused action yields exactly one `action-rejected` delivery to the
/// acting connection and leaves every room as it was.
pub fn dispatch(registry: &mut RoomRegistry, connection: ConnectionId, action: Action) -> Vec<Delivery> {
    let action_name = action.name();
    let result = match action {
        Action::Join { room_id, name, is_spectator, board } => {
            join(registry, connection, room_id, name, is_spectator, board)
        }
        Action::Start { room_id } => start(registry, connection, room_id),
        Action::Place { room_id, row, col } => place(registry, connection, room_id, row, col),
        Action::Ready { room_id, ready } => set_ready(registry, connection, room_id, ready),
        Action::RoomState { room_id } => registry
            .get(&room_id)
            .map(|room| {
                vec![Delivery::connection(
                    connection,
                    Notification::RoomState { snapshot: room.snapshot() },
                )]
            })
            .ok_or(RoomError::RoomNotFound(room_id)),
        Action::ListRooms => Ok(vec![Delivery::connection(
            connection,
            Notification::RoomList { rooms: registry.summaries() },
        )]),
        Action::Stats => Ok(vec![Delivery::connection(
            connection,
            Notification::Stats { stats: registry.stats() },
        )]),
        Action::Leave => Ok(leave(registry, connection)),
    };

    result.unwrap_or_else(|err| {
        debug!(%connection, action = action_name, error = %err, "action rejected");
        vec![Delivery::connection(connection, Notification::rejected(err.kind(), &err))]
    })
}

fn join(
    registry: &mut RoomRegistry,
    connection: ConnectionId,
    room_id: RoomId,
    name: String,
    is_spectator: bool,
    board: Option<BoardConfig>,
) -> Result<Vec<Delivery>, RoomError> {
    let max = registry.config().max_active_players;
    let room = registry.get_or_create(&room_id, board);

    let rejoin = room.player_by_connection(connection).is_some();
    if !rejoin && !is_spectator && room.seated_count() >= max {
        return Err(RoomError::RoomFull { room_id, max });
    }

    let player = room.add_player(connection, name, is_spectator);
    let (player_id, is_spectator) = (player.id(), player.is_spectator());
    if !rejoin {
        info!(
            %room_id,
            %player_id,
            %connection,
            is_spectator,
            players = room.players().len(),
            "player joined"
        );
    }

    Ok(vec![
        Delivery::connection(
            connection,
            Notification::Joined { player_id, is_spectator, snapshot: room.snapshot() },
        ),
        Delivery::room(
            room_id.clone(),
            Notification::RosterChanged {
                room_id,
                players: room.player_views(),
                current_player_index: room.current_player_index(),
            },
        ),
    ])
}

fn start(
    registry: &mut RoomRegistry,
    connection: ConnectionId,
    room_id: RoomId,
) -> Result<Vec<Delivery>, RoomError> {
    let Some(room) = registry.get_mut(&room_id) else {
        return Err(RoomError::RoomNotFound(room_id));
    };
    if room.player_by_connection(connection).is_none() {
        return Err(RoomError::NotAMember(room_id));
    }

    room.start_game()?;

    Ok(vec![Delivery::room(
        room_id.clone(),
        Notification::GameStarted {
            room_id,
            state: room.state(),
            board: room.board().view(),
            current_player_index: room.current_player_index(),
            players: room.player_views(),
        },
    )])
}

fn place(
    registry: &mut RoomRegistry,
    connection: ConnectionId,
    room_id: RoomId,
    row: i64,
    col: i64,
) -> Result<Vec<Delivery>, RoomError> {
    let Some(room) = registry.get_mut(&room_id) else {
        return Err(RoomError::RoomNotFound(room_id));
    };
    let Some(player) = room.player_by_connection(connection) else {
        return Err(RoomError::NotAMember(room_id));
    };
    if player.is_spectator() {
        return Err(RoomError::SpectatorForbidden);
    }
    let player_id = player.id();
    if room.state() != GameStatus::Playing {
        return Err(GameError::GameNotInProgress(room.state()).into());
    }
    if room.current_player().map(|p| p.id()) != Some(player_id) {
        return Err(RoomError::NotPlayersTurn);
    }

    let report = room.play_turn(player_id, row, col)?;
    debug!(
        %room_id,
        %player_id,
        row,
        col,
        explosions = report.explosions.len(),
        "token placed"
    );

    let mut out = vec![Delivery::room(
        room_id.clone(),
        Notification::GameUpdated {
            room_id: room_id.clone(),
            board: room.board().view(),
            current_player_index: room.current_player_index(),
            players: room.player_views(),
            explosions: report.explosions,
            eliminated: report.eliminated,
            winner: room.winner(),
        },
    )];
    if let Some(outcome) = report.outcome {
        out.push(game_over(room_id, outcome, room.player_views()));
    }
    Ok(out)
}

fn set_ready(
    registry: &mut RoomRegistry,
    connection: ConnectionId,
    room_id: RoomId,
    ready: bool,
) -> Result<Vec<Delivery>, RoomError> {
    let Some(room) = registry.get_mut(&room_id) else {
        return Err(RoomError::RoomNotFound(room_id));
    };
    if !room.set_ready(connection, ready) {
        return Err(RoomError::NotAMember(room_id));
    }
    Ok(vec![Delivery::room(
        room_id.clone(),
        Notification::RosterChanged {
            room_id,
            players: room.player_views(),
            current_player_index: room.current_player_index(),
        },
    )])
}

/// Removes `connection` from every room it is in, then sweeps.
///
/// Departing players never fail to leave, so this cannot be rejected.
pub fn leave(registry: &mut RoomRegistry, connection: ConnectionId) -> Vec<Delivery> {
    let mut out = Vec::new();

    for room_id in registry.rooms_with_connection(connection) {
        let Some(room) = registry.get_mut(&room_id) else {
            continue;
        };
        let Some(player) = room.remove_player(connection) else {
            continue;
        };
        info!(
            %room_id,
            player_id = %player.id(),
            %connection,
            players = room.players().len(),
            "player left"
        );

        out.push(Delivery::room(
            room_id.clone(),
            Notification::RosterChanged {
                room_id: room_id.clone(),
                players: room.player_views(),
                current_player_index: room.current_player_index(),
            },
        ));

        if !player.is_spectator() && room.state() == GameStatus::Playing {
            if let Some(outcome) = room.detect_winner() {
                out.push(game_over(room_id, outcome, room.player_views()));
            }
        }
    }

    registry.sweep_empty();
    out
}

fn game_over(room_id: RoomId, outcome: GameOutcome, players: Vec<PlayerView>) -> Delivery {
    Delivery::room(
        room_id.clone(),
        Notification::GameOver { room_id, winner: outcome.winner(), players },
    )
}
