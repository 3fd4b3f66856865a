//! Room registry: creates, tracks and drops rooms.

use std::collections::BTreeMap;

use chainforge_engine::GameRoom;
use chainforge_protocol::{
    BoardConfig, ConnectionId, GameStatus, RegistryStats, RoomId, RoomSummary,
};

use crate::RegistryConfig;

/// Every live room, keyed by id.
///
/// The registry holds no game logic. It finds or creates the room an
/// action addresses and forgets rooms once nobody is left in them.
/// Iteration is in room id order.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomId, GameRoom>,
    config: RegistryConfig,
}

impl RoomRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            rooms: BTreeMap::new(),
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the room, creating it with `board` (or the default board)
    /// if it does not exist. `board` is ignored for existing rooms.
    pub fn get_or_create(&mut self, room_id: &RoomId, board: Option<BoardConfig>) -> &mut GameRoom {
        let default_board = self.config.default_board;
        self.rooms.entry(room_id.clone()).or_insert_with(|| {
            let board = board.map(BoardConfig::validated).unwrap_or(default_board);
            tracing::info!(%room_id, rows = board.rows, cols = board.cols, "room created");
            GameRoom::new(room_id.clone(), board)
        })
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&GameRoom> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut GameRoom> {
        self.rooms.get_mut(room_id)
    }

    pub fn remove(&mut self, room_id: &RoomId) -> Option<GameRoom> {
        let removed = self.rooms.remove(room_id);
        if removed.is_some() {
            tracing::info!(%room_id, "room removed");
        }
        removed
    }

    pub fn all(&self) -> impl Iterator<Item = &GameRoom> {
        self.rooms.values()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Drops every room with an empty roster, returning their ids.
    pub fn sweep_empty(&mut self) -> Vec<RoomId> {
        let empty: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        for room_id in &empty {
            self.rooms.remove(room_id);
        }
        if !empty.is_empty() {
            tracing::info!(removed = empty.len(), remaining = self.rooms.len(), "swept empty rooms");
        }
        empty
    }

    /// The first room (in id order) this connection is in.
    pub fn find_room_by_connection(&self, connection: ConnectionId) -> Option<&RoomId> {
        self.rooms
            .iter()
            .find(|(_, room)| room.player_by_connection(connection).is_some())
            .map(|(id, _)| id)
    }

    /// Every room this connection is in.
    pub fn rooms_with_connection(&self, connection: ConnectionId) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|(_, room)| room.player_by_connection(connection).is_some())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms.values().map(GameRoom::summary).collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            total_rooms: self.rooms.len(),
            ..Default::default()
        };
        for room in self.rooms.values() {
            stats.total_players += room.seated_count();
            stats.total_spectators += room.spectator_count();
            match room.state() {
                GameStatus::Playing => stats.games_in_progress += 1,
                GameStatus::Finished => stats.games_finished += 1,
                GameStatus::Lobby => {}
            }
        }
        stats
    }

    /// Drops every room.
    pub fn clear(&mut self) {
        let count = self.rooms.len();
        self.rooms.clear();
        tracing::info!(removed = count, "registry cleared");
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
