//! One room's game: roster, turn order, board and lifecycle.

use chainforge_protocol::{
    BoardConfig, ConnectionId, ExplosionEvent, GameStatus, PlayerId, PlayerView, RoomId,
    RoomSnapshot, RoomSummary,
};
use rand::Rng;
use tracing::{debug, info};

use crate::{Board, GameError, PALETTE, Player, Position, resolve_chain};

/// Tokens dealt to each active player when the game starts.
pub const OPENING_TOKENS: usize = 3;

/// Failed draws allowed per opening token before the deal stops.
const OPENING_ATTEMPTS: usize = 100;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PlayerId),
    /// Nobody is left standing.
    Draw,
}

impl GameOutcome {
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            Self::Winner(id) => Some(id),
            Self::Draw => None,
        }
    }
}

/// Everything one accepted placement caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub explosions: Vec<ExplosionEvent>,
    /// Players knocked out by this turn, in roster order.
    pub eliminated: Vec<PlayerId>,
    /// Set when this turn ended the game.
    pub outcome: Option<GameOutcome>,
}

/// A single game instance.
///
/// Roster order is turn order. Removing a player never reorders the
/// others. While the game is playing and anyone is still active,
/// `players[current_player_index]` is an active player.
#[derive(Debug)]
pub struct GameRoom {
    id: RoomId,
    players: Vec<Player>,
    board: Board,
    state: GameStatus,
    current_player_index: usize,
    winner: Option<PlayerId>,
}

impl GameRoom {
    pub fn new(id: RoomId, board: BoardConfig) -> Self {
        Self {
            id,
            players: Vec::new(),
            board: Board::new(board),
            state: GameStatus::Lobby,
            current_player_index: 0,
            winner: None,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn state(&self) -> GameStatus {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player_by_connection(&self, connection: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.connection() == connection)
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.players.iter().map(Player::connection)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    /// Non-spectators, eliminated or not. This is what a room's seat
    /// limit counts.
    pub fn seated_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_spectator()).count()
    }

    pub fn spectator_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_spectator()).count()
    }

    /// Whose turn it is. Only meaningful while playing.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Adds a player, or returns the existing one if this connection is
    /// already in the room.
    ///
    /// Non-spectators joining the lobby get the first palette colour no
    /// other non-spectator holds. Joining after the lobby closed seats the
    /// player as already eliminated: they watch until the room is retired.
    pub fn add_player(
        &mut self,
        connection: ConnectionId,
        name: impl Into<String>,
        is_spectator: bool,
    ) -> &Player {
        if let Some(idx) = self.players.iter().position(|p| p.connection() == connection) {
            return &self.players[idx];
        }

        let mut player = Player::new(connection, name, is_spectator);
        if !is_spectator {
            if self.state == GameStatus::Lobby {
                player.set_color(self.free_color());
            } else {
                player.eliminate();
            }
        }

        debug!(
            room_id = %self.id,
            player_id = %player.id(),
            %connection,
            is_spectator,
            "player added"
        );
        let idx = self.players.len();
        self.players.push(player);
        &self.players[idx]
    }

    fn free_color(&self) -> &'static str {
        PALETTE
            .iter()
            .copied()
            .find(|c| {
                !self
                    .players
                    .iter()
                    .any(|p| !p.is_spectator() && p.color() == Some(*c))
            })
            .unwrap_or(PALETTE[self.players.len() % PALETTE.len()])
    }

    /// Removes the player on `connection`, returning it.
    ///
    /// The turn index is left alone unless the roster shrank past it, in
    /// which case it wraps to the front. While playing, a turn that lands
    /// on an inactive player moves on to the next active one.
    pub fn remove_player(&mut self, connection: ConnectionId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.connection() == connection)?;
        let removed = self.players.remove(idx);

        if self.players.is_empty() {
            self.current_player_index = 0;
            return Some(removed);
        }
        if self.current_player_index >= self.players.len() {
            self.current_player_index = 0;
        }
        if self.state == GameStatus::Playing && !self.players[self.current_player_index].is_active() {
            self.advance_turn();
        }

        debug!(room_id = %self.id, player_id = %removed.id(), %connection, "player removed");
        Some(removed)
    }

    /// Toggles readiness. Returns `false` if the connection is not here.
    pub fn set_ready(&mut self, connection: ConnectionId, ready: bool) -> bool {
        match self.players.iter_mut().find(|p| p.connection() == connection) {
            Some(player) => {
                player.set_ready(ready);
                true
            }
            None => false,
        }
    }

    /// Starts the game using the thread-local RNG for the opening deal.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.start_game_with(&mut rand::rng())
    }

    /// Leaves the lobby: clears the board and per-game flags, then deals
    /// up to [`OPENING_TOKENS`] random tokens to each active player.
    ///
    /// # Errors
    /// - `AlreadyStarted` if the room has left the lobby
    /// - `InsufficientPlayers` with fewer than two active players
    pub fn start_game_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.state != GameStatus::Lobby {
            return Err(GameError::AlreadyStarted);
        }
        let active = self.active_count();
        if active < 2 {
            return Err(GameError::InsufficientPlayers { active });
        }

        self.board.reset();
        for player in &mut self.players {
            player.reset();
        }
        self.state = GameStatus::Playing;
        self.current_player_index = 0;
        self.winner = None;

        self.deal_opening(rng);

        if !self.players[0].is_active() {
            self.advance_turn();
        }

        info!(room_id = %self.id, players = active, "game started");
        Ok(())
    }

    // Opening tokens are not resolved, so a corner dealt twice starts the
    // game at capacity and goes off after the first placement.
    fn deal_opening<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let ids: Vec<PlayerId> = self.active_players().map(Player::id).collect();
        let (rows, cols) = (self.board.rows(), self.board.cols());

        for id in ids {
            let mut placed = 0;
            let mut attempts = 0;
            while placed < OPENING_TOKENS && attempts < OPENING_ATTEMPTS {
                let pos = Position::new(rng.random_range(0..rows), rng.random_range(0..cols));
                if self.board.place_token(pos, id).is_ok() {
                    placed += 1;
                    attempts = 0;
                } else {
                    attempts += 1;
                }
            }
            if placed < OPENING_TOKENS {
                debug!(room_id = %self.id, player_id = %id, placed, "opening deal short");
            }
        }
    }

    /// Puts one token for `player` on `(row, col)`. Does not resolve.
    ///
    /// # Errors
    /// `GameNotInProgress` outside of play, otherwise whatever the board
    /// refuses with.
    pub fn place_token(&mut self, row: i64, col: i64, player: PlayerId) -> Result<Position, GameError> {
        if self.state != GameStatus::Playing {
            return Err(GameError::GameNotInProgress(self.state));
        }
        let pos = self.board.locate(row, col)?;
        self.board.place_token(pos, player)?;
        Ok(pos)
    }

    /// Runs the chain reaction to completion.
    pub fn resolve(&mut self) -> Vec<ExplosionEvent> {
        resolve_chain(&mut self.board)
    }

    /// Marks every active player with no territory as eliminated and
    /// returns them. Call after [`resolve`](Self::resolve).
    pub fn detect_eliminated(&mut self) -> Vec<PlayerId> {
        let mut out = Vec::new();
        for player in &mut self.players {
            if !player.is_active() {
                continue;
            }
            if self.board.cells_owned_by(player.id()).is_empty() {
                player.eliminate();
                info!(room_id = %self.id, player_id = %player.id(), "player eliminated");
                out.push(player.id());
            }
        }
        out
    }

    /// Ends the game if at most one active player remains.
    ///
    /// Returns `None` while the game continues or when not playing.
    pub fn detect_winner(&mut self) -> Option<GameOutcome> {
        if self.state != GameStatus::Playing {
            return None;
        }
        let active: Vec<PlayerId> = self.active_players().map(Player::id).take(2).collect();
        let outcome = match active.as_slice() {
            [id] => GameOutcome::Winner(*id),
            [] => GameOutcome::Draw,
            _ => return None,
        };

        self.state = GameStatus::Finished;
        self.winner = outcome.winner();
        match outcome {
            GameOutcome::Winner(id) => info!(room_id = %self.id, winner = %id, "game finished"),
            GameOutcome::Draw => info!(room_id = %self.id, "game finished in a draw"),
        }
        Some(outcome)
    }

    /// Passes the turn to the next active player in roster order,
    /// wrapping around. Does nothing when nobody is active.
    pub fn advance_turn(&mut self) {
        if self.active_players().next().is_none() {
            return;
        }
        let len = self.players.len();
        loop {
            self.current_player_index = (self.current_player_index + 1) % len;
            if self.players[self.current_player_index].is_active() {
                break;
            }
        }
    }

    /// Place, resolve, eliminate, check for a winner and, if the game goes
    /// on, pass the turn. Turn ownership is the caller's concern.
    pub fn play_turn(&mut self, player: PlayerId, row: i64, col: i64) -> Result<TurnReport, GameError> {
        self.place_token(row, col, player)?;
        let explosions = self.resolve();
        let eliminated = self.detect_eliminated();
        let outcome = self.detect_winner();
        if self.state == GameStatus::Playing {
            self.advance_turn();
        }
        Ok(TurnReport { explosions, eliminated, outcome })
    }

    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            players: self.player_views(),
            state: self.state,
            current_player_index: self.current_player_index,
            board: self.board.view(),
            winner: self.winner,
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            active_player_count: self.active_count(),
            spectator_count: self.spectator_count(),
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    fn room(rows: usize, cols: usize) -> GameRoom {
        GameRoom::new(RoomId::new("R").unwrap(), BoardConfig::new(rows, cols))
    }

    /// A started room with `n` players whose board has been wiped clean.
    fn playing(n: u64, rows: usize, cols: usize) -> GameRoom {
        let mut r = room(rows, cols);
        for i in 1..=n {
            r.add_player(conn(i), format!("p{i}"), false);
        }
        r.start_game_with(&mut StdRng::seed_from_u64(7)).unwrap();
        r.board.reset();
        r
    }

    fn id_of(r: &GameRoom, n: u64) -> PlayerId {
        r.player_by_connection(conn(n)).unwrap().id()
    }

    #[test]
    fn test_rejoin_returns_existing_player() {
        let mut r = room(6, 10);
        let first = r.add_player(conn(1), "alice", false).id();
        let again = r.add_player(conn(1), "someone else", true).id();
        assert_eq!(first, again);
        assert_eq!(r.players().len(), 1);
        assert_eq!(r.players()[0].name(), "alice");
    }

    #[test]
    fn test_colours_fill_lowest_free_slot() {
        let mut r = room(6, 10);
        r.add_player(conn(1), "a", false);
        r.add_player(conn(2), "b", false);
        r.add_player(conn(3), "c", false);
        r.remove_player(conn(2));
        let d = r.add_player(conn(4), "d", false);
        assert_eq!(d.color(), Some(PALETTE[1]));
    }

    #[test]
    fn test_spectators_get_no_colour() {
        let mut r = room(6, 10);
        let s = r.add_player(conn(1), "watcher", true);
        assert!(s.color().is_none());
        let p = r.add_player(conn(2), "player", false);
        assert_eq!(p.color(), Some(PALETTE[0]));
    }

    #[test]
    fn test_colours_cycle_once_palette_is_exhausted() {
        let mut r = room(6, 10);
        for i in 0..PALETTE.len() as u64 {
            r.add_player(conn(i), "p", false);
        }
        let extra = r.add_player(conn(99), "extra", false);
        assert_eq!(extra.color(), Some(PALETTE[0]));
    }

    #[test]
    fn test_late_joiner_sits_out_eliminated() {
        let mut r = playing(2, 4, 4);
        let late = r.add_player(conn(9), "late", false);
        assert!(late.is_eliminated());
        assert!(late.color().is_none());
        assert_eq!(r.active_count(), 2);
        assert_eq!(r.seated_count(), 3);
    }

    #[test]
    fn test_start_requires_two_active_players() {
        let mut r = room(6, 10);
        r.add_player(conn(1), "a", false);
        r.add_player(conn(2), "s", true);
        assert_eq!(r.start_game(), Err(GameError::InsufficientPlayers { active: 1 }));
        assert_eq!(r.state(), GameStatus::Lobby);
    }

    #[test]
    fn test_start_twice_is_already_started() {
        let mut r = playing(2, 6, 10);
        assert_eq!(r.start_game(), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_start_deals_opening_tokens() {
        let mut r = room(6, 10);
        r.add_player(conn(1), "a", false);
        r.add_player(conn(2), "b", false);
        r.start_game_with(&mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(r.state(), GameStatus::Playing);
        for player in r.players() {
            let tokens: u32 = r
                .board()
                .cells_owned_by(player.id())
                .into_iter()
                .map(|pos| r.board().cell(pos).unwrap().token_count())
                .sum();
            assert_eq!(tokens, OPENING_TOKENS as u32);
        }
    }

    #[test]
    fn test_start_skips_leading_spectator() {
        let mut r = room(6, 10);
        r.add_player(conn(1), "watcher", true);
        r.add_player(conn(2), "a", false);
        r.add_player(conn(3), "b", false);
        r.start_game_with(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(r.current_player_index(), 1);
    }

    #[test]
    fn test_place_outside_play_is_rejected() {
        let mut r = room(6, 10);
        r.add_player(conn(1), "a", false);
        let id = id_of(&r, 1);
        assert_eq!(
            r.place_token(0, 0, id),
            Err(GameError::GameNotInProgress(GameStatus::Lobby))
        );
    }

    #[test]
    fn test_place_propagates_board_errors() {
        let mut r = playing(2, 3, 3);
        let a = id_of(&r, 1);
        let b = id_of(&r, 2);
        assert!(matches!(r.place_token(3, 0, a), Err(GameError::OutOfBounds { .. })));
        r.place_token(1, 1, a).unwrap();
        assert!(matches!(
            r.place_token(1, 1, b),
            Err(GameError::CellOwnershipConflict { row: 1, col: 1 })
        ));
    }

    #[test]
    fn test_capture_eliminates_and_crowns_winner() {
        let mut r = playing(2, 3, 3);
        let p = id_of(&r, 1);
        let q = id_of(&r, 2);
        r.board.set_cell(Position::new(0, 0), 1, Some(p));
        r.board.set_cell(Position::new(0, 1), 1, Some(q));

        let report = r.play_turn(p, 0, 0).unwrap();

        assert_eq!(report.eliminated, vec![q]);
        assert_eq!(report.outcome, Some(GameOutcome::Winner(p)));
        assert_eq!(r.state(), GameStatus::Finished);
        assert_eq!(r.winner(), Some(p));
        let captured = r.board().cell(Position::new(0, 1)).unwrap();
        assert_eq!((captured.token_count(), captured.owner()), (2, Some(p)));
    }

    #[test]
    fn test_turn_passes_when_game_goes_on() {
        let mut r = playing(2, 3, 3);
        let p = id_of(&r, 1);
        let q = id_of(&r, 2);
        r.board.set_cell(Position::new(2, 2), 1, Some(q));

        let report = r.play_turn(p, 1, 1).unwrap();
        assert!(report.explosions.is_empty());
        assert!(report.outcome.is_none());
        assert_eq!(r.current_player_index(), 1);
    }

    #[test]
    fn test_detect_winner_draw_when_nobody_active() {
        let mut r = playing(2, 3, 3);
        for player in &mut r.players {
            player.eliminate();
        }
        assert_eq!(r.detect_winner(), Some(GameOutcome::Draw));
        assert_eq!(r.state(), GameStatus::Finished);
        assert_eq!(r.winner(), None);
    }

    #[test]
    fn test_detect_winner_waits_while_two_remain() {
        let mut r = playing(3, 3, 3);
        r.players[0].eliminate();
        assert_eq!(r.detect_winner(), None);
        assert_eq!(r.state(), GameStatus::Playing);

        r.players[1].eliminate();
        let last = id_of(&r, 3);
        assert_eq!(r.detect_winner(), Some(GameOutcome::Winner(last)));
        assert_eq!(r.winner(), Some(last));
    }

    #[test]
    fn test_detect_winner_is_inert_outside_play() {
        let mut r = room(3, 3);
        r.add_player(conn(1), "a", false);
        assert_eq!(r.detect_winner(), None);
        assert_eq!(r.state(), GameStatus::Lobby);
    }

    #[test]
    fn test_advance_skips_eliminated_middle_player() {
        let mut r = playing(3, 4, 4);
        r.players[1].eliminate();
        assert_eq!(r.current_player_index(), 0);
        r.advance_turn();
        assert_eq!(r.current_player_index(), 2);
        r.advance_turn();
        assert_eq!(r.current_player_index(), 0);
    }

    #[test]
    fn test_advance_with_nobody_active_is_noop() {
        let mut r = playing(2, 3, 3);
        for player in &mut r.players {
            player.eliminate();
        }
        r.advance_turn();
        assert_eq!(r.current_player_index(), 0);
    }

    #[test]
    fn test_removing_earlier_player_past_the_end_wraps_index() {
        let mut r = playing(3, 4, 4);
        r.advance_turn();
        r.advance_turn();
        r.remove_player(conn(1));
        assert_eq!(r.current_player_index(), 0);
        assert_eq!(r.current_player().unwrap().id(), id_of(&r, 2));
    }

    #[test]
    fn test_removing_earlier_player_keeps_index_in_range() {
        let mut r = playing(4, 4, 4);
        r.advance_turn();
        r.advance_turn();
        r.remove_player(conn(1));
        // Index 2 now holds the fourth player.
        assert_eq!(r.current_player_index(), 2);
        assert_eq!(r.current_player().unwrap().id(), id_of(&r, 4));
    }

    #[test]
    fn test_removing_current_player_passes_turn() {
        let mut r = playing(3, 4, 4);
        r.advance_turn();
        r.players[2].eliminate();
        r.remove_player(conn(2));
        // Index 1 now holds the eliminated third player, so the turn moves on.
        assert_eq!(r.current_player_index(), 0);
        assert!(r.current_player().unwrap().is_active());
    }

    #[test]
    fn test_removing_last_slot_wraps_to_front() {
        let mut r = playing(3, 4, 4);
        r.advance_turn();
        r.advance_turn();
        r.remove_player(conn(3));
        assert_eq!(r.current_player_index(), 0);
    }

    #[test]
    fn test_remove_unknown_connection_is_none() {
        let mut r = room(3, 3);
        assert!(r.remove_player(conn(5)).is_none());
        r.add_player(conn(1), "a", false);
        r.remove_player(conn(1));
        assert!(r.is_empty());
        assert_eq!(r.current_player_index(), 0);
    }

    #[test]
    fn test_set_ready_toggles_flag() {
        let mut r = room(3, 3);
        r.add_player(conn(1), "a", false);
        assert!(r.set_ready(conn(1), true));
        assert!(r.players()[0].is_ready());
        assert!(!r.set_ready(conn(2), true));
    }

    #[test]
    fn test_summary_and_snapshot_projection() {
        let mut r = room(2, 3);
        r.add_player(conn(1), "a", false);
        r.add_player(conn(2), "s", true);

        let summary = r.summary();
        assert_eq!(summary.active_player_count, 1);
        assert_eq!(summary.spectator_count, 1);
        assert_eq!(summary.state, GameStatus::Lobby);

        let snap = r.snapshot();
        assert_eq!(snap.players.len(), 2);
        assert_eq!((snap.board.rows, snap.board.cols), (2, 3));
        assert!(snap.winner.is_none());
    }
}
