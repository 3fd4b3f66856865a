//! Roster entries.

use chainforge_protocol::{ConnectionId, PlayerId, PlayerView};

/// Colours handed to non-spectators in join order. Ten entries, one per
/// seat at the default room cap.
pub const PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#DDA0DD", "#FF8C00", "#9370DB",
    "#20B2AA", "#FF69B4",
];

/// A participant in one room.
///
/// The id is random and fixed for the player's lifetime; the connection
/// is only used to find the player again when that connection acts or
/// disconnects.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    connection: ConnectionId,
    name: String,
    is_spectator: bool,
    color: Option<&'static str>,
    is_eliminated: bool,
    is_ready: bool,
}

impl Player {
    pub fn new(connection: ConnectionId, name: impl Into<String>, is_spectator: bool) -> Self {
        Self {
            id: PlayerId(rand::random()),
            connection,
            name: name.into(),
            is_spectator,
            color: None,
            is_eliminated: false,
            is_ready: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_spectator(&self) -> bool {
        self.is_spectator
    }

    pub fn color(&self) -> Option<&'static str> {
        self.color
    }

    pub fn is_eliminated(&self) -> bool {
        self.is_eliminated
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Neither a spectator nor eliminated.
    pub fn is_active(&self) -> bool {
        !self.is_spectator && !self.is_eliminated
    }

    pub(crate) fn set_color(&mut self, color: &'static str) {
        self.color = Some(color);
    }

    pub(crate) fn eliminate(&mut self) {
        self.is_eliminated = true;
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.is_ready = ready;
    }

    /// Clears per-game status at the start of a game.
    pub fn reset(&mut self) {
        self.is_eliminated = false;
        self.is_ready = false;
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            is_spectator: self.is_spectator,
            color: self.color.map(str::to_owned),
            is_eliminated: self.is_eliminated,
            is_ready: self.is_ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_active_and_uncoloured() {
        let p = Player::new(ConnectionId::new(1), "alice", false);
        assert!(p.is_active());
        assert!(p.color().is_none());
        assert_eq!(p.name(), "alice");
    }

    #[test]
    fn test_spectator_is_never_active() {
        let p = Player::new(ConnectionId::new(1), "eve", true);
        assert!(!p.is_active());
    }

    #[test]
    fn test_reset_clears_per_game_flags() {
        let mut p = Player::new(ConnectionId::new(1), "bob", false);
        p.eliminate();
        p.set_ready(true);
        assert!(!p.is_active());

        p.reset();
        assert!(p.is_active());
        assert!(!p.is_ready());
    }

    #[test]
    fn test_ids_differ_between_players() {
        let a = Player::new(ConnectionId::new(1), "a", false);
        let b = Player::new(ConnectionId::new(1), "b", false);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_palette_entries_are_distinct() {
        let mut colours = PALETTE.to_vec();
        colours.sort_unstable();
        colours.dedup();
        assert_eq!(colours.len(), PALETTE.len());
    }

    #[test]
    fn test_view_carries_colour_as_string() {
        let mut p = Player::new(ConnectionId::new(3), "c", false);
        p.set_color(PALETTE[2]);
        let view = p.view();
        assert_eq!(view.color.as_deref(), Some("#45B7D1"));
        assert_eq!(view.id, p.id());
    }
}
