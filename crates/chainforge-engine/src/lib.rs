//! The Chainforge game engine.
//!
//! Players drop tokens on a grid. A cell holds at most `capacity` tokens
//! (2 in a corner, 3 on an edge, 4 inside); once it reaches capacity it
//! explodes, sending one token to each orthogonal neighbour and seizing
//! them for its owner. Explosions cascade. The last player with territory
//! wins.
//!
//! Everything here is synchronous and owns its state outright: a
//! [`GameRoom`] is mutated by one caller at a time and every operation
//! runs to completion. Scheduling and fan-out live in `chainforge-room`.
//!
//! # Key types
//!
//! - [`Board`] / [`Cell`]: the grid, capacities, placement and explosion
//! - [`resolve_chain`]: the chain-reaction loop run after each placement
//! - [`Player`]: roster entry with colour, elimination and readiness
//! - [`GameRoom`]: roster, turn order and the lobby → playing → finished machine
//! - [`GameError`]: every way an engine call can be refused

mod board;
mod error;
mod game;
mod player;
mod resolve;

pub use board::{Board, Cell, Position};
pub use error::{GameError, NotExplodable};
pub use game::{GameOutcome, GameRoom, OPENING_TOKENS, TurnReport};
pub use player::{PALETTE, Player};
pub use resolve::resolve_chain;
