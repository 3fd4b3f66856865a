//! # Chainforge
//!
//! Multiplayer chain-reaction board game server.
//!
//! Players join named rooms over a WebSocket, take turns dropping tokens
//! onto a grid, and overloaded cells burst into their neighbours,
//! capturing them. The last player with tokens on the board wins.
//!
//! This crate wires the layers together:
//!
//! - `chainforge-transport`: WebSocket connections
//! - `chainforge-protocol`: inbound frames, outbound notifications, codecs
//! - `chainforge-engine`: board, chain reactions, turn order
//! - `chainforge-room`: the room registry actor
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chainforge::prelude::*;
//!
//! # async fn example() -> Result<(), ChainforgeError> {
//! let server = ChainforgeServer::builder()
//!     .config(ServerConfig::from_env())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_BIND_ADDR, ServerConfig};
pub use error::ChainforgeError;
pub use server::{ChainforgeServer, ChainforgeServerBuilder};

pub mod prelude {
    pub use crate::{ChainforgeError, ChainforgeServer, ChainforgeServerBuilder, ServerConfig};
    pub use chainforge_protocol::{
        Action, BoardConfig, Codec, GameStatus, InboundFrame, JsonCodec, Notification, PlayerId,
        RejectionKind, RoomId,
    };
    pub use chainforge_room::{RegistryConfig, RegistryHandle, SweepConfig};
}
