//! Wire protocol for Chainforge.
//!
//! This crate is the vocabulary shared by the engine, the room registry
//! and the server:
//!
//! - **Identity and views** ([`PlayerId`], [`RoomId`], [`BoardView`],
//!   [`RoomSnapshot`], ...): what a room looks like from the outside.
//! - **Inbound** ([`InboundFrame`], [`Action`]): what a client may ask
//!   for. Frames are decoded leniently and validated into a closed set of
//!   actions, so a malformed request is rejected before dispatch.
//! - **Outbound** ([`Notification`], [`Recipient`]): what the core emits
//!   for the transport to fan out.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) and [`ProtocolError`].
//!
//! ```text
//! Transport (bytes) → Protocol (Action) → Room registry → Notification → Transport
//! ```

mod action;
mod codec;
mod error;
mod notification;
mod types;

pub use action::{Action, InboundFrame, MAX_NAME_CHARS};
pub use chainforge_transport::ConnectionId;
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use notification::{Notification, Recipient};
pub use types::{
    BoardConfig, BoardView, CellView, ExplosionEvent, ExplosionKind, GameStatus, PlayerId,
    PlayerView, RegistryStats, RejectionKind, RoomId, RoomSnapshot, RoomSummary,
};
