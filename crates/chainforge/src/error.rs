//! Unified error type for the Chainforge server.

use chainforge_protocol::ProtocolError;
use chainforge_room::RoomError;
use chainforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChainforgeError {
    /// Binding, accepting, sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The room registry refused or has stopped.
    #[error(transparent)]
    Room(#[from] RoomError),
}
