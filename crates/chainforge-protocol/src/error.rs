//! Error types for the protocol layer.

use crate::RejectionKind;

/// Errors raised while encoding, decoding or validating frames.
///
/// Anything a client sent that cannot be turned into an
/// [`Action`](crate::Action) ends up here and is reported back as a
/// `MissingField` rejection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes were not a frame we understand: bad JSON, an unknown
    /// `type`, or a field of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A required field was absent or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The frame decoded but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// The rejection kind reported to the client for this error.
    pub fn kind(&self) -> RejectionKind {
        RejectionKind::MissingField
    }
}
