//! Room management for Chainforge.
//!
//! A single registry actor owns every [`GameRoom`](chainforge_engine::GameRoom)
//! and applies actions one at a time, so room state never sees two
//! mutations at once and needs no locks.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: room lookup, creation, empty-room sweep and statistics
//! - [`dispatch()`]: one action in, the notifications it causes out
//! - [`RegistryHandle`]: send commands to the running registry actor
//! - [`SweepScheduler`]: decides when the periodic sweep is due
//! - [`RegistryConfig`]: seat limit, default board, sweep interval

mod actor;
mod config;
mod dispatch;
mod error;
mod registry;
mod sweep;

pub use actor::{OutboundSender, RegistryHandle, spawn_registry};
pub use config::{RegistryConfig, SweepConfig};
pub use dispatch::{Delivery, dispatch, leave};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use sweep::{SweepMetrics, SweepScheduler};
