//! Registry actor: one Tokio task that owns every room.
//!
//! All room mutations go through this task's command channel, so two
//! actions never interleave and a disconnect is fully applied before the
//! next command is looked at. Notifications are pushed straight to
//! per-connection outbound channels registered with
//! [`RegistryHandle::connect`].

use std::collections::HashMap;

use chainforge_protocol::{
    Action, ConnectionId, Notification, Recipient, RegistryStats, RoomId, RoomSnapshot,
    RoomSummary,
};
use tokio::sync::{mpsc, oneshot};

use crate::dispatch::{self, Delivery};
use crate::{RegistryConfig, RoomError, RoomRegistry, SweepScheduler};

/// Channel sender for delivering notifications to one connection.
pub type OutboundSender = mpsc::UnboundedSender<Notification>;

/// Commands sent to the registry actor.
///
/// Actions and disconnects are fire-and-forget: their results arrive as
/// notifications on the connection's outbound channel. Queries carry a
/// reply channel.
enum RegistryCommand {
    Connect {
        connection: ConnectionId,
        sender: OutboundSender,
    },
    Submit {
        connection: ConnectionId,
        action: Action,
    },
    Disconnect {
        connection: ConnectionId,
    },
    ListRooms {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
    Stats {
        reply: oneshot::Sender<RegistryStats>,
    },
    RoomCount {
        reply: oneshot::Sender<usize>,
    },
    Snapshot {
        room_id: RoomId,
        reply: oneshot::Sender<Option<RoomSnapshot>>,
    },
    Shutdown,
}

/// Handle to the running registry actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    async fn send(&self, cmd: RegistryCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| RoomError::Unavailable)
    }

    async fn ask<T>(&self, cmd: impl FnOnce(oneshot::Sender<T>) -> RegistryCommand) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(cmd(reply_tx)).await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Registers where notifications for `connection` should go.
    pub async fn connect(&self, connection: ConnectionId, sender: OutboundSender) -> Result<(), RoomError> {
        self.send(RegistryCommand::Connect { connection, sender }).await
    }

    /// Queues an action. Its outcome arrives on the outbound channel.
    pub async fn submit(&self, connection: ConnectionId, action: Action) -> Result<(), RoomError> {
        self.send(RegistryCommand::Submit { connection, action }).await
    }

    /// Removes the connection from every room and forgets its channel.
    pub async fn disconnect(&self, connection: ConnectionId) -> Result<(), RoomError> {
        self.send(RegistryCommand::Disconnect { connection }).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RoomError> {
        self.ask(|reply| RegistryCommand::ListRooms { reply }).await
    }

    pub async fn stats(&self) -> Result<RegistryStats, RoomError> {
        self.ask(|reply| RegistryCommand::Stats { reply }).await
    }

    pub async fn room_count(&self) -> Result<usize, RoomError> {
        self.ask(|reply| RegistryCommand::RoomCount { reply }).await
    }

    pub async fn snapshot(&self, room_id: RoomId) -> Result<Option<RoomSnapshot>, RoomError> {
        self.ask(|reply| RegistryCommand::Snapshot { room_id, reply }).await
    }

    /// Stops sweeping, drops every room and outbound channel, and ends the
    /// actor. Later calls on any handle return `Unavailable`.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RegistryCommand::Shutdown).await
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The actor's state. Lives inside its Tokio task.
struct RegistryActor {
    registry: RoomRegistry,
    senders: HashMap<ConnectionId, OutboundSender>,
    sweeper: SweepScheduler,
    receiver: mpsc::Receiver<RegistryCommand>,
}

impl RegistryActor {
    async fn run(mut self) {
        tracing::info!("room registry started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle(cmd) {
                        break;
                    }
                }
                _ = self.sweeper.wait_for_sweep() => {
                    let removed = self.registry.sweep_empty();
                    self.sweeper.record_sweep(removed.len());
                }
            }
        }

        let metrics = self.sweeper.metrics();
        tracing::info!(
            sweeps = metrics.total_sweeps,
            swept_rooms = metrics.rooms_removed,
            "room registry stopped"
        );
    }

    /// Handles one command. Returns `false` when the actor should stop.
    fn handle(&mut self, cmd: RegistryCommand) -> bool {
        match cmd {
            RegistryCommand::Connect { connection, sender } => {
                tracing::debug!(%connection, "connection registered");
                self.senders.insert(connection, sender);
            }
            RegistryCommand::Submit { connection, action } => {
                let deliveries = dispatch::dispatch(&mut self.registry, connection, action);
                self.deliver(deliveries);
            }
            RegistryCommand::Disconnect { connection } => {
                let deliveries = dispatch::leave(&mut self.registry, connection);
                self.senders.remove(&connection);
                self.deliver(deliveries);
                tracing::debug!(%connection, "connection dropped");
            }
            RegistryCommand::ListRooms { reply } => {
                let _ = reply.send(self.registry.summaries());
            }
            RegistryCommand::Stats { reply } => {
                let _ = reply.send(self.registry.stats());
            }
            RegistryCommand::RoomCount { reply } => {
                let _ = reply.send(self.registry.room_count());
            }
            RegistryCommand::Snapshot { room_id, reply } => {
                let _ = reply.send(self.registry.get(&room_id).map(|room| room.snapshot()));
            }
            RegistryCommand::Shutdown => {
                tracing::info!(rooms = self.registry.room_count(), "room registry shutting down");
                self.sweeper.pause();
                self.registry.clear();
                self.senders.clear();
                return false;
            }
        }
        true
    }

    /// Resolves recipients and pushes each notification out.
    fn deliver(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, notification } in deliveries {
            match to {
                Recipient::Room(room_id) => {
                    let Some(room) = self.registry.get(&room_id) else {
                        continue;
                    };
                    for connection in room.connections() {
                        self.send_to(connection, notification.clone());
                    }
                }
                Recipient::Connection(connection) => self.send_to(connection, notification),
            }
        }
    }

    /// Silently drops the notification if the connection has gone.
    fn send_to(&self, connection: ConnectionId, notification: Notification) {
        if let Some(sender) = self.senders.get(&connection) {
            let _ = sender.send(notification);
        }
    }
}

/// Spawns the registry actor and returns a handle to it.
///
/// `config.channel_size` bounds the command queue; callers wait when it
/// is full.
pub fn spawn_registry(config: RegistryConfig) -> RegistryHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RegistryActor {
        sweeper: SweepScheduler::new(config.sweep.clone()),
        registry: RoomRegistry::new(config),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RegistryHandle { sender: tx }
}
