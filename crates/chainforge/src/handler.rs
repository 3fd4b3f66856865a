//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the registry
//!   2. Loop: decode and submit client frames, and write out whatever the
//!      registry pushes to this connection
//!   3. On exit, for whatever reason, tell the registry the connection is
//!      gone

use std::sync::Arc;

use chainforge_protocol::{Action, Codec, ConnectionId, InboundFrame, Notification, ProtocolError};
use chainforge_room::RegistryHandle;
use chainforge_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ChainforgeError;
use crate::server::ServerState;

/// Drop guard that removes the connection from its rooms when the handler
/// exits.
///
/// Runs even if the handler returns early with an error. Since `Drop` is
/// synchronous, the disconnect is sent from a fire-and-forget task.
struct DisconnectGuard {
    connection: ConnectionId,
    registry: RegistryHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let connection = self.connection;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            let _ = registry.disconnect(connection).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ChainforgeError> {
    let connection = conn.id();
    tracing::debug!(%connection, "handling new connection");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    state.registry.connect(connection, outbound_tx).await?;
    let _guard = DisconnectGuard {
        connection,
        registry: state.registry.clone(),
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => handle_frame(&conn, &state, &data).await?,
                Ok(None) => {
                    tracing::debug!(%connection, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%connection, error = %e, "recv error");
                    break;
                }
            },
            outbound = outbound_rx.recv() => {
                let Some(notification) = outbound else {
                    tracing::debug!(%connection, "registry stopped, closing");
                    let _ = conn.close().await;
                    break;
                };
                send_notification(&conn, &state.codec, &notification).await?;
            }
        }
    }

    // _guard drops here → disconnect fires.
    Ok(())
}

/// Decodes one client frame and hands the action to the registry.
///
/// Frames that do not decode or validate never reach the registry: the
/// rejection is answered from here.
async fn handle_frame<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    data: &[u8],
) -> Result<(), ChainforgeError> {
    match decode_action(&state.codec, data) {
        Ok(action) => {
            tracing::trace!(connection = %conn.id(), action = action.name(), "submitting action");
            state.registry.submit(conn.id(), action).await?;
        }
        Err(e) => {
            tracing::debug!(connection = %conn.id(), error = %e, "rejecting malformed frame");
            let rejection = Notification::rejected(e.kind(), &e);
            send_notification(conn, &state.codec, &rejection).await?;
        }
    }
    Ok(())
}

fn decode_action(codec: &impl Codec, data: &[u8]) -> Result<Action, ProtocolError> {
    codec.decode::<InboundFrame>(data)?.into_action()
}

async fn send_notification(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    notification: &Notification,
) -> Result<(), ChainforgeError> {
    let bytes = codec.encode(notification)?;
    conn.send(&bytes).await?;
    Ok(())
}
