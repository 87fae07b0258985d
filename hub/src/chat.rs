use crate::broadcaster::Broadcaster;
use crate::connection::{ConnectionId, ConnectionRegistry, ParticipantName};
use crate::error::Error;
use crate::message::Message;
use crate::transport::Transport;
use log::*;
use std::sync::Arc;

/// Sender label used when a connection without a registered name sends publicly.
pub const ANONYMOUS: &str = "Anonymous";

/// The hub behaviors clients observe: presence, public and private chat, roster.
///
/// Holds no state beyond the shared registry. Every operation is a registry
/// call followed by fire-and-forget sends, so it is safe to call from any
/// number of connection tasks at once.
#[derive(Clone)]
pub struct ChatService {
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl ChatService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry), transport);
        Self {
            registry,
            broadcaster,
        }
    }

    /// Read-only access for diagnostics.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Register a newly opened connection and announce it to everyone.
    /// Connections without a usable name stay connected but are left out of presence.
    pub fn on_connect(&self, connection_id: ConnectionId, participant_name: &str) {
        let participant_name = participant_name.trim();
        if participant_name.is_empty() {
            debug!("Connection {connection_id} opened without a name, not registering");
            return;
        }

        info!("{participant_name} connected on {connection_id}");
        self.registry.add(connection_id, participant_name.to_string());
        self.broadcaster.send_to_all(&Message::PresenceJoined {
            sender_name: participant_name.to_string(),
        });
    }

    /// Forget a closed connection. Unknown or repeated disconnects are ignored.
    pub fn on_disconnect(&self, connection_id: &ConnectionId) {
        match self.registry.remove(connection_id) {
            Some(participant_name) => {
                info!("{participant_name} disconnected from {connection_id}");
                self.broadcaster.send_to_all(&Message::PresenceLeft {
                    sender_name: participant_name,
                });
            }
            None => {
                debug!("Disconnect for unregistered connection {connection_id}, ignoring");
            }
        }
    }

    /// Broadcast a chat line under a client-supplied sender name.
    pub fn send_public(&self, sender_name: &str, body: &str) {
        if body.trim().is_empty() {
            return;
        }

        self.broadcaster.send_to_all(&Message::PublicChat {
            sender_name: sender_name.to_string(),
            body: body.to_string(),
        });
    }

    /// Broadcast a chat line with the sender taken from the registry.
    pub fn send_from_connection(&self, connection_id: &ConnectionId, body: &str) {
        let sender_name = self
            .registry
            .lookup(connection_id)
            .unwrap_or_else(|| ANONYMOUS.to_string());
        self.send_public(&sender_name, body);
    }

    /// Deliver a direct message to the first connection registered as `target_name`,
    /// then echo it back to the sender as confirmation.
    ///
    /// An offline target is dropped silently. The only error is an origin that
    /// isn't registered, which means the transport and the hub disagree.
    pub fn send_private(
        &self,
        origin_connection_id: &ConnectionId,
        target_name: &str,
        body: &str,
    ) -> Result<(), Error> {
        if target_name.trim().is_empty() || body.trim().is_empty() {
            return Ok(());
        }

        let origin_name = self.origin_name(origin_connection_id)?;

        let Some(target_connection_id) = self.registry.find_connection_by_name(target_name)
        else {
            debug!("Private message from {origin_name} to offline {target_name} dropped");
            return Ok(());
        };

        let delivered = self.broadcaster.send_to_connection(
            &target_connection_id,
            &Message::PrivateChat {
                sender_name: origin_name,
                body: body.to_string(),
            },
        );
        if delivered.is_err() {
            // Target vanished between lookup and send; nothing to confirm.
            return Ok(());
        }

        // The sender may have disconnected meanwhile; the echo is best-effort.
        let _ = self.broadcaster.send_to_caller(
            origin_connection_id,
            &Message::PrivateChat {
                sender_name: Message::private_echo_label(target_name),
                body: body.to_string(),
            },
        );
        Ok(())
    }

    /// Private "wink" at another participant.
    /// A blank target is a no-op even when the origin isn't registered.
    pub fn send_wink(
        &self,
        origin_connection_id: &ConnectionId,
        target_name: &str,
    ) -> Result<(), Error> {
        if target_name.trim().is_empty() {
            return Ok(());
        }

        let origin_name = self.origin_name(origin_connection_id)?;
        self.send_private(
            origin_connection_id,
            target_name,
            &format!("⚠️ {origin_name} winks you! 😉"),
        )
    }

    /// Send the current roster to the requesting connection and return it.
    pub fn list_participants(
        &self,
        requesting_connection_id: &ConnectionId,
    ) -> Vec<ParticipantName> {
        let names = self.registry.snapshot();
        let _ = self.broadcaster.send_to_caller(
            requesting_connection_id,
            &Message::RosterSnapshot {
                names: names.clone(),
            },
        );
        names
    }

    fn origin_name(&self, origin_connection_id: &ConnectionId) -> Result<ParticipantName, Error> {
        self.registry.lookup(origin_connection_id).ok_or_else(|| {
            let err = Error::inconsistent_state(format!(
                "private send from unregistered connection {origin_connection_id}"
            ));
            error!("{err}");
            err
        })
    }
}
