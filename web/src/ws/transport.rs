use dashmap::DashMap;
use hub::{ConnectionId, Error, Message, Transport};
use log::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Transport backed by one unbounded channel per WebSocket connection.
///
/// Sending is a non-blocking enqueue; each connection's writer task drains its
/// channel in order, which gives per-connection ordering for free.
#[derive(Default)]
pub struct ChannelTransport {
    senders: DashMap<ConnectionId, UnboundedSender<Message>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the outbound channel for a new connection.
    pub fn attach(&self, connection_id: ConnectionId) -> UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.senders.insert(connection_id.clone(), tx).is_some() {
            warn!("Replaced outbound channel for connection {connection_id}");
        }
        rx
    }

    /// Drop the outbound channel for a closed connection.
    pub fn detach(&self, connection_id: &ConnectionId) {
        self.senders.remove(connection_id);
    }

    pub fn is_attached(&self, connection_id: &ConnectionId) -> bool {
        self.senders.contains_key(connection_id)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, connection_id: &ConnectionId, message: &Message) -> Result<(), Error> {
        let sender = self
            .senders
            .get(connection_id)
            .ok_or_else(|| Error::delivery_failed(format!("no channel for {connection_id}")))?;

        sender
            .send(message.clone())
            .map_err(|e| Error::delivery_failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(name: &str) -> Message {
        Message::PresenceJoined {
            sender_name: name.to_string(),
        }
    }

    #[test]
    fn send_preserves_order_per_connection() {
        let transport = ChannelTransport::new();
        let mut rx = transport.attach("a".into());

        transport.send(&"a".into(), &joined("Alice")).expect("attached");
        transport.send(&"a".into(), &joined("Bob")).expect("attached");

        assert_eq!(rx.try_recv().ok(), Some(joined("Alice")));
        assert_eq!(rx.try_recv().ok(), Some(joined("Bob")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_to_unknown_connection_fails() {
        let transport = ChannelTransport::new();

        let err = transport
            .send(&"nobody".into(), &joined("Alice"))
            .expect_err("no channel");
        assert!(err.is_delivery_failed());
    }

    #[test]
    fn send_after_receiver_dropped_fails() {
        let transport = ChannelTransport::new();
        let rx = transport.attach("a".into());
        drop(rx);

        let err = transport
            .send(&"a".into(), &joined("Alice"))
            .expect_err("receiver gone");
        assert!(err.is_delivery_failed());
    }

    #[test]
    fn detach_removes_channel() {
        let transport = ChannelTransport::new();
        let _rx = transport.attach("a".into());
        assert!(transport.is_attached(&"a".into()));

        transport.detach(&"a".into());

        assert!(!transport.is_attached(&"a".into()));
        assert!(transport.send(&"a".into(), &joined("Alice")).is_err());
    }
}
