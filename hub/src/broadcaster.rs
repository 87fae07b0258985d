use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::error::Error;
use crate::message::{EventType, Message};
use crate::transport::Transport;
use log::*;
use std::sync::Arc;

/// Outcome of a fan-out. Callers are free to ignore it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fan-out engine. Holds no state of its own: every send resolves its targets
/// from the registry at the moment of the call and hands them to the transport.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    transport: Arc<dyn Transport>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Broadcast to every registered connection - O(n).
    /// A failed target is logged and skipped; it never stops the others.
    pub fn send_to_all(&self, message: &Message) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for connection_id in self.registry.connection_ids() {
            match self.transport.send(&connection_id, message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        "Failed to broadcast {} to connection {}: {}",
                        message.event_type(),
                        connection_id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        trace!(
            "Broadcast {} to {} connection(s), {} failed",
            message.event_type(),
            report.delivered,
            report.failed
        );
        report
    }

    /// Send to exactly one connection.
    pub fn send_to_connection(
        &self,
        connection_id: &ConnectionId,
        message: &Message,
    ) -> Result<(), Error> {
        self.transport.send(connection_id, message).map_err(|e| {
            warn!(
                "Failed to send {} to connection {}: {}",
                message.event_type(),
                connection_id,
                e
            );
            e
        })
    }

    /// Send back to the connection that originated the current operation.
    pub fn send_to_caller(
        &self,
        connection_id: &ConnectionId,
        message: &Message,
    ) -> Result<(), Error> {
        self.send_to_connection(connection_id, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::RecordingTransport;

    fn joined(name: &str) -> Message {
        Message::PresenceJoined {
            sender_name: name.to_string(),
        }
    }

    fn setup() -> (Arc<ConnectionRegistry>, Arc<RecordingTransport>, Broadcaster) {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(RecordingTransport::default());
        let broadcaster = Broadcaster::new(Arc::clone(&registry), transport.clone());
        (registry, transport, broadcaster)
    }

    #[test]
    fn send_to_all_reaches_every_registered_connection() {
        let (registry, transport, broadcaster) = setup();
        registry.add("a".into(), "Alice".to_string());
        registry.add("b".into(), "Bob".to_string());

        let report = broadcaster.send_to_all(&joined("Carol"));

        assert_eq!(
            report,
            BroadcastReport {
                delivered: 2,
                failed: 0
            }
        );
        assert_eq!(transport.received_by("a"), vec![joined("Carol")]);
        assert_eq!(transport.received_by("b"), vec![joined("Carol")]);
    }

    #[test]
    fn send_to_all_skips_dead_targets_without_failing() {
        let (registry, transport, broadcaster) = setup();
        registry.add("a".into(), "Alice".to_string());
        registry.add("b".into(), "Bob".to_string());
        registry.add("c".into(), "Carol".to_string());
        transport.kill("b");

        let report = broadcaster.send_to_all(&joined("Dave"));

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(transport.received_by("a").len(), 1);
        assert!(transport.received_by("b").is_empty());
        assert_eq!(transport.received_by("c").len(), 1);
    }

    #[test]
    fn send_to_all_with_empty_registry_sends_nothing() {
        let (_registry, transport, broadcaster) = setup();

        assert_eq!(broadcaster.send_to_all(&joined("Alice")), BroadcastReport::default());
        assert!(transport.deliveries().is_empty());
    }

    #[test]
    fn send_to_connection_reports_delivery_failed() {
        let (_registry, transport, broadcaster) = setup();
        transport.kill("gone");

        let err = broadcaster
            .send_to_connection(&"gone".into(), &joined("Alice"))
            .expect_err("dead connection should fail");

        assert!(err.is_delivery_failed());
        assert!(transport.deliveries().is_empty());
    }

    #[test]
    fn per_target_order_follows_issue_order() {
        let (registry, transport, broadcaster) = setup();
        registry.add("a".into(), "Alice".to_string());

        broadcaster.send_to_all(&joined("Alice"));
        broadcaster
            .send_to_caller(&"a".into(), &joined("Bob"))
            .expect("live connection");
        broadcaster.send_to_all(&joined("Carol"));

        assert_eq!(
            transport.received_by("a"),
            vec![joined("Alice"), joined("Bob"), joined("Carol")]
        );
    }
}
