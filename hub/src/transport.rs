use crate::connection::ConnectionId;
use crate::error::Error;
use crate::message::Message;

/// The one primitive the hub needs from a transport.
///
/// Implementations must be callable from any connection's task and must not
/// block: enqueue the message and return. Messages sent to the same
/// connection must reach it in the order `send` was called.
pub trait Transport: Send + Sync {
    /// Hand `message` to the transport for `connection_id`.
    /// Returns an error of kind `DeliveryFailed` when the connection is gone.
    fn send(&self, connection_id: &ConnectionId, message: &Message) -> Result<(), Error>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory transport that records every delivery in issue order.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        deliveries: Mutex<Vec<(ConnectionId, Message)>>,
        dead: Mutex<HashSet<ConnectionId>>,
    }

    impl RecordingTransport {
        /// Make every later send to `connection_id` fail.
        pub(crate) fn kill(&self, connection_id: &str) {
            self.dead
                .lock()
                .expect("dead set lock poisoned")
                .insert(ConnectionId::from(connection_id));
        }

        pub(crate) fn deliveries(&self) -> Vec<(ConnectionId, Message)> {
            self.deliveries
                .lock()
                .expect("deliveries lock poisoned")
                .clone()
        }

        /// Messages received by one connection, in order.
        pub(crate) fn received_by(&self, connection_id: &str) -> Vec<Message> {
            self.deliveries()
                .into_iter()
                .filter(|(id, _)| id.as_str() == connection_id)
                .map(|(_, message)| message)
                .collect()
        }

        pub(crate) fn clear(&self) {
            self.deliveries
                .lock()
                .expect("deliveries lock poisoned")
                .clear();
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, connection_id: &ConnectionId, message: &Message) -> Result<(), Error> {
            if self
                .dead
                .lock()
                .expect("dead set lock poisoned")
                .contains(connection_id)
            {
                return Err(Error::delivery_failed(format!(
                    "connection {connection_id} is closed"
                )));
            }
            self.deliveries
                .lock()
                .expect("deliveries lock poisoned")
                .push((connection_id.clone(), message.clone()));
            Ok(())
        }
    }
}
