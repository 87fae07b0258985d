//! In-process real-time message hub.
//!
//! This crate tracks which participants are connected and routes chat
//! messages between them. It never touches sockets: a transport adapter
//! (see the `web` crate) reports connection lifecycle events and provides a
//! non-blocking send primitive through the [`Transport`] trait.
//!
//! # Architecture
//!
//! - **ConnectionRegistry**: the single source of truth for who is online,
//!   connection id to participant name, with a name index for direct messages.
//! - **Broadcaster**: stateless fan-out. Sends to everyone, to one connection,
//!   or back to the caller; a failed target never aborts the others.
//! - **ChatService**: the observable hub behaviors (presence, public and
//!   private chat, roster) built from the two above.
//!
//! # Delivery semantics
//!
//! - **Ephemeral messages**: nothing is persisted. An offline participant
//!   misses the message.
//! - **Best effort**: delivery failures are logged and dropped, never retried.
//! - **Per-connection ordering**: messages to the same connection arrive in
//!   the order they were issued. Nothing is promised across connections.
//! - **Silent drops**: blank messages and messages to offline participants
//!   have no visible effect for the sender.
//!
//! # Example
//!
//! ```rust,ignore
//! let chat = ChatService::new(transport);
//! chat.on_connect(ConnectionId::from("a"), "Alice");
//! chat.on_connect(ConnectionId::from("b"), "Bob");
//! chat.send_private(&ConnectionId::from("a"), "Bob", "hi")?;
//! ```

pub mod broadcaster;
pub mod chat;
pub mod connection;
pub mod error;
pub mod message;
pub mod transport;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use chat::ChatService;
pub use connection::{ConnectionId, ConnectionRegistry};
pub use error::{Error, ErrorKind};
pub use message::{EventType, Message};
pub use transport::Transport;
