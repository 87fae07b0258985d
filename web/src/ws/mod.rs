//! WebSocket transport adapter for the chat hub.
//!
//! The hub core (`hub` crate) never sees sockets. This module owns them:
//! it upgrades HTTP requests, feeds lifecycle events and client invocations
//! into [`hub::ChatService`], and implements [`hub::Transport`] on top of
//! per-connection channels.

pub(crate) mod connection;
pub(crate) mod handler;
pub mod protocol;
pub mod transport;
