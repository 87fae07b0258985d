use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use hub::{ConnectionId, EventType, Message};
use log::*;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::ws::protocol;
use crate::AppState;

/// How long the writer may keep flushing queued frames after the reader ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Drive one WebSocket connection from open to close.
///
/// Splits the socket into a writer task, which drains the connection's
/// outbound channel, and a reader loop, which dispatches client invocations.
/// The hub only learns about the connection through `on_connect` and
/// `on_disconnect`; the latter runs however the reader loop ends.
pub(crate) async fn run_connection(
    socket: WebSocket,
    app_state: AppState,
    participant_name: String,
) {
    let connection_id = ConnectionId::new();
    let (ws_sender, mut ws_receiver) = socket.split();

    // Attach before announcing so the newcomer sees its own join.
    let rx = app_state.transport.attach(connection_id.clone());
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx, connection_id.clone()));

    app_state.chat.on_connect(connection_id.clone(), &participant_name);

    loop {
        match ws_receiver.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                handle_text(&app_state, &connection_id, &text);
            }
            Some(Ok(WsMessage::Binary(_))) => {
                debug!("Ignoring binary frame from connection {connection_id}");
            }
            Some(Ok(WsMessage::Close(frame))) => {
                debug!("Connection {connection_id} closed by client: {frame:?}");
                break;
            }
            // Pings are answered by axum itself.
            Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
            Some(Err(e)) => {
                warn!("WebSocket receive error on connection {connection_id}: {e}");
                break;
            }
            None => {
                debug!("WebSocket stream ended for connection {connection_id}");
                break;
            }
        }
    }

    app_state.chat.on_disconnect(&connection_id);
    // Dropping the sender lets the writer flush what is queued and then stop.
    app_state.transport.detach(&connection_id);

    finish_writer(writer_handle, &connection_id, WRITER_DRAIN_TIMEOUT).await;
}

/// Wait for the writer to flush and exit, aborting it if the socket stalls.
async fn finish_writer(
    writer_handle: JoinHandle<()>,
    connection_id: &ConnectionId,
    drain_timeout: Duration,
) {
    let abort_handle = writer_handle.abort_handle();
    match tokio::time::timeout(drain_timeout, writer_handle).await {
        Ok(Ok(())) => trace!("Writer for connection {connection_id} drained"),
        Ok(Err(e)) => warn!("Writer task for connection {connection_id} failed: {e}"),
        Err(_) => {
            debug!("Writer for connection {connection_id} still busy, aborting");
            abort_handle.abort();
        }
    }
}

fn handle_text(app_state: &AppState, connection_id: &ConnectionId, text: &str) {
    let call = match protocol::parse_invocation(text) {
        Ok(call) => call,
        Err(e) => {
            warn!("Dropping invocation from connection {connection_id}: {e}");
            return;
        }
    };

    trace!("Connection {connection_id} invoked {call:?}");
    if let Err(e) = protocol::dispatch(&app_state.chat, connection_id, call) {
        // Already logged by the hub; the client gets no feedback.
        debug!("Invocation from connection {connection_id} failed: {e}");
    }
}

/// Forward hub messages to the socket until the channel or the socket closes.
async fn writer_task<S>(
    mut ws_sender: S,
    mut rx: UnboundedReceiver<Message>,
    connection_id: ConnectionId,
) where
    S: Sink<WsMessage> + Unpin,
{
    while let Some(message) = rx.recv().await {
        let frame = match protocol::encode(&message) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} event: {e}", message.event_type());
                continue;
            }
        };

        if ws_sender.send(WsMessage::Text(frame)).await.is_err() {
            debug!("WebSocket send failed, stopping writer for connection {connection_id}");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn joined(name: &str) -> Message {
        Message::PresenceJoined {
            sender_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn writer_flushes_queued_frames_after_channel_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (sink, frames) = futures::channel::mpsc::unbounded::<WsMessage>();
        tx.send(joined("Alice")).unwrap();
        tx.send(joined("Bob")).unwrap();
        drop(tx);

        let writer = tokio::spawn(writer_task(sink, rx, ConnectionId::from("a")));
        finish_writer(writer, &ConnectionId::from("a"), Duration::from_secs(1)).await;

        let frames: Vec<WsMessage> = frames.collect().await;
        assert_eq!(frames.len(), 2);
        assert!(matches!(&frames[1], WsMessage::Text(text) if text.contains("Bob")));
    }

    #[tokio::test]
    async fn stalled_writer_is_aborted_after_timeout() {
        let writer = tokio::spawn(std::future::pending::<()>());
        let abort_handle = writer.abort_handle();

        finish_writer(writer, &ConnectionId::from("a"), Duration::from_millis(20)).await;
        for _ in 0..10 {
            if abort_handle.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(abort_handle.is_finished());
    }
}
