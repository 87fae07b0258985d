use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use log::*;
use std::collections::HashMap;

use crate::ws::connection;
use crate::AppState;

/// GET <hub_path>?username=<name>
/// Upgrades to a WebSocket and hands the socket to a connection task.
/// A missing or blank name is still accepted; the hub just won't announce it.
pub(crate) async fn hub_handler(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let participant_name = params
        .get(app_state.config.username_param())
        .cloned()
        .unwrap_or_default();

    debug!("Upgrading hub connection for {participant_name:?}");

    ws.on_upgrade(move |socket| connection::run_connection(socket, app_state, participant_name))
}
