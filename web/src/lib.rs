//! HTTP and WebSocket surface of the chat hub.
//!
//! Routes:
//! - `GET /health`: liveness probe
//! - `GET /participants`, `GET /participants/:name`: read-only roster diagnostics
//! - `GET <hub_path>?username=<name>`: WebSocket upgrade into the hub
//! - `GET /rapidoc`: OpenAPI documentation for the HTTP routes

use axum::http::{HeaderValue, Method};
use axum::Router;
use hub::ChatService;
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};
use crate::ws::transport::ChannelTransport;

mod controller;
mod error;
mod router;
pub mod ws;

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub chat: ChatService,
    pub transport: Arc<ChannelTransport>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let transport = Arc::new(ChannelTransport::new());
        let chat = ChatService::new(transport.clone());
        Self {
            config,
            chat,
            transport,
        }
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let server_url = app_state.config.listen_address();
    let listener = TcpListener::bind(&server_url).await?;

    info!(
        "Chat hub listening on {} (hub route {}), runtime env: {}",
        server_url,
        app_state.config.hub_path(),
        app_state.config.runtime_env()
    );

    axum::serve(listener, app(app_state)).await
}

/// The full application router with CORS applied.
pub fn app(app_state: AppState) -> Router {
    let cors_layer = cors_layer(&app_state.config);
    router::define_routes(app_state).layer(cors_layer)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    debug!("CORS allowed origins: {:?}", allowed_origins);

    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(allowed_origins)
}
