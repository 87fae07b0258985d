use crate::controller::{health_check_controller, participant_controller};
use crate::ws::handler::hub_handler;
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
// The hub WebSocket route is not HTTP request/response and isn't listed.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Chat Hub API"
        ),
        paths(
            health_check_controller::health_check,
            participant_controller::index,
            participant_controller::read,
        ),
        components(
            schemas(
                participant_controller::Participant,
            )
        ),
        tags(
            (name = "chathub", description = "Real-time chat hub")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(participant_routes(app_state.clone()))
        .merge(hub_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn participant_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/participants", get(participant_controller::index))
        .route("/participants/:name", get(participant_controller::read))
        .with_state(app_state)
}

fn hub_routes(app_state: AppState) -> Router {
    let hub_path = app_state.config.hub_path().to_string();
    Router::new()
        .route(&hub_path, get(hub_handler))
        .with_state(app_state)
}
