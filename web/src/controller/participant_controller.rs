use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hub::Error as HubError;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Participant {
    pub name: String,
    pub connection_id: String,
}

/// GET the roster of connected participants, in join order
#[utoipa::path(
    get,
    path = "/participants",
    responses(
        (status = 200, description = "Successfully retrieved the current roster", body = [String]),
    )
)]
pub async fn index(State(app_state): State<AppState>) -> impl IntoResponse {
    let names = app_state.chat.registry().snapshot();

    debug!("Roster has {} participant(s)", names.len());

    Json(ApiResponse::new(StatusCode::OK.into(), names))
}

/// GET the connection a private message to `name` would be delivered to
#[utoipa::path(
    get,
    path = "/participants/{name}",
    params(
        ("name" = String, Path, description = "Participant display name"),
    ),
    responses(
        (status = 200, description = "Participant is online", body = Participant),
        (status = 404, description = "Participant is not connected"),
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let connection_id = app_state
        .chat
        .registry()
        .find_connection_by_name(&name)
        .ok_or_else(HubError::not_found)?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        Participant {
            name,
            connection_id: connection_id.to_string(),
        },
    )))
}
