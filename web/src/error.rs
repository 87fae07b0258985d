use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use hub::{Error as HubError, ErrorKind as HubErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(HubError);

impl Error {
    pub fn kind(&self) -> &HubErrorKind {
        &self.0.error_kind
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            HubErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
            HubErrorKind::DeliveryFailed => {
                (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
            }
            HubErrorKind::InconsistentState(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<HubError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
