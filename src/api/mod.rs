use crate::core::assistant::ImageError;
use crate::infrastructure::traits::ModelError;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

pub mod catalog;
pub mod chat;
pub mod consultancy;

const SERVICE_UNAVAILABLE: &str = "Service unavailable.";
const CHAT_FAILED: &str = "Error processing chat request.";
const CONSULTANCY_FAILED: &str = "Error processing image analysis.";

/// All `/api` routes.
pub fn router() -> Router {
    Router::new()
        .merge(chat::router())
        .merge(consultancy::router())
        .merge(catalog::router())
}

/// Errors leaving a handler. Upstream detail is logged here and never sent to
/// the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    InvalidImage(#[from] ImageError),
    #[error("chat request failed: {0}")]
    Chat(ModelError),
    #[error("image analysis failed: {0}")]
    Consultancy(ModelError),
}

impl ApiError {
    fn upstream(&self) -> Option<&ModelError> {
        match self {
            ApiError::Chat(e) | ApiError::Consultancy(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(ModelError::MissingCredential) = self.upstream() {
            error!("{self}");
            return (StatusCode::INTERNAL_SERVER_ERROR, SERVICE_UNAVAILABLE).into_response();
        }

        match self {
            ApiError::EmptyMessage => {
                (StatusCode::BAD_REQUEST, "Message must not be empty.").into_response()
            }
            ApiError::InvalidImage(_) => {
                (StatusCode::BAD_REQUEST, "Invalid image payload.").into_response()
            }
            ApiError::Chat(e) => {
                error!("API chat error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, CHAT_FAILED).into_response()
            }
            ApiError::Consultancy(e) => {
                error!("API consultancy error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, CONSULTANCY_FAILED).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_generic() {
        let response = ApiError::Consultancy(ModelError::MissingCredential).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_errors_are_bad_request() {
        assert_eq!(
            ApiError::EmptyMessage.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ImageError::Empty).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
