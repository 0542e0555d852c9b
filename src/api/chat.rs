//! Streaming chat relay

use crate::api::ApiError;
use crate::core::traits::AssistantService;
use async_stream::stream;
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;
use futures_util::StreamExt;
use log::{error, info};

pub fn router() -> Router {
    Router::new().route("/api/chat", post(chat))
}

/// Relays every model fragment to the response body as soon as it arrives.
/// A failure after the first byte can only abort the body.
async fn chat(
    Inject(assistant): Inject<dyn AssistantService>,
    Json(request): Json<schemas::ChatRequest>,
) -> Result<Response, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let mut fragments = assistant
        .send_chat(request.history, request.message)
        .await
        .map_err(ApiError::Chat)?;

    let body = stream! {
        let mut relayed = 0usize;
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => {
                    relayed += fragment.len();
                    yield Ok(fragment);
                }
                Err(e) => {
                    error!("API chat error after {relayed} bytes: {e}");
                    yield Err(e);
                    return;
                }
            }
        }
        info!("chat reply relayed ({relayed} bytes)");
    };

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}

pub mod schemas {
    use crate::core::assistant::HistoryEntry;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct ChatRequest {
        #[serde(default)]
        pub history: Vec<HistoryEntry>,
        pub message: String,
    }
}
