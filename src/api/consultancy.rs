//! Vision consultation endpoint

use crate::api::ApiError;
use crate::core::assistant::InlineImage;
use crate::core::traits::AssistantService;
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/api/consultancy", post(consultancy))
}

async fn consultancy(
    Inject(assistant): Inject<dyn AssistantService>,
    Json(request): Json<schemas::ConsultancyRequest>,
) -> Result<Json<schemas::ConsultancyResult>, ApiError> {
    let image = InlineImage::from_payload(&request.base64_image)?;

    let result = assistant
        .analyze_image(image)
        .await
        .map_err(ApiError::Consultancy)?;

    Ok(Json(schemas::ConsultancyResult { result }))
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ConsultancyRequest {
        pub base64_image: String,
    }

    #[derive(Serialize, Debug)]
    pub struct ConsultancyResult {
        pub result: String,
    }
}
