//! Infrastructure traits, used for DI on higher levels

use crate::core::assistant::{HistoryEntry, InlineImage};
use crate::core::catalog::ServiceModel;
use crate::core::traits::TextStream;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model credential is not configured")]
    MissingCredential,
    #[error("request could not be built: {0}")]
    InvalidRequest(String),
    #[error("upstream request failed: {0}")]
    Request(String),
    #[error("upstream answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
    #[error("upstream stream was interrupted: {0}")]
    Interrupted(String),
}

/// The upstream generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Starts a chat turn and yields the reply fragments in the order the
    /// model produces them.
    async fn stream_chat(
        &self,
        system_instruction: &str,
        history: &[HistoryEntry],
        message: &str,
    ) -> Result<TextStream<ModelError>, ModelError>;

    /// Sends one image with an instruction and waits for the whole answer.
    async fn generate_from_image(
        &self,
        system_instruction: &str,
        image: &InlineImage,
        instruction: &str,
    ) -> Result<String, ModelError>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active lash models, oldest first.
    async fn list_active_models(&self) -> Result<Vec<ServiceModel>, ()>;
}
