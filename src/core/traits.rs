//! DI "Interfaces"

use crate::core::assistant::{HistoryEntry, InlineImage};
use crate::core::catalog::ServiceModel;
use crate::core::chat::RelayError;
use crate::infrastructure::traits::ModelError;
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

/// Ordered text fragments of one streamed reply.
pub type TextStream<E> = Pin<Box<dyn Stream<Item = Result<String, E>> + Send>>;

#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Continues a conversation with the studio persona.
    ///
    /// Returns `Err` before any fragment is produced if the turn cannot be
    /// started at all (missing credential, upstream refused the request).
    async fn send_chat(
        &self,
        history: Vec<HistoryEntry>,
        message: String,
    ) -> Result<TextStream<ModelError>, ModelError>;

    /// Produces the style consultation for one photo.
    async fn analyze_image(&self, image: InlineImage) -> Result<String, ModelError>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Lists the studio's lash models, never empty.
    async fn list_models(&self) -> Vec<ServiceModel>;

    /// Models that can be chosen in the booking wizard.
    async fn bookable_models(&self) -> Vec<ServiceModel> {
        self.list_models()
            .await
            .into_iter()
            .filter(ServiceModel::is_bookable)
            .collect()
    }
}

/// Client-side transport to the chat relay endpoint.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    async fn open_stream(
        &self,
        history: Vec<HistoryEntry>,
        message: String,
    ) -> Result<TextStream<RelayError>, RelayError>;
}
