//! Implementations for the service the app needs.
//!

use crate::core::assistant::{
    CONSULTANCY_INSTRUCTION, EMPTY_ANALYSIS_FALLBACK, HistoryEntry, InlineImage, Personas,
};
use crate::core::catalog::{ServiceModel, fallback_models};
use crate::core::traits::{AssistantService, CatalogService, TextStream};
use crate::infrastructure::traits::{CatalogRepository, GenerativeModel, ModelError};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::{debug, warn};

#[injectable(CatalogService)]
pub struct StudioCatalog {
    repo: Ref<dyn CatalogRepository>,
}

#[async_trait]
impl CatalogService for StudioCatalog {
    async fn list_models(&self) -> Vec<ServiceModel> {
        match self.repo.list_active_models().await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                debug!("catalog store has no active models, using built-in catalog");
                fallback_models()
            }
            Err(()) => {
                warn!("catalog store unavailable, using built-in catalog");
                fallback_models()
            }
        }
    }
}

#[injectable(AssistantService)]
pub struct StudioAssistant {
    model: Ref<dyn GenerativeModel>,
    catalog: Ref<dyn CatalogService>,
}

impl StudioAssistant {
    async fn personas(&self) -> Result<(Personas, Vec<ServiceModel>), ModelError> {
        let personas = Personas::new().map_err(|e| ModelError::InvalidRequest(e.to_string()))?;
        Ok((personas, self.catalog.list_models().await))
    }
}

#[async_trait]
impl AssistantService for StudioAssistant {
    async fn send_chat(
        &self,
        history: Vec<HistoryEntry>,
        message: String,
    ) -> Result<TextStream<ModelError>, ModelError> {
        let (personas, models) = self.personas().await?;
        let instruction = personas
            .chat(&models)
            .map_err(|e| ModelError::InvalidRequest(e.to_string()))?;

        debug!("starting chat turn with {} history entries", history.len());
        self.model
            .stream_chat(&instruction, &history, &message)
            .await
    }

    async fn analyze_image(&self, image: InlineImage) -> Result<String, ModelError> {
        let (personas, models) = self.personas().await?;
        let instruction = personas
            .consultancy(&models)
            .map_err(|e| ModelError::InvalidRequest(e.to_string()))?;

        let analysis = self
            .model
            .generate_from_image(&instruction, &image, CONSULTANCY_INSTRUCTION)
            .await?;

        if analysis.trim().is_empty() {
            warn!("model returned an empty consultation");
            return Ok(EMPTY_ANALYSIS_FALLBACK.to_owned());
        }
        Ok(analysis)
    }
}
