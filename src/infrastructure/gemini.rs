//! Gemini REST adapter for [`GenerativeModel`].
//!
//! Chat turns use `streamGenerateContent` with server-sent events; the
//! consultation uses a single `generateContent` call with the photo inline.

use crate::core::assistant::{HistoryEntry, InlineImage, Role};
use crate::core::traits::TextStream;
use crate::infrastructure::settings::Settings;
use crate::infrastructure::traits::{GenerativeModel, ModelError};
use async_stream::stream;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use futures_util::StreamExt;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    /// Set when the upstream reports a failure inside the event stream.
    #[serde(default)]
    error: Option<UpstreamError>,
}

#[derive(Deserialize, Debug)]
struct UpstreamError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl From<UpstreamError> for ModelError {
    fn from(e: UpstreamError) -> Self {
        ModelError::Status {
            status: e.code,
            body: format!("{}: {}", e.status, e.message),
        }
    }
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl Content {
    fn text(role: Option<Role>, text: &str) -> Self {
        Content {
            role: role.map(|r| r.as_str().to_owned()),
            parts: vec![Part {
                text: Some(text.to_owned()),
                inline_data: None,
            }],
        }
    }
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Splits a byte stream of server-sent events into `data:` payloads,
/// tolerating events that span several network chunks.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(payload) = Self::data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Whatever is left once the upstream closes the stream.
    fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        Self::data_payload(&rest)
    }

    fn data_payload(line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        line.strip_prefix("data:")
            .map(str::trim_start)
            .filter(|payload| !payload.is_empty())
            .map(str::to_owned)
    }
}

fn fragment_from_payload(payload: &str) -> Result<Option<String>, ModelError> {
    let mut chunk: GenerateResponse = serde_json::from_str(payload)
        .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
    if let Some(e) = chunk.error.take() {
        return Err(e.into());
    }
    let text = chunk.text();
    Ok((!text.is_empty()).then_some(text))
}

pub struct GeminiModel {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[injectable(GenerativeModel)]
impl GeminiModel {
    #[inject]
    pub fn create(settings: Ref<Settings>) -> GeminiModel {
        Self::new(&settings)
    }
}

impl GeminiModel {
    pub fn new(settings: &Settings) -> Self {
        info!(
            "Gemini model: {} (credential configured: {})",
            settings.model,
            settings.has_credential()
        );

        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.api_base_url.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, ModelError> {
        self.api_key.as_deref().ok_or(ModelError::MissingCredential)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    async fn post(
        &self,
        url: String,
        api_key: &str,
        body: &GenerateRequest,
    ) -> Result<reqwest::Response, ModelError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn stream_chat(
        &self,
        system_instruction: &str,
        history: &[HistoryEntry],
        message: &str,
    ) -> Result<TextStream<ModelError>, ModelError> {
        let api_key = self.api_key()?;

        let mut contents: Vec<Content> = history
            .iter()
            .map(|entry| Content::text(Some(entry.role), &entry.text))
            .collect();
        contents.push(Content::text(Some(Role::User), message));

        let request = GenerateRequest {
            system_instruction: Content::text(None, system_instruction),
            contents,
        };

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(url, api_key, &request).await?;
        debug!("chat stream opened");

        let mut bytes = response.bytes_stream();
        let fragments = stream! {
            let mut decoder = SseDecoder::default();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        error!("chat stream interrupted: {e}");
                        yield Err(ModelError::Interrupted(e.to_string()));
                        return;
                    }
                };

                for payload in decoder.push(&chunk) {
                    match fragment_from_payload(&payload) {
                        Ok(Some(fragment)) => yield Ok(fragment),
                        Ok(None) => {}
                        Err(e) => {
                            error!("chat stream failed upstream: {e}");
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            if let Some(payload) = decoder.finish() {
                match fragment_from_payload(&payload) {
                    Ok(Some(fragment)) => yield Ok(fragment),
                    Ok(None) => {}
                    Err(e) => {
                        error!("chat stream failed upstream: {e}");
                        yield Err(e);
                    }
                }
            }
        };

        Ok(Box::pin(fragments))
    }

    async fn generate_from_image(
        &self,
        system_instruction: &str,
        image: &InlineImage,
        instruction: &str,
    ) -> Result<String, ModelError> {
        let api_key = self.api_key()?;

        let request = GenerateRequest {
            system_instruction: Content::text(None, system_instruction),
            contents: vec![Content {
                role: Some(Role::User.as_str().to_owned()),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        }),
                    },
                    Part {
                        text: Some(instruction.to_owned()),
                        inline_data: None,
                    },
                ],
            }],
        };

        let response = self
            .post(self.endpoint("generateContent"), api_key, &request)
            .await?;
        let response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        if let Some(e) = response.error {
            return Err(e.into());
        }

        Ok(response.text())
    }
}
