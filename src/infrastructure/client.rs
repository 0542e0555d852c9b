//! HTTP client for the studio API, used by front-ends and end-to-end tests.

use crate::core::assistant::{EMPTY_ANALYSIS_FALLBACK, HistoryEntry};
use crate::core::chat::RelayError;
use crate::core::traits::{ChatRelay, TextStream};
use async_stream::stream;
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, error};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatBody<'a> {
    history: &'a [HistoryEntry],
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsultancyBody<'a> {
    base64_image: &'a str,
}

#[derive(Deserialize)]
struct ConsultancyAnswer {
    #[serde(default)]
    result: String,
}

/// Turns a chunked byte stream into text without splitting characters.
///
/// A multi-byte sequence cut by a chunk boundary is held back until the rest
/// arrives; bytes that can never form a character become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
                    match e.error_len() {
                        Some(invalid) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + invalid);
                        }
                        None => {
                            self.pending.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }
        text
    }

    /// Flushes an incomplete trailing sequence once the stream has ended.
    pub fn finish(&mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

#[derive(Clone)]
pub struct StudioApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl StudioApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, RelayError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Asks for a style consultation on one photo (raw base64 or data URL).
    pub async fn analyze_image(&self, base64_image: &str) -> Result<String, RelayError> {
        let response = self
            .post("/api/consultancy", &ConsultancyBody { base64_image })
            .await?;

        let answer: ConsultancyAnswer = response
            .json()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if answer.result.trim().is_empty() {
            return Ok(EMPTY_ANALYSIS_FALLBACK.to_owned());
        }
        Ok(answer.result)
    }
}

#[async_trait]
impl ChatRelay for StudioApiClient {
    async fn open_stream(
        &self,
        history: Vec<HistoryEntry>,
        message: String,
    ) -> Result<TextStream<RelayError>, RelayError> {
        let response = self
            .post(
                "/api/chat",
                &ChatBody {
                    history: &history,
                    message: &message,
                },
            )
            .await?;
        debug!("chat relay stream opened");

        let mut bytes = response.bytes_stream();
        let fragments = stream! {
            let mut decoder = Utf8StreamDecoder::default();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        let text = decoder.push(&chunk);
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Err(e) => {
                        error!("chat relay stream interrupted: {e}");
                        yield Err(RelayError::Interrupted(e.to_string()));
                        return;
                    }
                }
            }

            let rest = decoder.finish();
            if !rest.is_empty() {
                yield Ok(rest);
            }
        };

        Ok(Box::pin(fragments))
    }
}
