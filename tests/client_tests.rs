//! End-to-end tests for the HTTP client
//!
//! Serves the real router on a local port with a stubbed upstream model and
//! talks to it through `StudioApiClient`.

use async_trait::async_trait;
use di::{Injectable, ServiceCollection, inject, injectable};
use di_axum::RouterServiceProviderExtensions;
use lash_studio_api::{
    api,
    core::assistant::{HistoryEntry, InlineImage},
    core::catalog::ServiceModel,
    core::chat::{ChatPhase, ChatSession, RelayError},
    core::services::{StudioAssistant, StudioCatalog},
    core::traits::{ChatRelay, TextStream},
    infrastructure::client::StudioApiClient,
    infrastructure::traits::{CatalogRepository, GenerativeModel, ModelError},
};
use futures_util::StreamExt;

/// Multi-byte characters on purpose, so the client has to reassemble them.
const REPLY: [&str; 3] = ["Olá! ", "Recomendo o Volume Divino ", "💧 efeito molhado."];

struct EchoModel;

#[injectable(GenerativeModel)]
impl EchoModel {
    #[inject]
    pub fn create() -> EchoModel {
        EchoModel
    }
}

#[async_trait]
impl GenerativeModel for EchoModel {
    async fn stream_chat(
        &self,
        _system_instruction: &str,
        history: &[HistoryEntry],
        _message: &str,
    ) -> Result<TextStream<ModelError>, ModelError> {
        let mut fragments: Vec<Result<String, ModelError>> =
            REPLY.iter().map(|f| Ok(f.to_string())).collect();
        fragments.push(Ok(format!(" ({} anteriores)", history.len())));
        Ok(Box::pin(futures_util::stream::iter(fragments)))
    }

    async fn generate_from_image(
        &self,
        _system_instruction: &str,
        _image: &InlineImage,
        _instruction: &str,
    ) -> Result<String, ModelError> {
        Ok("**Análise do Olhar:** redondo".to_owned())
    }
}

struct EmptyStore;

#[injectable(CatalogRepository)]
impl EmptyStore {
    #[inject]
    pub fn create() -> EmptyStore {
        EmptyStore
    }
}

#[async_trait]
impl CatalogRepository for EmptyStore {
    async fn list_active_models(&self) -> Result<Vec<ServiceModel>, ()> {
        Ok(Vec::new())
    }
}

async fn spawn_server() -> StudioApiClient {
    let provider = ServiceCollection::new()
        .add(EchoModel::singleton())
        .add(EmptyStore::scoped())
        .add(StudioCatalog::scoped())
        .add(StudioAssistant::scoped())
        .build_provider()
        .unwrap();

    let app = axum::Router::new()
        .merge(api::router())
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    StudioApiClient::with_client(http, format!("http://{address}"))
}

#[tokio::test]
async fn test_relay_stream_decodes_utf8() {
    let client = spawn_server().await;

    let mut stream = client
        .open_stream(vec![HistoryEntry::user("Oi")], "Sugestão?".into())
        .await
        .unwrap();

    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment.unwrap());
    }

    assert_eq!(text, format!("{} (1 anteriores)", REPLY.concat()));
}

#[tokio::test]
async fn test_chat_session_over_http() {
    let client = spawn_server().await;
    let mut session = ChatSession::new();
    let mut renders = 0;

    session
        .send(&client, "Oi", |_| renders += 1)
        .await
        .unwrap();
    session
        .send(&client, "E o preço?", |_| renders += 1)
        .await
        .unwrap();

    assert!(renders >= 2);
    assert_eq!(session.phase(), ChatPhase::Idle);
    let last = session.messages().last().unwrap();
    assert_eq!(last.text, format!("{} (2 anteriores)", REPLY.concat()));
}

#[tokio::test]
async fn test_blank_message_rejected_by_server() {
    let client = spawn_server().await;

    let result = client.open_stream(vec![], "  ".into()).await;

    assert!(matches!(
        result,
        Err(RelayError::Status { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_analyze_image() {
    let client = spawn_server().await;

    let analysis = client.analyze_image("aGVsbG8=").await.unwrap();
    assert_eq!(analysis, "**Análise do Olhar:** redondo");

    let invalid = client.analyze_image("???").await;
    assert!(matches!(invalid, Err(RelayError::Status { status: 400, .. })));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let client = StudioApiClient::with_client(http, format!("http://{address}"));

    let result = client.open_stream(vec![], "Oi".into()).await;
    assert!(matches!(result, Err(RelayError::Transport(_))));
}
