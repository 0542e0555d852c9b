//! Havilah Lash Studio API server
//!
//! (c) Softlandia 2025

use lash_studio_api::api;
use lash_studio_api::core::services::{StudioAssistant, StudioCatalog};
use lash_studio_api::infrastructure::database::DatabaseConnection;
use lash_studio_api::infrastructure::gemini::GeminiModel;
use lash_studio_api::infrastructure::repositories::DbCatalogRepository;
use lash_studio_api::infrastructure::settings::Settings;

use anyhow::{Context, anyhow};
use axum::Router;
use axum::http::{HeaderValue, Method};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::{info, warn};
use tokio::runtime::{Builder, Runtime};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    if !settings.has_credential() {
        warn!("GEMINI_API_KEY is not set, chat and consultancy will answer 500");
    }

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task(settings))
}

async fn web_server_task(settings: Settings) -> anyhow::Result<()> {
    let provider = ServiceCollection::new()
        .add(Settings::singleton())
        .add(GeminiModel::singleton())
        .add(DatabaseConnection::singleton())
        .add(DbCatalogRepository::scoped())
        .add(StudioCatalog::scoped())
        .add(StudioAssistant::scoped())
        .build_provider()
        .map_err(|e| anyhow!("invalid service registrations: {e:?}"))?;

    let origins = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect::<Vec<_>>();

    let app = Router::new()
        .merge(api::router())
        .fallback_service(ServiceBuilder::new().service(ServeDir::new(&settings.static_dir)))
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(AllowOrigin::list(origins)),
        )
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address)
        .await
        .with_context(|| format!("cannot bind {}", settings.bind_address))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    info!("Shutting down...");

    Ok(())
}
