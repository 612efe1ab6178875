use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod assessment;
mod config;
mod errors;
mod extract;
mod ingest;
mod llm;
mod models;
mod normalize;
mod progress;
mod prompts;
mod roadmap;
mod store;

use api::AppState;
use assessment::AssessmentService;
use config::Config;
use ingest::IngestTracker;
use llm::{GeminiClient, TextGenerator};
use progress::ProgressService;
use roadmap::RoadmapService;
use store::JsonDirStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::from_env());
    if config.gemini_api_key.is_empty() {
        warn!("GOOGLE_API_KEY is not set; generation requests will fail");
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));

    let assessments = Arc::new(AssessmentService::new(
        JsonDirStore::open(config.data_root.join("assessments"))?,
        Arc::clone(&generator),
        config.upload_root.clone(),
        config.assessment_cache_ttl,
    ));
    let progress = Arc::new(ProgressService::new(JsonDirStore::open(
        config.data_root.join("progress"),
    )?));
    let roadmaps = Arc::new(RoadmapService::new(
        JsonDirStore::open(config.data_root.join("roadmaps"))?,
        Arc::clone(&generator),
    ));

    let state = AppState {
        config: Arc::clone(&config),
        generator,
        assessments,
        progress,
        roadmaps,
        ingest: IngestTracker::new(),
    };

    let app = api::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Starting server on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
