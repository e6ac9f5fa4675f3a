mod config;
mod db;
mod documents;
mod errors;
mod extract;
mod ingest;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::documents::pdf::ChromePdfRenderer;
use crate::ingest::enrich::LlmJobEnricher;
use crate::ingest::queue::run_enrichment_worker;
use crate::llm_client::LlmClient;
use crate::profile::CandidateProfile;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobtrail v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Candidate profile drives enrichment prompts and document names
    let profile = Arc::new(CandidateProfile::load(&config.candidate_profile_path)?);
    info!(candidate = %profile.name, "Candidate profile loaded");

    // Initialize LLM-backed enricher
    let llm = LlmClient::new(config.openai_api_key.clone())?;
    let enricher = Arc::new(LlmJobEnricher::new(llm, profile.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let renderer = Arc::new(ChromePdfRenderer::new(config.chrome_path.clone()));

    let state = AppState {
        db,
        redis,
        s3,
        config: config.clone(),
        enricher,
        renderer,
        profile,
    };

    tokio::spawn(run_enrichment_worker(state.clone()));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "jobtrail-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
