mod config;
mod enrichment;
mod errors;
mod extraction;
mod generate;
mod handlers;
mod job_store;
mod models;
mod pipeline;
mod query_builder;
mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::errors::ResultExt;
use crate::generate::{MessagesApiGenerator, TextGenerator};
use crate::handlers::AppState;
use crate::job_store::{InMemoryJobStore, JobStore};
use crate::services::{
    MailerService, ProfileEnrichService, ProspectSearchService, WebSearchService,
};

/// Main entry point for the application.
///
/// Initializes logging and configuration, builds the provider clients and
/// the in-memory job store, then starts the Axum server with CORS, request
/// tracing, a body size limit, and per-IP rate limiting on the job routes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_prospect_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // External provider clients
    let search =
        ProspectSearchService::new(&config).context("building people search client")?;
    let enrich =
        ProfileEnrichService::new(&config).context("building profile enrichment client")?;
    tracing::info!("✓ Search and enrichment clients initialized");

    let web_search = WebSearchService::from_config(&config)?;
    if web_search.is_some() {
        tracing::info!("✓ Companion web search client initialized");
    } else {
        tracing::info!("Web search not configured, snippet attachment disabled");
    }

    let mailer = MailerService::from_config(&config)?;
    if mailer.is_some() {
        tracing::info!("✓ Mailer client initialized");
    }

    let generator: Arc<dyn TextGenerator> =
        Arc::new(MessagesApiGenerator::new(&config).context("building generator client")?);
    tracing::info!("✓ Generator client initialized: {}", config.generator_model);

    // Job state lives in process memory only and is lost on restart.
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    tracing::info!("In-memory job store initialized");

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        store,
        generator,
        search,
        enrich,
        web_search,
        mailer,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Job lifecycle routes behind the protective layers
    let protected_routes = Router::new()
        .route("/start_job", post(handlers::start_job))
        .route("/status", get(handlers::check_status))
        .route("/provide_input", post(handlers::provide_input))
        .route("/availability", get(handlers::availability))
        .route("/input_schema", get(handlers::input_schema))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
