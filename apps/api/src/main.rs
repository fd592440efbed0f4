use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobmatch_api::config::Config;
use jobmatch_api::llm_client;
use jobmatch_api::matching::MatchPipeline;
use jobmatch_api::routes::build_router;
use jobmatch_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("jobmatch_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize matching pipeline (search adapter, scorer, shared call limiter)
    let pipeline = MatchPipeline::from_config(&config);
    info!(
        "Matching pipeline initialized (scorer: {}, model: {}, max concurrent calls: {})",
        pipeline.scorer_backend(),
        llm_client::MODEL,
        config.matching.max_concurrent_calls
    );

    // Build app state
    let state = AppState {
        pipeline: pipeline.clone(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(pipeline))
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C, then closes the call limiter so queued work stops
/// waiting while in-flight requests drain.
async fn shutdown_signal(pipeline: MatchPipeline) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received; closing call limiter");
    pipeline.shutdown();
}
