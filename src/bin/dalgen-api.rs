/// dalgen API - HTTP front end for background generation jobs
///
/// Accepts generation requests, runs them as background jobs and serves the
/// finished packages.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dalgen::api::router;
use dalgen::jobs::{GenerationPipeline, PipelineConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = PipelineConfig::from_env();
    tokio::fs::create_dir_all(&config.output_dir).await?;
    tracing::info!("Packages are written to {}", config.output_dir.display());
    match config.max_concurrent_jobs {
        Some(max) => tracing::info!("At most {} jobs run concurrently", max),
        None => tracing::info!("Job concurrency is unbounded"),
    }

    let app = router(GenerationPipeline::new(config));

    // Start server
    let addr = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let listener_addr = format!("{}:{}", addr, port);

    let listener = tokio::net::TcpListener::bind(&listener_addr).await?;
    tracing::info!("dalgen API listening on http://{}", listener_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
