mod app;
mod config;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::sync::Arc;

use services::{ArticleCache, DeepLClient, OpenAiClient, RedisCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env)?;

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        simplify_failure_policy = ?settings.simplify_failure_policy,
        "Starting easy-japanese-news"
    );

    // Redis connects lazily; a failed connect surfaces on the request that needed it
    let cache: Arc<dyn ArticleCache> =
        Arc::new(RedisCache::new(&settings.redis).context("Invalid Redis configuration")?);

    // Warm the connection without blocking startup
    tokio::spawn({
        let cache = cache.clone();
        async move {
            match cache.health_check().await {
                Ok(()) => tracing::info!("Redis cache is healthy"),
                Err(e) => tracing::warn!(error = %e, "Redis health check failed - will retry on first request"),
            }
        }
    });

    let translator = DeepLClient::new(
        &settings.deepl_api_url,
        &settings.deepl_api_key,
        settings.http_timeout_seconds,
    )?;

    let simplifier = OpenAiClient::new(
        &settings.openai_api_url,
        &settings.openai_api_key,
        &settings.openai_model,
        settings.http_timeout_seconds,
    )?;

    // Create application state
    let state = app::AppState::new(
        settings.clone(),
        cache,
        Arc::new(translator),
        Arc::new(simplifier),
    );

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
