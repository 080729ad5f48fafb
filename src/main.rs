use std::sync::Arc;

use anyhow::Context;
use nutrigen::{build_router, config::Config, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    telemetry::init_tracing(config.log_json);

    if config.api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set; model calls will fail until it is configured");
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %config.bind,
        text_model = %config.text_model,
        vision_model = %config.vision_model,
        users_file = %config.users_file.display(),
        "NutriGen listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
