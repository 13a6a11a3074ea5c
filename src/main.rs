use std::sync::Arc;

use crate::api::handlers::AppState;
use crate::clients::gemini::GeminiClient;
use crate::config::Config;
use crate::store::StateStore;

mod api;
mod clients;
mod config;
mod error;
mod models;
mod program;
mod scheduler;
mod services;
mod store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let store = Arc::new(StateStore::load(&config.data_path).await?);
    let gemini = GeminiClient::from_config(&config)?;
    if gemini.is_none() {
        tracing::warn!("coach.disabled");
    }

    let _scheduler = scheduler::start_scheduler(Arc::clone(&store), &config.reminder_cron).await?;

    let state = AppState {
        config: config.clone(),
        store,
        gemini,
    };

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = %config.port, data_path = %config.data_path.display(), "server.listening");
    axum::serve(listener, app).await?;
    Ok(())
}
