use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use queue_display::adapters::in_memory::in_memory_settings_store::InMemorySettingsStore;
use queue_display::adapters::outbound::graphql_backend::GraphQlBackend;
use queue_display::adapters::outbound::json_file_settings_store::JsonFileSettingsStore;
use queue_display::adapters::outbound::sse_event_source::SseEventSource;
use queue_display::application::display_store::DisplayStore;
use queue_display::core::display::ad_rotation::AdSettings;
use queue_display::core::ports::SettingsStore;
use queue_display::shell::config::Config;
use queue_display::shell::http::router;
use queue_display::shell::state::AppState;
use queue_display::shell::workers::{WorkerIntervals, spawn_workers};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;
    tracing::info!(
        graphql_uri = %config.graphql_uri,
        stream_url = %config.stream_url,
        media_base_url = %config.media_base_url,
        "starting queue display"
    );

    let backend = Arc::new(GraphQlBackend::new(
        config.graphql_uri.clone(),
        config.api_token.clone(),
        REQUEST_TIMEOUT,
    )?);
    // No request timeout here: the push connection is long lived.
    let push_source = Arc::new(SseEventSource::new(
        reqwest::Client::new(),
        config.stream_url.clone(),
        config.api_token.clone(),
    ));
    let settings: Arc<dyn SettingsStore> = match &config.settings_file {
        Some(path) => Arc::new(JsonFileSettingsStore::new(path)),
        None => {
            tracing::warn!("no settings file configured; ads follow the defaults");
            Arc::new(InMemorySettingsStore::new())
        }
    };

    let store = Arc::new(DisplayStore::new(
        config.flags,
        AdSettings::default(),
        config.media_base_url.clone(),
    ));
    let workers = spawn_workers(
        store.clone(),
        backend,
        push_source,
        settings,
        WorkerIntervals {
            queue_poll: config.queue_poll_interval,
            department_retry: config.queue_poll_interval,
            settings_poll: config.settings_poll_interval,
            ad_rotation: config.ad_rotation_interval,
        },
    );

    let app = router(AppState::new(store));
    tracing::info!("GraphQL endpoint: http://{}/graphql", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown requested");
        })
        .await?;

    workers.shutdown().await;
    Ok(())
}
