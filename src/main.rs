use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use trafficboard::analytics::{
    AnalyticsProvider, GoogleAnalytics, MetricsClient, PropertyLister, ServiceAccountTokenSource,
};
use trafficboard::clock::{Clock, SystemClock};
use trafficboard::daily_cache::DailyCache;
use trafficboard::pipeline::Pipeline;
use trafficboard::readiness::{SnapshotGate, spawn_initial_run};
use trafficboard::*;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::debug!(analytics = ?app_config.analytics, "config loaded");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(app_config.analytics.request_timeout_secs))
        .build()?;
    let tokens = Arc::new(ServiceAccountTokenSource::new(
        &app_config.analytics.client_email,
        &app_config.analytics.private_key,
        &app_config.analytics.token_url,
        http.clone(),
    )?);
    let provider: Arc<dyn AnalyticsProvider> = Arc::new(GoogleAnalytics::new(
        http,
        tokens,
        app_config.analytics.endpoints(),
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let pipeline = Arc::new(Pipeline::new(
        PropertyLister::new(provider.clone(), app_config.analytics.account_id.clone()),
        MetricsClient::new(provider),
        DailyCache::new(&app_config.cache.path, clock.clone()),
        clock,
    ));

    let gate = SnapshotGate::new();
    let init_handle = spawn_initial_run(pipeline.clone(), gate.clone());

    let app = routes::app(gate, Some(pipeline), app_config.dashboard.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    init_handle.abort();

    Ok(())
}
