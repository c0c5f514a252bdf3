mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use shelfpulse_jobs::{CategoryPipeline, CsvExporter, JobRunner, RunnerSettings};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(shelfpulse_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pipeline = CategoryPipeline::from_app_config(&config)?;
    let exporter = CsvExporter::new(config.export_dir.clone());
    let runner = JobRunner::new(
        Arc::new(pipeline),
        exporter,
        RunnerSettings::from_app_config(&config),
    );
    tracing::info!(
        site = %config.site_base_url,
        export_dir = %config.export_dir.display(),
        "job runner ready"
    );

    let _scheduler = scheduler::build_scheduler(runner.clone()).await?;

    let app = build_app(AppState { runner }, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
