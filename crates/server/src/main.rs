//! Voice TTS Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_tts_config::{load_settings, Settings};
use voice_tts_pipeline::{build_engine, SpeechService};
use voice_tts_server::{create_router, init_metrics, metrics::record_purged, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first (need observability settings for tracing init)
    let env = std::env::var("VOICE_TTS_ENV").ok();
    let config = load_settings(env.as_deref())?;

    init_tracing(&config);

    tracing::info!("Starting Voice TTS Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(env = env.as_deref().unwrap_or("default"), "Loaded configuration");

    if config.observability.metrics_enabled {
        init_metrics()?;
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    // Catalog styles are computed here, once, before accepting requests
    let engine = build_engine(&config)?;
    let service = tokio::task::spawn_blocking({
        let config = config.clone();
        move || SpeechService::from_settings(&config, engine)
    })
    .await??;

    let state = AppState::new(config.clone(), service);
    let cleanup = state.cleanup.clone();

    let sweep = &config.output.sweep;
    let sweep_shutdown = sweep.enabled.then(|| {
        tracing::info!(
            interval_seconds = sweep.interval_seconds,
            max_age_seconds = sweep.max_age_seconds,
            "Starting output sweep task"
        );
        cleanup.start_sweep_task(
            Duration::from_secs(sweep.interval_seconds),
            Duration::from_secs(sweep.max_age_seconds),
        )
    });

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(tx) = sweep_shutdown {
        let _ = tx.send(true);
    }

    // Generated audio does not outlive the process
    let purge = Arc::clone(&cleanup);
    match tokio::task::spawn_blocking(move || purge.purge()).await? {
        Ok(report) => record_purged(report.removed),
        Err(e) => tracing::error!(error = %e, "Failed to purge generated audio"),
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("voice_tts={},tower_http=debug", level).into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
