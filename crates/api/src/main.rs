use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use fortidash_core::config::ConfigError;
use fortidash_events::EventBus;
use fortidash_fortimanager::config::MonitorConfig;
use fortidash_fortimanager::mock::DEFAULT_SEED;
use fortidash_fortimanager::{
    FortiManagerApi, FortiManagerClient, FortiManagerConfig, FortiManagerError, MockFortiManager,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fortidash_api::config::ServerConfig;
use fortidash_api::router::build_app_router;
use fortidash_api::state::AppState;

/// Fatal startup failures.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    FortiManager(#[from] FortiManagerError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fortidash_api=debug,fortidash_fortimanager=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    let fm_config = FortiManagerConfig::from_env()?;
    let monitor_config = MonitorConfig::from_env(&fm_config.adom)?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        adom = %fm_config.adom,
        mock_mode = fm_config.mock_mode,
        "Loaded configuration",
    );

    // --- FortiManager backend ---
    let (fortimanager, mock_seed): (Arc<dyn FortiManagerApi>, Option<u64>) = if fm_config.mock_mode {
        tracing::warn!("FORTIMANAGER_MOCK_MODE is on, serving generated data");
        (Arc::new(MockFortiManager::new(DEFAULT_SEED)), Some(DEFAULT_SEED))
    } else {
        let client = FortiManagerClient::new(&fm_config)?;
        tracing::info!(
            endpoint = client.endpoint(),
            auth_method = %client.auth_method(),
            "FortiManager client ready",
        );
        (Arc::new(client), None)
    };

    // --- Event bus and log ---
    let event_bus = Arc::new(EventBus::default());
    let monitor_enabled = monitor_config.enabled;
    let state = AppState::new(
        config.clone(),
        Arc::clone(&fortimanager),
        Arc::clone(&event_bus),
        monitor_config,
        mock_seed,
    );

    let event_log = Arc::clone(&state.event_log);
    let log_receiver = event_bus.subscribe();
    let log_handle = tokio::spawn(async move { event_log.run(log_receiver).await });

    // --- Device monitor ---
    let monitor = Arc::clone(&state.monitor);
    if monitor_enabled {
        monitor.start().await;
    } else {
        tracing::info!("MONITOR_ENABLED is off, device monitor not started");
    }

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = config.socket_addr()?;
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    monitor.stop().await;
    if let Err(e) = fortimanager.close().await {
        tracing::warn!(error = %e, "FortiManager logout failed");
    }

    // Dropping the last bus handles closes the channel and ends the log task.
    drop(monitor);
    drop(fortimanager);
    drop(event_bus);
    if tokio::time::timeout(Duration::from_secs(5), log_handle).await.is_err() {
        tracing::warn!("Event log did not shut down in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
