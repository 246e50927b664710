use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use suncool_service::{
    api::{self, AppState},
    config::Config,
    control::ThresholdController,
    local_state,
    spray_log::SprayLog,
    store::{DeviceSwitch, RealtimeStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let verifier = Arc::new(config.verifier()?);

    let store = RealtimeStore::new();

    // Restore the device flag persisted by a previous session (default: off)
    if let Some(on) = local_state::load::<bool>(&config.device_state_path).await {
        store.set_status(on).await?;
        info!(on, "Device state restored");
    }

    let spray_log = SprayLog::load(config.spray_log_path.clone()).await;
    info!(entries = spray_log.len().await, "Spray log ready");

    // Threshold controller: subscribes to reading and device-state changes
    // and actuates the cooling device past the threshold.
    let (controller, mut alerts) = ThresholdController::new(
        store.clone(),
        spray_log.clone(),
        config.spray_threshold,
        store.subscribe_readings(),
        store.subscribe_device(),
    );
    let controller_task = tokio::spawn(controller.run());

    // Surface one-time trigger notifications.
    tokio::spawn(async move {
        while let Ok(alert) = alerts.recv().await {
            warn!(
                temperature = alert.temperature,
                "High temperature alert — mist spray activated automatically"
            );
        }
    });

    // Persist the device flag on every change, best-effort.
    {
        let mut device_rx = store.subscribe_device();
        let path = config.device_state_path.clone();
        tokio::spawn(async move {
            while device_rx.changed().await.is_ok() {
                let on = *device_rx.borrow_and_update();
                local_state::save(&path, &on).await;
            }
        });
    }

    let state = AppState {
        store,
        spray_log,
        verifier,
        spray_threshold: config.spray_threshold,
        log_manual_sprays: config.log_manual_sprays,
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cancel the controller's subscriptions so no listener outlives the session.
    controller_task.abort();
    let _ = controller_task.await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
