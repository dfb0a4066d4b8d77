//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::LifelineConfig;
use crate::controller::{Mode, StartRequest};
use crate::logging::init_tracing;
use std::sync::Arc;

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<LifelineConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        LifelineConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        LifelineConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if let Some(mode) = args.mode {
        config.monitor.mode = mode;
    }
    if let Some(kind) = args.kind {
        config.simulation.kind = kind;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.simulation.interval_ms = interval_ms;
    }
    if let Some(ref endpoint) = args.stream_endpoint {
        config.stream.endpoint = endpoint.clone();
    }
    if let Some(ref endpoint) = args.prediction_endpoint {
        config.prediction.endpoint = endpoint.clone();
    }
    if args.autostart {
        config.monitor.autostart = true;
    }

    Ok(config)
}

/// Start request for the configured startup mode.
pub fn startup_request(config: &LifelineConfig) -> StartRequest {
    match config.monitor.mode {
        Mode::Simulated => StartRequest::simulated(config.simulation.kind)
            .with_interval_ms(config.simulation.interval_ms),
        Mode::Streaming => StartRequest::streaming().with_endpoint(config.stream.endpoint.clone()),
    }
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
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
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;
    tracing::info!("Starting Lifeline server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Build state and router
    let app_state = Arc::new(AppState::new(Arc::new(config.clone())));
    let app = create_router(Arc::clone(&app_state));

    // 4. Optionally start the configured source
    if config.monitor.autostart {
        let status = app_state
            .controller
            .start(startup_request(&config))
            .await?;
        tracing::info!(status = %status.status_text, "Source started at startup");
    }

    // 5. Bind and serve
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Lifeline dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 6. Cleanup
    tracing::info!("Stopping active source");
    app_state.controller.stop().await;

    tracing::info!("Lifeline server stopped");
    Ok(())
}
