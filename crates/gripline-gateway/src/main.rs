//! gripline gateway daemon.
//!
//! - Loads `GRIPLINE_CONFIG` (default `gripline.yaml`), strict parsing + validate
//! - Serves /healthz, /readyz, /metrics
//! - Ctrl-C flips readiness to draining, then shuts down gracefully

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use gripline_core::error::{GriplineError, Result};
use gripline_gateway::{app_state::AppState, config, router};

const DEFAULT_CONFIG_PATH: &str = "gripline.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "gripline-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("GRIPLINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = config::load_from_file(&path)?;
    let state = AppState::new(cfg)?;

    let listen = state.listen_addr();
    let app = router::build_router(state.clone());

    tracing::info!(
        %listen,
        config = %path,
        inspect_enabled = state.cfg().inspect.enabled,
        failure_mode = ?state.cfg().inspect.failure_mode,
        coalescing = state.cfg().router.coalescing,
        "gripline-gateway starting"
    );

    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| GriplineError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(drain_on_ctrl_c(state))
        .await
        .map_err(|e| GriplineError::Internal(format!("server failed: {e}")))
}

async fn drain_on_ctrl_c(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    state.set_draining();
    tracing::info!("draining");
}
