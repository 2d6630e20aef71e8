//! Shared application state for the gripline gateway.
//!
//! Holds the validated config and the metrics registry, and assembles
//! `RequestRouter`s from the config for whichever proxying engine embeds
//! the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use gripline_core::error::{GriplineError, Result};

use crate::config::GatewayConfig;
use crate::inspect::{InspectSettings, InspectionClient, Inspector};
use crate::obs::metrics::RouterMetrics;
use crate::routing::{Origin, RequestRouter, RouterSettings};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<RouterMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    listen: SocketAddr,
}

impl AppState {
    /// Build application state. Fails on a listen address that does not parse.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
            GriplineError::BadConfig(format!(
                "gateway.listen must be a socket address ({}): {e}",
                cfg.gateway.listen
            ))
        })?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, listen }),
            metrics: Arc::new(RouterMetrics::default()),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.inner.listen
    }

    pub fn metrics(&self) -> Arc<RouterMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Router wired with this state's inspect/router settings and metrics.
    pub fn request_router<U>(
        &self,
        client: Arc<dyn InspectionClient<U>>,
        origin: Arc<dyn Origin<U>>,
    ) -> RequestRouter<U>
    where
        U: Send + Sync + 'static,
    {
        let cfg = self.cfg();
        let inspector = Inspector::new(
            client,
            InspectSettings::from(&cfg.inspect),
            self.metrics(),
        );
        RequestRouter::new(
            inspector,
            origin,
            RouterSettings::from(&cfg.router),
            self.metrics(),
        )
    }
}
