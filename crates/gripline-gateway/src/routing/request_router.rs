use std::sync::Arc;

use tracing::{debug, info_span, warn, Instrument};

use gripline_core::error::Result;
use gripline_core::InspectionResult;

use crate::coalesce::SharingRegistry;
use crate::config::RouterSection;
use crate::inspect::Inspector;
use crate::obs::metrics::RouterMetrics;
use crate::obs::LogBytes;

use super::collaborators::{ChannelHandoff, NoopHandoff, Origin};
use super::types::{InboundRequest, OriginResponse, RouteDecision, SessionContext};

#[derive(Debug, Clone, Copy)]
pub struct RouterSettings {
    pub coalescing: bool,
}

impl From<&RouterSection> for RouterSettings {
    fn from(s: &RouterSection) -> Self {
        Self {
            coalescing: s.coalescing,
        }
    }
}

/// Output of one origin fetch, handed to every request that shared it.
#[derive(Debug)]
pub struct SharedFetch<U> {
    pub inspection: Arc<InspectionResult<U>>,
    pub response: OriginResponse,
}

impl<U> Clone for SharedFetch<U> {
    fn clone(&self) -> Self {
        Self {
            inspection: Arc::clone(&self.inspection),
            response: self.response.clone(),
        }
    }
}

/// Decides proxy-vs-reject from the inspection result and drives the origin
/// fetch for proxied requests.
pub struct RequestRouter<U> {
    inspector: Inspector<U>,
    origin: Arc<dyn Origin<U>>,
    handoff: Arc<dyn ChannelHandoff>,
    sharing: SharingRegistry<Result<SharedFetch<U>>>,
    settings: RouterSettings,
    metrics: Arc<RouterMetrics>,
}

impl<U> RequestRouter<U>
where
    U: Send + Sync + 'static,
{
    pub fn new(
        inspector: Inspector<U>,
        origin: Arc<dyn Origin<U>>,
        settings: RouterSettings,
        metrics: Arc<RouterMetrics>,
    ) -> Self {
        Self {
            inspector,
            origin,
            handoff: Arc::new(NoopHandoff),
            sharing: SharingRegistry::new(),
            settings,
            metrics,
        }
    }

    /// Attach the channel layer that receives session context on proxied requests.
    pub fn with_handoff(mut self, handoff: Arc<dyn ChannelHandoff>) -> Self {
        self.handoff = handoff;
        self
    }

    pub fn sharing(&self) -> &SharingRegistry<Result<SharedFetch<U>>> {
        &self.sharing
    }

    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    pub async fn route(&self, req: InboundRequest) -> Result<RouteDecision<U>> {
        let span = info_span!(
            "route",
            request_id = %req.id,
            method = %req.method,
            uri = %req.uri,
        );
        self.route_inner(req).instrument(span).await
    }

    async fn route_inner(&self, req: InboundRequest) -> Result<RouteDecision<U>> {
        let inspection = match self.inspector.inspect(&req).await {
            Ok(outcome) => outcome.result,
            Err(e) => {
                self.metrics.routes.inc(&[("decision", "error")]);
                return Err(e);
            }
        };

        // Not proxied: the remaining fields carry no routing meaning.
        if !inspection.should_proxy() {
            self.metrics.routes.inc(&[("decision", "not_proxied")]);
            debug!("not proxying");
            return Ok(RouteDecision::NotProxied { inspection });
        }

        let req = Arc::new(req);
        let (fetched, coalesced) = if self.settings.coalescing && inspection.is_shareable() {
            let key = inspection.sharing_key().clone();
            let make = {
                let origin = Arc::clone(&self.origin);
                let req = Arc::clone(&req);
                let inspection = Arc::clone(&inspection);
                let metrics = Arc::clone(&self.metrics);
                move || fetch_origin(origin, req, inspection, metrics)
            };
            let (out, joined) = self.sharing.run(key, make).await;
            if joined {
                self.metrics.coalesced.inc(&[]);
                debug!(
                    sharing_key = %LogBytes(inspection.sharing_key()),
                    "joined in-flight origin fetch"
                );
            }
            (out, joined)
        } else {
            let out = fetch_origin(
                Arc::clone(&self.origin),
                Arc::clone(&req),
                Arc::clone(&inspection),
                Arc::clone(&self.metrics),
            )
            .await;
            (out, false)
        };

        let fetched = match fetched {
            Ok(f) => f,
            Err(e) => {
                self.metrics.routes.inc(&[("decision", "error")]);
                warn!(error = %e, coalesced, "origin fetch failed");
                return Err(e);
            }
        };

        // Session and cursors come from this request's own inspection: joined
        // requests share the fetch, not the client's position in its channels.
        self.hand_off(SessionContext::from_inspection(&req.id, &inspection))
            .await;

        self.metrics.routes.inc(&[("decision", "proxied")]);
        Ok(RouteDecision::Proxied {
            inspection: fetched.inspection,
            response: fetched.response,
            coalesced,
        })
    }

    async fn hand_off(&self, ctx: SessionContext) {
        if ctx.is_empty() {
            return;
        }
        let session_id = LogBytes(&ctx.session_id).to_string();
        let channels = ctx.last_event_ids.len();
        if let Err(e) = self.handoff.resume(ctx).await {
            self.metrics.handoff_failures.inc(&[("code", e.code().as_str())]);
            warn!(error = %e, %session_id, channels, "session handoff failed");
        }
    }
}

/// Decrements the in-flight gauge when the fetch ends or is dropped.
struct InflightGuard(Arc<RouterMetrics>);

impl InflightGuard {
    fn new(metrics: Arc<RouterMetrics>) -> Self {
        metrics.inflight_fetches.inc();
        Self(metrics)
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.0.inflight_fetches.dec();
    }
}

async fn fetch_origin<U>(
    origin: Arc<dyn Origin<U>>,
    req: Arc<InboundRequest>,
    inspection: Arc<InspectionResult<U>>,
    metrics: Arc<RouterMetrics>,
) -> Result<SharedFetch<U>>
where
    U: Send + Sync + 'static,
{
    let _inflight = InflightGuard::new(metrics);
    let response = origin.fetch(&req, &inspection).await?;
    Ok(SharedFetch {
        inspection,
        response,
    })
}
