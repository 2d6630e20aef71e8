use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use gripline_core::error::{GriplineError, Result, Unavailable};
use gripline_core::InspectionResult;

use crate::config::{FailureMode, InspectSection};
use crate::obs::metrics::RouterMetrics;
use crate::routing::InboundRequest;

use super::client::InspectionClient;

#[derive(Debug, Clone, Copy)]
pub struct InspectSettings {
    pub enabled: bool,
    pub timeout: Duration,
    pub failure_mode: FailureMode,
}

impl From<&InspectSection> for InspectSettings {
    fn from(s: &InspectSection) -> Self {
        Self {
            enabled: s.enabled,
            timeout: s.timeout(),
            failure_mode: s.failure_mode,
        }
    }
}

/// Where an outcome's result came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeSource {
    /// Returned by the inspection client.
    Inspected,
    /// Inspection disabled; default result.
    Skipped,
    /// Inspection unavailable; substitute chosen by the failure mode. A
    /// contract violation from the client lands here as `Malformed` with the
    /// default result.
    Substituted(Unavailable),
}

#[derive(Debug)]
pub struct InspectionOutcome<U> {
    pub result: Arc<InspectionResult<U>>,
    pub source: OutcomeSource,
}

pub struct Inspector<U> {
    client: Arc<dyn InspectionClient<U>>,
    settings: InspectSettings,
    metrics: Arc<RouterMetrics>,
}

impl<U> Inspector<U>
where
    U: Send + Sync + 'static,
{
    pub fn new(
        client: Arc<dyn InspectionClient<U>>,
        settings: InspectSettings,
        metrics: Arc<RouterMetrics>,
    ) -> Self {
        Self {
            client,
            settings,
            metrics,
        }
    }

    /// Obtain the inspection result for `req`.
    ///
    /// Never fails: unavailability and contract violations reported by the
    /// client both degrade to a substituted result.
    pub async fn inspect(&self, req: &InboundRequest) -> Result<InspectionOutcome<U>> {
        if !self.settings.enabled {
            self.metrics.inspections.inc(&[("outcome", "skipped")]);
            return Ok(InspectionOutcome {
                result: Arc::new(InspectionResult::default()),
                source: OutcomeSource::Skipped,
            });
        }

        let start = Instant::now();
        let deadline = self.settings.timeout;
        let res = match tokio::time::timeout(deadline, self.client.inspect(req)).await {
            Ok(res) => res,
            Err(_) => Err(Unavailable::Timeout.into()),
        };
        self.metrics.inspect_duration.observe(&[], start.elapsed());

        match res {
            Ok(result) => {
                self.metrics.inspections.inc(&[("outcome", "inspected")]);
                debug!(
                    should_proxy = result.should_proxy(),
                    shareable = result.is_shareable(),
                    "inspection complete"
                );
                Ok(InspectionOutcome {
                    result: Arc::new(result),
                    source: OutcomeSource::Inspected,
                })
            }
            Err(GriplineError::ContractViolation(msg)) => {
                self.metrics.inspections.inc(&[("outcome", "violation")]);
                self.metrics
                    .contract_violations
                    .inc(&[("source", "inspection_client")]);
                error!(reason = %msg, "invalid inspection result, not proxying");
                // A producer bug is never failed open.
                Ok(InspectionOutcome {
                    result: Arc::new(InspectionResult::default()),
                    source: OutcomeSource::Substituted(Unavailable::Malformed(msg)),
                })
            }
            Err(GriplineError::InspectionUnavailable(why)) => Ok(self.substitute(why)),
            // Anything else from the client is a transport-level failure as far
            // as the router is concerned.
            Err(other) => Ok(self.substitute(Unavailable::Transport(other.to_string()))),
        }
    }

    fn substitute(&self, why: Unavailable) -> InspectionOutcome<U> {
        self.metrics.inspections.inc(&[("outcome", why.as_label())]);

        let result = match self.settings.failure_mode {
            FailureMode::Closed => InspectionResult::default(),
            FailureMode::Open => InspectionResult::fail_open(),
        };
        warn!(
            reason = %why,
            failure_mode = ?self.settings.failure_mode,
            should_proxy = result.should_proxy(),
            timeout_ms = self.settings.timeout.as_millis() as u64,
            "inspection unavailable, substituting result"
        );

        InspectionOutcome {
            result: Arc::new(result),
            source: OutcomeSource::Substituted(why),
        }
    }
}
