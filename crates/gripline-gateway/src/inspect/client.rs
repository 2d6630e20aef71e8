use async_trait::async_trait;

use gripline_core::error::Result;
use gripline_core::InspectionResult;

use crate::routing::InboundRequest;

/// Caller of the inspection authority.
///
/// Implementations report unavailability (transport error, malformed answer,
/// cancellation) as `GriplineError::InspectionUnavailable`. A result built in
/// breach of the contract surfaces as `GriplineError::ContractViolation`
/// straight from `InspectionResultBuilder::build`.
#[async_trait]
pub trait InspectionClient<U>: Send + Sync {
    async fn inspect(&self, req: &InboundRequest) -> Result<InspectionResult<U>>;
}
