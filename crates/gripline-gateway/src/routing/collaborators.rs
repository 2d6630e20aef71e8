use async_trait::async_trait;

use gripline_core::error::Result;
use gripline_core::InspectionResult;

use super::types::{InboundRequest, OriginResponse, SessionContext};

/// Proxying engine that performs the actual origin fetch.
#[async_trait]
pub trait Origin<U>: Send + Sync {
    async fn fetch(
        &self,
        req: &InboundRequest,
        inspection: &InspectionResult<U>,
    ) -> Result<OriginResponse>;
}

/// Streaming/channel delivery layer that correlates sessions and resumes
/// per-channel cursors. Receives the fields exactly as inspected.
#[async_trait]
pub trait ChannelHandoff: Send + Sync {
    async fn resume(&self, ctx: SessionContext) -> Result<()>;
}

/// Handoff that drops everything; used when no channel layer is attached.
#[derive(Debug, Default)]
pub struct NoopHandoff;

#[async_trait]
impl ChannelHandoff for NoopHandoff {
    async fn resume(&self, _ctx: SessionContext) -> Result<()> {
        Ok(())
    }
}
