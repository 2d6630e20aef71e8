use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use bytes::Bytes;

use gripline_core::{InspectionResult, LastEventIds};

/// HTTP-like request as seen by the router (already read off the wire).
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Router-assigned id, used for log correlation and session handoff.
    pub id: String,
    pub method: Method,
    pub uri: Uri,
    /// Header names are case-insensitive (`HeaderMap`).
    pub headers: HeaderMap,
    /// Request body, already buffered.
    pub body: Bytes,
    /// Remote address, when the transport knows it.
    pub peer: Option<SocketAddr>,
}

impl InboundRequest {
    pub fn new(id: impl Into<String>, method: Method, uri: Uri) -> Self {
        Self {
            id: id.into(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            peer: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    /// First value of a header, if present and valid UTF-8. `name` is
    /// matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response produced by the origin. Cheap to clone (body is `Bytes`) so one
/// fetch can be handed to every coalesced waiter.
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OriginResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Session fields stamped onto a proxied request for the channel subsystem.
/// Copied verbatim from the inspection result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub request_id: String,
    pub session_id: Bytes,
    pub last_event_ids: LastEventIds,
}

impl SessionContext {
    pub fn from_inspection<U>(request_id: &str, inspection: &InspectionResult<U>) -> Self {
        Self {
            request_id: request_id.to_string(),
            session_id: inspection.session_id().clone(),
            last_event_ids: inspection.last_event_ids().clone(),
        }
    }

    /// Nothing to resume and no session to correlate.
    pub fn is_empty(&self) -> bool {
        self.session_id.is_empty() && self.last_event_ids.is_empty()
    }
}

/// What the router decided for one request.
#[derive(Debug, Clone)]
pub enum RouteDecision<U> {
    /// Not forwarded to an origin. The result still carries the payload for
    /// whatever handles the request next.
    NotProxied {
        inspection: Arc<InspectionResult<U>>,
    },
    /// Forwarded. When `coalesced` is true the response and the inspection
    /// result are the ones produced for the request that led the shared fetch.
    Proxied {
        inspection: Arc<InspectionResult<U>>,
        response: OriginResponse,
        coalesced: bool,
    },
}

impl<U> RouteDecision<U> {
    pub fn inspection(&self) -> &Arc<InspectionResult<U>> {
        match self {
            RouteDecision::NotProxied { inspection } => inspection,
            RouteDecision::Proxied { inspection, .. } => inspection,
        }
    }

    pub fn is_proxied(&self) -> bool {
        matches!(self, RouteDecision::Proxied { .. })
    }

    pub fn response(&self) -> Option<&OriginResponse> {
        match self {
            RouteDecision::NotProxied { .. } => None,
            RouteDecision::Proxied { response, .. } => Some(response),
        }
    }
}
