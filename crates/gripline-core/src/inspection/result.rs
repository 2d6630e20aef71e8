use bytes::Bytes;

use crate::error::{GriplineError, Result};

use super::cursor::LastEventIds;

/// Verdict of the inspection authority on one inbound request.
///
/// Built once (by an inspection client, or as a substitute when inspection
/// could not be performed) and never mutated afterwards. There are no
/// setters; share it behind `Arc` when several tasks need to read it.
///
/// `U` is the application payload. The router never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionResult<U = serde_json::Value> {
    should_proxy: bool,
    sharing_key: Bytes,
    session_id: Bytes,
    last_event_ids: LastEventIds,
    user_data: Option<U>,
}

/// The "no inspection" value: do not proxy, every other field empty.
impl<U> Default for InspectionResult<U> {
    fn default() -> Self {
        Self {
            should_proxy: false,
            sharing_key: Bytes::new(),
            session_id: Bytes::new(),
            last_event_ids: LastEventIds::new(),
            user_data: None,
        }
    }
}

impl<U> InspectionResult<U> {
    /// Start a populated result. Every field defaults to the "no inspection"
    /// value until set.
    pub fn builder() -> InspectionResultBuilder<U> {
        InspectionResultBuilder::default()
    }

    /// Substitute used when the router is configured to fail open: proxy,
    /// but with no sharing key so the request is never coalesced.
    pub fn fail_open() -> Self {
        Self {
            should_proxy: true,
            ..Self::default()
        }
    }

    /// Whether the request is forwarded to an origin. When false the other
    /// fields carry no routing meaning.
    pub fn should_proxy(&self) -> bool {
        self.should_proxy
    }

    /// Opaque coalescing key. Requests with equal non-empty keys may share
    /// one origin fetch; empty means "do not share".
    pub fn sharing_key(&self) -> &Bytes {
        &self.sharing_key
    }

    /// Opaque session id for correlation by the channel layer. May be empty.
    pub fn session_id(&self) -> &Bytes {
        &self.session_id
    }

    /// Per-channel resume cursors, forwarded verbatim.
    pub fn last_event_ids(&self) -> &LastEventIds {
        &self.last_event_ids
    }

    /// Application payload, untouched by the router.
    pub fn user_data(&self) -> Option<&U> {
        self.user_data.as_ref()
    }

    /// Take the payload out, dropping the routing fields.
    pub fn into_user_data(self) -> Option<U> {
        self.user_data
    }

    /// Eligible for request coalescing.
    pub fn is_shareable(&self) -> bool {
        self.should_proxy && !self.sharing_key.is_empty()
    }

    /// Convert the payload type, leaving every other field untouched.
    pub fn map_user_data<V, F>(self, f: F) -> InspectionResult<V>
    where
        F: FnOnce(U) -> V,
    {
        InspectionResult {
            should_proxy: self.should_proxy,
            sharing_key: self.sharing_key,
            session_id: self.session_id,
            last_event_ids: self.last_event_ids,
            user_data: self.user_data.map(f),
        }
    }
}

/// Builder for a populated `InspectionResult`.
///
/// `build()` validates the contract instead of coercing: a sharing key on a
/// request that is not proxied, or a channel given twice, is a producer bug.
#[derive(Debug)]
pub struct InspectionResultBuilder<U> {
    should_proxy: bool,
    sharing_key: Bytes,
    session_id: Bytes,
    last_event_ids: std::collections::HashMap<String, String>,
    duplicate_channel: Option<String>,
    user_data: Option<U>,
}

impl<U> Default for InspectionResultBuilder<U> {
    fn default() -> Self {
        Self {
            should_proxy: false,
            sharing_key: Bytes::new(),
            session_id: Bytes::new(),
            last_event_ids: Default::default(),
            duplicate_channel: None,
            user_data: None,
        }
    }
}

impl<U> InspectionResultBuilder<U> {
    /// Forward the request to an origin. Defaults to false.
    pub fn should_proxy(mut self, v: bool) -> Self {
        self.should_proxy = v;
        self
    }

    /// Coalescing key. Must stay empty unless `should_proxy(true)`.
    pub fn sharing_key(mut self, key: impl Into<Bytes>) -> Self {
        self.sharing_key = key.into();
        self
    }

    /// Session id to hand to the channel layer.
    pub fn session_id(mut self, sid: impl Into<Bytes>) -> Self {
        self.session_id = sid.into();
        self
    }

    /// Replace all cursors at once.
    pub fn last_event_ids(mut self, ids: LastEventIds) -> Self {
        self.last_event_ids = ids.into_iter().collect();
        self.duplicate_channel = None;
        self
    }

    /// Add one channel cursor. Naming a channel twice fails at `build()`.
    pub fn last_event_id(mut self, channel: impl Into<String>, id: impl Into<String>) -> Self {
        let channel = channel.into();
        if self.last_event_ids.contains_key(&channel) {
            self.duplicate_channel.get_or_insert(channel);
        } else {
            self.last_event_ids.insert(channel, id.into());
        }
        self
    }

    /// Attach the application payload.
    pub fn user_data(mut self, data: U) -> Self {
        self.user_data = Some(data);
        self
    }

    /// Validate and freeze.
    ///
    /// # Errors
    /// `ContractViolation` for a sharing key without `should_proxy`, or a
    /// duplicate channel.
    pub fn build(self) -> Result<InspectionResult<U>> {
        if !self.should_proxy && !self.sharing_key.is_empty() {
            return Err(GriplineError::ContractViolation(
                "sharing key set on a request that is not proxied".into(),
            ));
        }
        if let Some(channel) = self.duplicate_channel {
            return Err(GriplineError::ContractViolation(format!(
                "duplicate channel in last event ids: {channel}"
            )));
        }

        Ok(InspectionResult {
            should_proxy: self.should_proxy,
            sharing_key: self.sharing_key,
            session_id: self.session_id,
            last_event_ids: LastEventIds::from(self.last_event_ids),
            user_data: self.user_data,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shareable_across_tasks() {
        assert_send_sync::<InspectionResult>();
        assert_send_sync::<std::sync::Arc<InspectionResult<Vec<u8>>>>();
    }

    #[test]
    fn fail_open_is_not_shareable() {
        let r: InspectionResult = InspectionResult::fail_open();
        assert!(r.should_proxy());
        assert!(!r.is_shareable());
        assert!(r.sharing_key().is_empty());
    }

    #[test]
    fn map_user_data_keeps_other_fields() {
        let r = InspectionResult::builder()
            .should_proxy(true)
            .sharing_key("k")
            .session_id("s")
            .last_event_id("c", "1")
            .user_data(41u32)
            .build()
            .unwrap();
        let m = r.clone().map_user_data(|v| v + 1);
        assert_eq!(m.user_data(), Some(&42));
        assert_eq!(m.sharing_key(), r.sharing_key());
        assert_eq!(m.session_id(), r.session_id());
        assert_eq!(m.last_event_ids(), r.last_event_ids());
    }

    #[test]
    fn replacing_cursors_clears_duplicate() {
        let r: InspectionResult = InspectionResult::builder()
            .last_event_id("a", "1")
            .last_event_id("a", "2")
            .last_event_ids(LastEventIds::new())
            .build()
            .unwrap();
        assert!(r.last_event_ids().is_empty());
    }
}
