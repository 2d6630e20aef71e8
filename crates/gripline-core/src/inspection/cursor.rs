use std::collections::hash_map::{self, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{GriplineError, Result};

/// Channel name -> last event id seen by the client on that channel.
///
/// Keys are unique and unordered; equality ignores insertion order. Channel
/// names and event ids are opaque strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LastEventIds(HashMap<String, String>);

impl LastEventIds {
    /// No cursors.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build from pairs, rejecting a channel that appears more than once.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (k, v) in pairs {
            match map.entry(k.into()) {
                hash_map::Entry::Occupied(e) => {
                    return Err(GriplineError::ContractViolation(format!(
                        "duplicate channel in last event ids: {}",
                        e.key()
                    )));
                }
                hash_map::Entry::Vacant(e) => {
                    e.insert(v.into());
                }
            }
        }
        Ok(Self(map))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of channels with a stored id (empty ids included).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Stored event id for a channel, exactly as the producer supplied it.
    pub fn get(&self, channel: &str) -> Option<&str> {
        self.0.get(channel).map(String::as_str)
    }

    /// Resume position for a channel.
    ///
    /// An empty event id carries no position and is reported as `None`, the
    /// same as an absent channel.
    pub fn cursor(&self, channel: &str) -> Option<&str> {
        self.get(channel).filter(|id| !id.is_empty())
    }

    /// `(channel, event id)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for LastEventIds {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

/// Last write wins; use `try_from_pairs` to reject duplicates instead.
impl FromIterator<(String, String)> for LastEventIds {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LastEventIds {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn empty_event_id_has_no_cursor() {
        let ids = LastEventIds::try_from_pairs([("chan-a", ""), ("chan-b", "7")]).unwrap();
        assert_eq!(ids.get("chan-a"), Some(""));
        assert_eq!(ids.cursor("chan-a"), None);
        assert_eq!(ids.cursor("chan-b"), Some("7"));
        assert_eq!(ids.cursor("chan-c"), None);
    }

    #[test]
    fn duplicate_channel_rejected() {
        let err = LastEventIds::try_from_pairs([("a", "1"), ("a", "2")]).expect_err("dup");
        assert_eq!(err.code().as_str(), "CONTRACT_VIOLATION");
    }

    #[test]
    fn serializes_as_plain_object() {
        let ids = LastEventIds::try_from_pairs([("chan-a", "42")]).unwrap();
        let s = serde_json::to_string(&ids).unwrap();
        assert_eq!(s, r#"{"chan-a":"42"}"#);
        let back: LastEventIds = serde_json::from_str(&s).unwrap();
        assert_eq!(back, ids);
    }
}
