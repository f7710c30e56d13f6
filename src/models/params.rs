//! Parameters forwarded from the browser to the archiver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter for bucket listings and bucket actions.
///
/// `index`, `from` and `to` are the keys the archiver understands. Anything
/// else the form carries lands in `extra` and is forwarded untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BucketParams {
    /// Index filter; empty or absent means every index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Start of the date range (archiver default: 0001-01-01).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// End of the date range (archiver default: 9999-12-31).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Unrecognized form fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl BucketParams {
    #[cfg(test)]
    pub fn new(
        index: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            index: Some(index.into()),
            from: Some(from.into()),
            to: Some(to.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Key/value pairs sent upstream, known keys first.
    ///
    /// Values are whitespace-trimmed; blank ones are dropped so the archiver
    /// applies its own defaults.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let known = [("index", &self.index), ("from", &self.from), ("to", &self.to)];

        known
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map(|(key, value)| (key, value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}
