//! Template-facing structures produced by the gateway.
//!
//! The renderer walks [`DisplayTable`] in insertion order, so everything here
//! is built on `serde_json`'s order-preserving map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping of section data, headers, titles and messages.
pub type DisplayTable = Map<String, Value>;

/// Column name → display label for bucket tables.
pub const SUPER_HEADER: [(&str, &str); 7] = [
    ("bucketName", "Name"),
    ("indexName", "Index"),
    ("format", "Format"),
    ("fromDate", "From"),
    ("toDate", "To"),
    ("size", "Size"),
    ("uri", "URI"),
];

/// Column name → display label for flattened failed buckets.
pub const FAILED_HEADER: [(&str, &str); 8] = [
    ("bucket_bucketName", "Name"),
    ("reason", "Reason"),
    ("bucket_format", "Format"),
    ("bucket_fromDate", "From"),
    ("bucket_toDate", "To"),
    ("bucket_size", "Size"),
    ("bucket_uri", "URI"),
    ("bucket_indexName", "Index"),
];

pub const SUPER_HEADER_KEY: &str = "SUPER_HEADER";
pub const FAILED_HEADER_KEY: &str = "failed_HEADER";
pub const BUCKETS_KEY: &str = "buckets";
pub const BUCKETS_NO_DATA_KEY: &str = "buckets_NO_DATA_MSG";
pub const BUCKETS_NO_DATA_MSG: &str = "No buckets in that range!";
pub const FAILED_KEY: &str = "failed";
pub const THAWED_TITLE_KEY: &str = "thawed_TITLE";
pub const THAWED_TITLE: &str = "Thawed buckets:";
pub const FAILED_TITLE_KEY: &str = "failed_TITLE";
pub const FAILED_TITLE: &str = "Failed buckets:";
pub const THAWED_NO_DATA_KEY: &str = "thawed_NO_DATA_MSG";
pub const THAWED_NO_DATA_MSG: &str = "No buckets to thaw!";

/// Builds an ordered JSON object from a fixed header table.
pub fn header_object(entries: &[(&str, &str)]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(column, label)| (column.to_string(), Value::String(label.to_string())))
            .collect(),
    )
}

/// Ordered, human-readable error lines. Some entries are HTML snippets.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ErrorSet(Vec<String>);

impl ErrorSet {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(lines.into_iter().map(Into::into).collect())
    }

    /// Concatenates two optional error sets, keeping `None` when both are.
    pub fn merge(first: Option<Self>, second: Option<Self>) -> Option<Self> {
        match (first, second) {
            (Some(mut a), Some(b)) => {
                a.0.extend(b.0);
                Some(a)
            }
            (a, b) => a.or(b),
        }
    }
}

#[cfg(test)]
impl ErrorSet {
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// True if any line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|line| line.contains(needle))
    }
}

/// Templates the page models are meant for.
pub mod templates {
    pub const THAW: &str = "thaw.html";
    pub const FLUSHING: &str = "flushing.html";
    pub const INDEX_LIST: &str = "index_list.html";
    pub const BUCKET_LIST: &str = "bucket_list.html";
    pub const ARCHIVING: &str = "archiving.html";
}

/// Everything a template needs to render one page.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Page {
    pub template: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<DisplayTable>,

    pub errors: Option<ErrorSet>,
}

impl Page {
    /// A page with no data, only a template and no errors.
    pub fn shell(template: &str) -> Self {
        Self {
            template: template.to_string(),
            indexes: None,
            tables: None,
            errors: None,
        }
    }
}
