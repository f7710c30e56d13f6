#![allow(dead_code)]
//! Represents an archived bucket as reported by the archiver service.

use serde::{Deserialize, Serialize};

/// A bucket of archived index data.
///
/// The gateway keeps archiver payloads as ordered JSON so unknown fields
/// survive; this type documents the wire shape and builds fixtures.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Name of the bucket directory in the archive.
    pub bucket_name: String,

    /// Index the bucket belongs to.
    pub index_name: String,

    /// Storage format of the archived bucket (e.g. "SPLUNK_BUCKET", "CSV").
    pub format: String,

    /// Earliest event date in the bucket.
    pub from_date: String,

    /// Latest event date in the bucket.
    pub to_date: String,

    /// Human-readable size.
    pub size: String,

    /// Location of the bucket in the archive file system.
    pub uri: String,
}

/// A bucket the archiver could not thaw or flush, with the reason why.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FailedBucket {
    pub bucket: Bucket,
    pub reason: String,
}
