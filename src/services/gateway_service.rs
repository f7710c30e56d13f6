//! GatewayService — turns archiver REST answers into page models.
//!
//! Every operation makes at most one archiver call, never fails towards its
//! caller, and returns best-effort data together with an optional
//! [`ErrorSet`]. Non-200 answers, unreachable archivers and unparsable bodies
//! all end up in that error set.

use crate::{
    models::{
        params::BucketParams,
        table::{
            BUCKETS_KEY, BUCKETS_NO_DATA_KEY, BUCKETS_NO_DATA_MSG, DisplayTable, ErrorSet,
            FAILED_HEADER, FAILED_HEADER_KEY, FAILED_KEY, FAILED_TITLE, FAILED_TITLE_KEY,
            SUPER_HEADER, SUPER_HEADER_KEY, THAWED_NO_DATA_KEY, THAWED_NO_DATA_MSG, THAWED_TITLE,
            THAWED_TITLE_KEY, header_object,
        },
    },
    services::{
        archiver_client::{
            ArchiverClient, ArchiverError, ArchiverRequest, Endpoint, UpstreamResponse,
        },
        flatten::{flatten, reverse_entries},
    },
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

const NON_200_HEADER: &str = "<h1>Got a NON 200 status code!</h1>";
const UNREACHABLE_HEADER: &str = "<h1>Could not reach the archiver!</h1>";
const MALFORMED_HEADER: &str = "<h1>Got an unreadable response from the archiver!</h1>";
pub const EMPTY_ACTION_RESPONSE: &str = "Error! Got no data as thaw response!";

/// Result of an index listing.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexListing {
    pub indexes: Vec<String>,
    pub errors: Option<ErrorSet>,
}

/// Result of a bucket listing or bucket action.
#[derive(Debug, Clone, PartialEq)]
pub struct TableResult {
    pub tables: DisplayTable,
    pub errors: Option<ErrorSet>,
}

/// Indexes and the unfiltered bucket list, for the archiving overview page.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub indexes: Vec<String>,
    pub tables: DisplayTable,
    pub errors: Option<ErrorSet>,
}

/// Stateless front for the archiver; cheap to clone into every handler.
#[derive(Clone)]
pub struct GatewayService {
    archiver: Arc<dyn ArchiverClient>,
}

impl GatewayService {
    pub fn new(archiver: Arc<dyn ArchiverClient>) -> Self {
        Self { archiver }
    }

    /// All archived indexes, sorted ascending.
    pub async fn list_indexes(&self) -> IndexListing {
        let request = ArchiverRequest::new(Endpoint::ListIndexes);
        let mut indexes = Vec::new();
        let mut errors = None;

        match self.archiver.send(request).await {
            Ok(response) if response.is_ok() => match parse_index_names(&response.body) {
                Ok(names) => indexes = names,
                Err(err) => errors = Some(malformed(&response, &err)),
            },
            Ok(response) => {
                warn!("index listing answered {}", response.status);
                errors = Some(ErrorSet::new([
                    NON_200_HEADER.to_string(),
                    "Index response:".to_string(),
                    response.status_summary(),
                    response.body,
                ]));
            }
            Err(err) => errors = Some(transport_failure(&err)),
        }

        indexes.sort();
        debug!("list_indexes - indexes: {:?}", indexes);

        IndexListing { indexes, errors }
    }

    pub async fn list_buckets(&self, params: &BucketParams) -> TableResult {
        self.list_buckets_at(Endpoint::ListBuckets, params).await
    }

    pub async fn list_thawed(&self, params: &BucketParams) -> TableResult {
        self.list_buckets_at(Endpoint::ListThawed, params).await
    }

    /// Shared listing primitive: GET `endpoint` with `params` as the query.
    pub async fn list_buckets_at(&self, endpoint: Endpoint, params: &BucketParams) -> TableResult {
        debug!("list_buckets at {} - params: {:?}", endpoint, params);

        let request = ArchiverRequest::new(endpoint).with_params(params.to_pairs());
        let mut tables = DisplayTable::new();
        let mut errors = None;

        match self.archiver.send(request).await {
            Ok(response) if response.is_ok() => match parse_object(&response.body) {
                Ok(Some(buckets)) => tables = buckets,
                Ok(None) => {
                    tables.insert(BUCKETS_KEY.into(), Value::Object(Map::new()));
                }
                Err(err) => errors = Some(malformed(&response, &err)),
            },
            Ok(response) => {
                warn!("bucket listing at {} answered {}", endpoint, response.status);
                errors = Some(non_200(response));
            }
            Err(err) => errors = Some(transport_failure(&err)),
        }

        tables.insert(SUPER_HEADER_KEY.into(), header_object(&SUPER_HEADER));
        tables.insert(BUCKETS_NO_DATA_KEY.into(), BUCKETS_NO_DATA_MSG.into());

        debug!("list_buckets - tables: {:?}", tables);

        TableResult { tables, errors }
    }

    pub async fn thaw(&self, params: &BucketParams) -> TableResult {
        self.bucket_action(Endpoint::Thaw, params).await
    }

    pub async fn flush(&self, params: &BucketParams) -> TableResult {
        self.bucket_action(Endpoint::Flush, params).await
    }

    /// Shared action primitive: POST `params` to `endpoint`.
    ///
    /// The archiver lists `failed` before `thawed`; the top-level entries are
    /// reversed so thawed buckets show first, and each failed record is
    /// flattened to match [`FAILED_HEADER`].
    pub async fn bucket_action(&self, endpoint: Endpoint, params: &BucketParams) -> TableResult {
        debug!("bucket action at {} - params: {:?}", endpoint, params);

        let request = ArchiverRequest::new(endpoint).with_params(params.to_pairs());
        let mut tables = DisplayTable::new();
        let mut errors = None;

        match self.archiver.send(request).await {
            Ok(response) if response.is_ok() => match parse_object(&response.body) {
                Ok(Some(data)) if !data.is_empty() => {
                    tables = reverse_entries(data);
                    flatten_failed(&mut tables);
                }
                Ok(_) => {
                    error!("bucket action at {} got OK http response but no data", endpoint);
                    errors = Some(ErrorSet::new([EMPTY_ACTION_RESPONSE]));
                }
                Err(err) => errors = Some(malformed(&response, &err)),
            },
            Ok(response) => {
                warn!("bucket action at {} answered {}", endpoint, response.status);
                errors = Some(non_200(response));
            }
            Err(err) => errors = Some(transport_failure(&err)),
        }

        tables.insert(THAWED_TITLE_KEY.into(), THAWED_TITLE.into());
        tables.insert(FAILED_TITLE_KEY.into(), FAILED_TITLE.into());
        tables.insert(SUPER_HEADER_KEY.into(), header_object(&SUPER_HEADER));
        tables.insert(FAILED_HEADER_KEY.into(), header_object(&FAILED_HEADER));
        tables.insert(THAWED_NO_DATA_KEY.into(), THAWED_NO_DATA_MSG.into());

        debug!("bucket action - tables: {:?}", tables);

        TableResult { tables, errors }
    }

    /// Indexes plus every archived bucket, as one page.
    pub async fn overview(&self) -> Overview {
        let listing = self.list_indexes().await;
        let buckets = self.list_buckets(&BucketParams::default()).await;

        Overview {
            indexes: listing.indexes,
            tables: buckets.tables,
            errors: ErrorSet::merge(listing.errors, buckets.errors),
        }
    }

    /// Probes `index/list`; `Err` carries what went wrong.
    pub async fn archiver_ready(&self) -> Result<(), String> {
        let request = ArchiverRequest::new(Endpoint::ListIndexes);
        match self.archiver.send(request).await {
            Ok(response) if response.is_ok() => Ok(()),
            Ok(response) => Err(format!("archiver answered {}", response.status)),
            Err(err) => Err(err.to_string()),
        }
    }
}

/// Replaces every object in the `failed` list by its flattened form.
fn flatten_failed(tables: &mut DisplayTable) {
    if let Some(Value::Array(failed)) = tables.get_mut(FAILED_KEY) {
        for entry in failed.iter_mut() {
            if let Value::Object(record) = entry {
                let flat = flatten(record, "");
                *entry = Value::Object(flat);
            }
        }
    }
}

/// Index names from an `index/list` body: a list of names, or an object whose
/// keys are the names. An empty body or `null` means no indexes.
fn parse_index_names(body: &str) -> Result<Vec<String>, String> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(body).map_err(|err| err.to_string())? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => name,
                other => other.to_string(),
            })
            .collect()),
        Value::Object(map) => Ok(map.into_iter().map(|(name, _)| name).collect()),
        other => Err(format!("expected a list of indexes, got `{}`", other)),
    }
}

/// Parses a body expected to hold a JSON object, keeping key order.
///
/// `Ok(None)` stands for "no data": an empty body, `null`, or an empty list.
fn parse_object(body: &str) -> Result<Option<Map<String, Value>>, String> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(body).map_err(|err| err.to_string())? {
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(None),
        other => Err(format!("expected a JSON object, got `{}`", other)),
    }
}

fn non_200(response: UpstreamResponse) -> ErrorSet {
    ErrorSet::new([
        NON_200_HEADER.to_string(),
        "Response header:".to_string(),
        response.status_summary(),
        "Response body:".to_string(),
        response.body,
    ])
}

fn transport_failure(err: &ArchiverError) -> ErrorSet {
    error!("archiver call failed: {}", err);
    ErrorSet::new([UNREACHABLE_HEADER.to_string(), err.to_string()])
}

fn malformed(response: &UpstreamResponse, cause: &str) -> ErrorSet {
    error!("archiver answered with an unreadable body: {}", cause);
    ErrorSet::new([
        MALFORMED_HEADER.to_string(),
        format!("Cause: {}", cause),
        "Response body:".to_string(),
        response.body.clone(),
    ])
}
