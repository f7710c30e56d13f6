//! Outbound calls to the archiver REST API.
//!
//! [`ArchiverClient`] is the seam between the gateway and the network: the
//! gateway builds an [`ArchiverRequest`], the client turns it into one HTTP
//! call and hands back status, headers and the raw body. Interpreting the
//! body is the gateway's job.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use std::{fmt, time::Duration};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Archiver endpoints used by the gateway, relative to the REST base URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    ListIndexes,
    ListBuckets,
    ListThawed,
    Thaw,
    Flush,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::ListIndexes => "index/list",
            Endpoint::ListBuckets => "bucket/list",
            Endpoint::ListThawed => "thaw/list",
            Endpoint::Thaw => "bucket/thaw",
            Endpoint::Flush => "bucket/flush",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::ListIndexes | Endpoint::ListBuckets | Endpoint::ListThawed => Method::GET,
            Endpoint::Thaw | Endpoint::Flush => Method::POST,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// One call to the archiver. GET params become the query string, POST params
/// a form-urlencoded body.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiverRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
}

impl ArchiverRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }
}

/// What the archiver answered, body still unparsed.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl UpstreamResponse {
    #[cfg(test)]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Status line followed by the response headers, for error reports.
    pub fn status_summary(&self) -> String {
        let mut summary = format!("status: {}", self.status);
        for (name, value) in &self.headers {
            summary.push_str(&format!(", {}: {}", name, value));
        }
        summary
    }
}

#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("could not build archiver URL for `{endpoint}`: {source}")]
    InvalidUrl {
        endpoint: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("archiver request to `{url}` failed: {reason}")]
    Transport { url: String, reason: String },
}

pub type ArchiverResult<T> = Result<T, ArchiverError>;

#[async_trait]
pub trait ArchiverClient: Send + Sync {
    async fn send(&self, request: ArchiverRequest) -> ArchiverResult<UpstreamResponse>;
}

/// Production client talking HTTP to the archiver.
#[derive(Clone, Debug)]
pub struct HttpArchiverClient {
    http: Client,
    base_url: Url,
}

impl HttpArchiverClient {
    /// Create a client for the REST API rooted at `base_url`.
    ///
    /// Every call is bounded by `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("bucket-gateway/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    fn url_for(&self, endpoint: Endpoint) -> ArchiverResult<Url> {
        self.base_url
            .join(endpoint.path())
            .map_err(|source| ArchiverError::InvalidUrl {
                endpoint: endpoint.path(),
                source,
            })
    }
}

#[async_trait]
impl ArchiverClient for HttpArchiverClient {
    async fn send(&self, request: ArchiverRequest) -> ArchiverResult<UpstreamResponse> {
        let url = self.url_for(request.endpoint)?;
        debug!("archiver call {} -> {}", request.endpoint, url);

        let builder = self.http.request(request.endpoint.method(), url.clone());
        let builder = if request.endpoint.method() == Method::GET {
            builder.query(&request.params)
        } else {
            builder.form(&request.params)
        };

        let transport = |err: reqwest::Error| {
            let reason = if err.is_timeout() {
                "request timed out".to_string()
            } else if err.is_connect() {
                format!("connection failed: {}", err)
            } else {
                err.to_string()
            };
            ArchiverError::Transport {
                url: url.to_string(),
                reason,
            }
        };

        let response = builder.send().await.map_err(&transport)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(&transport)?;

        debug!("archiver answered {} with {} bytes", status, body.len());

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub mod fake {
    //! In-memory archiver used by gateway and handler tests.

    use super::*;
    use std::{
        collections::{HashMap, VecDeque},
        sync::{Arc, Mutex},
    };

    enum Reply {
        Response(UpstreamResponse),
        Unreachable,
    }

    /// Replays canned replies per endpoint and records every request.
    #[derive(Clone, Default)]
    pub struct FakeArchiver {
        replies: Arc<Mutex<HashMap<&'static str, VecDeque<Reply>>>>,
        requests: Arc<Mutex<Vec<ArchiverRequest>>>,
    }

    impl FakeArchiver {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a reply for the next call to `endpoint`.
        pub fn respond(self, endpoint: Endpoint, status: u16, body: &str) -> Self {
            let status = StatusCode::from_u16(status).unwrap();
            self.push(endpoint, Reply::Response(UpstreamResponse::new(status, body)));
            self
        }

        /// Make the next call to `endpoint` fail like a refused connection.
        pub fn unreachable(self, endpoint: Endpoint) -> Self {
            self.push(endpoint, Reply::Unreachable);
            self
        }

        pub fn requests(&self) -> Vec<ArchiverRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn push(&self, endpoint: Endpoint, reply: Reply) {
            self.replies
                .lock()
                .unwrap()
                .entry(endpoint.path())
                .or_default()
                .push_back(reply);
        }
    }

    #[async_trait]
    impl ArchiverClient for FakeArchiver {
        async fn send(&self, request: ArchiverRequest) -> ArchiverResult<UpstreamResponse> {
            let endpoint = request.endpoint;
            self.requests.lock().unwrap().push(request);

            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(endpoint.path())
                .and_then(VecDeque::pop_front);

            match reply {
                Some(Reply::Response(response)) => Ok(response),
                Some(Reply::Unreachable) | None => Err(ArchiverError::Transport {
                    url: format!("http://archiver.test/{}", endpoint.path()),
                    reason: "connection failed: connection refused".into(),
                }),
            }
        }
    }
}
