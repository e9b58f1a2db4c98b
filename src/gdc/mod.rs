//! Access to the GDC (Genomic Data Commons) REST API.
//!
//! All queries against the API have the same shape: a list of requested fields, a page
//! size and offset, and a structured filter.  The [`Api`] trait abstracts the transport
//! so the query logic can be exercised without network access, [`HttpApi`] is the
//! blocking `reqwest` implementation used by the command line tool.

pub mod denominators;
pub mod occurrences;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::common::{error::RemoteQueryError, truncate_chars};

/// Base URL of the public GDC API.
pub const DEFAULT_BASE_URL: &str = "https://api.gdc.cancer.gov";
/// Maximal number of characters of an error response body kept in errors.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

/// The GDC API endpoints used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Occurrences of simple somatic mutations in cases.
    SsmOccurrences,
    /// Cases with simple somatic mutation data.
    CaseSsms,
}

impl Endpoint {
    /// Path of the endpoint relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::SsmOccurrences => "ssm_occurrences",
            Endpoint::CaseSsms => "case_ssms",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Structured GDC filter expression.
///
/// Serializes to the `{"op": ..., "content": ...}` JSON form the API expects.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "op", content = "content")]
pub enum Filter {
    /// Conjunction of filters.
    #[serde(rename = "and")]
    And(Vec<Filter>),
    /// Field value must be one of the given values.
    #[serde(rename = "in")]
    In { field: String, value: Vec<String> },
    /// Field value must equal the given value.
    #[serde(rename = "=")]
    Equals { field: String, value: String },
}

impl Filter {
    /// Construct an `in` filter.
    pub fn one_of<I, S>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::In {
            field: field.to_string(),
            value: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Construct an `=` filter.
    pub fn equals(field: &str, value: &str) -> Self {
        Filter::Equals {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Parameters of one structured-filter query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Fields to return for each hit.
    pub fields: Vec<String>,
    /// Page size.
    pub size: usize,
    /// Offset of the first hit to return.
    pub from: usize,
    /// The filter to apply.
    pub filters: Filter,
}

impl QueryParams {
    /// Construct new query parameters starting at offset `0`.
    pub fn new(fields: &[&str], filters: Filter, size: usize) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            size,
            from: 0,
            filters,
        }
    }

    /// Return a copy that starts at the given offset.
    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }
}

/// Transport for GDC queries.
pub trait Api {
    /// Run the query described by `params` against `endpoint`.
    ///
    /// # Returns
    ///
    /// The decoded JSON response body.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be performed, the server answers with a non-success
    /// status, or the body is not JSON.
    fn get(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
    ) -> Result<serde_json::Value, RemoteQueryError>;
}

/// Query string as sent over the wire.
#[serde_with::skip_serializing_none]
#[derive(Debug, serde::Serialize)]
struct WireQuery {
    fields: String,
    size: usize,
    from: Option<usize>,
    filters: String,
}

/// Blocking HTTP implementation of [`Api`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    /// The reused HTTP client.
    client: reqwest::blocking::Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl HttpApi {
    /// Create a new client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, anyhow::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| anyhow::anyhow!("problem creating HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Api for HttpApi {
    fn get(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
    ) -> Result<serde_json::Value, RemoteQueryError> {
        let transport_err = |message: String| RemoteQueryError::Transport {
            endpoint: endpoint.to_string(),
            message,
        };

        let wire = WireQuery {
            fields: params.fields.join(","),
            size: params.size,
            from: (params.from > 0).then_some(params.from),
            filters: serde_json::to_string(&params.filters)
                .map_err(|e| transport_err(format!("problem encoding filters: {}", e)))?,
        };
        let url = format!("{}/{}", self.base_url, endpoint.path());
        tracing::trace!("GET {} {:?}", &url, &wire);

        let response = self
            .client
            .get(&url)
            .query(&wire)
            .send()
            .map_err(|e| transport_err(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| transport_err(format!("problem reading body: {}", e)))?;

        if !status.is_success() {
            return Err(RemoteQueryError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate_chars(&text, MAX_ERROR_BODY_CHARS).to_string(),
            });
        }

        serde_json::from_str(&text).map_err(|e| RemoteQueryError::Malformed {
            endpoint: endpoint.to_string(),
            message: format!("body is not JSON: {}", e),
        })
    }
}

/// The `data` envelope all GDC responses are wrapped in.
#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Pagination metadata of a GDC response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct Pagination {
    /// Total number of records matching the query.
    pub total: usize,
}

/// Run a structured-filter query and decode its `data` member as `T`.
///
/// # Errors
///
/// Transport and status errors of `api` are passed through; a body lacking the structure
/// of `T` results in `RemoteQueryError::Malformed`.
pub fn query<A, T>(api: &A, endpoint: Endpoint, params: &QueryParams) -> Result<T, RemoteQueryError>
where
    A: Api + ?Sized,
    T: DeserializeOwned,
{
    let body = api.get(endpoint, params)?;
    let envelope: Envelope<T> =
        serde_json::from_value(body).map_err(|e| RemoteQueryError::Malformed {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
    Ok(envelope.data)
}

/// In-memory [`Api`] implementation for tests.
#[cfg(test)]
pub mod testing {
    use std::{cell::RefCell, time::Instant};

    use crate::common::error::RemoteQueryError;

    use super::{Api, Endpoint, QueryParams};

    /// Handler computing the response for one request.
    type Handler = dyn Fn(Endpoint, &QueryParams) -> Result<serde_json::Value, RemoteQueryError>;

    /// Fake API that answers from a handler and records all requests.
    pub struct FakeApi {
        handler: Box<Handler>,
        calls: RefCell<Vec<(Endpoint, QueryParams, Instant)>>,
    }

    impl FakeApi {
        /// Create with the given response handler.
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(Endpoint, &QueryParams) -> Result<serde_json::Value, RemoteQueryError>
                + 'static,
        {
            Self {
                handler: Box::new(handler),
                calls: RefCell::new(Vec::new()),
            }
        }

        /// All requests seen so far.
        pub fn calls(&self) -> Vec<(Endpoint, QueryParams)> {
            self.calls
                .borrow()
                .iter()
                .map(|(endpoint, params, _)| (*endpoint, params.clone()))
                .collect()
        }

        /// Time at which each request was received, in order.
        pub fn call_times(&self) -> Vec<(Endpoint, Instant)> {
            self.calls
                .borrow()
                .iter()
                .map(|(endpoint, _, at)| (*endpoint, *at))
                .collect()
        }

        /// Number of requests seen so far for `endpoint`.
        pub fn count(&self, endpoint: Endpoint) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|(e, _, _)| *e == endpoint)
                .count()
        }
    }

    impl Api for FakeApi {
        fn get(
            &self,
            endpoint: Endpoint,
            params: &QueryParams,
        ) -> Result<serde_json::Value, RemoteQueryError> {
            self.calls
                .borrow_mut()
                .push((endpoint, params.clone(), Instant::now()));
            (self.handler)(endpoint, params)
        }
    }

    /// Build a `Status` error as the HTTP transport would.
    pub fn status_error(endpoint: Endpoint, status: u16) -> RemoteQueryError {
        RemoteQueryError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: "{\"message\": \"internal error\"}".to_string(),
        }
    }
}
