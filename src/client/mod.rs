//! Blocking client for the Prometheus range-query API.

use crate::error::{Error, Result};
use crate::tsdb::{Labels, ResultSet, Sample, Series, Timestamp, Value};
use crate::window::TimeWindow;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info, warn};

mod api;


use api::{ApiResponse, RawSeries, Status};

const RANGE_QUERY_PATH: &str = "api/v1/query_range";

/// A range query: the expression is sent to the backend verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeQuery {
    pub expression: String,
    pub window: TimeWindow,
    pub step: Duration,
}

impl RangeQuery {
    /// Builds a query over `window`. Without an explicit step, one is sized
    /// to the window.
    pub fn new(expression: &str, window: TimeWindow, step: Option<Duration>) -> Result<Self> {
        let step = match step {
            Some(step) => window.check_step(step)?,
            None => window.step(),
        };

        Ok(Self {
            expression: expression.to_string(),
            window,
            step,
        })
    }
}

pub struct Client {
    http: reqwest::blocking::Client,
    base: Url,
}

impl Client {
    /// Creates a client for the backend at `base`, which may include a path
    /// prefix. `timeout` replaces the HTTP client's default request timeout.
    pub fn with_timeout(base: &str, timeout: Option<Duration>) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidBackendUrl {
            url: base.to_string(),
            reason,
        };

        let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;

        // reqwest is built without a tls backend
        if url.scheme() != "http" {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }

        if url.cannot_be_a_base() {
            return Err(invalid("not a base url".into()));
        }

        url.set_query(None);
        url.set_fragment(None);

        let mut builder = reqwest::blocking::Client::builder().http1_only();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(Error::BackendUnreachable)?;

        Ok(Self { http, base: url })
    }

    /// The full request URL for `query`.
    pub fn url(&self, query: &RangeQuery) -> Url {
        let mut url = self.base.clone();

        let path = format!("{}/{RANGE_QUERY_PATH}", self.base.path().trim_end_matches('/'));
        url.set_path(&path);

        url.query_pairs_mut()
            .append_pair("query", &query.expression)
            .append_pair("start", &query.window.start().to_string())
            .append_pair("end", &query.window.end().to_string())
            .append_pair("step", &query.step.as_secs_f64().to_string());

        url
    }

    /// Issues the query. There is exactly one attempt; any failure is
    /// returned to the caller.
    pub fn query_range(&self, query: &RangeQuery) -> Result<ResultSet> {
        let url = self.url(query);

        info!("querying {} over {}", self.base, query.window);
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(Error::BackendUnreachable)?;

        let status = response.status();
        let body = response.bytes().map_err(Error::BackendUnreachable)?;

        debug!("response: {status} ({} bytes)", body.len());

        let results = parse_response(status.as_u16(), &body)?;

        for warning in &results.warnings {
            warn!("prometheus: {warning}");
        }

        info!("query returned {} series", results.len());

        Ok(results)
    }
}

/// Runs a single range query against the backend at `base`.
pub fn query(base: &str, timeout: Option<Duration>, query: &RangeQuery) -> Result<ResultSet> {
    Client::with_timeout(base, timeout)?.query_range(query)
}

/// Turns an HTTP status and body into a result set or the backend's error.
pub(crate) fn parse_response(status: u16, body: &[u8]) -> Result<ResultSet> {
    let success = (200..300).contains(&status);

    let response: ApiResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(e) if success => return Err(Error::MalformedResponse(e)),
        Err(_) => {
            return Err(Error::BackendError {
                error_type: format!("http {status}"),
                message: String::from_utf8_lossy(body).trim().to_string(),
            });
        }
    };

    if response.status == Status::Error || !success {
        let error_type = response.error_type.unwrap_or_else(|| {
            if success {
                "error".to_string()
            } else {
                format!("http {status}")
            }
        });

        return Err(Error::BackendError {
            error_type,
            message: response
                .error
                .unwrap_or_else(|| format!("request failed with status {status}")),
        });
    }

    let Some(data) = response.data else {
        let mut results = ResultSet::default();
        results.warnings = response.warnings;
        return Ok(results);
    };

    if let Some(result_type) = data.result_type.as_deref() {
        if result_type != "matrix" && result_type != "vector" {
            debug!("unexpected result type: {result_type}");
        }
    }

    let series = data
        .result
        .into_iter()
        .map(series)
        .collect::<Result<Vec<_>>>()?;

    let mut results = ResultSet::new(series);
    results.warnings = response.warnings;

    Ok(results)
}

fn series(raw: RawSeries) -> Result<Series> {
    let labels = Labels::from(raw.metric);

    let samples = raw
        .values
        .into_iter()
        .chain(raw.value)
        .map(|(timestamp, value)| match Value::parse(&value) {
            Some(v) => Ok(Sample::new(Timestamp::from_secs_f64(timestamp), v)),
            None => Err(Error::MalformedSample {
                series: labels.to_string(),
                value,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Series::new(labels, samples))
}
