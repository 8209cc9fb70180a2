use serde::Deserialize;
use std::collections::HashMap;

/// Envelope of every Prometheus HTTP API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub status: Status,
    #[serde(default)]
    pub data: Option<QueryData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Deserialize)]
pub struct QueryData {
    #[serde(default, rename = "resultType")]
    pub result_type: Option<String>,
    #[serde(default)]
    pub result: Vec<RawSeries>,
}

/// One element of `data.result`. Range queries fill `values`; instant-style
/// results carry a single `value` instead.
#[derive(Debug, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, String)>,
    #[serde(default)]
    pub value: Option<(f64, String)>,
}
