use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

pub mod api;
pub mod checker;
pub mod config;
pub mod driver;
pub mod error;
pub mod persist;
pub mod report;
pub mod summary;

/// Path of the statistics resource served next to the API root.
pub const STATISTICS_PATH: &str = "/estadisticas";

/// What an `Endpoint` is expected to serve.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// A JSON API. A healthy root answers with a JSON document.
    Api,
    /// A web page, inspected for a framework marker.
    Dashboard,
}

/// A named URL polled by the monitor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub kind: EndpointKind,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: EndpointKind) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
        }
    }
}

/// Why an endpoint was recorded offline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(into = "String", from = "String")]
pub enum Failure {
    Timeout,
    ConnectionError,
    Http(u16),
    Other(String),
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::ConnectionError => write!(f, "CONNECTION_ERROR"),
            Self::Http(code) => write!(f, "HTTP {code}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl From<Failure> for String {
    fn from(value: Failure) -> Self {
        value.to_string()
    }
}

impl From<String> for Failure {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TIMEOUT" => return Self::Timeout,
            "CONNECTION_ERROR" => return Self::ConnectionError,
            _ => {}
        }
        let code = value
            .strip_prefix("HTTP ")
            .and_then(|code| code.parse::<u16>().ok());
        match code {
            Some(code) => Self::Http(code),
            None => Self::Other(value),
        }
    }
}

/// Outcome of polling one endpoint once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CheckResult {
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Seconds until the response was read, or the timeout that expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_streamlit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl CheckResult {
    pub fn offline(error: Failure, status_code: Option<u16>, response_time: Option<f64>) -> Self {
        Self {
            online: false,
            status_code,
            response_time,
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Body of the API root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub message: String,
    pub status: String,
}

/// Body of the statistics resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    #[serde(rename = "total_evaluaciones", default)]
    pub total_evaluations: Option<u64>,
    #[serde(rename = "puntuacion_promedio", default)]
    pub average_score: Option<f64>,
}

/// One poll cycle over every configured endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub results: BTreeMap<String, CheckResult>,
    pub statistics: Option<Statistics>,
    pub recommendations: Vec<String>,
}

impl Report {
    pub fn online_count(&self) -> usize {
        self.results.values().filter(|result| result.online).count()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Optimal,
    Partial,
    Critical,
}

impl OverallStatus {
    #[must_use]
    pub fn from_counts(online: usize, total: usize) -> Self {
        if online == total {
            Self::Optimal
        } else if online >= 1 {
            Self::Partial
        } else {
            Self::Critical
        }
    }
}

impl Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Partial => write!(f, "partial"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub status: OverallStatus,
    pub online: usize,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

/// A completed cycle of a continuous run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub cycle: u32,
    pub timestamp: DateTime<Utc>,
    pub summary: Summary,
    pub details: BTreeMap<String, CheckResult>,
}

/// Aggregate over a whole run, written next to its history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_cycles: usize,
    pub availability_by_endpoint: BTreeMap<String, f64>,
    pub generation_time: DateTime<Utc>,
}

/// Layout of a persisted report file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedReport {
    pub history: Vec<HistoryEntry>,
    pub summary: RunSummary,
}

/// Display tier of an availability percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityTier {
    Good,
    Fair,
    Poor,
}

impl AvailabilityTier {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 90.0 {
            Self::Good
        } else if percentage > 70.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_status_tiers() {
        assert_eq!(OverallStatus::from_counts(2, 2), OverallStatus::Optimal);
        assert_eq!(OverallStatus::from_counts(1, 2), OverallStatus::Partial);
        assert_eq!(OverallStatus::from_counts(0, 2), OverallStatus::Critical);
    }

    #[test]
    fn failure_strings_survive_serialization() {
        let failures = vec![
            Failure::Timeout,
            Failure::ConnectionError,
            Failure::Http(503),
            Failure::Other("error decoding response body".to_string()),
        ];
        let json = serde_json::to_string(&failures).unwrap();
        assert_eq!(
            json,
            r#"["TIMEOUT","CONNECTION_ERROR","HTTP 503","error decoding response body"]"#
        );
        let parsed: Vec<Failure> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, failures);
    }

    #[test]
    fn malformed_http_failure_is_kept_verbatim() {
        assert_eq!(
            Failure::from("HTTP teapot".to_string()),
            Failure::Other("HTTP teapot".to_string())
        );
    }

    #[test]
    fn availability_tier_boundaries() {
        assert_eq!(AvailabilityTier::from_percentage(100.0), AvailabilityTier::Good);
        assert_eq!(AvailabilityTier::from_percentage(90.0), AvailabilityTier::Fair);
        assert_eq!(AvailabilityTier::from_percentage(70.0), AvailabilityTier::Poor);
        assert_eq!(AvailabilityTier::from_percentage(0.0), AvailabilityTier::Poor);
    }

    #[test]
    fn statistics_use_wire_names() {
        let stats: Statistics =
            serde_json::from_str(r#"{"total_evaluaciones": 12, "puntuacion_promedio": 4.5}"#)
                .unwrap();
        assert_eq!(stats.total_evaluations, Some(12));
        assert_eq!(stats.average_score, Some(4.5));
    }

    #[test]
    fn offline_result_omits_missing_fields() {
        let result = CheckResult::offline(Failure::ConnectionError, None, None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"online": false, "error": "CONNECTION_ERROR"})
        );
    }
}
