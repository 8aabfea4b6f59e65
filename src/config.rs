use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::{Endpoint, EndpointKind, STATISTICS_PATH};

pub const DEFAULT_API_URL: &str = "https://silicic-api.onrender.com";
pub const DEFAULT_DASHBOARD_URL: &str = "https://silicic-dashboard.onrender.com";

/// Everything the monitor needs for a run. Fixed once the run starts.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub endpoints: Vec<Endpoint>,
    /// Timeout of the per-endpoint check.
    pub timeout: Duration,
    /// Timeout of the statistics request that follows a healthy API check.
    pub statistics_timeout: Duration,
    /// Timeout of the last-resort request after an unexpected failure.
    pub emergency_timeout: Duration,
    pub statistics_path: String,
    pub report_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                Endpoint::new("api", DEFAULT_API_URL, EndpointKind::Api),
                Endpoint::new("dashboard", DEFAULT_DASHBOARD_URL, EndpointKind::Dashboard),
            ],
            timeout: Duration::from_secs(30),
            statistics_timeout: Duration::from_secs(15),
            emergency_timeout: Duration::from_secs(10),
            statistics_path: STATISTICS_PATH.to_string(),
            report_dir: PathBuf::from("."),
        }
    }
}

impl MonitorConfig {
    /// Points the endpoint called `name` somewhere else. Unknown names are ignored.
    #[must_use]
    pub fn with_url(mut self, name: &str, url: impl Into<String>) -> Self {
        if let Some(endpoint) = self.endpoints.iter_mut().find(|e| e.name == name) {
            endpoint.url = url.into();
        }
        self
    }

    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            if !seen.insert(endpoint.name.as_str()) {
                return Err(ConfigError::DuplicateEndpoint(endpoint.name.clone()));
            }
            Url::parse(&endpoint.url).map_err(|e| ConfigError::InvalidUrl {
                name: endpoint.name.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// URL of the statistics resource belonging to an API endpoint.
    pub fn statistics_url(&self, endpoint: &Endpoint) -> String {
        format!(
            "{}{}",
            endpoint.url.trim_end_matches('/'),
            self.statistics_path
        )
    }
}
