use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;

use crate::{CheckResult, Endpoint, EndpointKind, Failure, Statistics};

/// Substring that identifies a Streamlit page, compared case-insensitively.
const STREAMLIT_MARKER: &str = "streamlit";

const DEFAULT_API_MESSAGE: &str = "API operational";

/// Issues single GET requests and folds every outcome into a `CheckResult`.
#[derive(Debug, Clone)]
pub struct Checker {
    client: Client,
}

impl Checker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Polls `endpoint` once. Never retries and never fails: network
    /// errors end up in `CheckResult::error`.
    pub async fn check(&self, endpoint: &Endpoint, timeout: Duration) -> CheckResult {
        let start = Instant::now();
        let response = match self.client.get(&endpoint.url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => return failed(&e, timeout),
        };

        let status = response.status();
        if !status.is_success() {
            return CheckResult::offline(
                Failure::Http(status.as_u16()),
                Some(status.as_u16()),
                Some(start.elapsed().as_secs_f64()),
            );
        }

        let mut result = match endpoint.kind {
            EndpointKind::Api => match response.json::<Value>().await {
                Ok(body) => CheckResult {
                    message: Some(
                        body.get("message")
                            .and_then(Value::as_str)
                            .unwrap_or(DEFAULT_API_MESSAGE)
                            .to_string(),
                    ),
                    ..CheckResult::default()
                },
                Err(e) => return failed(&e, timeout),
            },
            EndpointKind::Dashboard => match response.text().await {
                Ok(body) => CheckResult {
                    is_streamlit: Some(body.to_lowercase().contains(STREAMLIT_MARKER)),
                    size: Some(body.len()),
                    ..CheckResult::default()
                },
                Err(e) => return failed(&e, timeout),
            },
        };
        result.online = true;
        result.status_code = Some(status.as_u16());
        result.response_time = Some(start.elapsed().as_secs_f64());
        result
    }

    /// Fetches the statistics document behind `url`.
    pub async fn statistics(&self, url: &str, timeout: Duration) -> reqwest::Result<Statistics> {
        self.client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Bare status request used when the regular flow has failed.
    pub async fn status_code(&self, url: &str, timeout: Duration) -> reqwest::Result<u16> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }
}

fn failed(error: &reqwest::Error, timeout: Duration) -> CheckResult {
    if error.is_timeout() {
        CheckResult::offline(Failure::Timeout, None, Some(timeout.as_secs_f64()))
    } else if error.is_connect() {
        CheckResult::offline(Failure::ConnectionError, None, None)
    } else {
        CheckResult::offline(Failure::Other(error.to_string()), None, None)
    }
}
