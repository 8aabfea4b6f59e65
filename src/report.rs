use std::collections::BTreeMap;

use chrono::Utc;
use tracing::warn;

use crate::checker::Checker;
use crate::config::MonitorConfig;
use crate::{CheckResult, Endpoint, EndpointKind, Failure, Report, Statistics};

/// Checks every configured endpoint in order and assembles a `Report`.
///
/// `observe` is called once per endpoint as soon as its result is known,
/// together with the statistics fetched for it, if any.
pub async fn generate<F>(checker: &Checker, config: &MonitorConfig, mut observe: F) -> Report
where
    F: FnMut(&Endpoint, &CheckResult, Option<&Statistics>),
{
    let timestamp = Utc::now();
    let mut results = BTreeMap::new();
    let mut statistics = None;
    let mut recommendations = Vec::new();

    for endpoint in &config.endpoints {
        let result = checker.check(endpoint, config.timeout).await;

        let fetched = if result.online && endpoint.kind == EndpointKind::Api {
            fetch_statistics(checker, config, endpoint).await
        } else {
            None
        };
        observe(endpoint, &result, fetched.as_ref());
        if fetched.is_some() {
            statistics = fetched;
        }

        recommendations.extend(recommendation(&endpoint.name, &result));
        results.insert(endpoint.name.clone(), result);
    }

    Report {
        timestamp,
        results,
        statistics,
        recommendations,
    }
}

async fn fetch_statistics(
    checker: &Checker,
    config: &MonitorConfig,
    endpoint: &Endpoint,
) -> Option<Statistics> {
    let url = config.statistics_url(endpoint);
    match checker.statistics(&url, config.statistics_timeout).await {
        Ok(statistics) => Some(statistics),
        Err(e) => {
            warn!(endpoint = %endpoint.name, %url, error = %e, "statistics unavailable");
            None
        }
    }
}

/// Bare status of every endpoint for when the regular flow has failed.
/// `None` means the endpoint did not answer within the emergency timeout.
pub async fn emergency(checker: &Checker, config: &MonitorConfig) -> Vec<(String, Option<u16>)> {
    let mut statuses = Vec::with_capacity(config.endpoints.len());
    for endpoint in &config.endpoints {
        let status = match checker.status_code(&endpoint.url, config.emergency_timeout).await {
            Ok(code) => Some(code),
            Err(e) => {
                warn!(endpoint = %endpoint.name, error = %e, "emergency check failed");
                None
            }
        };
        statuses.push((endpoint.name.clone(), status));
    }
    statuses
}

/// Advice for failure patterns with a known cause.
pub fn recommendation(name: &str, result: &CheckResult) -> Option<String> {
    if result.online {
        return None;
    }
    match (&result.error, result.status_code) {
        (Some(Failure::Timeout), _) => Some(format!(
            "{name}: probably sleeping (free tier). Wait ~50s and retry."
        )),
        (_, Some(404)) => Some(format!("{name}: wrong URL or service not deployed.")),
        _ => None,
    }
}
