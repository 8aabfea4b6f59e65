#![allow(dead_code)]

use std::time::Duration;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use reqwest::Client;
use silicic::config::MonitorConfig;
use silicic::driver::Monitor;
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn dashboard(body: &'static str) -> Router {
    Router::new().route("/", get(move || async move { Html(body) }))
}

pub fn streamlit_dashboard() -> Router {
    dashboard("<html><head><title>Streamlit</title></head><body>app</body></html>")
}

/// Answers `/` only after `delay`.
pub fn slow(delay: Duration) -> Router {
    Router::new().route(
        "/",
        get(move || async move {
            tokio::time::sleep(delay).await;
            "late"
        }),
    )
}

/// Knows no routes, so every request is a 404.
pub fn missing() -> Router {
    Router::new()
}

pub fn config(api: &str, dashboard: &str) -> MonitorConfig {
    MonitorConfig {
        timeout: Duration::from_millis(500),
        statistics_timeout: Duration::from_millis(500),
        emergency_timeout: Duration::from_millis(500),
        ..MonitorConfig::default()
    }
    .with_url("api", api)
    .with_url("dashboard", dashboard)
}

/// Client that talks to the local peers directly, whatever the proxy settings.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

pub fn monitor(config: MonitorConfig) -> Monitor {
    Monitor::with_client(config, client()).unwrap()
}
