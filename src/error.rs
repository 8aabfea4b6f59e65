use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no endpoints configured")]
    NoEndpoints,
    #[error("endpoint {0} is configured twice")]
    DuplicateEndpoint(String),
    #[error("endpoint {name} has an invalid url: {reason}")]
    InvalidUrl { name: String, reason: String },
    #[error("failed to build http client")]
    Client(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode report {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
