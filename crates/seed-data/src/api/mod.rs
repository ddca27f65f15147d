//! Triggers seeding on a running dashboard server.
//!
//! Useful when the database is only reachable from the server, e.g. behind
//! a managed connection proxy.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::db::SeedSummary;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Seeding failed: {0}")]
    SeedFailed(String),
    #[error("Backend not reachable at {0}")]
    BackendNotReachable(String),
}

/// Body of a successful `GET /seed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub message: String,
    pub summary: SeedSummary,
}

/// Body of a failed `GET /seed`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP client for the dashboard's seed endpoint.
pub struct ApiSeeder {
    client: Client,
    base_url: String,
}

impl ApiSeeder {
    /// Creates a new API seeder for the given backend URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Checks if the backend is reachable.
    pub async fn check_health(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(ApiError::BackendNotReachable(format!(
                "{} (health check returned status {})",
                self.base_url,
                resp.status()
            ))),
            Err(e) => Err(ApiError::BackendNotReachable(format!("{}: {e}", self.base_url))),
        }
    }

    /// Calls `GET /seed` and returns the server's summary.
    pub async fn trigger_seed(&self) -> Result<SeedResponse, ApiError> {
        let url = format!("{}/seed", self.base_url);
        debug!("Triggering seed at {url}");

        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ApiError::SeedFailed(format!("Status {status}: {reason}")));
        }

        Ok(resp.json().await?)
    }
}
