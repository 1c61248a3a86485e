//! HTTP client for the claim-analysis backend.
//!
//! One JSON POST per claim, no retries and no client-side timeout. Failures
//! come back as [`ApiError`] so callers can tell an unreachable backend from
//! one that answered with an error.

use crate::schema::{InvestigationRequest, InvestigationResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

pub const INVESTIGATE_PATH: &str = "/api/debating";
pub const HEALTH_PATH: &str = "/health";

/// Status reported when no HTTP response was received at all.
pub const TRANSPORT_STATUS: u16 = 500;

const GENERIC_FAILURE: &str = "Investigation failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Backend answered with a non-2xx status.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// The request never completed (connection refused, DNS, reset...).
    #[error("{message}")]
    Transport { message: String },

    /// Backend answered 2xx but the body is not a valid result.
    #[error("{message}")]
    MalformedResponse { status: u16, message: String },
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Application { status, .. } => *status,
            ApiError::Transport { .. } => TRANSPORT_STATUS,
            ApiError::MalformedResponse { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Application { message, .. }
            | ApiError::Transport { message }
            | ApiError::MalformedResponse { message, .. } => message,
        }
    }
}

/// Anything that can turn a claim into an [`InvestigationResult`].
#[async_trait]
pub trait Investigator: Send + Sync {
    async fn investigate(&self, claim: &str) -> Result<InvestigationResult, ApiError>;
}

pub struct InvestigationClient {
    base_url: String,
    http: reqwest::Client,
}

impl InvestigationClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(concat!("truthlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self) -> ApiError {
        ApiError::Transport {
            message: format!(
                "Network error. Please check if the backend is running at {}.",
                self.base_url
            ),
        }
    }

    /// True when `GET /health` answers 2xx. Never errors.
    pub async fn health_check(&self) -> bool {
        match self.http.get(self.endpoint(HEALTH_PATH)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "health check failed");
                false
            }
        }
    }
}

#[async_trait]
impl Investigator for InvestigationClient {
    async fn investigate(&self, claim: &str) -> Result<InvestigationResult, ApiError> {
        let url = self.endpoint(INVESTIGATE_PATH);
        debug!(%url, "submitting claim");

        let request = InvestigationRequest {
            claim: claim.to_string(),
        };
        let response = self.http.post(&url).json(&request).send().await.map_err(|err| {
            warn!(error = %err, "investigation request did not complete");
            self.transport_error()
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            warn!(error = %err, "investigation response body was cut off");
            self.transport_error()
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "backend responded");

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| GENERIC_FAILURE.to_string());
            return Err(ApiError::Application {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|err| ApiError::MalformedResponse {
            status: status.as_u16(),
            message: format!("Malformed investigation response: {err}"),
        })
    }
}

/// Pulls a non-empty string `detail` out of an error body, if there is one.
fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: Value = serde_json::from_slice(body).ok()?;
    parsed
        .get("detail")
        .and_then(|value| value.as_str())
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}
