//! Transports for the contact form.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use shared::{
    domain::{ContactSubmission, SubmissionReceipt},
    error::SubmissionError,
};
use tracing::{debug, info};
use url::Url;

use crate::config::SubmissionSettings;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Accepts every submission after a fixed delay. Stands in for a backend during demos.
pub struct SimulatedSubmitter {
    latency: Duration,
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        tokio::time::sleep(self.latency).await;
        debug!(submission_id = %submission.submission_id, "simulated submission accepted");
        Ok(SubmissionReceipt {
            submission_id: submission.submission_id,
            accepted_at: Utc::now(),
        })
    }
}

pub struct HttpSubmitter {
    client: Client,
    endpoint: Url,
}

impl HttpSubmitter {
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build submission http client")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(
        &self,
        submission: &ContactSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(submission)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        // Endpoints may answer 204 or a body that is not a receipt; the id is ours either way.
        let body = response.bytes().await.map_err(classify_transport_error)?;
        let receipt = serde_json::from_slice::<SubmissionReceipt>(&body).unwrap_or(SubmissionReceipt {
            submission_id: submission.submission_id,
            accepted_at: Utc::now(),
        });
        info!(
            submission_id = %submission.submission_id,
            endpoint = %self.endpoint,
            "submission accepted by endpoint"
        );
        Ok(receipt)
    }
}

fn classify_transport_error(err: reqwest::Error) -> SubmissionError {
    if err.is_timeout() {
        SubmissionError::Timeout
    } else {
        SubmissionError::network(err.to_string())
    }
}

/// Chooses the HTTP transport when asked to and an endpoint is configured.
pub fn submitter_from_settings(
    settings: &SubmissionSettings,
    prefer_http: bool,
) -> anyhow::Result<Arc<dyn Submitter>> {
    if prefer_http {
        if let Some(endpoint) = settings.endpoint_url()? {
            info!(%endpoint, "using http submission transport");
            return Ok(Arc::new(HttpSubmitter::new(endpoint, settings.timeout())?));
        }
        info!("no submission endpoint configured; falling back to simulated transport");
    }
    Ok(Arc::new(SimulatedSubmitter::new(settings.simulated_latency())))
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
