//! HTTP client for the remote classifier.

use async_trait::async_trait;
use base64::Engine;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::wire::{decode_prediction, HealthResponse, PredictRequest};
use super::Classifier;
use crate::config::ClientConfig;
use crate::constants::{HEALTHY_STATUS, HEALTH_PATH, PREDICT_PATH};
use crate::error::ClassificationFailure;
use crate::sample::PredictionSample;
use crate::{Error, Result};

/// Classifier reached over HTTP.
///
/// Stateless apart from the connection pool; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    predict_url: reqwest::Url,
    health_url: reqwest::Url,
    config: ClientConfig,
}

fn transport_failure(err: reqwest::Error) -> ClassificationFailure {
    if err.is_timeout() {
        ClassificationFailure::Timeout
    } else {
        ClassificationFailure::Transport {
            message: err.to_string(),
        }
    }
}

impl ClassifierClient {
    /// Create a client for the classifier described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let predict_url = config.endpoint(PREDICT_PATH)?;
        let health_url = config.endpoint(HEALTH_PATH)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::InvalidConfig {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            predict_url,
            health_url,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Submit one encoded frame for classification.
    ///
    /// Bounded by the configured classification timeout. Never retries.
    pub async fn classify(&self, frame: &[u8]) -> std::result::Result<PredictionSample, ClassificationFailure> {
        if frame.is_empty() {
            return Err(ClassificationFailure::Transport {
                message: "refusing to send an empty frame".to_string(),
            });
        }

        let image = base64::engine::general_purpose::STANDARD.encode(frame);
        let started = Instant::now();

        let request = async {
            let response = self
                .http
                .post(self.predict_url.clone())
                .json(&PredictRequest { image: &image })
                .send()
                .await
                .map_err(transport_failure)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(transport_failure)?;
            decode_prediction(status, &body)
        };

        let result = match tokio::time::timeout(self.config.classify_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ClassificationFailure::Timeout),
        };

        trace!(
            frame_len = frame.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Classification finished"
        );
        result
    }

    /// Check whether the backend reports itself healthy.
    pub async fn probe_health(&self) -> bool {
        let probe = async {
            let response = self
                .http
                .get(self.health_url.clone())
                .send()
                .await
                .ok()?
                .error_for_status()
                .ok()?;
            let health: HealthResponse = response.json().await.ok()?;
            Some(health.status)
        };

        match tokio::time::timeout(self.config.health_timeout, probe).await {
            Ok(Some(status)) => {
                debug!(url = %self.health_url, status = %status, "Health probe answered");
                status == HEALTHY_STATUS
            }
            Ok(None) => {
                debug!(url = %self.health_url, "Health probe failed");
                false
            }
            Err(_) => {
                debug!(url = %self.health_url, "Health probe timed out");
                false
            }
        }
    }
}

#[async_trait]
impl Classifier for ClassifierClient {
    async fn classify(&self, frame: &[u8]) -> std::result::Result<PredictionSample, ClassificationFailure> {
        ClassifierClient::classify(self, frame).await
    }

    async fn probe_health(&self) -> bool {
        ClassifierClient::probe_health(self).await
    }

    fn endpoint(&self) -> String {
        self.config.base_url.clone()
    }
}
