//! Prediction API Client
//!
//! HTTP client for the Insurance Prediction API.

use std::time::Duration;

use prediction_core::{EngineStatus, HealthStatus, PredictionResult, RawRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Prediction API client
pub struct PredictionClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
}

#[derive(Debug, Serialize)]
struct BatchPredictRequest<'a> {
    data: &'a [RawRecord],
}

#[derive(Debug, Deserialize)]
struct BatchPredictResponse {
    predictions: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    field: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Could not connect to the API at {url}. Make sure it is running ({message})")]
    Connection { url: String, message: String },

    #[error("The API did not answer in time")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl PredictionClient {
    /// Create new client
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    /// Check server health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.url("/health");
        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        read_json(response).await
    }

    /// Predict a single record
    pub async fn predict(&self, record: &RawRecord) -> Result<PredictionResult, ClientError> {
        let url = self.url("/predict");
        log::debug!("POST {} {:?}", url, record);

        let response = self.http_client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        read_json(response).await
    }

    /// Predict a batch of records
    pub async fn predict_batch(&self, records: &[RawRecord]) -> Result<Vec<u8>, ClientError> {
        let url = self.url("/predict_batch");
        log::debug!("POST {} ({} records)", url, records.len());

        let response = self.http_client
            .post(&url)
            .json(&BatchPredictRequest { data: records })
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let body: BatchPredictResponse = read_json(response).await?;
        Ok(body.predictions)
    }

    /// Fetch model/engine status
    pub async fn model_status(&self) -> Result<EngineStatus, ClientError> {
        let url = self.url("/model");
        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        read_json(response).await
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.api_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        response.json().await
            .map_err(|e| ClientError::Parse(e.to_string()))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &body))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else if err.is_connect() {
        ClientError::Connection {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else {
        ClientError::Network(err.to_string())
    }
}

/// Build an `Api` error from a non-success response body
pub fn api_error(status: u16, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => match err.field {
            Some(field) => format!("{} [field: {}]", err.error, field),
            None => err.error,
        },
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    };

    ClientError::Api { status, message }
}
