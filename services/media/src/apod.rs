//! NASA Astronomy Picture of the Day client

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{env, error::ConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ApodError {
    #[error("APOD request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("APOD API returned {0}")]
    Status(u16),

    #[error("APOD returned an unreadable date: {0}")]
    InvalidDate(String),
}

/// Picture of the day as returned by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodResponse {
    pub copyright: Option<String>,
    pub date: String,
    #[serde(default)]
    pub explanation: String,
    pub hdurl: Option<String>,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub service_version: String,
    pub title: String,
    pub url: String,
}

#[async_trait]
pub trait ApodClient: Send + Sync {
    async fn picture(&self, date: NaiveDate) -> Result<ApodResponse, ApodError>;
}

#[derive(Debug, Clone)]
pub struct ApodConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ApodConfig {
    /// Read `NASA_API_KEY` (required) and `NASA_API_URL`
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ApodConfig {
            api_key: env::required("NASA_API_KEY")?,
            base_url: env::or_default("NASA_API_URL", "https://api.nasa.gov/"),
        })
    }
}

/// HTTP client for `GET {base}/planetary/apod`
#[derive(Debug, Clone)]
pub struct NasaApodClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl NasaApodClient {
    pub fn new(config: &ApodConfig) -> Result<Self, ApodError> {
        let http = reqwest::Client::builder()
            .timeout(TRANSPORT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/planetary/apod", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ApodClient for NasaApodClient {
    async fn picture(&self, date: NaiveDate) -> Result<ApodResponse, ApodError> {
        let date = date.format("%Y-%m-%d").to_string();
        info!("Fetching picture of the day for {}", date);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str()), ("date", date.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("APOD API returned {} for {}", status, date);
            return Err(ApodError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}
