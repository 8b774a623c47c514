//! HTTP server settings

use std::time::Duration;

use common::{env, error::ConfigError};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Budget for every downstream call made while serving a request
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Read `HOST` (default `0.0.0.0`), `PORT` (default `80`) and
    /// `REQUEST_TIMEOUT_SECS` (default `5`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::or_default("HOST", "0.0.0.0"),
            port: env::parse_or("PORT", 80)?,
            request_timeout: Duration::from_secs(env::parse_or("REQUEST_TIMEOUT_SECS", 5)?),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
