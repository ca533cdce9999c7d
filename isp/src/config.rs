use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_COOKIE_DOMAIN: &str = ".neon-images.com";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Mastermind path cannot be empty")]
    EmptyMastermindPath,

    #[error("Mastermind refresh interval cannot be 0")]
    InvalidRefreshInterval,

    #[error("Cookie domain cannot be empty")]
    EmptyCookieDomain,
}

fn default_cookie_domain() -> String {
    DEFAULT_COOKIE_DOMAIN.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

/// Image serving configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Public listener for the image APIs
    pub listener: Listener,
    /// Admin listener for health and readiness checks
    pub admin_listener: Listener,
    /// Domain attribute of every cookie set
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
    pub mastermind: MastermindConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.mastermind.validate()?;

        if self.cookie_domain.is_empty() {
            return Err(ValidationError::EmptyCookieDomain);
        }
        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Where the directive data comes from and how often it is re-read.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MastermindConfig {
    /// JSON-lines file with publisher and directive records
    pub path: PathBuf,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl MastermindConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyMastermindPath);
        }
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::InvalidRefreshInterval);
        }
        Ok(())
    }
}
