use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

use crate::error::NetwError;

pub const DEFAULT_BASE_URL: &str = "https://snaic.netw.fr/api/1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub demo_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source (env, .env map, tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(v) = lookup("NETW_API_BASE_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Some(v) = lookup("NETW_CLIENT_ID") {
            self.api.client_id = v;
        }
        if let Some(v) = lookup("NETW_CLIENT_SECRET") {
            self.api.client_secret = v;
        }
        if let Some(v) = lookup("NETW_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        // Session overrides
        if let Some(v) = lookup("NETW_ACCESS_TOKEN_TTL_HOURS") {
            self.session.access_token_ttl_hours = v.parse().unwrap_or(self.session.access_token_ttl_hours);
        }
        if let Some(v) = lookup("NETW_REFRESH_TOKEN_TTL_DAYS") {
            self.session.refresh_token_ttl_days = v.parse().unwrap_or(self.session.refresh_token_ttl_days);
        }

        if let Some(v) = lookup("NETW_DEMO_MODE") {
            self.demo_mode = matches!(v.as_str(), "true" | "1" | "yes");
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                client_id: String::new(),
                client_secret: String::new(),
                request_timeout_secs: 30,
            },
            session: SessionConfig {
                access_token_ttl_hours: 24,
                refresh_token_ttl_days: 7,
            },
            demo_mode: false,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                request_timeout_secs: 15,
                ..Self::development().api
            },
            ..Self::development()
        }
    }

    /// Validated base URL of the remote API
    pub fn base_url(&self) -> Result<Url, NetwError> {
        Url::parse(&self.api.base_url)
            .map_err(|e| NetwError::Config(format!("invalid NETW_API_BASE_URL '{}': {}", self.api.base_url, e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn access_token_ttl(&self) -> Result<chrono::Duration, NetwError> {
        let hours = self.session.access_token_ttl_hours;
        chrono::Duration::try_hours(hours)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| NetwError::Config(format!("NETW_ACCESS_TOKEN_TTL_HOURS out of range: {}", hours)))
    }

    pub fn refresh_token_ttl(&self) -> Result<chrono::Duration, NetwError> {
        let days = self.session.refresh_token_ttl_days;
        chrono::Duration::try_days(days)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| NetwError::Config(format!("NETW_REFRESH_TOKEN_TTL_DAYS out of range: {}", days)))
    }

    pub fn has_app_credentials(&self) -> bool {
        !self.api.client_id.is_empty() && !self.api.client_secret.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}
