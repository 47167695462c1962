//! Connection configuration for the microCMS content API.

use std::env;
use std::time::Duration;

use crate::error::ApiError;

/// Domain every tenant subdomain hangs off.
pub const BASE_DOMAIN: &str = "microcms.io";

/// Content API version segment.
pub const API_VERSION: &str = "v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable connection settings shared by every request a client builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Tenant subdomain, e.g. `foo` for `foo.microcms.io`.
    pub service_domain: String,
    /// Sent as `X-API-KEY` on every request.
    pub api_key: String,
    /// Sent as `X-GLOBAL-DRAFT-KEY` when non-empty.
    pub global_draft_key: String,
    /// Bound on the whole round trip. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Replaces `https://{domain}.microcms.io/api/v1` when set.
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(service_domain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            service_domain: service_domain.into(),
            api_key: api_key.into(),
            global_draft_key: String::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            base_url: None,
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Reads:
    /// - `MICROCMS_SERVICE_DOMAIN` (required)
    /// - `MICROCMS_API_KEY` (required)
    /// - `MICROCMS_GLOBAL_DRAFT_KEY`
    /// - `MICROCMS_TIMEOUT_SECS`, where `0` disables the timeout
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let service_domain = lookup("MICROCMS_SERVICE_DOMAIN")
            .ok_or_else(|| ApiError::config("MICROCMS_SERVICE_DOMAIN is not set"))?;
        let api_key = lookup("MICROCMS_API_KEY")
            .ok_or_else(|| ApiError::config("MICROCMS_API_KEY is not set"))?;

        let mut config = Self::new(service_domain, api_key);
        if let Some(key) = lookup("MICROCMS_GLOBAL_DRAFT_KEY") {
            config = config.with_global_draft_key(key);
        }
        if let Some(raw) = lookup("MICROCMS_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::config(format!("MICROCMS_TIMEOUT_SECS is not a number: {raw:?}"))
            })?;
            config = match secs {
                0 => config.without_timeout(),
                n => config.with_timeout(Duration::from_secs(n)),
            };
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_global_draft_key(mut self, key: impl Into<String>) -> Self {
        self.global_draft_key = key.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Point the client at another origin, such as a local stub server.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Root every endpoint path is appended to.
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}.{BASE_DOMAIN}/api/{API_VERSION}",
                self.service_domain
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.service_domain.is_empty() {
            return Err(ApiError::config("service domain cannot be empty"));
        }
        if self.api_key.is_empty() {
            return Err(ApiError::config("API key cannot be empty"));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ApiError::config("timeout cannot be zero"));
        }
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ApiError::config("base URL must start with http:// or https://"));
            }
        }
        Ok(())
    }
}
