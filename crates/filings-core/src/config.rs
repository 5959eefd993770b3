//! Client configuration.
//!
//! The archive's fair-access policy requires every request to carry a
//! user-agent naming the caller and a contact address. [`ClientConfig`] holds
//! those plus the throttling, retry and caching knobs; nothing in the fetch
//! path is hardcoded.

use std::time::Duration;

use crate::error::{FilingsError, Result};

/// Default host of the JSON endpoints.
pub const DEFAULT_DATA_BASE_URL: &str = "https://data.sec.gov";

/// Default host of the document archive and ticker list.
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://www.sec.gov";

/// Configuration for the archive fetch client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Contact e-mail sent with every request.
    pub contact_email: String,
    /// Product label sent with every request (e.g. `"MyApp/1.0"`).
    pub user_agent: String,
    /// Maximum requests admitted per `time_window`.
    pub max_requests: usize,
    /// Length of the rate-limit window.
    pub time_window: Duration,
    /// Maximum attempts per logical request.
    pub max_retries: u32,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// Whether JSON responses are cached in memory.
    pub cache_enabled: bool,
    /// Base delay for exponential backoff (`base * 2^attempt`).
    pub backoff_base: Duration,
    /// Wait used when a throttling response carries no usable `Retry-After`.
    pub default_retry_after: Duration,
    /// Maximum server-requested waits honoured for one logical request.
    pub max_throttle_waits: u32,
    /// Base URL of the JSON endpoints.
    pub data_base_url: String,
    /// Base URL of the document archive.
    pub archive_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contact_email: String::new(),
            user_agent: concat!("filings/", env!("CARGO_PKG_VERSION")).to_string(),
            max_requests: 10,
            time_window: Duration::from_secs(1),
            max_retries: 3,
            request_timeout: Duration::from_secs(30),
            cache_enabled: true,
            backoff_base: Duration::from_secs(1),
            default_retry_after: Duration::from_secs(60),
            max_throttle_waits: 10,
            data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given contact e-mail and default settings.
    ///
    /// # Example
    /// ```
    /// use filings_core::ClientConfig;
    ///
    /// let config = ClientConfig::new("ops@example.com").with_user_agent("MyApp/1.0");
    /// assert_eq!(config.identification(), "MyApp/1.0 (ops@example.com)");
    /// ```
    #[must_use]
    pub fn new(contact_email: impl Into<String>) -> Self {
        Self {
            contact_email: contact_email.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `SEC_CONTACT_EMAIL` (required), `SEC_USER_AGENT`,
    /// `SEC_MAX_REQUESTS`, `SEC_TIME_WINDOW_MS`, `SEC_MAX_RETRIES`,
    /// `SEC_TIMEOUT_SECS` and `SEC_CACHE_ENABLED`.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if a variable is missing or malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if a value is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contact_email = lookup("SEC_CONTACT_EMAIL")
            .ok_or_else(|| FilingsError::Config("SEC_CONTACT_EMAIL must be set".to_string()))?;

        let mut config = Self::new(contact_email);

        if let Some(agent) = lookup("SEC_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("SEC_MAX_REQUESTS") {
            config.max_requests = parse_var("SEC_MAX_REQUESTS", &raw)?;
        }
        if let Some(raw) = lookup("SEC_TIME_WINDOW_MS") {
            config.time_window = Duration::from_millis(parse_var("SEC_TIME_WINDOW_MS", &raw)?);
        }
        if let Some(raw) = lookup("SEC_MAX_RETRIES") {
            config.max_retries = parse_var("SEC_MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("SEC_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_var("SEC_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("SEC_CACHE_ENABLED") {
            config.cache_enabled = parse_var("SEC_CACHE_ENABLED", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the product label.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the rate limit as `max_requests` per `time_window`.
    #[must_use]
    pub const fn with_rate_limit(mut self, max_requests: usize, time_window: Duration) -> Self {
        self.max_requests = max_requests;
        self.time_window = time_window;
        self
    }

    /// Sets the maximum attempts per logical request.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables the response cache.
    #[must_use]
    pub const fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Sets the base delay for exponential backoff.
    #[must_use]
    pub const fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Overrides both base URLs (mirrors, tests).
    #[must_use]
    pub fn with_base_urls(mut self, data: impl Into<String>, archive: impl Into<String>) -> Self {
        self.data_base_url = data.into().trim_end_matches('/').to_string();
        self.archive_base_url = archive.into().trim_end_matches('/').to_string();
        self
    }

    /// The identification string sent as `User-Agent`.
    #[must_use]
    pub fn identification(&self) -> String {
        format!("{} ({})", self.user_agent.trim(), self.contact_email.trim())
    }

    /// Checks that the configuration satisfies the archive's access policy.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let email = self.contact_email.trim();
        if email.is_empty() {
            return Err(FilingsError::Config(
                "a contact e-mail is required by the archive access policy".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(FilingsError::Config(format!(
                "contact e-mail looks invalid: {email}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(FilingsError::Config("user agent label is empty".to_string()));
        }
        if self.max_requests == 0 {
            return Err(FilingsError::Config("max_requests must be at least 1".to_string()));
        }
        if self.time_window.is_zero() {
            return Err(FilingsError::Config("time_window must be non-zero".to_string()));
        }
        if self.max_retries == 0 {
            return Err(FilingsError::Config("max_retries must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| FilingsError::Config(format!("{key} has an invalid value: {raw}")))
}

/// Configuration for the ingestion orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Records handed to the sink per upsert call.
    pub batch_size: usize,
    /// Filings parsed concurrently by batch operations.
    pub concurrency: usize,
    /// Form types ingested when the caller does not name any.
    pub default_forms: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            concurrency: 4,
            default_forms: ["10-K", "10-Q", "8-K", "13F-HR"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
