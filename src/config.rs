//! Widget configuration.

use std::time::Duration;

use url::Url;

/// Default chat endpoint when no override is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/chat";

/// Environment variable overriding the chat endpoint
/// (e.g. `https://assistant.example.com/api/chat`).
pub const ENDPOINT_ENV: &str = "NEXUSAI_ENDPOINT";

/// Default end-to-end request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the widget core.
#[derive(Clone, Debug)]
pub struct WidgetConfig {
    /// Remote assistant endpoint receiving chat requests.
    pub endpoint: Url,
    /// End-to-end timeout of one dispatch.
    pub request_timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl WidgetConfig {
    /// Create a config for `endpoint` with default timeouts.
    #[must_use]
    pub const fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Create a config from [`ENDPOINT_ENV`], falling back to
    /// [`DEFAULT_ENDPOINT`].
    ///
    /// # Errors
    /// Returns an error if the configured endpoint is not a valid URL.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let raw = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Ok(Self::new(Url::parse(&raw)?))
    }

    /// Set the end-to-end request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
