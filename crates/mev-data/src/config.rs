use std::time::Duration;

/// Public dYdX observatory deployment.
pub const DEFAULT_BASE_URL: &str = "https://dydx.observatory.zone";

/// Result cap sent as `limit` on every raw MEV query.
pub const DEFAULT_SAMPLE_LIMIT: u64 = 500_000;

/// Configuration for the observatory client.
#[derive(Debug, Clone)]
pub struct ObservatoryConfig {
    /// Base URL, without the `/api/v1` suffix.
    pub base_url: String,

    /// `limit` query parameter for raw MEV requests.
    pub limit: u64,

    /// Ask the API to attach block metadata to each datapoint.
    pub with_block_info: bool,

    /// User agent string
    pub user_agent: String,

    /// Request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl Default for ObservatoryConfig {
    fn default() -> Self {
        Self::custom(DEFAULT_BASE_URL)
    }
}

impl ObservatoryConfig {
    pub fn custom(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            limit: DEFAULT_SAMPLE_LIMIT,
            with_block_info: true,
            user_agent: format!("mev-report/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_block_info(mut self, enabled: bool) -> Self {
        self.with_block_info = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
