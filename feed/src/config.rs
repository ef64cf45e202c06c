use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_WS_BASE_URL: &str = "ws://127.0.0.1:8000";
pub const DEFAULT_OHLC_LIMIT: u32 = 500;
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(5);

const DEFAULT_BACKOFF_INITIAL: Duration = Duration::from_millis(200);
const DEFAULT_BACKOFF_MAX: Duration = Duration::from_millis(5_000);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// HTTP origin of the backend, without a trailing slash.
    pub base_url: String,
    /// WebSocket origin of the backend, without a trailing slash.
    pub ws_base_url: String,
    /// `limit` sent with every OHLC request.
    pub ohlc_limit: u32,
    pub poll_period: Duration,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
    pub request_timeout: Duration,
}

impl FeedConfig {
    pub fn new(base_url: impl AsRef<str>, ws_base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: trim_origin(base_url.as_ref()),
            ws_base_url: trim_origin(ws_base_url.as_ref()),
            ohlc_limit: DEFAULT_OHLC_LIMIT,
            poll_period: DEFAULT_POLL_PERIOD,
            backoff_initial: DEFAULT_BACKOFF_INITIAL,
            backoff_max: DEFAULT_BACKOFF_MAX,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_ohlc_limit(mut self, limit: u32) -> Self {
        self.ohlc_limit = limit;
        self
    }

    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }

    /// Next reconnect delay after `current`: doubled, capped at `backoff_max`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.backoff_max)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        let base = std::env::var("BACKEND_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let ws = std::env::var("BACKEND_WS_BASE_URL").unwrap_or_else(|_| DEFAULT_WS_BASE_URL.into());
        let limit = std::env::var("BACKEND_OHLC_LIMIT")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_OHLC_LIMIT);
        Self::new(base, ws).with_ohlc_limit(limit)
    }
}

fn trim_origin(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
