use chart_core::{Candle, Interval};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{FeedConfig, FeedError};

/// HTTP side of the market-data backend.
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl MarketDataClient {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// `{base}/market/ohlc?symbol=..&interval=..&limit=..`
    pub fn ohlc_url(&self, symbol: &str, interval: Interval) -> Result<Url, FeedError> {
        let raw = format!("{}/market/ohlc", self.config.base_url);
        Url::parse_with_params(
            &raw,
            [
                ("symbol", symbol.to_string()),
                ("interval", interval.to_string()),
                ("limit", self.config.ohlc_limit.to_string()),
            ],
        )
        .map_err(|err| FeedError::invalid_url(&raw, err))
    }

    /// Fetches the most recent bars for `symbol`. A body that is not a JSON
    /// array is treated as "no history" and yields an empty list.
    pub async fn fetch_ohlc(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, FeedError> {
        let url = self.ohlc_url(symbol, interval)?;
        debug!(%url, "fetching ohlc");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(symbol, status = status.as_u16(), "ohlc request failed");
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        match body {
            Value::Array(_) => Ok(serde_json::from_value(body)?),
            other => {
                debug!(symbol, kind = json_kind(&other), "ohlc body is not a list");
                Ok(Vec::new())
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, serve_ohlc};

    fn client(base: &str) -> MarketDataClient {
        MarketDataClient::new(FeedConfig::new(base, "ws://unused").with_ohlc_limit(250)).unwrap()
    }

    #[test]
    fn url_encodes_query() {
        let url = client("http://127.0.0.1:8000/")
            .ohlc_url("M&M", Interval::Minute(15))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/market/ohlc?symbol=M%26M&interval=15m&limit=250"
        );
    }

    #[tokio::test]
    async fn fetches_candle_list() {
        let base = serve_ohlc(|_| {
            Reply::ok(
                r#"[{"time":60,"open":1,"high":2,"low":0.5,"close":1.5,"volume":10},
                    {"time":120,"open":1.5,"high":2.5,"low":1,"close":2}]"#,
            )
        })
        .await;
        let candles = client(&base)
            .fetch_ohlc("TCS", Interval::Minute(1))
            .await
            .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].time, 120);
        assert_eq!(candles[1].volume, None);
    }

    #[tokio::test]
    async fn non_list_body_means_no_history() {
        let base = serve_ohlc(|_| Reply::ok(r#"{"detail":"no data"}"#)).await;
        let candles = client(&base)
            .fetch_ohlc("NEW", Interval::Day(1))
            .await
            .unwrap();
        assert!(candles.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let base = serve_ohlc(|_| Reply::status(503, "maintenance")).await;
        let err = client(&base)
            .fetch_ohlc("INFY", Interval::Hour(1))
            .await
            .unwrap_err();
        match err {
            FeedError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_carries_symbol_and_interval() {
        let base = serve_ohlc(|params| {
            let wanted = [("symbol", "RELIANCE"), ("interval", "5m"), ("limit", "250")];
            if wanted
                .iter()
                .all(|(k, v)| params.get(*k).map(String::as_str) == Some(*v))
            {
                Reply::ok("[]")
            } else {
                Reply::status(400, "unexpected query")
            }
        })
        .await;
        let candles = client(&base)
            .fetch_ohlc("RELIANCE", Interval::Minute(5))
            .await
            .unwrap();
        assert!(candles.is_empty());
    }
}
