//! JSON messages pushed on the candle stream.

use chart_core::{Candle, CandleUpdate};
use serde::Deserialize;

use crate::FeedError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Bootstrap {
        #[serde(default)]
        candles: Vec<Candle>,
    },
    Candle {
        data: Candle,
    },
    #[serde(other)]
    Other,
}

impl StreamMessage {
    pub fn into_update(self) -> Option<CandleUpdate> {
        match self {
            StreamMessage::Bootstrap { candles } => Some(CandleUpdate::Bootstrap(candles)),
            StreamMessage::Candle { data } => Some(CandleUpdate::Bar(data)),
            StreamMessage::Other => None,
        }
    }
}

/// Decodes one text frame. Message types the chart does not use decode to
/// `None`.
pub fn decode_message(text: &str) -> Result<Option<CandleUpdate>, FeedError> {
    let message: StreamMessage = serde_json::from_str(text)?;
    Ok(message.into_update())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_replaces_history() {
        let raw = r#"{
            "type": "bootstrap",
            "candles": [
                {"time": 1700000000, "open": 10, "high": 12, "low": 9, "close": 11, "volume": 150},
                {"time": 1700000060, "open": 11, "high": 11.5, "low": 10.5, "close": 11.2}
            ]
        }"#;
        let Some(CandleUpdate::Bootstrap(candles)) = decode_message(raw).unwrap() else {
            panic!("expected bootstrap");
        };
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].volume, Some(150.0));
        assert_eq!(candles[1].volume, None);
        assert_eq!(candles[1].close, 11.2);
    }

    #[test]
    fn bootstrap_without_candles_is_empty() {
        let update = decode_message(r#"{"type":"bootstrap"}"#).unwrap();
        assert_eq!(update, Some(CandleUpdate::Bootstrap(Vec::new())));
    }

    #[test]
    fn candle_carries_one_bar() {
        let raw = r#"{"type":"candle","data":{"time":1700000120,"open":11.2,"high":11.4,"low":11.0,"close":11.3,"volume":20}}"#;
        assert_eq!(
            decode_message(raw).unwrap(),
            Some(CandleUpdate::Bar(Candle::new(
                1_700_000_120,
                11.2,
                11.4,
                11.0,
                11.3,
                20.0
            )))
        );
    }

    #[test]
    fn unknown_types_are_ignored() {
        assert_eq!(decode_message(r#"{"type":"heartbeat","ts":1}"#).unwrap(), None);
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            decode_message(r#"{"candles":[]}"#),
            Err(FeedError::Decode(_))
        ));
        assert!(decode_message(r#"{"type":"candle"}"#).is_err());
        assert!(decode_message("not json").is_err());
    }
}
