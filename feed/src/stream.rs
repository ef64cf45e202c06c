//! Live candle subscription over WebSocket with reconnect.

use std::time::Duration;

use chart_core::{CandleUpdate, Interval};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::{FeedConfig, FeedError, decode_message};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A connection was (re)established; the server follows with a bootstrap.
    Connected,
    Update(CandleUpdate),
    Error(String),
}

/// Owns the subscription task. Dropping the handle stops it.
#[derive(Debug)]
pub struct StreamHandle {
    task: JoinHandle<()>,
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// `{ws}/marketdata/ws/candles?symbol=..&timeframe=..`
pub fn stream_url(config: &FeedConfig, symbol: &str, interval: Interval) -> Result<Url, FeedError> {
    let raw = format!("{}/marketdata/ws/candles", config.ws_base_url);
    Url::parse_with_params(
        &raw,
        [("symbol", symbol.to_string()), ("timeframe", interval.to_string())],
    )
    .map_err(|err| FeedError::invalid_url(&raw, err))
}

/// Subscribes to live candles for `symbol` on the current tokio runtime.
///
/// The task reconnects with exponential backoff until the receiver is gone
/// or the handle is dropped.
pub fn spawn_stream(
    config: &FeedConfig,
    symbol: &str,
    interval: Interval,
    sender: UnboundedSender<StreamEvent>,
) -> Result<StreamHandle, FeedError> {
    let url = stream_url(config, symbol, interval)?;
    let config = config.clone();
    let task = tokio::spawn(async move { subscribe(config, url, sender).await });
    Ok(StreamHandle { task })
}

async fn subscribe(config: FeedConfig, url: Url, sender: UnboundedSender<StreamEvent>) {
    let mut backoff = config.backoff_initial;
    loop {
        match subscribe_once(&config, &url, &sender, &mut backoff).await {
            Ok(()) => info!(%url, "candle stream closed"),
            Err(err) => {
                warn!(%url, error = %err, retry_ms = backoff.as_millis() as u64, "candle stream failed");
                let _ = sender.send(StreamEvent::Error(err.to_string()));
            }
        }
        if sender.is_closed() {
            return;
        }
        sleep(backoff).await;
        backoff = config.next_backoff(backoff);
    }
}

async fn subscribe_once(
    config: &FeedConfig,
    url: &Url,
    sender: &UnboundedSender<StreamEvent>,
    backoff: &mut Duration,
) -> Result<(), FeedError> {
    let (socket, _) = timeout(CONNECT_TIMEOUT, connect_async(url.as_str()))
        .await
        .map_err(|_| FeedError::Timeout(CONNECT_TIMEOUT))??;
    *backoff = config.backoff_initial;
    info!(%url, "candle stream connected");
    if sender.send(StreamEvent::Connected).is_err() {
        return Ok(());
    }

    let (mut write, mut read) = socket.split();
    while let Some(message) = read.next().await {
        match message? {
            Message::Text(text) => match decode_message(text.as_str()) {
                Ok(Some(update)) => {
                    if sender.send(StreamEvent::Update(update)).is_err() {
                        return Ok(());
                    }
                }
                Ok(None) => debug!("ignoring stream message"),
                Err(err) => warn!(error = %err, "undecodable stream message"),
            },
            Message::Ping(payload) => write.send(Message::Pong(payload)).await?,
            Message::Close(frame) => {
                debug!(?frame, "server closed candle stream");
                return Ok(());
            }
            _ => {}
        }
    }
    Ok(())
}
