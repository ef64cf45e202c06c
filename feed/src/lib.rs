//! Client for the market-data backend: OHLC history over HTTP, live candles
//! over WebSocket, and the cancellable fetch/poll loop that feeds a
//! [`chart_core::ChartSession`].

mod client;
mod config;
mod error;
mod poll;
mod stream;
mod wire;

#[cfg(test)]
mod testing;

pub use client::MarketDataClient;
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_OHLC_LIMIT, DEFAULT_POLL_PERIOD, DEFAULT_WS_BASE_URL, FeedConfig,
};
pub use error::FeedError;
pub use poll::{FetchRequest, FetchResponse, Fetcher, poll_ticker};
pub use stream::{StreamEvent, StreamHandle, spawn_stream, stream_url};
pub use wire::{StreamMessage, decode_message};
