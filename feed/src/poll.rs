//! Periodic OHLC refresh. At most one fetch is in flight; issuing a new
//! request cancels the previous one.

use std::time::Duration;

use chart_core::{Candle, Interval, RequestToken};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::{FeedError, MarketDataClient};

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub symbol: String,
    pub interval: Interval,
}

#[derive(Debug)]
pub struct FetchResponse {
    pub token: RequestToken,
    pub result: Result<Vec<Candle>, FeedError>,
}

pub struct Fetcher {
    client: MarketDataClient,
    sender: UnboundedSender<FetchResponse>,
    in_flight: Option<JoinHandle<()>>,
}

impl Fetcher {
    pub fn new(client: MarketDataClient, sender: UnboundedSender<FetchResponse>) -> Self {
        Self {
            client,
            sender,
            in_flight: None,
        }
    }

    /// Starts `request`, aborting any fetch still running.
    pub fn request(&mut self, request: FetchRequest) {
        self.cancel();
        let client = self.client.clone();
        let sender = self.sender.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = client.fetch_ohlc(&request.symbol, request.interval).await;
            let _ = sender.send(FetchResponse {
                token: request.token,
                result,
            });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if !task.is_finished() {
                debug!("cancelling in-flight fetch");
            }
            task.abort();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A ticker firing every `period`, first tick one period from now. Late
/// ticks are delayed rather than bunched.
pub fn poll_ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
