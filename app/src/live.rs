//! `live` subcommand: keeps one chart session current from the backend.

use std::time::Duration;

use anyhow::Result;
use chart_core::{Candle, CandleUpdate, ChartSession, LoadStatus};
use feed::{
    FeedConfig, FetchRequest, Fetcher, MarketDataClient, StreamEvent, poll_ticker, spawn_stream,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::unix_now;

#[derive(Debug, Clone, Copy)]
pub struct LiveOptions {
    pub poll_period: Duration,
    pub stream: bool,
    pub max_updates: Option<usize>,
    pub pretty: bool,
}

/// One line of output per applied update.
#[derive(Debug, Serialize)]
struct Tick<'a> {
    source: &'static str,
    symbol: &'a str,
    status: &'a LoadStatus,
    bars: usize,
    last: Option<&'a Candle>,
}

/// Runs until ctrl-c or `max_updates` applied updates and hands the session
/// back for a final snapshot.
pub async fn run(
    mut session: ChartSession,
    config: FeedConfig,
    options: LiveOptions,
) -> Result<ChartSession> {
    let client = MarketDataClient::new(config.clone())?;
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel();
    let mut fetcher = Fetcher::new(client, fetch_tx);

    let (stream_tx, mut stream_rx) = mpsc::unbounded_channel();
    let _stream = if options.stream {
        Some(spawn_stream(
            &config,
            session.symbol(),
            session.interval(),
            stream_tx,
        )?)
    } else {
        None
    };
    let mut stream_open = options.stream;

    request(&mut session, &mut fetcher);
    let mut ticker = poll_ticker(options.poll_period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut updates = 0usize;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            _ = ticker.tick() => request(&mut session, &mut fetcher),
            Some(response) = fetch_rx.recv() => {
                if session.apply_fetch(response.token, response.result, unix_now()) {
                    emit(&session, "fetch", options.pretty)?;
                    updates += 1;
                }
            }
            event = stream_rx.recv(), if stream_open => match event {
                Some(StreamEvent::Connected) => {
                    session.apply_stream(CandleUpdate::Bootstrap(Vec::new()));
                }
                Some(StreamEvent::Update(update)) => {
                    session.apply_stream(update);
                    emit(&session, "stream", options.pretty)?;
                    updates += 1;
                }
                Some(StreamEvent::Error(message)) => warn!(%message, "stream error"),
                None => stream_open = false,
            },
        }
        if options.max_updates.is_some_and(|max| updates >= max) {
            break;
        }
    }
    fetcher.cancel();
    Ok(session)
}

fn request(session: &mut ChartSession, fetcher: &mut Fetcher) {
    let token = session.begin_request();
    fetcher.request(FetchRequest {
        token,
        symbol: session.symbol().to_string(),
        interval: session.interval(),
    });
}

fn emit(session: &ChartSession, source: &'static str, pretty: bool) -> Result<()> {
    let tick = Tick {
        source,
        symbol: session.symbol(),
        status: session.status(),
        bars: session.candles().len(),
        last: session.candles().last(),
    };
    crate::print_json(&tick, pretty)
}
