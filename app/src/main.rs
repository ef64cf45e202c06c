use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use chart_core::{ChartSession, ChartType, IndicatorKey, Interval};
use clap::{ArgAction, Args, Parser, Subcommand};
use feed::{FeedConfig, MarketDataClient};
use serde::Serialize;
use time::OffsetDateTime;

mod catalog;
mod input;
mod live;
mod logging;

use input::{InputFormat, load_candles};
use live::LiveOptions;

#[derive(Parser, Debug)]
#[command(name = "paperchart", version, about = "Chart engine for the paper-trading front end")]
struct Cli {
    /// Raise log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chart a CSV or Parquet file and print the snapshot as JSON.
    File {
        /// Path to the CSV or Parquet file containing OHLCV data.
        path: PathBuf,

        /// Explicitly set the file format. If omitted, inferred from extension.
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Symbol shown in the snapshot. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Bar interval of the file (e.g. 1m, 15m, 1d).
        #[arg(long, default_value = "1m")]
        interval: Interval,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Fetch history for a symbol once and print the snapshot as JSON.
    Fetch {
        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Poll history and follow the candle stream; one JSON line per update.
    Live {
        #[command(flatten)]
        remote: RemoteArgs,

        #[command(flatten)]
        view: ViewArgs,

        /// Seconds between history refreshes.
        #[arg(long, default_value_t = 5)]
        poll_secs: u64,

        /// Only poll; do not open the WebSocket stream.
        #[arg(long)]
        no_stream: bool,

        /// Exit after this many applied updates and print the snapshot.
        #[arg(long)]
        max_updates: Option<usize>,
    },
    /// Print timeframes, chart types, indicators and drawing tools.
    Catalog {
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Ticker symbol, e.g. RELIANCE.
    symbol: String,

    /// Timeframe: 1m, 5m, 15m, 1h or 1d.
    #[arg(long, default_value = "1m", value_parser = parse_timeframe)]
    interval: Interval,

    /// Backend HTTP origin. Defaults to BACKEND_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Backend WebSocket origin. Defaults to BACKEND_WS_BASE_URL.
    #[arg(long)]
    ws_base_url: Option<String>,

    /// Bars requested per fetch. Defaults to BACKEND_OHLC_LIMIT or 500.
    #[arg(long)]
    limit: Option<u32>,
}

impl RemoteArgs {
    fn feed_config(&self) -> FeedConfig {
        let defaults = FeedConfig::default();
        FeedConfig::new(
            self.base_url.as_deref().unwrap_or(&defaults.base_url),
            self.ws_base_url.as_deref().unwrap_or(&defaults.ws_base_url),
        )
        .with_ohlc_limit(self.limit.unwrap_or(defaults.ohlc_limit))
    }
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Chart type key (candles, line, heikin, ...). See `catalog`.
    #[arg(long, default_value = "candles", value_parser = parse_chart_type)]
    chart_type: ChartType,

    /// Indicators to enable, comma separated, or `all`.
    #[arg(long = "indicator", value_delimiter = ',')]
    indicators: Vec<String>,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

impl ViewArgs {
    fn session(&self, symbol: &str, interval: Interval) -> Result<ChartSession> {
        let mut session = ChartSession::new(symbol, interval, self.chart_type);
        for key in self.indicator_keys()? {
            if !session.is_active(key) {
                session.toggle_indicator(key);
            }
        }
        Ok(session)
    }

    fn indicator_keys(&self) -> Result<Vec<IndicatorKey>> {
        let mut keys = Vec::new();
        for raw in &self.indicators {
            if raw.trim().eq_ignore_ascii_case("all") {
                keys.extend(IndicatorKey::ALL);
                continue;
            }
            let key = IndicatorKey::from_key(raw)
                .ok_or_else(|| anyhow!("unknown indicator `{raw}` (see `catalog`)"))?;
            keys.push(key);
        }
        Ok(keys)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_tracing(cli.verbose);

    match cli.command {
        Command::File {
            path,
            format,
            symbol,
            interval,
            view,
        } => {
            let candles = load_candles(&path, format)?;
            let symbol = symbol
                .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .unwrap_or_default();
            let mut session = view.session(&symbol, interval)?;
            let token = session.begin_request();
            session.apply_fetch::<String>(token, Ok(candles), unix_now());
            finish(&mut session, view.pretty)
        }
        Command::Fetch { remote, view } => {
            let client = MarketDataClient::new(remote.feed_config())?;
            let mut session = view.session(&remote.symbol, remote.interval)?;
            let token = session.begin_request();
            let result = client
                .fetch_ohlc(session.symbol(), session.interval())
                .await;
            session.apply_fetch(token, result, unix_now());
            finish(&mut session, view.pretty)
        }
        Command::Live {
            remote,
            view,
            poll_secs,
            no_stream,
            max_updates,
        } => {
            if poll_secs == 0 {
                bail!("--poll-secs must be positive");
            }
            let config = remote
                .feed_config()
                .with_poll_period(Duration::from_secs(poll_secs));
            let session = view.session(&remote.symbol, remote.interval)?;
            let options = LiveOptions {
                poll_period: config.poll_period,
                stream: !no_stream,
                max_updates,
                pretty: view.pretty,
            };
            let mut session = live::run(session, config, options).await?;
            finish(&mut session, view.pretty)
        }
        Command::Catalog { pretty } => print_json(&catalog::build(), pretty),
    }
}

fn finish(session: &mut ChartSession, pretty: bool) -> Result<()> {
    print_json(&session.snapshot(), pretty)
}

pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

pub(crate) fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn parse_timeframe(raw: &str) -> Result<Interval, String> {
    let interval: Interval = raw.parse()?;
    if !Interval::SUPPORTED.contains(&interval) {
        return Err(format!("unsupported timeframe {interval} (use 1m, 5m, 15m, 1h or 1d)"));
    }
    Ok(interval)
}

fn parse_chart_type(raw: &str) -> Result<ChartType, String> {
    let chart_type =
        ChartType::from_key(raw).ok_or_else(|| format!("unknown chart type `{raw}`"))?;
    if !chart_type.is_supported() {
        return Err(format!("chart type `{}` is not available yet", chart_type.key()));
    }
    Ok(chart_type)
}
