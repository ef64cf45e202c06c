//! Chart engine for a paper-trading front end: candle model, technical
//! indicators, chart-type transforms, coordinate mapping and the drawing
//! overlay. Rendering and networking live outside this crate.

mod error;
mod load;
mod types;

pub mod cache;
pub mod coords;
pub mod drawing;
pub mod indicators;
pub mod nav;
pub mod session;
pub mod transform;

pub use error::{ChartError, DataError, LoadError};
pub use load::{ColumnMapping, LoadOptions, load_csv, load_parquet};
pub use types::{Candle, Interval, OhlcPoint, SeriesPoint, validate};

pub use cache::{ChartData, PriceView, SeriesCache, UpdateOutcome};
pub use coords::{
    BarTimeScale, ChartPoint, CoordinateMapper, LinearPriceScale, PixelPos, PriceScale, TimeScale,
    Viewport, bounds,
};
pub use drawing::{Drawing, DrawingId, DrawingOverlay, DrawingState, DrawingTool, Shape};
pub use indicators::{Computation, IndicatorKey};
pub use nav::{ChartLauncher, Navigator};
pub use session::{CandleUpdate, ChartSession, ChartSnapshot, LoadStatus, RequestToken};
pub use transform::ChartType;
