//! Terminal COVID-19 dashboard: summary cards, a ranked country table,
//! a braille world map with proportional markers and a daily chart, fed
//! by the disease.sh API.

pub mod api;
pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod format;
pub mod map;
pub mod metric;
pub mod stats;
pub mod ui;

pub use metric::{marker_radius, style_for, style_for_name, MetricError, MetricKind, MetricStyle};
pub use stats::{rank, CountryStat, Summary};
