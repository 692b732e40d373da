mod chart;
mod events;
mod filter_api;
mod lifecycle;
mod registry;

pub use chart::Chart;
pub use events::{ChartEvent, EventKind, Listener};
pub use filter_api::{FilterHandler, default_filter_handler};
pub use lifecycle::{ChartAttribute, RenderState, Renderlet};
pub use registry::{ChartGroupRegistry, DEFAULT_CHART_GROUP, SharedChart};
