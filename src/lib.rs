//! dimchart: data-transformation and coordination core for linked charts.
//!
//! This crate owns the hard, non-visual half of a charting library: a
//! baseline-stacking layout engine and the filter/redraw coordination model
//! that keeps many charts over one shared dataset mutually consistent.
//! Drawing is delegated to a collaborator behind [`render::ChartRenderer`].

pub mod chart;
pub mod core;
pub mod data;
pub mod error;
pub mod filters;
pub mod render;
pub mod stack;
pub mod telemetry;

pub use chart::{
    Chart, ChartAttribute, ChartEvent, ChartGroupRegistry, DEFAULT_CHART_GROUP, EventKind,
    RenderState, SharedChart,
};
pub use error::{ChartError, ChartResult};
