mod null_renderer;

pub use null_renderer::NullRenderer;

use serde::{Deserialize, Serialize};

use crate::error::ChartResult;
use crate::filters::Filter;
use crate::stack::Layer;

/// Read-only snapshot handed to draw hooks.
///
/// Carries the post-stacking layer array and the active filter set so the
/// drawing collaborator can paint and highlight without reaching back into
/// chart internals.
pub struct ChartView<'a> {
    pub chart_id: u64,
    pub anchor: &'a str,
    pub layers: &'a [Layer],
    pub filters: &'a [Filter],
    /// Configured visual transition length in milliseconds. Zero means the
    /// draw is expected to complete synchronously.
    pub transition_ms: u64,
}

/// One legend entry per layer, hidden layers included and flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub name: String,
    pub hidden: bool,
    pub color: String,
}

/// Contract implemented by the drawing collaborator.
///
/// Every hook is a no-op by default; chart types override the ones they
/// need. The core calls `draw_full` on render, `draw_incremental` on
/// redraw, `draw_legend` when a legend is attached, and the two
/// filter-indicator hooks whenever the chart's filter set flips between
/// empty and non-empty.
pub trait ChartRenderer {
    fn draw_full(&mut self, view: &ChartView<'_>) -> ChartResult<()> {
        let _ = view;
        Ok(())
    }

    fn draw_incremental(&mut self, view: &ChartView<'_>) -> ChartResult<()> {
        let _ = view;
        Ok(())
    }

    fn draw_legend(&mut self, items: &[LegendItem]) -> ChartResult<()> {
        let _ = items;
        Ok(())
    }

    fn turn_on_filter_indicator(&mut self) {}

    fn turn_off_filter_indicator(&mut self) {}
}
