use crate::error::ChartResult;
use crate::render::{ChartRenderer, ChartView, LegendItem};

/// No-op renderer used by tests and headless chart usage.
///
/// It records the shape of the last draw so tests can observe lifecycle
/// behavior before a real backend is introduced.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub full_draws: usize,
    pub incremental_draws: usize,
    pub last_layer_count: usize,
    pub last_legend_count: usize,
    pub filter_indicator_on: bool,
}

impl ChartRenderer for NullRenderer {
    fn draw_full(&mut self, view: &ChartView<'_>) -> ChartResult<()> {
        self.full_draws += 1;
        self.last_layer_count = view.layers.len();
        Ok(())
    }

    fn draw_incremental(&mut self, view: &ChartView<'_>) -> ChartResult<()> {
        self.incremental_draws += 1;
        self.last_layer_count = view.layers.len();
        Ok(())
    }

    fn draw_legend(&mut self, items: &[LegendItem]) -> ChartResult<()> {
        self.last_legend_count = items.len();
        Ok(())
    }

    fn turn_on_filter_indicator(&mut self) {
        self.filter_indicator_on = true;
    }

    fn turn_off_filter_indicator(&mut self) {
        self.filter_indicator_on = false;
    }
}
