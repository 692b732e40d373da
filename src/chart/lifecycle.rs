use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::chart::Chart;
use crate::chart::events::ChartEvent;
use crate::error::{ChartError, ChartResult};
use crate::render::ChartView;

/// Lifecycle states: `Unrendered → Rendering → Rendered ⇄ Redrawing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderState {
    #[default]
    Unrendered,
    Rendering,
    Rendered,
    Redrawing,
}

/// Attributes a full render refuses to run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartAttribute {
    Dimension,
    Group,
}

impl ChartAttribute {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dimension => "dimension",
            Self::Group => "group",
        }
    }
}

/// Post-draw callback, executed in registration order. Append-only.
pub type Renderlet = Rc<dyn Fn(&Chart) -> ChartResult<()>>;

pub(crate) struct LifecycleState {
    pub(crate) state: RenderState,
    pub(crate) mandatory: Vec<ChartAttribute>,
    pub(crate) renderlets: Vec<Renderlet>,
    pub(crate) renderlets_pending: bool,
    pub(crate) transition_ms: u64,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self {
            state: RenderState::Unrendered,
            mandatory: vec![ChartAttribute::Dimension, ChartAttribute::Group],
            renderlets: Vec::new(),
            renderlets_pending: false,
            transition_ms: 0,
        }
    }
}

enum DrawPass {
    Full,
    Incremental,
}

impl Chart {
    #[must_use]
    pub fn render_state(&self) -> RenderState {
        self.lifecycle.state
    }

    #[must_use]
    pub fn mandatory_attributes(&self) -> &[ChartAttribute] {
        &self.lifecycle.mandatory
    }

    pub fn set_mandatory_attributes(&mut self, attributes: Vec<ChartAttribute>) {
        self.lifecycle.mandatory = attributes;
    }

    #[must_use]
    pub fn transition_duration_ms(&self) -> u64 {
        self.lifecycle.transition_ms
    }

    pub fn set_transition_duration_ms(&mut self, millis: u64) {
        self.lifecycle.transition_ms = millis;
    }

    /// Appends a renderlet. Renderlets cannot be removed once added.
    pub fn renderlet(&mut self, renderlet: impl Fn(&Chart) -> ChartResult<()> + 'static) {
        self.lifecycle.renderlets.push(Rc::new(renderlet));
    }

    #[must_use]
    pub fn renderlet_count(&self) -> usize {
        self.lifecycle.renderlets.len()
    }

    #[must_use]
    pub fn has_pending_renderlets(&self) -> bool {
        self.lifecycle.renderlets_pending
    }

    /// Runs renderlets deferred by a positive transition duration.
    ///
    /// The host calls this on the control thread once the drawing
    /// collaborator's visual transition completes.
    pub fn flush_pending_renderlets(&mut self) {
        if self.lifecycle.renderlets_pending {
            self.lifecycle.renderlets_pending = false;
            self.run_renderlets();
        }
    }

    /// Full render: validates mandatory attributes, recomputes chart data,
    /// and calls the full-draw hook. Fires `PreRender`/`PostRender`.
    pub fn render(&mut self) -> ChartResult<()> {
        debug!(chart_id = self.id(), anchor = self.anchor(), "render chart");
        self.fire(&ChartEvent::PreRender);

        let previous = self.lifecycle.state;
        self.lifecycle.state = RenderState::Rendering;

        if let Err(err) = self.validate_mandatory_attributes() {
            self.lifecycle.state = previous;
            return Err(err);
        }
        if let Err(err) = self.draw(DrawPass::Full) {
            self.lifecycle.state = previous;
            return Err(err);
        }

        self.lifecycle.state = RenderState::Rendered;
        self.finish_draw();
        self.fire(&ChartEvent::PostRender);
        Ok(())
    }

    /// Incremental redraw: skips mandatory-attribute validation and calls
    /// the incremental-draw hook. Fires `PreRedraw`/`PostRedraw`.
    pub fn redraw(&mut self) -> ChartResult<()> {
        trace!(chart_id = self.id(), anchor = self.anchor(), "redraw chart");
        self.fire(&ChartEvent::PreRedraw);

        let previous = self.lifecycle.state;
        self.lifecycle.state = RenderState::Redrawing;

        if let Err(err) = self.draw(DrawPass::Incremental) {
            self.lifecycle.state = previous;
            return Err(err);
        }

        self.lifecycle.state = RenderState::Rendered;
        self.finish_draw();
        self.fire(&ChartEvent::PostRedraw);
        Ok(())
    }

    fn validate_mandatory_attributes(&self) -> ChartResult<()> {
        for attribute in &self.lifecycle.mandatory {
            let present = match attribute {
                ChartAttribute::Dimension => self.dimension().is_some(),
                ChartAttribute::Group => self.group().is_some(),
            };
            if !present {
                return Err(ChartError::InvalidState {
                    anchor: self.anchor().to_owned(),
                    attribute: attribute.name().to_owned(),
                });
            }
        }
        Ok(())
    }

    fn draw(&mut self, pass: DrawPass) -> ChartResult<()> {
        let layers = self.data()?;
        let anchor = self.anchor().to_owned();
        let filters = self.filters.set.as_slice().to_vec();
        let view = ChartView {
            chart_id: self.id(),
            anchor: &anchor,
            layers: &layers,
            filters: &filters,
            transition_ms: self.lifecycle.transition_ms,
        };
        match pass {
            DrawPass::Full => self.renderer.draw_full(&view)?,
            DrawPass::Incremental => self.renderer.draw_incremental(&view)?,
        }

        if self.legend_attached() {
            let items = self.legendables();
            self.renderer.draw_legend(&items)?;
        }
        Ok(())
    }

    fn finish_draw(&mut self) {
        if self.lifecycle.transition_ms == 0 {
            self.run_renderlets();
        } else {
            self.lifecycle.renderlets_pending = true;
            trace!(
                chart_id = self.id(),
                transition_ms = self.lifecycle.transition_ms,
                "renderlets deferred until transition completion"
            );
        }
    }

    fn run_renderlets(&mut self) {
        let renderlets = self.lifecycle.renderlets.clone();
        for (index, renderlet) in renderlets.iter().enumerate() {
            if let Err(err) = renderlet(self) {
                warn!(
                    error = %err,
                    chart_id = self.id(),
                    index,
                    "renderlet failed; continuing"
                );
            }
        }
    }
}
