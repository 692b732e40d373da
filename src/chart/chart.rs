use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::chart::events::ListenerTable;
use crate::chart::filter_api::FilterState;
use crate::chart::lifecycle::LifecycleState;
use crate::chart::registry::DEFAULT_CHART_GROUP;
use crate::core::accessor::{
    KeyAccessor, OrderingAccessor, ValueAccessor, constant_value_accessor, default_key_accessor,
    default_value_accessor,
};
use crate::core::key::GroupRow;
use crate::core::ordering::stable_sort_by_key;
use crate::core::scale::XScale;
use crate::data::{SharedDimension, SharedGroup};
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartRenderer, NullRenderer};
use crate::stack::{Layer, StackState};

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

const DEFAULT_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// One chart: the coordination-side state of a visual widget.
///
/// A `Chart` composes its capability modules (filter state, lifecycle
/// state, stack state, and the listener table) behind one facade, and
/// delegates all drawing to a [`ChartRenderer`]. Implementation is split
/// across concern-named files (`filter_api`, `lifecycle`, `stack::engine`).
pub struct Chart {
    id: u64,
    anchor: String,
    chart_group: String,
    dimension: Option<SharedDimension>,
    key_accessor: KeyAccessor,
    value_accessor: ValueAccessor,
    ordering: OrderingAccessor,
    x: Option<XScale>,
    colors: Vec<String>,
    legend_attached: bool,
    pub(crate) renderer: Box<dyn ChartRenderer>,
    pub(crate) filters: FilterState,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) stacking: StackState,
    pub(crate) listeners: ListenerTable,
}

impl Chart {
    /// Creates a chart with the no-op renderer.
    #[must_use]
    pub fn new(anchor: impl Into<String>) -> Self {
        Self::with_renderer(anchor, Box::new(NullRenderer::default()))
    }

    #[must_use]
    pub fn with_renderer(anchor: impl Into<String>, renderer: Box<dyn ChartRenderer>) -> Self {
        let id = NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed);
        let anchor = anchor.into();
        debug!(chart_id = id, anchor = %anchor, "created chart");
        Self {
            id,
            anchor,
            chart_group: DEFAULT_CHART_GROUP.to_owned(),
            dimension: None,
            key_accessor: default_key_accessor(),
            value_accessor: default_value_accessor(),
            ordering: default_key_accessor(),
            x: None,
            colors: DEFAULT_COLORS.iter().map(|c| (*c).to_owned()).collect(),
            legend_attached: false,
            renderer,
            filters: FilterState::default(),
            lifecycle: LifecycleState::default(),
            stacking: StackState::default(),
            listeners: ListenerTable::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    #[must_use]
    pub fn chart_group(&self) -> &str {
        &self.chart_group
    }

    /// Assigns the chart-group name. The group registry reads this at
    /// registration time; re-register the chart to move it between groups.
    pub fn set_chart_group(&mut self, group: impl Into<String>) {
        self.chart_group = group.into();
    }

    #[must_use]
    pub fn dimension(&self) -> Option<SharedDimension> {
        self.dimension.clone()
    }

    pub fn set_dimension(&mut self, dimension: SharedDimension) {
        self.dimension = Some(dimension);
    }

    /// The base aggregation source: the first stacked layer's group.
    #[must_use]
    pub fn group(&self) -> Option<SharedGroup> {
        self.stacking.layers.first().map(Layer::group)
    }

    /// Binds the base aggregation source, resetting the stack list to a
    /// single layer named `"0"`.
    pub fn set_group(&mut self, group: SharedGroup) {
        self.stacking.layers = vec![Layer::new(group, "0".to_owned(), None)];
    }

    /// Binds the base aggregation source under an explicit layer name.
    pub fn set_group_named(&mut self, group: SharedGroup, name: impl Into<String>) {
        self.stacking.layers = vec![Layer::new(group, name.into(), None)];
    }

    #[must_use]
    pub fn key_accessor(&self) -> KeyAccessor {
        Rc::clone(&self.key_accessor)
    }

    pub fn set_key_accessor(&mut self, accessor: KeyAccessor) {
        self.key_accessor = accessor;
    }

    #[must_use]
    pub fn value_accessor(&self) -> ValueAccessor {
        Rc::clone(&self.value_accessor)
    }

    pub fn set_value_accessor(&mut self, accessor: ValueAccessor) {
        self.value_accessor = accessor;
    }

    /// Wraps a constant into the value accessor.
    pub fn set_value_constant(&mut self, value: f64) {
        self.value_accessor = constant_value_accessor(value);
    }

    #[must_use]
    pub fn ordering(&self) -> OrderingAccessor {
        Rc::clone(&self.ordering)
    }

    pub fn set_ordering(&mut self, ordering: OrderingAccessor) {
        self.ordering = ordering;
    }

    /// Base-group rows sorted ascending by the ordering accessor.
    pub fn ordered_group_rows(&self) -> ChartResult<Vec<GroupRow>> {
        let group = self.group().ok_or_else(|| ChartError::InvalidState {
            anchor: self.anchor.clone(),
            attribute: "group".to_owned(),
        })?;
        let rows = group.borrow().all();
        let ordering = Rc::clone(&self.ordering);
        Ok(stable_sort_by_key(&rows, |row| ordering(row)))
    }

    #[must_use]
    pub fn x(&self) -> Option<&XScale> {
        self.x.as_ref()
    }

    pub fn set_x(&mut self, scale: XScale) {
        self.x = Some(scale);
    }

    pub fn clear_x(&mut self) {
        self.x = None;
    }

    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn set_colors(&mut self, colors: Vec<String>) -> ChartResult<()> {
        if colors.is_empty() {
            return Err(ChartError::InvalidData(
                "color palette must not be empty".to_owned(),
            ));
        }
        self.colors = colors;
        Ok(())
    }

    /// Resolved color for the layer at `index`, cycling through the palette.
    #[must_use]
    pub fn layer_color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }

    #[must_use]
    pub fn legend_attached(&self) -> bool {
        self.legend_attached
    }

    pub fn attach_legend(&mut self, attached: bool) {
        self.legend_attached = attached;
    }

    #[must_use]
    pub fn into_renderer(self) -> Box<dyn ChartRenderer> {
        self.renderer
    }
}
