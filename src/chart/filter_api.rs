use std::rc::Rc;

use tracing::debug;

use crate::chart::Chart;
use crate::chart::events::ChartEvent;
use crate::core::key::GroupRow;
use crate::data::DimensionTarget;
use crate::filters::{Filter, FilterInput, FilterSet};

/// Strategy applying a chart's filter list to its dimension.
///
/// The returned list becomes the chart's new filter set, so a handler may
/// transform filters (offsetting, coalescing) before they reach the
/// dataset.
pub type FilterHandler = Rc<dyn Fn(&mut dyn DimensionTarget, Vec<Filter>) -> Vec<Filter>>;

#[must_use]
pub fn default_filter_handler() -> FilterHandler {
    Rc::new(|dimension: &mut dyn DimensionTarget, filters: Vec<Filter>| {
        dimension.replace_filters(&filters);
        filters
    })
}

pub(crate) struct FilterState {
    pub(crate) set: FilterSet,
    pub(crate) handler: FilterHandler,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            set: FilterSet::new(),
            handler: default_filter_handler(),
        }
    }
}

impl Chart {
    #[must_use]
    pub fn has_filter(&self) -> bool {
        !self.filters.set.is_empty()
    }

    /// Whether `probe` is present: stored symmetrically equal, or admitted
    /// by a stored filter's `is_filtered` capability.
    #[must_use]
    pub fn has_filter_value(&self, probe: &Filter) -> bool {
        self.filters.set.admits(probe)
    }

    /// The first stored filter, if any.
    #[must_use]
    pub fn current_filter(&self) -> Option<&Filter> {
        self.filters.set.first()
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        self.filters.set.as_slice()
    }

    pub fn set_filter_handler(&mut self, handler: FilterHandler) {
        self.filters.handler = handler;
    }

    /// Mutates the filter set.
    ///
    /// `Clear` removes everything; `One` toggles a single value;
    /// `BulkToggle` applies a symmetric difference in one batch. Every call
    /// reapplies the set through the filter handler and fires `Filtered`
    /// exactly once, with `None` as the payload for a reset.
    pub fn filter(&mut self, input: FilterInput) {
        match &input {
            FilterInput::Clear => self.filters.set.clear(),
            FilterInput::One(filter) => {
                self.filters.set.toggle(filter.clone());
            }
            FilterInput::BulkToggle(filters) => self.filters.set.toggle_all(filters.clone()),
        }
        self.apply_filters();

        let payload = match input {
            FilterInput::Clear => None,
            other => Some(other),
        };
        self.notify_filtered(payload);
    }

    /// Removes every active filter. Equivalent to `filter(Clear)`.
    pub fn filter_all(&mut self) {
        self.filter(FilterInput::Clear);
    }

    /// Clears all filters, then applies `filter`: two internal mutation
    /// steps, one observable outcome and one `Filtered` notification.
    pub fn replace_filter(&mut self, filter: Filter) {
        self.filters.set.clear();
        self.filters.set.toggle(filter.clone());
        self.apply_filters();
        self.notify_filtered(Some(FilterInput::One(filter)));
    }

    /// Click handling: toggles the filter derived from the clicked row's
    /// key. The host should then ask the registry to redraw the chart's
    /// group.
    pub fn on_click(&mut self, row: &GroupRow) {
        let key = self.key_accessor()(row);
        self.filter(FilterInput::One(Filter::exact(key)));
    }

    fn apply_filters(&mut self) {
        let Some(dimension) = self.dimension() else {
            return;
        };
        let handler = Rc::clone(&self.filters.handler);
        let applied = handler(
            &mut *dimension.borrow_mut(),
            self.filters.set.as_slice().to_vec(),
        );
        self.filters.set.replace(applied);
    }

    fn notify_filtered(&mut self, input: Option<FilterInput>) {
        let active = self.has_filter();
        if active {
            self.renderer.turn_on_filter_indicator();
        } else {
            self.renderer.turn_off_filter_indicator();
        }
        debug!(
            chart_id = self.id(),
            active,
            filter_count = self.filters.set.len(),
            "filter set changed"
        );
        self.fire(&ChartEvent::Filtered(input));
    }
}
