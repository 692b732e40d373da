use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::chart::Chart;

/// Group name charts carry until the host assigns one.
pub const DEFAULT_CHART_GROUP: &str = "default";

pub type SharedChart = Rc<RefCell<Chart>>;

/// Registry of charts that render and redraw together.
///
/// An explicit value with defined init (empty) and no implicit teardown:
/// buckets are created lazily on first registration and survive emptying.
/// Members are visited in registration order, and a failure in one member
/// never prevents the remaining members from being attempted: one
/// malformed chart must not blank the rest of a dashboard.
#[derive(Default)]
pub struct ChartGroupRegistry {
    groups: IndexMap<String, Vec<SharedChart>>,
}

impl ChartGroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `chart` under its current chart-group name.
    ///
    /// A chart belongs to exactly one group: registering again after
    /// `set_chart_group` moves it, placing it at the end of the new
    /// bucket's registration order.
    pub fn register(&mut self, chart: &SharedChart) {
        self.deregister(chart);
        let group = chart.borrow().chart_group().to_owned();
        debug!(
            chart_id = chart.borrow().id(),
            group = %group,
            "registered chart in group"
        );
        self.groups
            .entry(group)
            .or_default()
            .push(Rc::clone(chart));
    }

    /// Removes `chart` from whichever group holds it. Returns `true` when
    /// the chart was registered.
    pub fn deregister(&mut self, chart: &SharedChart) -> bool {
        let id = chart.borrow().id();
        let mut removed = false;
        for members in self.groups.values_mut() {
            members.retain(|member| {
                let keep = member.borrow().id() != id;
                removed |= !keep;
                keep
            });
        }
        removed
    }

    #[must_use]
    pub fn has_chart(&self, chart: &SharedChart) -> bool {
        let id = chart.borrow().id();
        self.groups
            .values()
            .any(|members| members.iter().any(|member| member.borrow().id() == id))
    }

    /// Members of `group` in registration order; empty when the group has
    /// never been registered into.
    #[must_use]
    pub fn list(&self, group: &str) -> &[SharedChart] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn chart_count(&self, group: &str) -> usize {
        self.list(group).len()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Full-renders every chart in `group`, in registration order,
    /// isolating per-chart failures.
    pub fn render_all(&self, group: &str) {
        for chart in self.list(group) {
            let result = chart.borrow_mut().render();
            if let Err(err) = result {
                warn!(
                    error = %err,
                    chart_id = chart.borrow().id(),
                    group,
                    "chart render failed; continuing with remaining charts in group"
                );
            }
        }
    }

    /// Incrementally redraws every chart in `group`, in registration order,
    /// isolating per-chart failures.
    pub fn redraw_all(&self, group: &str) {
        for chart in self.list(group) {
            let result = chart.borrow_mut().redraw();
            if let Err(err) = result {
                warn!(
                    error = %err,
                    chart_id = chart.borrow().id(),
                    group,
                    "chart redraw failed; continuing with remaining charts in group"
                );
            }
        }
    }

    /// Clears the filters of every chart in `group`.
    pub fn filter_all(&self, group: &str) {
        for chart in self.list(group) {
            chart.borrow_mut().filter_all();
        }
    }
}
