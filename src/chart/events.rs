use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chart::Chart;
use crate::error::ChartResult;
use crate::filters::FilterInput;

/// The fixed set of chart lifecycle hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PreRender,
    PostRender,
    PreRedraw,
    PostRedraw,
    Filtered,
    Zoomed,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::PreRender,
        EventKind::PostRender,
        EventKind::PreRedraw,
        EventKind::PostRedraw,
        EventKind::Filtered,
        EventKind::Zoomed,
    ];

    fn index(self) -> usize {
        match self {
            Self::PreRender => 0,
            Self::PostRender => 1,
            Self::PreRedraw => 2,
            Self::PostRedraw => 3,
            Self::Filtered => 4,
            Self::Zoomed => 5,
        }
    }
}

/// A lifecycle event and its payload.
#[derive(Debug, Clone)]
pub enum ChartEvent {
    PreRender,
    PostRender,
    PreRedraw,
    PostRedraw,
    /// The filter mutation that just completed; `None` for a reset.
    Filtered(Option<FilterInput>),
    Zoomed,
}

impl ChartEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PreRender => EventKind::PreRender,
            Self::PostRender => EventKind::PostRender,
            Self::PreRedraw => EventKind::PreRedraw,
            Self::PostRedraw => EventKind::PostRedraw,
            Self::Filtered(_) => EventKind::Filtered,
            Self::Zoomed => EventKind::Zoomed,
        }
    }
}

pub type Listener = Rc<dyn Fn(&Chart, &ChartEvent) -> ChartResult<()>>;

/// Per-kind subscriber lists, invoked synchronously in subscription order.
#[derive(Default, Clone)]
pub(crate) struct ListenerTable {
    subscribers: [Vec<Listener>; 6],
}

impl ListenerTable {
    pub(crate) fn subscribe(&mut self, kind: EventKind, listener: Listener) {
        self.subscribers[kind.index()].push(listener);
    }

    pub(crate) fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers[kind.index()].len()
    }

    pub(crate) fn snapshot(&self, kind: EventKind) -> Vec<Listener> {
        self.subscribers[kind.index()].clone()
    }
}

impl Chart {
    /// Subscribes a listener to one event kind. Listeners run synchronously
    /// in subscription order; a failing listener is reported and does not
    /// prevent the remaining listeners from running.
    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl Fn(&Chart, &ChartEvent) -> ChartResult<()> + 'static,
    ) {
        self.listeners.subscribe(kind, Rc::new(listener));
    }

    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.subscriber_count(kind)
    }

    /// Signals a zoom/focus change to subscribers.
    pub fn emit_zoomed(&mut self) {
        self.fire(&ChartEvent::Zoomed);
    }

    pub(crate) fn fire(&mut self, event: &ChartEvent) {
        let listeners = self.listeners.snapshot(event.kind());
        for (index, listener) in listeners.iter().enumerate() {
            if let Err(err) = listener(self, event) {
                warn!(
                    error = %err,
                    kind = ?event.kind(),
                    index,
                    "chart event listener failed; continuing"
                );
            }
        }
    }
}
