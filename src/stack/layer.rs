use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::accessor::ValueAccessor;
use crate::core::key::{GroupRow, Key};
use crate::data::SharedGroup;

/// One baseline-positioned point of a stacked series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackPoint {
    pub x: Key,
    /// The layer's own value at `x`; `None` when the layer is hidden.
    pub y: Option<f64>,
    pub y0: f64,
    pub y1: f64,
    /// The aggregated record this point was derived from.
    pub data: GroupRow,
    /// Owning layer's name.
    pub layer: String,
    pub hidden: bool,
}

/// One named stacked series backed by an aggregation source.
///
/// `values` and `domain_values` are derived fields: recomputed on every data
/// pull, never persisted across redraws.
#[derive(Clone)]
pub struct Layer {
    group: SharedGroup,
    name: String,
    accessor: Option<ValueAccessor>,
    hidden: bool,
    pub(crate) values: Vec<StackPoint>,
    pub(crate) domain_values: Vec<StackPoint>,
}

impl Layer {
    #[must_use]
    pub(crate) fn new(group: SharedGroup, name: String, accessor: Option<ValueAccessor>) -> Self {
        Self {
            group,
            name,
            accessor,
            hidden: false,
            values: Vec::new(),
            domain_values: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    #[must_use]
    pub fn group(&self) -> SharedGroup {
        SharedGroup::clone(&self.group)
    }

    #[must_use]
    pub(crate) fn accessor(&self) -> Option<&ValueAccessor> {
        self.accessor.as_ref()
    }

    /// Points handed to the drawing collaborator: domain-clipped unless the
    /// chart evades the domain filter.
    #[must_use]
    pub fn values(&self) -> &[StackPoint] {
        &self.values
    }

    /// Points inside the current x domain; the basis for axis extents.
    #[must_use]
    pub fn domain_values(&self) -> &[StackPoint] {
        &self.domain_values
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("values", &self.values.len())
            .field("domain_values", &self.domain_values.len())
            .finish()
    }
}
