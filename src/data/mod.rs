//! Dataset seam: the two handles a chart holds into the shared dataset.
//!
//! The coordination core never owns record storage. It pushes filter lists
//! through [`DimensionTarget`] and pulls aggregated rows through
//! [`GroupSource`]; any store implementing these traits can back a chart.
//! [`MemoryTable`] is the reference implementation.

mod memory_table;

pub use memory_table::{MemoryDimension, MemoryGroup, MemoryTable};

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::key::GroupRow;
use crate::filters::Filter;

/// A filterable view over the shared dataset, scoped to one key.
pub trait DimensionTarget {
    /// Replaces the dimension's active filter list. An empty list removes
    /// all filtering on this dimension.
    fn replace_filters(&mut self, filters: &[Filter]);

    fn clear_filters(&mut self) {
        self.replace_filters(&[]);
    }
}

/// A pre-aggregated view producing one `(key, value)` record per key,
/// key-ascending.
pub trait GroupSource {
    fn all(&self) -> Vec<GroupRow>;
}

pub type SharedDimension = Rc<RefCell<dyn DimensionTarget>>;
pub type SharedGroup = Rc<RefCell<dyn GroupSource>>;
