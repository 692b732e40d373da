use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::key::{GroupRow, Key};
use crate::core::ordering::stable_sort_by_key;
use crate::data::{DimensionTarget, GroupSource, SharedDimension, SharedGroup};
use crate::filters::Filter;

type RecordKeyFn<R> = Rc<dyn Fn(&R) -> Key>;
type RecordValueFn<R> = Rc<dyn Fn(&R) -> f64>;

/// Reference in-memory dataset.
///
/// A table owns records; dimensions are keyed, filterable views; groups
/// aggregate record values per key. A group observes the filters of every
/// *other* dimension but not its own, so a chart's own selection does not
/// erase the categories the user is clicking on.
pub struct MemoryTable<R> {
    core: Rc<RefCell<TableCore<R>>>,
}

struct TableCore<R> {
    records: Vec<R>,
    dimensions: IndexMap<usize, DimensionState<R>>,
    next_dimension_id: usize,
}

struct DimensionState<R> {
    key_fn: RecordKeyFn<R>,
    filters: Vec<Filter>,
}

impl<R: 'static> MemoryTable<R> {
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self {
            core: Rc::new(RefCell::new(TableCore {
                records,
                dimensions: IndexMap::new(),
                next_dimension_id: 0,
            })),
        }
    }

    pub fn add_record(&self, record: R) {
        self.core.borrow_mut().records.push(record);
    }

    pub fn add_records(&self, records: Vec<R>) {
        self.core.borrow_mut().records.extend(records);
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.core.borrow().records.len()
    }

    /// Creates a filterable dimension keyed by `key_fn`.
    pub fn dimension(&self, key_fn: impl Fn(&R) -> Key + 'static) -> MemoryDimension<R> {
        let key_fn: RecordKeyFn<R> = Rc::new(key_fn);
        let mut core = self.core.borrow_mut();
        let id = core.next_dimension_id;
        core.next_dimension_id += 1;
        core.dimensions.insert(
            id,
            DimensionState {
                key_fn: Rc::clone(&key_fn),
                filters: Vec::new(),
            },
        );
        debug!(dimension_id = id, "created memory dimension");
        MemoryDimension {
            core: Rc::clone(&self.core),
            id,
            key_fn,
        }
    }
}

impl<R> Clone for MemoryTable<R> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

/// Filterable view over a [`MemoryTable`], scoped to one key function.
pub struct MemoryDimension<R> {
    core: Rc<RefCell<TableCore<R>>>,
    id: usize,
    key_fn: RecordKeyFn<R>,
}

impl<R: 'static> MemoryDimension<R> {
    /// Aggregation over this dimension's keys, summing `value_fn`.
    pub fn group(&self, value_fn: impl Fn(&R) -> f64 + 'static) -> MemoryGroup<R> {
        MemoryGroup {
            core: Rc::clone(&self.core),
            dimension_id: self.id,
            key_fn: Rc::clone(&self.key_fn),
            value_fn: Rc::new(value_fn),
        }
    }

    /// Aggregation counting one per record.
    pub fn group_count(&self) -> MemoryGroup<R> {
        self.group(|_| 1.0)
    }

    #[must_use]
    pub fn active_filters(&self) -> Vec<Filter> {
        let core = self.core.borrow();
        core.dimensions
            .get(&self.id)
            .map(|state| state.filters.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn into_shared(self) -> SharedDimension {
        Rc::new(RefCell::new(self))
    }
}

impl<R> Clone for MemoryDimension<R> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            id: self.id,
            key_fn: Rc::clone(&self.key_fn),
        }
    }
}

impl<R: 'static> DimensionTarget for MemoryDimension<R> {
    fn replace_filters(&mut self, filters: &[Filter]) {
        trace!(
            dimension_id = self.id,
            filter_count = filters.len(),
            "replace dimension filters"
        );
        let mut core = self.core.borrow_mut();
        if let Some(state) = core.dimensions.get_mut(&self.id) {
            state.filters = filters.to_vec();
        }
    }
}

/// Per-key sum aggregation over a [`MemoryTable`].
pub struct MemoryGroup<R> {
    core: Rc<RefCell<TableCore<R>>>,
    dimension_id: usize,
    key_fn: RecordKeyFn<R>,
    value_fn: RecordValueFn<R>,
}

impl<R: 'static> MemoryGroup<R> {
    #[must_use]
    pub fn into_shared(self) -> SharedGroup {
        Rc::new(RefCell::new(self))
    }
}

impl<R> Clone for MemoryGroup<R> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            dimension_id: self.dimension_id,
            key_fn: Rc::clone(&self.key_fn),
            value_fn: Rc::clone(&self.value_fn),
        }
    }
}

impl<R: 'static> GroupSource for MemoryGroup<R> {
    fn all(&self) -> Vec<GroupRow> {
        let core = self.core.borrow();
        let mut accumulated: IndexMap<Key, f64> = IndexMap::new();

        for record in &core.records {
            let passes = core.dimensions.iter().all(|(other_id, state)| {
                if *other_id == self.dimension_id || state.filters.is_empty() {
                    return true;
                }
                let key = (state.key_fn)(record);
                state.filters.iter().any(|filter| filter.is_filtered(&key))
            });
            if !passes {
                continue;
            }
            let key = (self.key_fn)(record);
            *accumulated.entry(key).or_insert(0.0) += (self.value_fn)(record);
        }

        let rows: Vec<GroupRow> = accumulated
            .into_iter()
            .map(|(key, value)| GroupRow::new(key, value))
            .collect();
        stable_sort_by_key(&rows, |row| row.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTable;
    use crate::core::key::Key;
    use crate::data::{DimensionTarget, GroupSource};
    use crate::filters::Filter;

    struct Sale {
        region: &'static str,
        month: f64,
        amount: f64,
    }

    fn table() -> MemoryTable<Sale> {
        MemoryTable::new(vec![
            Sale { region: "east", month: 1.0, amount: 10.0 },
            Sale { region: "east", month: 2.0, amount: 20.0 },
            Sale { region: "west", month: 1.0, amount: 5.0 },
            Sale { region: "west", month: 2.0, amount: 7.0 },
        ])
    }

    #[test]
    fn groups_sum_per_key_sorted_ascending() {
        let table = table();
        let months = table.dimension(|s| Key::num(s.month));
        let by_month = months.group(|s| s.amount);

        let rows = by_month.all();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, Key::num(1.0));
        assert!((rows[0].value - 15.0).abs() < 1e-12);
        assert!((rows[1].value - 27.0).abs() < 1e-12);
    }

    #[test]
    fn groups_ignore_their_own_dimension_filters() {
        let table = table();
        let mut regions = table.dimension(|s| Key::text(s.region));
        let by_region = regions.group(|s| s.amount);

        regions.replace_filters(&[Filter::exact(Key::text("east"))]);

        let rows = by_region.all();
        assert_eq!(rows.len(), 2, "own-dimension filter must not clip groups");
    }

    #[test]
    fn groups_observe_other_dimensions_filters() {
        let table = table();
        let mut regions = table.dimension(|s| Key::text(s.region));
        let months = table.dimension(|s| Key::num(s.month));
        let by_month = months.group(|s| s.amount);

        regions.replace_filters(&[Filter::exact(Key::text("east"))]);

        let rows = by_month.all();
        assert!((rows[0].value - 10.0).abs() < 1e-12);
        assert!((rows[1].value - 20.0).abs() < 1e-12);

        regions.clear_filters();
        let rows = by_month.all();
        assert!((rows[0].value - 15.0).abs() < 1e-12);
    }

    #[test]
    fn multiple_filters_on_one_dimension_union() {
        let table = table();
        let mut months = table.dimension(|s| Key::num(s.month));
        let regions = table.dimension(|s| Key::text(s.region));
        let by_region = regions.group(|s| s.amount);

        months.replace_filters(&[
            Filter::exact(Key::num(1.0)),
            Filter::exact(Key::num(2.0)),
        ]);

        let rows = by_region.all();
        assert!((rows[0].value - 30.0).abs() < 1e-12);
        assert!((rows[1].value - 12.0).abs() < 1e-12);
    }
}
