use smallvec::SmallVec;

use crate::core::key::Key;
use crate::filters::Filter;

/// Outcome of a single toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterToggle {
    Added,
    Removed,
}

/// Ordered storage for a chart's active filters.
///
/// Presence is decided by symmetric filter equality, so a value can never be
/// stored twice; toggling an already-present value removes it.
#[derive(Clone, Default)]
pub struct FilterSet {
    filters: SmallVec<[Filter; 2]>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Filter> {
        self.filters.first()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn contains(&self, filter: &Filter) -> bool {
        self.filters.iter().any(|stored| stored == filter)
    }

    /// Whether `probe` is "present": stored outright, or admitted by a
    /// stored filter's `is_filtered` capability when probing with a scalar.
    #[must_use]
    pub fn admits(&self, probe: &Filter) -> bool {
        if self.contains(probe) {
            return true;
        }
        match probe {
            Filter::Exact(key) => self.is_filtered(key),
            _ => false,
        }
    }

    /// Whether a datum with key `key` passes any stored filter.
    #[must_use]
    pub fn is_filtered(&self, key: &Key) -> bool {
        self.filters.iter().any(|stored| stored.is_filtered(key))
    }

    pub fn toggle(&mut self, filter: Filter) -> FilterToggle {
        if let Some(position) = self.filters.iter().position(|stored| stored == &filter) {
            self.filters.remove(position);
            FilterToggle::Removed
        } else {
            self.filters.push(filter);
            FilterToggle::Added
        }
    }

    /// Symmetric difference: every element present is removed, every element
    /// absent is added, in one batch.
    pub fn toggle_all(&mut self, filters: Vec<Filter>) {
        for filter in filters {
            self.toggle(filter);
        }
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Adopts `filters` as the new set, replacing current contents. Used to
    /// accept the list a filter handler actually applied.
    pub fn replace(&mut self, filters: Vec<Filter>) {
        self.filters = SmallVec::from_vec(filters);
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterSet, FilterToggle};
    use crate::core::key::Key;
    use crate::filters::Filter;

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut set = FilterSet::new();
        assert_eq!(set.toggle(Filter::exact(Key::num(1.0))), FilterToggle::Added);
        assert!(set.contains(&Filter::exact(Key::num(1.0))));
        assert_eq!(
            set.toggle(Filter::exact(Key::num(1.0))),
            FilterToggle::Removed
        );
        assert!(set.is_empty());
    }

    #[test]
    fn duplicates_are_never_stored() {
        let mut set = FilterSet::new();
        set.toggle(Filter::exact(Key::text("a")));
        set.toggle(Filter::exact(Key::text("b")));
        set.toggle(Filter::exact(Key::text("a")));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&Filter::exact(Key::text("b"))));
    }

    #[test]
    fn toggle_all_computes_symmetric_difference() {
        let mut set = FilterSet::new();
        set.toggle(Filter::exact(Key::num(1.0)));
        set.toggle(Filter::exact(Key::num(2.0)));
        set.toggle_all(vec![
            Filter::exact(Key::num(2.0)),
            Filter::exact(Key::num(3.0)),
        ]);
        assert!(set.contains(&Filter::exact(Key::num(1.0))));
        assert!(!set.contains(&Filter::exact(Key::num(2.0))));
        assert!(set.contains(&Filter::exact(Key::num(3.0))));
    }

    #[test]
    fn admits_consults_stored_capabilities() {
        let mut set = FilterSet::new();
        set.toggle(Filter::range(0.0, 10.0).unwrap());
        assert!(set.admits(&Filter::exact(Key::num(5.0))));
        assert!(!set.admits(&Filter::exact(Key::num(11.0))));
        assert!(set.admits(&Filter::range(0.0, 10.0).unwrap()));
    }
}
