//! Typed filter values and the filter-mutation input union.
//!
//! The filter value is a closed union instead of shape-sniffed dynamic
//! arguments: a scalar with equality semantics, an inclusive range, or a
//! label-identified predicate. Bulk toggling is spelled explicitly through
//! [`FilterInput::BulkToggle`] rather than detected from nesting.

mod filter_set;

pub use filter_set::{FilterSet, FilterToggle};

use std::fmt;
use std::rc::Rc;

use crate::core::key::Key;
use crate::error::{ChartError, ChartResult};

/// A single active filter value.
#[derive(Clone)]
pub enum Filter {
    /// Equality against one key.
    Exact(Key),
    /// Inclusive numeric containment. Date keys are compared through their
    /// unix-seconds view; text keys are never inside a range.
    Range { lo: f64, hi: f64 },
    /// Arbitrary predicate, identified by its label.
    Predicate(PredicateFilter),
}

impl Filter {
    #[must_use]
    pub fn exact(key: Key) -> Self {
        Self::Exact(key)
    }

    pub fn range(lo: f64, hi: f64) -> ChartResult<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(ChartError::InvalidData(
                "range filter bounds must be finite with lo <= hi".to_owned(),
            ));
        }
        Ok(Self::Range { lo, hi })
    }

    #[must_use]
    pub fn predicate(
        label: impl Into<String>,
        predicate: impl Fn(&Key) -> bool + 'static,
    ) -> Self {
        Self::Predicate(PredicateFilter::new(label, predicate))
    }

    /// Whether a datum with key `key` passes this filter.
    #[must_use]
    pub fn is_filtered(&self, key: &Key) -> bool {
        match self {
            Self::Exact(expected) => expected == key,
            Self::Range { lo, hi } => key
                .as_f64()
                .is_some_and(|value| value >= *lo && value <= *hi),
            Self::Predicate(filter) => filter.is_filtered(key),
        }
    }
}

/// Symmetric filter equality: scalars by key, ranges by endpoints,
/// predicates by label. Cross-variant comparisons are never equal.
impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Range { lo: a_lo, hi: a_hi }, Self::Range { lo: b_lo, hi: b_hi }) => {
                a_lo == b_lo && a_hi == b_hi
            }
            (Self::Predicate(a), Self::Predicate(b)) => a.label == b.label,
            _ => false,
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => f.debug_tuple("Exact").field(key).finish(),
            Self::Range { lo, hi } => f
                .debug_struct("Range")
                .field("lo", lo)
                .field("hi", hi)
                .finish(),
            Self::Predicate(filter) => f
                .debug_tuple("Predicate")
                .field(&filter.label)
                .finish(),
        }
    }
}

/// Human-readable affordance label, e.g. for a "reset" control.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => write!(f, "{key}"),
            Self::Range { lo, hi } => write!(f, "[{lo} -> {hi}]"),
            Self::Predicate(filter) => write!(f, "{}", filter.label),
        }
    }
}

/// Predicate filter with a label that stands in for closure identity.
#[derive(Clone)]
pub struct PredicateFilter {
    label: String,
    predicate: Rc<dyn Fn(&Key) -> bool>,
}

impl PredicateFilter {
    #[must_use]
    pub fn new(label: impl Into<String>, predicate: impl Fn(&Key) -> bool + 'static) -> Self {
        Self {
            label: label.into(),
            predicate: Rc::new(predicate),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_filtered(&self, key: &Key) -> bool {
        (self.predicate)(key)
    }
}

/// Input to a filter mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterInput {
    /// Remove every active filter.
    Clear,
    /// Toggle one filter: remove when present, add otherwise.
    One(Filter),
    /// Symmetric difference of every element against the current set,
    /// applied and notified as a single batch.
    BulkToggle(Vec<Filter>),
}

#[cfg(test)]
mod tests {
    use super::Filter;
    use crate::core::key::Key;
    use chrono::{TimeZone, Utc};

    #[test]
    fn exact_filters_compare_by_key() {
        assert_eq!(Filter::exact(Key::num(3.0)), Filter::exact(Key::num(3.0)));
        assert_ne!(Filter::exact(Key::num(3.0)), Filter::exact(Key::num(4.0)));
        assert_ne!(
            Filter::exact(Key::num(3.0)),
            Filter::range(3.0, 3.0).unwrap()
        );
    }

    #[test]
    fn range_containment_is_inclusive() {
        let filter = Filter::range(1.0, 5.0).unwrap();
        assert!(filter.is_filtered(&Key::num(1.0)));
        assert!(filter.is_filtered(&Key::num(5.0)));
        assert!(!filter.is_filtered(&Key::num(5.1)));
        assert!(!filter.is_filtered(&Key::text("5")));
    }

    #[test]
    fn range_admits_dates_through_unix_seconds() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let ts = date.timestamp() as f64;
        let filter = Filter::range(ts - 1.0, ts + 1.0).unwrap();
        assert!(filter.is_filtered(&Key::date(date)));
    }

    #[test]
    fn predicates_compare_by_label() {
        let a = Filter::predicate("evens", |k| {
            k.as_f64().is_some_and(|v| (v as i64) % 2 == 0)
        });
        let b = Filter::predicate("evens", |_| false);
        assert_eq!(a, b);
        assert!(a.is_filtered(&Key::num(4.0)));
        assert!(!a.is_filtered(&Key::num(3.0)));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(Filter::range(5.0, 1.0).is_err());
    }
}
