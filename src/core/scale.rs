use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::key::Key;
use crate::error::{ChartError, ChartResult};

/// The x-scale surface the stacking engine's domain filter consumes.
///
/// Only the data-model side of a scale lives here: the domain, whether it is
/// ordinal, and whether it auto-expands to fit data ("elastic"). Pixel
/// mapping belongs to the drawing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XScale {
    kind: XScaleKind,
    elastic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum XScaleKind {
    Linear {
        start: f64,
        end: f64,
    },
    Time {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Ordinal {
        categories: Vec<String>,
    },
}

impl XScale {
    pub fn linear(start: f64, end: f64) -> ChartResult<Self> {
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ChartError::InvalidData(
                "linear x domain must be finite with start < end".to_owned(),
            ));
        }
        Ok(Self {
            kind: XScaleKind::Linear { start, end },
            elastic: false,
        })
    }

    pub fn time(start: DateTime<Utc>, end: DateTime<Utc>) -> ChartResult<Self> {
        if start >= end {
            return Err(ChartError::InvalidData(
                "time x domain must satisfy start < end".to_owned(),
            ));
        }
        Ok(Self {
            kind: XScaleKind::Time { start, end },
            elastic: false,
        })
    }

    #[must_use]
    pub fn ordinal(categories: Vec<String>) -> Self {
        Self {
            kind: XScaleKind::Ordinal { categories },
            elastic: false,
        }
    }

    /// Marks the scale as auto-fitting its domain to the data.
    ///
    /// Elastic scales never clip: the domain filter passes every point
    /// through so the recomputed domain can grow to cover it.
    #[must_use]
    pub fn with_elastic(mut self, elastic: bool) -> Self {
        self.elastic = elastic;
        self
    }

    #[must_use]
    pub fn is_ordinal(&self) -> bool {
        matches!(self.kind, XScaleKind::Ordinal { .. })
    }

    #[must_use]
    pub fn is_elastic(&self) -> bool {
        self.elastic
    }

    #[must_use]
    pub fn numeric_domain(&self) -> Option<(f64, f64)> {
        match &self.kind {
            XScaleKind::Linear { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    #[must_use]
    pub fn time_domain(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match &self.kind {
            XScaleKind::Time { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    #[must_use]
    pub fn categories(&self) -> Option<&[String]> {
        match &self.kind {
            XScaleKind::Ordinal { categories } => Some(categories),
            _ => None,
        }
    }

    /// Inclusive domain containment for a key.
    ///
    /// A key of the wrong variant for the scale is never contained.
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        match &self.kind {
            XScaleKind::Linear { start, end } => match key {
                Key::Num(value) => value.0 >= *start && value.0 <= *end,
                _ => false,
            },
            XScaleKind::Time { start, end } => match key {
                Key::Date(value) => value >= start && value <= end,
                _ => false,
            },
            XScaleKind::Ordinal { categories } => match key {
                Key::Text(value) => categories.iter().any(|c| c == value),
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::XScale;
    use crate::core::key::Key;
    use chrono::{TimeZone, Utc};

    #[test]
    fn linear_domain_rejects_degenerate_bounds() {
        assert!(XScale::linear(5.0, 5.0).is_err());
        assert!(XScale::linear(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn linear_containment_is_inclusive() {
        let scale = XScale::linear(0.0, 10.0).unwrap();
        assert!(scale.contains(&Key::num(0.0)));
        assert!(scale.contains(&Key::num(10.0)));
        assert!(!scale.contains(&Key::num(10.000_001)));
        assert!(!scale.contains(&Key::text("a")));
    }

    #[test]
    fn time_containment_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let scale = XScale::time(start, end).unwrap();
        assert!(scale.contains(&Key::date(start)));
        assert!(scale.contains(&Key::date(end)));
        assert!(!scale.contains(&Key::num(3.0)));
    }

    #[test]
    fn ordinal_scale_reports_ordinal() {
        let scale = XScale::ordinal(vec!["a".to_owned(), "b".to_owned()]);
        assert!(scale.is_ordinal());
        assert!(scale.contains(&Key::text("b")));
        assert!(!scale.contains(&Key::text("c")));
    }
}
