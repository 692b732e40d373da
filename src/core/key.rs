use std::fmt;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// A chart key: the x-side of an aggregated record.
///
/// Keys are totally ordered and hashable so they can drive re-keying,
/// ordinal category ordering, and axis-extent computation. Cross-variant
/// comparisons fall back to the variant order (numbers, then text, then
/// dates); in practice a single chart carries one key variant throughout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Num(OrderedFloat<f64>),
    Text(String),
    Date(DateTime<Utc>),
}

impl Key {
    #[must_use]
    pub fn num(value: f64) -> Self {
        Self::Num(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn date(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }

    /// Numeric view used by range filters and linear-domain clipping.
    ///
    /// Dates map to fractional unix seconds; text has no numeric view.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(value) => Some(value.0),
            Self::Text(_) => None,
            Self::Date(value) => Some(datetime_to_unix_seconds(*value)),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(value) => write!(f, "{}", value.0),
            Self::Text(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.to_rfc3339()),
        }
    }
}

/// One aggregated record: the `(key, value)` pair a group source produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub key: Key,
    pub value: f64,
}

impl GroupRow {
    #[must_use]
    pub fn new(key: Key, value: f64) -> Self {
        Self { key, value }
    }

    pub fn from_decimal(key: Key, value: Decimal) -> ChartResult<Self> {
        Ok(Self {
            key,
            value: decimal_to_f64(value, "group value")?,
        })
    }
}

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}
