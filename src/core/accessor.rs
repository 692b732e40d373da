//! Accessor closures resolved against aggregated records.
//!
//! Accessors are always stored as functions; constants are wrapped into a
//! closure at the setter boundary. Everything is `Rc`: the coordination
//! model is single-threaded and cooperative.

use std::rc::Rc;

use crate::core::key::{GroupRow, Key};

pub type KeyAccessor = Rc<dyn Fn(&GroupRow) -> Key>;
pub type ValueAccessor = Rc<dyn Fn(&GroupRow) -> f64>;
pub type TitleAccessor = Rc<dyn Fn(&GroupRow) -> String>;
pub type OrderingAccessor = Rc<dyn Fn(&GroupRow) -> Key>;

#[must_use]
pub fn default_key_accessor() -> KeyAccessor {
    Rc::new(|row: &GroupRow| row.key.clone())
}

#[must_use]
pub fn default_value_accessor() -> ValueAccessor {
    Rc::new(|row: &GroupRow| row.value)
}

#[must_use]
pub fn default_title_accessor() -> TitleAccessor {
    Rc::new(|row: &GroupRow| format!("{}: {}", row.key, row.value))
}

/// Wraps a constant value into a value accessor.
#[must_use]
pub fn constant_value_accessor(value: f64) -> ValueAccessor {
    Rc::new(move |_: &GroupRow| value)
}
