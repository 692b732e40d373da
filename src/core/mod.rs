pub mod accessor;
pub mod key;
pub mod ordering;
pub mod scale;

pub use accessor::{
    KeyAccessor, OrderingAccessor, TitleAccessor, ValueAccessor, constant_value_accessor,
    default_key_accessor, default_title_accessor, default_value_accessor,
};
pub use key::{GroupRow, Key, decimal_to_f64};
pub use ordering::stable_sort_by_key;
pub use scale::XScale;
