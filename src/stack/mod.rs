mod engine;
mod layer;

pub use engine::{
    AxisPadding, ChartDataSnapshot, LayerSnapshot, StackFunction, StackRow,
    default_stack_function,
};
pub use layer::{Layer, StackPoint};

pub(crate) use engine::StackState;
