use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("mandatory attribute `{attribute}` is not set on chart `{anchor}`")]
    InvalidState { anchor: String, attribute: String },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(
        "layer `{layer}` diverges from the canonical key sequence at index {index}: \
         expected `{expected}`, found `{found}`"
    )]
    LayerKeyMismatch {
        layer: String,
        index: usize,
        expected: String,
        found: String,
    },
}
