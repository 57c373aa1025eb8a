//! Kestrel error types.

use crate::il;
use thiserror::Error;

/// Kestrel's error type. Errors signal invariant violations inside the
/// analysis, never merely unsupported input; unsupported constructs are
/// skipped during graph construction instead.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// An invariant of the analysis was violated
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A vertex was not found in the constraint graph
    #[error("The vertex id {0} does not exist in the constraint graph")]
    VertexNotFound(usize),

    /// A value was not found in a function
    #[error("The value id {0} does not exist in the function")]
    ValueNotFound(usize),

    /// A block was not found in a function
    #[error("The block id {0} does not exist in the function")]
    BlockNotFound(usize),

    /// An operator which is not a comparison was inverted
    #[error("The operator {0} is not a comparison and cannot be inverted")]
    UnsupportedComparison(il::Op),
}
