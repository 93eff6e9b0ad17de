//! Error types for the inference crate. A symbol whose type cannot be found
//! is not an error here; it carries the `SymType::Error` sentinel instead.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum InferError {
    #[error("type inference cancelled with {remaining} top-level symbols left")]
    Cancelled { remaining: usize },
}
