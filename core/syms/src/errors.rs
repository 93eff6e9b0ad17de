//! Error types for the symbol crate.

use thiserror::Error;

use crate::kind::SymKind;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum SymError {
    #[error("{0} symbol with an empty name")]
    EmptyName(SymKind),

    #[error("no symbol with id {0}")]
    UnknownSymbol(u32),

    #[error("no symbol at path `{0}`")]
    PathNotFound(String),
}
