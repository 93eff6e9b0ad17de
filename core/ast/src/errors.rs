//! Error types for the AST crate.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// A child-name path did not resolve.
    #[error("no node at path `{path}` under `{from}`")]
    PathNotFound { path: String, from: String },
}
