//! Error types for the language support hub.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum LangError {
    #[error("no specific support for language `{0}`")]
    Unsupported(String),

    /// Registration failed (e.g. a malformed grammar); the language stays off.
    #[error("support for {lang} is disabled: {reason}")]
    Disabled { lang: String, reason: String },

    #[error("{0} has no parser")]
    NoParser(String),

    #[error("cancelled with {remaining} files left")]
    Cancelled { remaining: usize },
}
