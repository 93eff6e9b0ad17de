//! Error types for the lexer crate.

use thiserror::Error;

use crate::pos::Pos;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum LexError {
    /// No lexical rule matched; lexing cannot continue past `offset`.
    #[error("{offset} ({pos}): no lexical rule matches `{found}` in state `{state}`")]
    LexNoMatch {
        offset: usize,
        pos: Pos,
        found: String,
        state: String,
    },

    /// A rule kept matching without consuming input or changing state.
    #[error("{offset} ({pos}): rule `{rule}` makes no progress")]
    NoProgress {
        offset: usize,
        pos: Pos,
        rule: String,
    },

    /// The rule tree references something that does not exist.
    #[error("malformed lexer grammar: {0}")]
    MalformedGrammar(String),

    #[error("invalid lexer grammar json: {0}")]
    Json(String),
}

impl LexError {
    /// Byte offset of the failure, when it is tied to the input.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            LexError::LexNoMatch { offset, .. } | LexError::NoProgress { offset, .. } => {
                Some(*offset)
            }
            LexError::MalformedGrammar(_) | LexError::Json(_) => None,
        }
    }
}
