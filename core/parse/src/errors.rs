//! Error types for the parser crate.

use pi_lex::{LexError, Pos};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// No grammar rule matched at a token position with input remaining.
    /// `rule_chain` names the rules being attempted at the furthest point the
    /// parser reached, outermost first.
    #[error("{offset} ({pos}): no rule matches `{found}` (while trying {rule_chain})")]
    ParseNoMatch {
        offset: usize,
        pos: Pos,
        found: String,
        rule_chain: String,
    },

    /// The rule tree references an undefined rule or is otherwise unusable.
    #[error("malformed grammar: {0}")]
    MalformedGrammar(String),

    #[error("invalid grammar json: {0}")]
    Json(String),
}

impl ParseError {
    /// Byte offset of the failure, when it is tied to the input.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Lex(e) => e.offset(),
            ParseError::ParseNoMatch { offset, .. } => Some(*offset),
            ParseError::MalformedGrammar(_) | ParseError::Json(_) => None,
        }
    }
}
