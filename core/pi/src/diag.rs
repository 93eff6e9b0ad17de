use core::fmt;
use std::fmt::{Display, Formatter};

use pi_lex::{LexError, Pos};
use pi_parse::ParseError;
use serde::{Deserialize, Serialize};

/// A lex or parse failure as shown to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub offset: usize,
    pub pos: Pos,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(offset: usize, pos: Pos, message: &str) -> Self {
        Self {
            offset,
            pos,
            message: message.to_string(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.offset, self.message)
    }
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        let pos = match err {
            LexError::LexNoMatch { pos, .. } | LexError::NoProgress { pos, .. } => *pos,
            LexError::MalformedGrammar(_) | LexError::Json(_) => Pos::default(),
        };
        Self::new(err.offset().unwrap_or(0), pos, &err.to_string())
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        match err {
            ParseError::Lex(e) => e.into(),
            ParseError::ParseNoMatch { offset, pos, .. } => Self::new(*offset, *pos, &err.to_string()),
            ParseError::MalformedGrammar(_) | ParseError::Json(_) => {
                Self::new(0, Pos::default(), &err.to_string())
            }
        }
    }
}
