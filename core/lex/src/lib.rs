#![warn(clippy::pedantic)]
//! Rule-tree lexer for the pi parsing framework.
//!
//! Lexers are data: a tree of [`LexRule`]s, loaded once per language (from JSON
//! or built in code) and validated into a [`LexGrammar`]. The [`Lexer`] walks
//! that tree over raw text and produces a flat sequence of classified
//! [`Token`]s that covers the input byte for byte.
//!
//! ```
//! use pi_lex::{LexAct, LexGrammar, LexRule, Matches, TokenKind, lex};
//!
//! let root = LexRule::new("Go")
//!     .child(LexRule::new("Space").matches(Matches::WhiteSpace).token(TokenKind::TextWhitespace).act(LexAct::Next))
//!     .child(LexRule::new("Name").matches(Matches::Letter).token(TokenKind::Name).act(LexAct::Name));
//! let grammar = LexGrammar::new(root).unwrap();
//! let out = lex(&grammar, "a b").unwrap();
//! assert_eq!(out.tokens.len(), 3);
//! ```

pub mod errors;
pub mod lexer;
pub mod matches;
pub mod pos;
pub mod rule;
pub mod text;
pub mod token;

pub use errors::LexError;
pub use lexer::{LexGrammar, LexOutput, LexState, Lexer, lex, relex_from_line};
pub use matches::{Cursor, MatchPos, Matches};
pub use pos::{Pos, Region};
pub use rule::{LexAct, LexRule};
pub use token::{Token, TokenCat, TokenKind};
