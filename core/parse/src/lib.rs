#![warn(clippy::pedantic)]
//! Rule-tree parser for the pi parsing framework.
//!
//! A [`Grammar`] is a tree of [`ParseRule`]s matched depth-first over the
//! significant tokens produced by `pi-lex`. Successful matches are folded into
//! an arena AST through each rule's [`pi_ast::AstAct`]. Rules flagged `off`
//! are never attempted, and zero-width `reverse`/`exclude` rules settle
//! ambiguous tokens with a bounded look behind or ahead.
//!
//! ```
//! use pi_ast::AstAct;
//! use pi_lex::{LexAct, LexGrammar, LexRule, Matches, TokenKind};
//! use pi_parse::{Abandon, Grammar, ParseRule, Parser};
//!
//! let lexer = LexGrammar::new(
//!     LexRule::new("Calc")
//!         .child(LexRule::new("Space").matches(Matches::WhiteSpace).token(TokenKind::TextWhitespace).act(LexAct::Next))
//!         .child(LexRule::new("Num").matches(Matches::Digit).token(TokenKind::LitNumInteger).act(LexAct::Number))
//!         .child(LexRule::new("Plus").string("+").token(TokenKind::OpMathAdd).act(LexAct::Next)),
//! )
//! .unwrap();
//! let grammar = Grammar::new(
//!     ParseRule::seq("File").child(
//!         ParseRule::seq("Sum")
//!             .act(AstAct::AddAst)
//!             .child(ParseRule::kind("Num", TokenKind::LitNumInteger).act(AstAct::AddAst))
//!             .child(ParseRule::text("Plus", "+"))
//!             .child(ParseRule::kind("Num", TokenKind::LitNumInteger).act(AstAct::AddAst)),
//!     ),
//! )
//! .unwrap();
//! let out = Parser::new(lexer, grammar).parse("1 + 2", &Abandon).unwrap();
//! assert_eq!(out.ast.write_tree(1), "File: \n  Sum: 1 + 2\n    Num: 1\n    Num: 2\n");
//! ```

pub mod engine;
pub mod errors;
pub mod grammar;
pub mod parser;
pub mod recovery;
pub mod rule;

pub use engine::ParseStats;
pub use errors::ParseError;
pub use grammar::Grammar;
pub use parser::{ParseOutput, Parser, parse_tokens};
pub use recovery::{Abandon, RecoveryPolicy, Resync};
pub use rule::{ParseRule, RuleKind, TokenMatch};
