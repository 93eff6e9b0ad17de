//! The Go plugin.
//!
//! [`GoLang`] carries the Go lexer and grammar rule trees and implements
//! every [`Lang`] capability: symbol population, type hooks, completion,
//! lookup and edits.

mod complete;
pub mod grammar;
pub mod lexer;
mod symbols;
pub mod types;

use pi::{Completion, Edit, FileState, FileStates, Lang, Lookup, Matches, Supported};
use pi_lex::Pos;
use pi_parse::{ParseError, Parser, Resync};
use pi_syms::TypeRegistry;
use pi_type_infer::TypeHooks;

pub use grammar::{go_grammar, go_resync};
pub use lexer::go_lexer;
pub use types::GoTypes;

pub struct GoLang {
    parser: Parser,
}

impl GoLang {
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedGrammar`] (or the wrapped lexer error)
    /// when a rule tree fails validation.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            parser: Parser::new(go_lexer()?, go_grammar()?),
        })
    }
}

impl Lang for GoLang {
    fn sup(&self) -> Supported {
        Supported::Go
    }

    fn parser(&self) -> Option<&Parser> {
        Some(&self.parser)
    }

    fn type_hooks(&self) -> Option<&dyn TypeHooks> {
        Some(&GoTypes)
    }

    fn resync(&self) -> Resync {
        go_resync()
    }

    fn populate_symbols(&self, fs: &mut FileState, types: &TypeRegistry) {
        symbols::populate(fs, types);
    }

    fn complete_line(&self, fss: &FileStates, text: &str, pos: Pos) -> Matches {
        complete::complete_line(fss, text, pos)
    }

    fn lookup(&self, fss: &FileStates, text: &str, pos: Pos) -> Lookup {
        complete::lookup(fss, text, pos)
    }

    fn complete_edit(
        &self,
        _fss: &FileStates,
        line: &str,
        cursor: usize,
        completion: &Completion,
        _seed: &str,
    ) -> Edit {
        complete::complete_edit(line, cursor, completion)
    }
}
