//! The capability set every supported language provides.

use pi_lex::text::last_scoped_string;
use pi_lex::{Pos, TokenCat};
use pi_parse::{Parser, Resync};
use pi_syms::TypeRegistry;
use pi_type_infer::{NodeNames, TypeHooks};

use crate::complete::{Completion, Edit, Lookup, Matches, edit_word};
use crate::file_state::{FileState, FileStates};
use crate::props::Supported;

/// A language plugin.
///
/// Only [`Lang::sup`], [`Lang::parser`] and the three editor entry points are
/// required. Languages without [`TypeHooks`] stop after symbol population.
pub trait Lang: Send + Sync {
    fn sup(&self) -> Supported;

    /// Lexer and grammar rule trees.
    fn parser(&self) -> Option<&Parser>;

    fn type_hooks(&self) -> Option<&dyn TypeHooks> {
        None
    }

    /// AST node names the generic inference dispatch looks for.
    fn node_names(&self) -> NodeNames {
        NodeNames::default()
    }

    /// Synchronizing tokens for the resync recovery policy.
    fn resync(&self) -> Resync {
        Resync::new(&[";"], &[])
    }

    /// Fills `fs.syms` (and `fs.pkg`) from `fs.ast`. Declared types may be
    /// registered in `types` along the way.
    fn populate_symbols(&self, fs: &mut FileState, types: &TypeRegistry) {
        let _ = (fs, types);
    }

    /// Candidates for `text`, the line up to the cursor at `pos`.
    fn complete_line(&self, fss: &FileStates, text: &str, pos: Pos) -> Matches;

    /// Detail for the term ending at the cursor.
    fn lookup(&self, fss: &FileStates, text: &str, pos: Pos) -> Lookup;

    /// Edit applying `completion` on `line` with the cursor at byte `cursor`;
    /// `seed` is the text the completion replaces.
    fn complete_edit(
        &self,
        fss: &FileStates,
        line: &str,
        cursor: usize,
        completion: &Completion,
        seed: &str,
    ) -> Edit;
}

/// A language known only by its rule trees, e.g. loaded from JSON. Completes
/// from the names in the last finished lex pass.
pub struct GrammarLang {
    sup: Supported,
    parser: Parser,
}

impl GrammarLang {
    #[must_use]
    pub fn new(sup: Supported, parser: Parser) -> Self {
        Self { sup, parser }
    }
}

impl Lang for GrammarLang {
    fn sup(&self) -> Supported {
        self.sup
    }

    fn parser(&self) -> Option<&Parser> {
        Some(&self.parser)
    }

    fn complete_line(&self, fss: &FileStates, text: &str, _pos: Pos) -> Matches {
        let seed = last_scoped_string(text);
        let mut matches = Matches {
            seed: seed.to_string(),
            matches: Vec::new(),
        };
        if seed.is_empty() {
            return matches;
        }
        let done = fss.done();
        for tok in &done.lex.tokens {
            if tok.kind.cat() != TokenCat::Name {
                continue;
            }
            let word = tok.text(&done.src);
            if word.starts_with(seed) {
                matches.matches.push(Completion::new(word, "name"));
            }
        }
        matches.rank();
        matches
    }

    fn lookup(&self, _: &FileStates, _: &str, _: Pos) -> Lookup {
        Lookup::default()
    }

    fn complete_edit(
        &self,
        _: &FileStates,
        line: &str,
        cursor: usize,
        completion: &Completion,
        _: &str,
    ) -> Edit {
        edit_word(line.get(cursor..).unwrap_or(""), completion)
    }
}
