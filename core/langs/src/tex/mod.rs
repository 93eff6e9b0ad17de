//! The TeX plugin: command completion and bibliography-backed `\cite`
//! completion and lookup.

pub mod bib;
pub mod rules;

use std::path::Path;

use pi::complete::seed_matches;
use pi::{Completion, Edit, FileStates, Lang, Lookup, Matches, Supported};
use pi_lex::Pos;
use pi_lex::text::{is_letter_or_digit, last_field, last_scoped_string};
use pi_parse::{ParseError, Parser, Resync};

use crate::tex::bib::BibCache;
pub use rules::{tex_grammar, tex_lexer};

/// Standard LaTeX commands and environment names offered for completion.
pub const LATEX_CMDS: &[&str] = &[
    r"\em",
    r"\emph",
    r"\textbf",
    r"\textit",
    r"\texttt",
    r"\textsf",
    r"\textrm",
    r"\cite",
    r"\incite",
    r"\shortcite",
    r"\tiny",
    r"\scriptsize",
    r"\footnotesize",
    r"\small",
    r"\normalsize",
    r"\large",
    r"\Large",
    r"\LARGE",
    r"\huge",
    r"\Huge",
    r"\begin",
    r"\end",
    "enumerate",
    "itemize",
    "description",
    r"\item",
    "figure",
    "table",
    "tabular",
    "array",
    r"\hline",
    r"\cline",
    r"\multicolumn",
    "equation",
    "center",
    r"\centering",
    r"\verb",
    "verbatim",
    "quote",
    r"\section",
    r"\subsection",
    r"\subsubsection",
    r"\paragraph",
];

const CITE_CMDS: &[&str] = &[r"\cite", r"\incite", r"\shortcite"];

fn is_cite(field: &str) -> bool {
    CITE_CMDS.iter().any(|c| field.starts_with(c))
}

pub struct TexLang {
    parser: Parser,
    bibs: BibCache,
}

impl TexLang {
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedGrammar`] (or the wrapped lexer error)
    /// when a rule tree fails validation.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            parser: Parser::new(tex_lexer()?, tex_grammar()?),
            bibs: BibCache::new(),
        })
    }

    fn complete_cite(&self, fss: &FileStates, seed: &str) -> Matches {
        let mut matches = Matches {
            seed: seed.to_string(),
            matches: Vec::new(),
        };
        for file in self.bibs.files_for(Path::new(fss.filename())) {
            matches.matches.extend(
                file.entries
                    .iter()
                    .filter(|e| e.key.starts_with(seed))
                    .map(|e| Completion::new(&e.key, "cite").desc(&e.summary())),
            );
        }
        matches.rank();
        matches
    }

    fn lookup_cite(&self, fss: &FileStates, key: &str) -> Lookup {
        self.bibs
            .files_for(Path::new(fss.filename()))
            .iter()
            .find_map(|file| {
                file.entry(key).map(|e| Lookup {
                    filename: file.path.display().to_string(),
                    text: e.text.clone(),
                    start_line: e.start_line,
                    end_line: e.end_line,
                })
            })
            .unwrap_or_default()
    }
}

impl Lang for TexLang {
    fn sup(&self) -> Supported {
        Supported::TeX
    }

    fn parser(&self) -> Option<&Parser> {
        Some(&self.parser)
    }

    fn resync(&self) -> Resync {
        Resync::new(&["}"], &[])
    }

    fn complete_line(&self, fss: &FileStates, text: &str, _pos: Pos) -> Matches {
        let field = last_field(text);
        let mut seed = last_scoped_string(text);
        if is_cite(field) {
            return self.complete_cite(fss, seed);
        }
        // A command seed keeps its backslash.
        if field.strip_prefix('\\') == Some(seed) {
            seed = field;
        }
        let mut matches = Matches {
            seed: seed.to_string(),
            matches: seed_matches(seed, LATEX_CMDS.iter().copied(), "function"),
        };
        matches.rank();
        matches
    }

    fn lookup(&self, fss: &FileStates, text: &str, _pos: Pos) -> Lookup {
        if is_cite(last_field(text)) {
            return self.lookup_cite(fss, last_scoped_string(text));
        }
        Lookup::default()
    }

    /// Deletes the rest of the word after the cursor, stopping at `{`.
    fn complete_edit(
        &self,
        _fss: &FileStates,
        line: &str,
        cursor: usize,
        completion: &Completion,
        _seed: &str,
    ) -> Edit {
        let after = line.get(cursor..).unwrap_or("");
        let forward_delete = if after.starts_with(is_letter_or_digit) {
            after.find(|c: char| !is_letter_or_digit(c)).unwrap_or(after.len())
        } else {
            0
        };
        Edit {
            new_text: completion.text.clone(),
            forward_delete,
        }
    }
}
