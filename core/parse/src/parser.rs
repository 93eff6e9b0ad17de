//! Lexer plus grammar: the per-language parser.

use pi_ast::{Arena, AstBuilder};
use pi_lex::{LexGrammar, LexOutput, Pos, Token, lex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{Engine, ParseStats, commit};
use crate::errors::ParseError;
use crate::grammar::Grammar;
use crate::recovery::RecoveryPolicy;

/// Result of a parse pass.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub lex: LexOutput,
    /// The significant tokens the grammar ran over; AST token spans index
    /// into this sequence.
    pub tokens: Vec<Token>,
    pub ast: Arena,
    /// Failures the recovery policy resynchronized past.
    pub errors: Vec<ParseError>,
    pub stats: ParseStats,
}

/// A language's lexer and grammar, loaded once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Parser {
    lexer: LexGrammar,
    grammar: Grammar,
}

/// Serialized form of a [`Parser`]: both rule trees in one document.
#[derive(Serialize, Deserialize)]
struct ParserDoc {
    lexer: pi_lex::LexRule,
    grammar: crate::rule::ParseRule,
}

impl Parser {
    #[must_use]
    pub fn new(lexer: LexGrammar, grammar: Grammar) -> Self {
        Self { lexer, grammar }
    }

    /// Loads both rule trees from one JSON document with `lexer` and
    /// `grammar` fields.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is invalid or either tree is
    /// malformed.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let doc: ParserDoc =
            serde_json::from_str(json).map_err(|e| ParseError::Json(e.to_string()))?;
        Ok(Self {
            lexer: LexGrammar::new(doc.lexer)?,
            grammar: Grammar::new(doc.grammar)?,
        })
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        let doc = ParserDoc {
            lexer: self.lexer.root().clone(),
            grammar: self.grammar.root().clone(),
        };
        serde_json::to_string_pretty(&doc).map_err(|e| ParseError::Json(e.to_string()))
    }

    #[must_use]
    pub fn lexer(&self) -> &LexGrammar {
        &self.lexer
    }

    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// # Errors
    ///
    /// Returns [`ParseError::Lex`] when lexing fails.
    pub fn lex(&self, src: &str) -> Result<LexOutput, ParseError> {
        Ok(lex(&self.lexer, src)?)
    }

    /// Lexes and parses `src`.
    ///
    /// # Errors
    ///
    /// Returns the lex error, or the parse failure the recovery policy chose
    /// not to resynchronize past.
    pub fn parse(&self, src: &str, recovery: &dyn RecoveryPolicy) -> Result<ParseOutput, ParseError> {
        let lexed = self.lex(src)?;
        self.parse_lexed(src, lexed, recovery)
    }

    /// Parses an existing lex pass of `src`.
    ///
    /// # Errors
    ///
    /// Returns the parse failure the recovery policy chose not to
    /// resynchronize past.
    pub fn parse_lexed(
        &self,
        src: &str,
        lexed: LexOutput,
        recovery: &dyn RecoveryPolicy,
    ) -> Result<ParseOutput, ParseError> {
        let tokens = lexed.significant();
        let (ast, errors, stats) = parse_tokens(&self.grammar, src, &tokens, recovery)?;
        Ok(ParseOutput {
            lex: lexed,
            tokens,
            ast,
            errors,
            stats,
        })
    }
}

/// Runs `grammar` over significant `tokens`.
///
/// Top-level alternatives are matched one declaration at a time; each
/// successful declaration is replayed into the tree and its anchors are
/// dropped before the next one starts.
///
/// # Errors
///
/// Returns [`ParseError::ParseNoMatch`] for the first failure `recovery` does
/// not resynchronize past.
pub fn parse_tokens(
    grammar: &Grammar,
    src: &str,
    tokens: &[Token],
    recovery: &dyn RecoveryPolicy,
) -> Result<(Arena, Vec<ParseError>, ParseStats), ParseError> {
    let mut engine = Engine::new(grammar, src, tokens);
    let mut builder = AstBuilder::new(src, tokens, grammar.root_name());
    let mut errors = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        if let Some(m) = engine.match_top(pos) {
            commit(grammar, &mut builder, &m);
            builder.reset_anchors();
            pos = m.end;
            continue;
        }
        let err = no_match(&engine, src, tokens, pos);
        debug!(error = %err, "top-level parse failure");
        match recovery.recover(src, tokens, pos, errors.len()) {
            Some(next) if next > pos => {
                warn!(skipped = next - pos, "resynchronized after parse error");
                errors.push(err);
                pos = next;
            }
            _ => return Err(err),
        }
    }
    Ok((builder.finish(), errors, engine.stats))
}

fn no_match(engine: &Engine<'_, '_>, src: &str, tokens: &[Token], pos: usize) -> ParseError {
    let (at, rule_chain) = engine.furthest_failure(pos);
    match tokens.get(at) {
        Some(tok) => ParseError::ParseNoMatch {
            offset: tok.start,
            pos: tok.pos,
            found: tok.text(src).to_string(),
            rule_chain,
        },
        None => ParseError::ParseNoMatch {
            offset: src.len(),
            pos: tokens
                .last()
                .map_or(Pos::default(), |t| t.end_pos(src)),
            found: "end of input".to_string(),
            rule_chain,
        },
    }
}
