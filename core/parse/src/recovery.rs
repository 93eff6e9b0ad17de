//! What the parser does after a top-level `ParseNoMatch`.

use pi_lex::Token;
use serde::{Deserialize, Serialize};

/// Decides whether and where parsing resumes after a failure.
pub trait RecoveryPolicy: Send + Sync {
    /// Token index to resume at, or `None` to abandon the parse. An index at
    /// or before `failed_at` is treated as `None`.
    fn recover(&self, src: &str, tokens: &[Token], failed_at: usize, errors: usize) -> Option<usize>;
}

/// Stops at the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Abandon;

impl RecoveryPolicy for Abandon {
    fn recover(&self, _: &str, _: &[Token], _: usize, _: usize) -> Option<usize> {
        None
    }
}

/// Skips ahead to a synchronising token: just past the next `after` token
/// (typically `;` or `}`), or at the next `before` token (typically a
/// keyword that opens a declaration), whichever comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resync {
    pub after: Vec<String>,
    pub before: Vec<String>,
    /// Give up after this many errors; 0 means no limit.
    pub max_errors: usize,
}

impl Resync {
    #[must_use]
    pub fn new(after: &[&str], before: &[&str]) -> Self {
        Self {
            after: after.iter().map(ToString::to_string).collect(),
            before: before.iter().map(ToString::to_string).collect(),
            max_errors: 0,
        }
    }

    #[must_use]
    pub fn max_errors(mut self, max: usize) -> Self {
        self.max_errors = max;
        self
    }
}

impl RecoveryPolicy for Resync {
    fn recover(&self, src: &str, tokens: &[Token], failed_at: usize, errors: usize) -> Option<usize> {
        if self.max_errors > 0 && errors >= self.max_errors {
            return None;
        }
        for (i, tok) in tokens.iter().enumerate().skip(failed_at) {
            let text = tok.text(src);
            if i > failed_at && self.before.iter().any(|b| b == text) {
                return Some(i);
            }
            if self.after.iter().any(|a| a == text) {
                return Some(i + 1);
            }
        }
        Some(tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use pi_lex::{Pos, TokenKind};

    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let mut out = Vec::new();
        let mut at = 0;
        for word in src.split(' ') {
            out.push(Token {
                kind: TokenKind::Text,
                start: at,
                end: at + word.len(),
                pos: Pos::default(),
                rule: 0,
            });
            at += word.len() + 1;
        }
        out
    }

    #[test]
    fn resync_skips_past_terminator() {
        let src = "x ? ? ; func f";
        let toks = tokens(src);
        let policy = Resync::new(&[";"], &["func"]);
        assert_eq!(policy.recover(src, &toks, 1, 0), Some(4));
    }

    #[test]
    fn resync_stops_before_keyword() {
        let src = "? ? func f ;";
        let toks = tokens(src);
        let policy = Resync::new(&[";"], &["func"]);
        assert_eq!(policy.recover(src, &toks, 0, 0), Some(2));
        assert_eq!(policy.clone().max_errors(1).recover(src, &toks, 0, 1), None);
    }

    #[test]
    fn abandon_never_resumes() {
        assert_eq!(Abandon.recover("", &[], 0, 0), None);
    }
}
