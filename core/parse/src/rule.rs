//! Grammar rule trees.
//!
//! A grammar is a tree of [`ParseRule`]s. Each rule has a [`RuleKind`] saying
//! how its children compose, an [`AstAct`] saying what a successful match does
//! to the tree, and two flags that turn it into a zero-width test: `reverse`
//! matches the rule's tokens backward, ending just before the cursor, and
//! `exclude` succeeds only when the rule's content does not match.

use pi_ast::AstAct;
use pi_lex::{Token, TokenCat, TokenKind};
use serde::{Deserialize, Serialize};

/// Constraints on a single token. Every constraint that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenMatch {
    pub kind: Option<TokenKind>,
    pub cat: Option<TokenCat>,
    pub text: Option<String>,
}

impl TokenMatch {
    #[must_use]
    pub fn matches(&self, token: &Token, src: &str) -> bool {
        self.kind.is_none_or(|k| k == token.kind)
            && self.cat.is_none_or(|c| c == token.kind.cat())
            && self.text.as_deref().is_none_or(|t| t == token.text(src))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    /// Children in order; all must match.
    #[default]
    Seq,
    /// Children in declaration order; the first that matches wins.
    Alt,
    /// Children as a sequence, or nothing.
    Opt,
    /// Children as a sequence, repeated `min` or more times.
    Repeat { min: usize },
    /// Exactly one token.
    Token(TokenMatch),
    /// The rule of that name, wherever it is declared.
    Ref(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseRule {
    pub name: String,
    pub desc: String,
    pub off: bool,
    pub kind: RuleKind,
    pub act: AstAct,
    pub reverse: bool,
    pub exclude: bool,
    pub children: Vec<ParseRule>,
}

impl ParseRule {
    #[must_use]
    pub fn new(name: &str, kind: RuleKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn seq(name: &str) -> Self {
        Self::new(name, RuleKind::Seq)
    }

    #[must_use]
    pub fn alt(name: &str) -> Self {
        Self::new(name, RuleKind::Alt)
    }

    #[must_use]
    pub fn opt(name: &str) -> Self {
        Self::new(name, RuleKind::Opt)
    }

    #[must_use]
    pub fn repeat(name: &str, min: usize) -> Self {
        Self::new(name, RuleKind::Repeat { min })
    }

    /// A reference to the rule named `target`, itself named after it.
    #[must_use]
    pub fn to(target: &str) -> Self {
        Self::new(target, RuleKind::Ref(target.to_string()))
    }

    /// Token with exactly this text.
    #[must_use]
    pub fn text(name: &str, text: &str) -> Self {
        Self::new(
            name,
            RuleKind::Token(TokenMatch {
                text: Some(text.to_string()),
                ..TokenMatch::default()
            }),
        )
    }

    /// Token of this kind.
    #[must_use]
    pub fn kind(name: &str, kind: TokenKind) -> Self {
        Self::new(
            name,
            RuleKind::Token(TokenMatch {
                kind: Some(kind),
                ..TokenMatch::default()
            }),
        )
    }

    /// Token of this category.
    #[must_use]
    pub fn cat(name: &str, cat: TokenCat) -> Self {
        Self::new(
            name,
            RuleKind::Token(TokenMatch {
                cat: Some(cat),
                ..TokenMatch::default()
            }),
        )
    }

    #[must_use]
    pub fn act(mut self, act: AstAct) -> Self {
        self.act = act;
        self
    }

    #[must_use]
    pub fn off(mut self) -> Self {
        self.off = true;
        self
    }

    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    #[must_use]
    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    #[must_use]
    pub fn desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    #[must_use]
    pub fn child(mut self, child: ParseRule) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = ParseRule>) -> Self {
        self.children.extend(children);
        self
    }

    /// Zero-width rules consume nothing and build nothing.
    #[must_use]
    pub fn is_lookaround(&self) -> bool {
        self.reverse || self.exclude
    }

    /// Visits this rule and all descendants in preorder.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a ParseRule)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use pi_lex::Pos;

    use super::*;

    #[test]
    fn token_match_checks_all_set_fields() {
        let src = "foo";
        let tok = Token {
            kind: TokenKind::Name,
            start: 0,
            end: 3,
            pos: Pos::default(),
            rule: 0,
        };
        assert!(TokenMatch::default().matches(&tok, src));
        let m = TokenMatch {
            cat: Some(TokenCat::Name),
            text: Some("foo".into()),
            ..TokenMatch::default()
        };
        assert!(m.matches(&tok, src));
        let m = TokenMatch {
            kind: Some(TokenKind::Keyword),
            text: Some("foo".into()),
            ..TokenMatch::default()
        };
        assert!(!m.matches(&tok, src));
    }

    #[test]
    fn rules_round_trip_through_json() {
        let rule = ParseRule::seq("Decl")
            .act(AstAct::AddAst)
            .child(ParseRule::text("var", "var"))
            .child(ParseRule::to("Name").act(AstAct::AnchorFirstAst));
        let json = serde_json::to_string(&rule).unwrap();
        let back: ParseRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.children.len(), 2);
        assert_eq!(back.children[1].kind, RuleKind::Ref("Name".into()));
        assert_eq!(back.children[1].act, AstAct::AnchorFirstAst);
    }
}
