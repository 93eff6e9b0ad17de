//! Lexical rule trees.
//!
//! A rule matches at the cursor through its classifier ([`Matches`]); when it
//! has children the first matching child (in declaration order) takes over,
//! otherwise the rule's own [`LexAct`]s run and emit one token.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::matches::{MatchPos, Matches};
use crate::token::TokenKind;

/// What a matched rule does at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexAct {
    /// Consume the matched text (or the rule string, or one character).
    Next,
    /// Consume a run of letters and digits; keywords are looked up in `name_map`.
    Name,
    /// Consume a numeric literal; the token kind reflects the literal flavor.
    Number,
    /// Consume a quoted string starting at the cursor, honoring `\` escapes.
    Quoted,
    /// Consume a quoted string without escape processing.
    QuotedRaw,
    /// Consume up to (not including) the end of the line.
    Eol,
    /// Consume through `until`; with `nest`, occurrences of the rule string
    /// deepen the nesting and each needs its own terminator.
    ReadUntil,
    PushState,
    PopState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexRule {
    pub name: String,
    pub desc: String,
    pub off: bool,
    pub token: TokenKind,
    pub matches: Matches,
    pub pos: MatchPos,
    pub string: String,
    pub offset: usize,
    pub reverse: bool,
    pub exclude: bool,
    pub acts: Vec<LexAct>,
    pub until: String,
    pub nest: bool,
    pub push_state: String,
    pub name_map: FxHashMap<String, TokenKind>,
    pub children: Vec<LexRule>,
    #[serde(skip)]
    pub(crate) id: u32,
}

impl LexRule {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn token(mut self, kind: TokenKind) -> Self {
        self.token = kind;
        self
    }

    #[must_use]
    pub fn matches(mut self, matches: Matches) -> Self {
        self.matches = matches;
        self
    }

    #[must_use]
    pub fn string(mut self, s: &str) -> Self {
        self.string = s.to_string();
        self
    }

    #[must_use]
    pub fn at(mut self, pos: MatchPos) -> Self {
        self.pos = pos;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
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
    pub fn off(mut self) -> Self {
        self.off = true;
        self
    }

    #[must_use]
    pub fn act(mut self, act: LexAct) -> Self {
        self.acts.push(act);
        self
    }

    #[must_use]
    pub fn until(mut self, until: &str, nest: bool) -> Self {
        self.until = until.to_string();
        self.nest = nest;
        self.acts.push(LexAct::ReadUntil);
        self
    }

    #[must_use]
    pub fn push(mut self, state: &str) -> Self {
        self.push_state = state.to_string();
        self.acts.push(LexAct::PushState);
        self
    }

    #[must_use]
    pub fn keyword(mut self, word: &str, kind: TokenKind) -> Self {
        self.name_map.insert(word.to_string(), kind);
        self
    }

    #[must_use]
    pub fn child(mut self, child: LexRule) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = LexRule>) -> Self {
        self.children.extend(children);
        self
    }

    /// Assigns preorder ids starting at `next`; returns the next free id.
    pub(crate) fn number(&mut self, next: u32) -> u32 {
        self.id = next;
        let mut next = next + 1;
        for child in &mut self.children {
            next = child.number(next);
        }
        next
    }

    /// Visits this rule and all descendants in preorder.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a LexRule)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}
