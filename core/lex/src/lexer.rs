//! Lexer engine.
//!
//! The engine walks a [`LexGrammar`] against raw text. At every position the
//! root's children are tried in declaration order and the first match wins; a
//! matching rule with children delegates to them, a leaf runs its actions and
//! emits exactly one token. Nothing is skipped: every consumed byte lands in a
//! token, so concatenating the token texts reproduces the input.
//!
//! Sub-lexing (inside strings, block comments, ...) is driven by a stack of
//! named states. Rules push and pop states through [`LexAct::PushState`] and
//! [`LexAct::PopState`], and [`Matches::CurState`] rules select the branch of the
//! tree that handles the active state.
//!
//! The full lexer state is a plain value ([`LexState`]); a pass can be resumed
//! from any snapshot and produces the same tokens as an uninterrupted pass.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::LexError;
use crate::matches::{Cursor, Matches, is_match};
use crate::pos::Pos;
use crate::rule::{LexAct, LexRule};
use crate::text::{is_letter_or_digit, line_start_offset};
use crate::token::{Token, TokenKind};

/// Zero-width steps (pure state changes) allowed in a row before the lexer
/// declares that a rule makes no progress.
const MAX_ZERO_WIDTH_STEPS: usize = 32;

/// A validated, numbered lexical rule tree. Immutable once built.
#[derive(Debug, Clone)]
pub struct LexGrammar {
    root: LexRule,
    states: FxHashSet<String>,
    rule_count: u32,
}

impl LexGrammar {
    /// Numbers the rules and checks that every pushed state is handled by
    /// some `CurState` rule.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::MalformedGrammar`] when a rule pushes an unknown state
    /// or is missing the operand its actions need.
    pub fn new(mut root: LexRule) -> Result<Self, LexError> {
        let rule_count = root.number(0);
        let mut states = FxHashSet::default();
        root.walk(&mut |r| {
            if r.matches == Matches::CurState && !r.off {
                states.insert(r.string.clone());
            }
        });
        let mut problems = Vec::new();
        root.walk(&mut |r| {
            if r.off {
                return;
            }
            for act in &r.acts {
                match act {
                    LexAct::PushState if r.push_state.is_empty() => {
                        problems.push(format!("rule `{}` pushes an unnamed state", r.name));
                    }
                    LexAct::PushState if !states.contains(&r.push_state) => {
                        problems.push(format!(
                            "rule `{}` pushes undefined state `{}`",
                            r.name, r.push_state
                        ));
                    }
                    LexAct::ReadUntil if r.until.is_empty() => {
                        problems.push(format!("rule `{}` reads until an empty terminator", r.name));
                    }
                    _ => {}
                }
            }
        });
        if !problems.is_empty() {
            return Err(LexError::MalformedGrammar(problems.join("; ")));
        }
        Ok(Self {
            root,
            states,
            rule_count,
        })
    }

    /// Loads a rule tree from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is invalid or the tree is malformed.
    pub fn from_json(json: &str) -> Result<Self, LexError> {
        let root: LexRule = serde_json::from_str(json).map_err(|e| LexError::Json(e.to_string()))?;
        Self::new(root)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, LexError> {
        serde_json::to_string_pretty(&self.root).map_err(|e| LexError::Json(e.to_string()))
    }

    #[must_use]
    pub fn root(&self) -> &LexRule {
        &self.root
    }

    #[must_use]
    pub fn rule_count(&self) -> u32 {
        self.rule_count
    }

    #[must_use]
    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    #[must_use]
    pub fn rule_by_id(&self, id: u32) -> Option<&LexRule> {
        let mut found = None;
        self.root.walk(&mut |r| {
            if r.id == id {
                found = Some(r);
            }
        });
        found
    }

    /// First matching leaf under `rule`, in declaration order.
    fn find<'a>(rule: &'a LexRule, cur: &Cursor) -> Option<(&'a LexRule, usize)> {
        for child in &rule.children {
            if child.off {
                continue;
            }
            let Some(len) = is_match(child, cur) else {
                continue;
            };
            if child.children.is_empty() {
                return Some((child, len));
            }
            if let Some(hit) = Self::find(child, cur) {
                return Some(hit);
            }
            if !child.acts.is_empty() {
                return Some((child, len));
            }
        }
        None
    }
}

/// Everything needed to resume lexing at a token boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LexState {
    pub offset: usize,
    pub pos: Pos,
    pub stack: Vec<String>,
}

impl LexState {
    /// Active state name; the outer language is the empty string.
    #[must_use]
    pub fn cur_state(&self) -> &str {
        self.stack.last().map_or("", String::as_str)
    }
}

/// Result of a lex pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    /// `line_states[i]` is the state at the first token boundary at or after
    /// the start of line `i`.
    pub line_states: Vec<LexState>,
    pub end: LexState,
}

impl LexOutput {
    /// Tokens the parser sees: no whitespace or comments.
    #[must_use]
    pub fn significant(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .copied()
            .filter(|t| !t.kind.is_trivia())
            .collect()
    }

    /// Concatenation of all token texts; equals the lexed input.
    #[must_use]
    pub fn reconstruct(&self, src: &str) -> String {
        self.tokens.iter().map(|t| t.text(src)).collect()
    }
}

pub struct Lexer<'g, 's> {
    grammar: &'g LexGrammar,
    src: &'s str,
    state: LexState,
    tokens: Vec<Token>,
    line_states: Vec<LexState>,
}

impl<'g, 's> Lexer<'g, 's> {
    #[must_use]
    pub fn new(grammar: &'g LexGrammar, src: &'s str) -> Self {
        Self {
            grammar,
            src,
            state: LexState::default(),
            tokens: Vec::new(),
            line_states: Vec::new(),
        }
    }

    /// Starts a lexer at a previously saved state. Line states for the lines
    /// before the snapshot are unknown and are filled with the snapshot itself.
    #[must_use]
    pub fn resume(grammar: &'g LexGrammar, src: &'s str, state: LexState) -> Self {
        let mut lexer = Self::new(grammar, src);
        lexer.state = state;
        lexer
    }

    #[must_use]
    pub fn snapshot(&self) -> LexState {
        self.state.clone()
    }

    /// Rewinds to `state`, dropping tokens and line states produced after it.
    pub fn restore(&mut self, state: LexState) {
        self.tokens.retain(|t| t.start < state.offset);
        self.line_states.retain(|ls| ls.offset <= state.offset);
        self.state = state;
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn at_end(&self) -> bool {
        self.state.offset >= self.src.len()
    }

    /// Lexes one token. Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// [`LexError::LexNoMatch`] when no rule matches at the cursor, and
    /// [`LexError::NoProgress`] when rules only keep changing state.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let mut zero_width = 0usize;
        while !self.at_end() {
            self.record_line_state();
            let offset = self.state.offset;
            let cur = Cursor::new(self.src, offset, self.state.cur_state());
            let Some((rule, matched)) = LexGrammar::find(self.grammar.root(), &cur) else {
                let found: String = self.src[offset..].chars().take(8).collect();
                debug!(offset, state = self.state.cur_state(), "no lexical rule matched");
                return Err(LexError::LexNoMatch {
                    offset,
                    pos: self.state.pos,
                    found,
                    state: self.state.cur_state().to_string(),
                });
            };
            let depth = self.state.stack.len();
            let (end, kind) = self.apply(rule, matched);
            if end > offset {
                let token = Token {
                    kind,
                    start: offset,
                    end,
                    pos: self.state.pos,
                    rule: rule.id,
                };
                trace!(rule = %rule.name, ?kind, start = offset, end, "token");
                self.state.pos = advance_pos(self.state.pos, &self.src[offset..end]);
                self.state.offset = end;
                self.tokens.push(token);
                return Ok(Some(token));
            }
            zero_width += 1;
            if self.state.stack.len() == depth || zero_width > MAX_ZERO_WIDTH_STEPS {
                return Err(LexError::NoProgress {
                    offset,
                    pos: self.state.pos,
                    rule: rule.name.clone(),
                });
            }
        }
        Ok(None)
    }

    /// Lexes to the end of input.
    ///
    /// # Errors
    ///
    /// Propagates the first [`LexError`].
    pub fn run(mut self) -> Result<LexOutput, LexError> {
        while self.next_token()?.is_some() {}
        self.record_line_state();
        Ok(LexOutput {
            tokens: self.tokens,
            line_states: self.line_states,
            end: self.state,
        })
    }

    fn record_line_state(&mut self) {
        while self.line_states.len() <= self.state.pos.line as usize {
            self.line_states.push(self.state.clone());
        }
    }

    /// Runs the rule's actions and returns the token end and kind.
    fn apply(&mut self, rule: &LexRule, matched: usize) -> (usize, TokenKind) {
        let start = self.state.offset;
        let mut end = start;
        let mut kind = rule.token;
        for act in &rule.acts {
            match act {
                LexAct::Next => {
                    if end == start {
                        let n = if matched > 0 {
                            matched
                        } else if !rule.string.is_empty()
                            && self.src[start..].starts_with(&rule.string)
                        {
                            rule.string.len()
                        } else {
                            char_len_at(self.src, start)
                        };
                        end = start + n;
                    } else {
                        end += char_len_at(self.src, end);
                    }
                }
                LexAct::Name => {
                    end += self.src[end..]
                        .chars()
                        .take_while(|c| is_letter_or_digit(*c))
                        .map(char::len_utf8)
                        .sum::<usize>();
                    if let Some(k) = rule.name_map.get(&self.src[start..end]) {
                        kind = *k;
                    }
                }
                LexAct::Number => {
                    let (n, k) = read_number(&self.src[end..]);
                    end += n;
                    if n > 0 {
                        kind = k;
                    }
                }
                LexAct::Quoted => end += read_quoted(&self.src[end..], true),
                LexAct::QuotedRaw => end += read_quoted(&self.src[end..], false),
                LexAct::Eol => {
                    end += self.src[end..].find('\n').unwrap_or(self.src.len() - end);
                }
                LexAct::ReadUntil => {
                    if end == start {
                        end += matched;
                    }
                    let opener = if rule.nest { rule.string.as_str() } else { "" };
                    end += read_until(&self.src[end..], opener, &rule.until);
                }
                LexAct::PushState => self.state.stack.push(rule.push_state.clone()),
                LexAct::PopState => {
                    self.state.stack.pop();
                }
            }
        }
        (end.min(self.src.len()), kind)
    }
}

/// Lexes `src` from the start.
///
/// # Errors
///
/// Propagates the first [`LexError`].
pub fn lex(grammar: &LexGrammar, src: &str) -> Result<LexOutput, LexError> {
    Lexer::new(grammar, src).run()
}

/// Re-lexes `src` after an edit at or below `line`, reusing the tokens of
/// `prev` that precede the edit. Everything before the start of `line`
/// (including its line break) must be unchanged since `prev`.
///
/// Resumes from the last line snapshot strictly before the start of `line`.
///
/// # Errors
///
/// Propagates the first [`LexError`] of the re-lexed suffix.
pub fn relex_from_line(
    grammar: &LexGrammar,
    src: &str,
    prev: &LexOutput,
    line: u32,
) -> Result<LexOutput, LexError> {
    let Some(line_start) = line_start_offset(src, line) else {
        return lex(grammar, src);
    };
    let Some(k) = prev
        .line_states
        .iter()
        .rposition(|s| s.offset < line_start)
    else {
        return lex(grammar, src);
    };
    let snapshot = prev.line_states[k].clone();
    debug!(line, offset = snapshot.offset, "re-lexing from snapshot");
    let mut lexer = Lexer::resume(grammar, src, snapshot.clone());
    lexer.tokens = prev
        .tokens
        .iter()
        .copied()
        .take_while(|t| t.start < snapshot.offset)
        .collect();
    lexer.line_states = prev.line_states[..k].to_vec();
    lexer.run()
}

fn char_len_at(src: &str, at: usize) -> usize {
    src[at..].chars().next().map_or(0, char::len_utf8)
}

fn advance_pos(mut pos: Pos, text: &str) -> Pos {
    for c in text.chars() {
        if c == '\n' {
            pos.line += 1;
            pos.col = 0;
        } else {
            pos.col += 1;
        }
    }
    pos
}

/// Length and flavor of the numeric literal at the start of `s`.
fn read_number(s: &str) -> (usize, TokenKind) {
    let b = s.as_bytes();
    let mut i = 0;
    let mut kind = TokenKind::LitNumInteger;
    let digits = |i: &mut usize, pred: fn(u8) -> bool| {
        while *i < b.len() && (pred(b[*i]) || b[*i] == b'_') {
            *i += 1;
        }
    };
    if b.len() > 1 && b[0] == b'0' && (b[1] == b'x' || b[1] == b'X') {
        i = 2;
        digits(&mut i, |c| c.is_ascii_hexdigit());
        return (i, kind);
    }
    digits(&mut i, |c| c.is_ascii_digit());
    if i < b.len() && b[i] == b'.' && b.get(i + 1) != Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        digits(&mut j, |c| c.is_ascii_digit());
        if i > 0 || j > frac_start {
            i = j;
            kind = TokenKind::LitNumFloat;
        }
    }
    if i > 0 && i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        digits(&mut j, |c| c.is_ascii_digit());
        if j > exp_start {
            i = j;
            kind = TokenKind::LitNumFloat;
        }
    }
    if i > 0 && i < b.len() && b[i] == b'i' {
        i += 1;
        kind = TokenKind::LitNumImag;
    }
    (i, kind)
}

/// Length of the quoted string at the start of `s`, quote marks included.
/// Escaped strings end at the line end when unterminated; raw strings run to
/// the end of input.
fn read_quoted(s: &str, escapes: bool) -> usize {
    let mut chars = s.char_indices();
    let Some((_, quote)) = chars.next() else {
        return 0;
    };
    let mut escaped = false;
    for (i, c) in chars {
        if escapes && c == '\n' {
            return i;
        }
        if escaped {
            escaped = false;
            continue;
        }
        if escapes && c == '\\' {
            escaped = true;
            continue;
        }
        if c == quote {
            return i + c.len_utf8();
        }
    }
    s.len()
}

/// Length through the terminator that balances the already-open delimiter.
fn read_until(s: &str, opener: &str, until: &str) -> usize {
    let mut depth = 1usize;
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if !opener.is_empty() && rest.starts_with(opener) {
            depth += 1;
            i += opener.len();
        } else if rest.starts_with(until) {
            depth -= 1;
            i += until.len();
            if depth == 0 {
                return i;
            }
        } else {
            i += char_len_at(s, i);
        }
    }
    s.len()
}
