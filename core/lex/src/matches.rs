//! Token classifier.
//!
//! A classifier answers a single question: does the rule's predicate hold at the
//! cursor, and if so how many bytes would it consume? It never advances the
//! cursor itself; the lexer applies the advance through the rule's actions.

use serde::{Deserialize, Serialize};

use crate::rule::LexRule;
use crate::text::{is_letter, is_letter_or_digit};

/// What a lexical rule matches at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Matches {
    /// The rule string, verbatim.
    #[default]
    String,
    /// The rule string, but only when it is not immediately followed by another
    /// identifier character (so `func` does not match the start of `funcs`).
    StrName,
    Letter,
    Digit,
    /// A run of whitespace.
    WhiteSpace,
    /// Matches when the lexer's active state equals the rule string.
    CurState,
    AnyRune,
    /// A line break. Backward, a line break between the previous
    /// non-whitespace character and the cursor.
    LineBreak,
    /// A type reference: `*` and `[]` markers, then a dotted name, then
    /// (past spaces and tabs) the end of the line, the end of the input or any
    /// character of the rule string. Backward, an identifier character.
    TypeRef,
}

/// Where in a line or word the match must occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchPos {
    #[default]
    AnyPos,
    StartOfLine,
    EndOfLine,
    MiddleOfLine,
    StartOfWord,
    EndOfWord,
    MiddleOfWord,
}

/// Read-only view of the lexer at one position.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub src: &'a str,
    pub pos: usize,
    pub state: &'a str,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(src: &'a str, pos: usize, state: &'a str) -> Self {
        Self { src, pos, state }
    }

    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    #[must_use]
    pub fn prev_char(&self) -> Option<char> {
        self.src[..self.pos].chars().next_back()
    }

    #[must_use]
    pub fn cur_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Byte position of the `n`-th character after the cursor.
    fn ahead(&self, n: usize) -> Option<usize> {
        if n == 0 {
            return Some(self.pos);
        }
        self.rest()
            .char_indices()
            .nth(n)
            .map(|(i, _)| self.pos + i)
            .or_else(|| (self.rest().chars().count() == n).then_some(self.src.len()))
    }

    /// Text before the cursor with trailing whitespace removed.
    fn behind_trimmed(&self) -> &'a str {
        self.src[..self.pos].trim_end()
    }
}

impl Matches {
    /// Evaluates the forward predicate at `at` and reports the consumed length.
    fn forward(self, rule: &LexRule, src: &str, at: usize, state: &str) -> Option<usize> {
        let rest = &src[at..];
        match self {
            Matches::String => rest.starts_with(&rule.string).then_some(rule.string.len()),
            Matches::StrName => {
                if !rest.starts_with(&rule.string) {
                    return None;
                }
                let after = rest[rule.string.len()..].chars().next();
                match after {
                    Some(c) if is_letter_or_digit(c) => None,
                    _ => Some(rule.string.len()),
                }
            }
            Matches::Letter => rest
                .chars()
                .next()
                .filter(|c| is_letter(*c))
                .map(char::len_utf8),
            Matches::Digit => rest
                .chars()
                .next()
                .filter(char::is_ascii_digit)
                .map(char::len_utf8),
            Matches::WhiteSpace => {
                let n: usize = rest
                    .chars()
                    .take_while(|c| c.is_whitespace())
                    .map(char::len_utf8)
                    .sum();
                (n > 0).then_some(n)
            }
            Matches::CurState => (state == rule.string).then_some(0),
            Matches::AnyRune => rest.chars().next().map(char::len_utf8),
            Matches::LineBreak => {
                if rest.starts_with("\r\n") {
                    Some(2)
                } else {
                    rest.starts_with('\n').then_some(1)
                }
            }
            Matches::TypeRef => type_ref_len(rest, &rule.string),
        }
    }

    /// Evaluates the predicate against the text preceding the cursor, skipping
    /// whitespace. Always zero-width.
    fn backward(self, rule: &LexRule, cur: &Cursor) -> bool {
        let behind = cur.behind_trimmed();
        let last = behind.chars().next_back();
        match self {
            Matches::String => !rule.string.is_empty() && behind.ends_with(&rule.string),
            Matches::StrName => {
                !rule.string.is_empty()
                    && behind
                        .strip_suffix(rule.string.as_str())
                        .is_some_and(|pre| !pre.chars().next_back().is_some_and(is_letter_or_digit))
            }
            Matches::Letter => last.is_some_and(is_letter),
            Matches::Digit => last.is_some_and(|c| c.is_ascii_digit()),
            Matches::WhiteSpace => cur.prev_char().is_some_and(char::is_whitespace),
            Matches::CurState => cur.state == rule.string,
            Matches::AnyRune => last.is_some(),
            Matches::LineBreak => cur.src[behind.len()..cur.pos].contains('\n'),
            Matches::TypeRef => last.is_some_and(is_letter_or_digit),
        }
    }
}

/// Length of the type reference at the start of `rest`, if it is followed by
/// a line end, the end of input or one of the `ends` characters.
fn type_ref_len(rest: &str, ends: &str) -> Option<usize> {
    let mut s = rest;
    while let Some(tail) = s.strip_prefix('*').or_else(|| s.strip_prefix("[]")) {
        s = tail;
    }
    loop {
        if !s.chars().next().is_some_and(is_letter) {
            return None;
        }
        s = s.trim_start_matches(is_letter_or_digit);
        match s.strip_prefix('.') {
            Some(tail) => s = tail,
            None => break,
        }
    }
    let len = rest.len() - s.len();
    let after = s.trim_start_matches([' ', '\t']);
    match after.chars().next() {
        None | Some('\n' | '\r') => Some(len),
        Some(c) if ends.contains(c) => Some(len),
        _ => None,
    }
}

impl MatchPos {
    fn holds(self, cur: &Cursor, len: usize) -> bool {
        let prev = cur.prev_char();
        let at_line_start = prev.is_none_or(|c| c == '\n');
        let end = cur.pos + len;
        let next_after = cur.src[end.min(cur.src.len())..].chars().next();
        let at_line_end = next_after.is_none_or(|c| c == '\n' || c == '\r');
        let word_before = prev.is_some_and(is_letter_or_digit);
        let word_after = next_after.is_some_and(is_letter_or_digit);
        match self {
            MatchPos::AnyPos => true,
            MatchPos::StartOfLine => at_line_start,
            MatchPos::EndOfLine => at_line_end,
            MatchPos::MiddleOfLine => !at_line_start && !at_line_end,
            MatchPos::StartOfWord => !word_before,
            MatchPos::EndOfWord => !word_after,
            MatchPos::MiddleOfWord => word_before && word_after,
        }
    }
}

/// Runs the rule's classifier at the cursor.
///
/// Returns the number of bytes the match would consume from the cursor. Matches
/// that look ahead (`offset > 0`), look backward (`reverse`) or are inverted
/// (`exclude`) are zero-width.
#[must_use]
pub fn is_match(rule: &LexRule, cur: &Cursor) -> Option<usize> {
    let hit = if rule.reverse {
        rule.matches.backward(rule, cur).then_some(0)
    } else {
        match cur.ahead(rule.offset) {
            Some(at) if at <= cur.src.len() => rule
                .matches
                .forward(rule, cur.src, at, cur.state)
                .map(|n| if rule.offset == 0 { n } else { 0 }),
            _ => None,
        }
    };
    let hit = if rule.exclude {
        match hit {
            Some(_) => None,
            None => Some(0),
        }
    } else {
        hit
    };
    hit.filter(|len| rule.pos.holds(cur, *len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(matches: Matches, s: &str) -> LexRule {
        LexRule::new("t").matches(matches).string(s)
    }

    #[test]
    fn str_name_respects_identifier_boundary() {
        let r = rule(Matches::StrName, "func");
        assert_eq!(is_match(&r, &Cursor::new("func main", 0, "")), Some(4));
        assert_eq!(is_match(&r, &Cursor::new("funcs", 0, "")), None);
    }

    #[test]
    fn whitespace_consumes_whole_run() {
        let r = rule(Matches::WhiteSpace, "");
        assert_eq!(is_match(&r, &Cursor::new(" \t\n x", 0, "")), Some(4));
    }

    #[test]
    fn cur_state_is_zero_width() {
        let r = rule(Matches::CurState, "Comment");
        assert_eq!(is_match(&r, &Cursor::new("abc", 0, "Comment")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("abc", 0, "")), None);
    }

    #[test]
    fn reverse_skips_whitespace() {
        let r = rule(Matches::Letter, "").reverse();
        assert_eq!(is_match(&r, &Cursor::new("a  *p", 3, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("*p", 0, "")), None);
    }

    #[test]
    fn reverse_str_name_needs_word_boundary() {
        let r = rule(Matches::StrName, "go").reverse();
        assert_eq!(is_match(&r, &Cursor::new("go *p", 3, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("ago *p", 4, "")), None);
    }

    #[test]
    fn exclude_inverts() {
        let r = rule(Matches::Digit, "").exclude();
        assert_eq!(is_match(&r, &Cursor::new("x", 0, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("1", 0, "")), None);
    }

    #[test]
    fn reverse_line_break_sees_past_indentation() {
        let r = rule(Matches::LineBreak, "").reverse();
        assert_eq!(is_match(&r, &Cursor::new("x := a\n\t*p = 3", 8, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("x := a *p", 7, "")), None);
        let fwd = rule(Matches::LineBreak, "");
        assert_eq!(is_match(&fwd, &Cursor::new("\r\nx", 0, "")), Some(2));
    }

    #[test]
    fn type_ref_needs_a_terminator() {
        let r = rule(Matches::TypeRef, ")},").offset(1);
        assert_eq!(is_match(&r, &Cursor::new("*T", 0, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("*geom.Point)", 0, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("**[]T }", 0, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("*T\n\tnext int", 0, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new("* T", 0, "")), None);
        assert_eq!(is_match(&r, &Cursor::new("*b + c", 0, "")), None);
        assert_eq!(is_match(&r, &Cursor::new("*2)", 0, "")), None);
        assert_eq!(type_ref_len("geom.Point)", ")"), Some(10));
    }

    #[test]
    fn offset_looks_ahead() {
        let r = rule(Matches::String, "=").offset(1);
        assert_eq!(is_match(&r, &Cursor::new(":=", 0, "")), Some(0));
        assert_eq!(is_match(&r, &Cursor::new(":x", 0, "")), None);
    }
}
