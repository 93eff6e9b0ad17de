//! Matching engine.
//!
//! Matching is a depth-first walk of the compiled rules over the significant
//! token sequence. It is a pure function of (rule, token index), so every
//! failure is memoized and never retried at the same position. Alternatives
//! are tried in declaration order and the first success is kept; there is no
//! backtracking into a committed alternative.
//!
//! Zero-width rules (`reverse` and/or `exclude`) decide whether an ambiguous
//! construct applies by scanning backward from, or forward at, the cursor.
//! Each such decision is made once per (rule, token) and cached.
//!
//! The engine only builds a match tree. Nothing reaches the AST until a
//! top-level declaration has matched completely.

use pi_ast::{AstAct, AstBuilder};
use pi_lex::Token;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::trace;

use crate::grammar::{Compiled, Grammar};

/// Successful application of one rule over `start..end` token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchNode {
    pub(crate) rule: u32,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) children: Vec<MatchNode>,
}

/// How many times each rule was attempted during a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    attempts: Vec<u32>,
    names: Vec<String>,
}

impl ParseStats {
    fn new(grammar: &Grammar) -> Self {
        Self {
            attempts: vec![0; grammar.rules.len()],
            names: grammar.rules.iter().map(|r| r.name.clone()).collect(),
        }
    }

    #[must_use]
    pub fn attempts_by_id(&self, id: u32) -> u32 {
        self.attempts.get(id as usize).copied().unwrap_or(0)
    }

    /// Attempts summed over every rule carrying `name`.
    #[must_use]
    pub fn attempts(&self, name: &str) -> u32 {
        self.names
            .iter()
            .zip(&self.attempts)
            .filter(|(n, _)| *n == name)
            .map(|(_, a)| *a)
            .sum()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.attempts.iter().map(|a| u64::from(*a)).sum()
    }
}

pub(crate) struct Engine<'g, 't> {
    grammar: &'g Grammar,
    src: &'t str,
    tokens: &'t [Token],
    failed: FxHashSet<(u32, usize)>,
    decisions: FxHashMap<(u32, usize), bool>,
    active: FxHashSet<(u32, usize)>,
    stack: Vec<u32>,
    furthest: Option<(usize, Vec<u32>)>,
    quiet: usize,
    pub(crate) stats: ParseStats,
}

impl<'g, 't> Engine<'g, 't> {
    pub(crate) fn new(grammar: &'g Grammar, src: &'t str, tokens: &'t [Token]) -> Self {
        Self {
            grammar,
            src,
            tokens,
            failed: FxHashSet::default(),
            decisions: FxHashMap::default(),
            active: FxHashSet::default(),
            stack: Vec::new(),
            furthest: None,
            quiet: 0,
            stats: ParseStats::new(grammar),
        }
    }

    /// Tries the top-level alternatives at `pos`. A match must consume at
    /// least one token.
    ///
    /// A failure the previous top-level match ran into beyond `pos` is kept:
    /// when an optional part of a declaration fails deep inside (a function
    /// body, say), the declaration still matches without it and the next
    /// attempt fails at its first token, which is not where the error is.
    pub(crate) fn match_top(&mut self, pos: usize) -> Option<MatchNode> {
        let carried = self.furthest.take().filter(|(at, _)| *at > pos);
        let grammar = self.grammar;
        for &id in &grammar.rule(0).children {
            if grammar.rule(id).off {
                continue;
            }
            if let Some(m) = self.match_rule(id, pos) {
                if m.end > pos {
                    return Some(m);
                }
            }
        }
        if let Some((at, stack)) = carried {
            if self.furthest.as_ref().is_none_or(|(now, _)| *now < at) {
                self.furthest = Some((at, stack));
            }
        }
        None
    }

    /// Token index and rule chain of the furthest failure of the last
    /// [`Engine::match_top`], or of the match before it when that one got
    /// further.
    pub(crate) fn furthest_failure(&self, pos: usize) -> (usize, String) {
        let Some((at, stack)) = &self.furthest else {
            return (pos, self.grammar.root_name().to_string());
        };
        let chain: Vec<&str> = std::iter::once(0u32)
            .chain(stack.iter().copied())
            .filter_map(|id| self.grammar.rule_name(id))
            .filter(|n| !n.is_empty())
            .collect();
        ((*at).max(pos), chain.join(" > "))
    }

    fn match_rule(&mut self, id: u32, pos: usize) -> Option<MatchNode> {
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        if rule.off || self.failed.contains(&(id, pos)) {
            return None;
        }
        // Re-entering a rule at the same position only happens through left
        // recursion, which never matches.
        if !self.active.insert((id, pos)) {
            return None;
        }
        self.stats.attempts[id as usize] += 1;
        self.stack.push(id);

        let result = if rule.is_lookaround() {
            self.lookaround(id, pos).then_some((pos, Vec::new()))
        } else {
            self.match_body(id, pos)
        };

        self.stack.pop();
        self.active.remove(&(id, pos));
        match result {
            Some((end, children)) => Some(MatchNode {
                rule: id,
                start: pos,
                end,
                children,
            }),
            None => {
                self.failed.insert((id, pos));
                None
            }
        }
    }

    fn match_body(&mut self, id: u32, pos: usize) -> Option<(usize, Vec<MatchNode>)> {
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        match &rule.kind {
            Compiled::Token(m) => {
                if self.tokens.get(pos).is_some_and(|t| m.matches(t, self.src)) {
                    trace!(rule = %rule.name, pos, "token");
                    Some((pos + 1, Vec::new()))
                } else {
                    self.note_failure(pos);
                    None
                }
            }
            Compiled::Seq => self.match_seq(&rule.children, pos),
            Compiled::Alt => rule
                .children
                .iter()
                .filter(|c| !grammar.rule(**c).off)
                .find_map(|c| self.match_rule(*c, pos))
                .map(|m| (m.end, vec![m])),
            Compiled::Opt => self
                .match_seq(&rule.children, pos)
                .or(Some((pos, Vec::new()))),
            Compiled::Repeat(min) => {
                let mut end = pos;
                let mut count = 0;
                let mut children = Vec::new();
                while let Some((next, mut got)) = self.match_seq(&rule.children, end) {
                    if next == end {
                        break;
                    }
                    end = next;
                    count += 1;
                    children.append(&mut got);
                }
                (count >= *min).then_some((end, children))
            }
            Compiled::Ref(target) => self
                .match_rule(*target, pos)
                .map(|m| (m.end, vec![m])),
        }
    }

    /// Children in order. Off children are absent; zero-width children gate
    /// the sequence but leave nothing in the match tree.
    fn match_seq(&mut self, children: &[u32], pos: usize) -> Option<(usize, Vec<MatchNode>)> {
        let grammar = self.grammar;
        let mut end = pos;
        let mut out = Vec::with_capacity(children.len());
        for &c in children {
            let child = grammar.rule(c);
            if child.off {
                continue;
            }
            let m = self.match_rule(c, end)?;
            end = m.end;
            if !child.is_lookaround() {
                out.push(m);
            }
        }
        Some((end, out))
    }

    fn lookaround(&mut self, id: u32, pos: usize) -> bool {
        if let Some(decided) = self.decisions.get(&(id, pos)) {
            return *decided;
        }
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        self.quiet += 1;
        let hit = if rule.reverse {
            self.match_backward(id, pos)
        } else {
            self.match_body(id, pos).is_some()
        };
        self.quiet -= 1;
        let decided = hit != rule.exclude;
        trace!(rule = %rule.name, pos, decided, "ambiguity check");
        self.decisions.insert((id, pos), decided);
        decided
    }

    /// Matches the rule's tokens so that the last one sits just before `pos`.
    fn match_backward(&self, id: u32, pos: usize) -> bool {
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        let leaves: Vec<&Compiled> = if matches!(rule.kind, Compiled::Token(_)) {
            vec![&rule.kind]
        } else {
            rule.children
                .iter()
                .map(|c| grammar.rule(*c))
                .filter(|c| !c.off)
                .map(|c| &c.kind)
                .collect()
        };
        leaves.iter().rev().enumerate().all(|(i, leaf)| {
            let Compiled::Token(m) = leaf else {
                return false;
            };
            pos.checked_sub(i + 1)
                .and_then(|at| self.tokens.get(at))
                .is_some_and(|t| m.matches(t, self.src))
        })
    }

    fn note_failure(&mut self, pos: usize) {
        if self.quiet > 0 {
            return;
        }
        if self.furthest.as_ref().is_none_or(|(at, _)| pos > *at) {
            self.furthest = Some((pos, self.stack.clone()));
        }
    }
}

/// Replays a successful match through the AST builder.
///
/// Only rules with an AST action open an anchor scope. Structural rules
/// share the scope of their nearest acting ancestor, so a list like `a, b`
/// anchors into one frame.
pub(crate) fn commit(grammar: &Grammar, builder: &mut AstBuilder<'_>, m: &MatchNode) {
    let rule = grammar.rule(m.rule);
    if rule.act == AstAct::NoAst {
        for child in &m.children {
            commit(grammar, builder, child);
        }
        return;
    }
    let restore_to = builder.cursor();
    builder.apply(rule.act, &rule.name, (m.start, m.end));
    let scope = builder.enter();
    for child in &m.children {
        commit(grammar, builder, child);
    }
    builder.exit(scope, restore_to);
}
