//! AST construction protocol.
//!
//! The parser never touches the tree directly. Once a top-level match has
//! succeeded it replays the matched rules through an [`AstBuilder`], one
//! [`AstBuilder::apply`] per rule application, bracketed by
//! [`AstBuilder::enter`] and [`AstBuilder::exit`] around the rule's children.
//! Every application resolves exactly one [`AstAct`]; a failed match has
//! already been discarded by then, so actions never partially apply.
//!
//! Anchors live in a scoped side table ([`Anchors`]). An anchoring rule records
//! its node in the frame of the enclosing rule, so siblings that follow can
//! find it, and the frame is dropped when the enclosing rule exits.

use pi_lex::{Pos, Region, Token};
use tracing::trace;

use crate::acts::AstAct;
use crate::anchors::Anchors;
use crate::arena::Arena;

/// Saved builder position, returned by [`AstBuilder::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the scope back to `exit`"]
pub struct Scope {
    cursor: u32,
    depth: usize,
}

pub struct AstBuilder<'a> {
    src: &'a str,
    tokens: &'a [Token],
    arena: Arena,
    cursor: u32,
    anchors: Anchors,
}

impl<'a> AstBuilder<'a> {
    /// Starts a tree whose root is named `root_name` and spans all `tokens`.
    /// `tokens` is the significant token sequence the parser runs over.
    #[must_use]
    pub fn new(src: &'a str, tokens: &'a [Token], root_name: &str) -> Self {
        let mut arena = Arena::default();
        let region = Region::new(0, src.len(), Pos::default(), end_of(src));
        let cursor = arena.add_node(root_name, None, region, String::new(), (0, tokens.len()));
        Self {
            src,
            tokens,
            arena,
            cursor,
            anchors: Anchors::new(),
        }
    }

    #[must_use]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    #[must_use]
    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    /// Applies one rule's action for the token span `start..end` and moves the
    /// cursor to the node the rule's children should attach to. Returns that
    /// node.
    pub fn apply(&mut self, act: AstAct, name: &str, span: (usize, usize)) -> u32 {
        let (region, src) = self.span_text(span);
        let target = match act {
            AstAct::NoAst => self.cursor,
            AstAct::AddAst => self.add(name, region, src, span),
            AstAct::AnchorAst => {
                let id = self.add(name, region, src, span);
                self.anchors.set(name, id);
                id
            }
            AstAct::AnchorFirstAst => {
                let id = self.add(name, region, src, span);
                self.anchors.set_first(name, id);
                id
            }
            AstAct::SubAst => {
                let id = self.anchors.latest().unwrap_or(self.cursor);
                self.arena.extend_node(id, region, &src, span);
                self.refresh_src(id);
                id
            }
        };
        trace!(%act, rule = name, node = target, "ast action");
        self.cursor = target;
        target
    }

    /// Opens the anchor scope for a rule's children.
    pub fn enter(&mut self) -> Scope {
        self.anchors.push_scope();
        Scope {
            cursor: self.cursor,
            depth: self.anchors.depth(),
        }
    }

    /// Closes a scope opened by [`AstBuilder::enter`] and restores the cursor
    /// that was current when the rule's action ran.
    pub fn exit(&mut self, scope: Scope, restore_to: u32) {
        while self.anchors.depth() >= scope.depth {
            let before = self.anchors.depth();
            self.anchors.pop_scope();
            if self.anchors.depth() == before {
                break;
            }
        }
        self.cursor = restore_to;
    }

    /// Drops every anchor of the outermost scope. Called between top-level
    /// declarations so no anchor leaks from one to the next.
    pub fn reset_anchors(&mut self) {
        self.anchors = Anchors::new();
    }

    #[must_use]
    pub fn finish(self) -> Arena {
        self.arena
    }

    fn add(&mut self, name: &str, region: Region, src: String, span: (usize, usize)) -> u32 {
        self.arena.add_node(name, Some(self.cursor), region, src, span)
    }

    fn refresh_src(&mut self, id: u32) {
        let Some(region) = self.arena.find_node(id).map(|n| n.region) else {
            return;
        };
        let text = self
            .src
            .get(region.offset_start..region.offset_end)
            .unwrap_or_default()
            .to_string();
        self.arena.set_src(id, text);
    }

    fn span_text(&self, (start, end): (usize, usize)) -> (Region, String) {
        let first = self.tokens.get(start);
        let last = end.checked_sub(1).and_then(|i| self.tokens.get(i));
        match (first, last) {
            (Some(first), Some(last)) if end > start => {
                let region = Region::new(first.start, last.end, first.pos, last.end_pos(self.src));
                (region, self.src[first.start..last.end].to_string())
            }
            _ => {
                let at = first.map_or(self.src.len(), |t| t.start);
                let pos = first.map_or_else(|| end_of(self.src), |t| t.pos);
                (Region::new(at, at, pos, pos), String::new())
            }
        }
    }
}

fn end_of(src: &str) -> Pos {
    let line = u32::try_from(src.matches('\n').count()).unwrap_or(u32::MAX);
    let last_line = src.rsplit('\n').next().unwrap_or_default();
    let col = u32::try_from(last_line.chars().count()).unwrap_or(u32::MAX);
    Pos::new(line, col)
}

#[cfg(test)]
mod tests {
    use pi_lex::TokenKind;

    use super::*;

    /// `var a b int` as four name-ish tokens.
    fn fixture() -> (&'static str, Vec<Token>) {
        let src = "var a b int";
        let mut tokens = Vec::new();
        let mut col = 0;
        for word in src.split(' ') {
            let start = src[col..].find(word).map_or(col, |i| col + i);
            tokens.push(Token {
                kind: TokenKind::Name,
                start,
                end: start + word.len(),
                pos: Pos::new(0, u32::try_from(start).unwrap()),
                rule: 0,
            });
            col = start + word.len();
        }
        (src, tokens)
    }

    #[test]
    fn add_nests_children_under_new_node() {
        let (src, tokens) = fixture();
        let mut b = AstBuilder::new(src, &tokens, "File");
        let root = b.cursor();
        let decl = b.apply(AstAct::AddAst, "VarDecl", (0, 4));
        let scope = b.enter();
        let name = b.apply(AstAct::AddAst, "Name", (1, 2));
        b.exit(scope, decl);
        let arena = b.finish();
        assert_eq!(arena.find_parent_node(decl), Some(root));
        assert_eq!(arena.find_parent_node(name), Some(decl));
        assert_eq!(arena.src(decl), "var a b int");
        assert_eq!(arena.src(name), "a");
    }

    #[test]
    fn no_ast_attaches_to_cursor() {
        let (src, tokens) = fixture();
        let mut b = AstBuilder::new(src, &tokens, "File");
        let root = b.cursor();
        assert_eq!(b.apply(AstAct::NoAst, "Keyword", (0, 1)), root);
        assert_eq!(b.arena().len(), 1);
    }

    #[test]
    fn anchor_first_keeps_first_identity() {
        let (src, tokens) = fixture();
        let mut b = AstBuilder::new(src, &tokens, "File");
        let decl = b.apply(AstAct::AddAst, "VarDecl", (0, 4));
        let scope = b.enter();
        let first = b.apply(AstAct::AnchorFirstAst, "Name", (1, 2));
        b.exit_to(decl);
        let _second = b.apply(AstAct::AnchorFirstAst, "Name", (2, 3));
        b.exit_to(decl);
        assert_eq!(b.anchors().get("Name"), Some(first));
        b.apply(AstAct::SubAst, "Type", (3, 4));
        b.exit(scope, decl);
        assert_eq!(b.anchors().get("Name"), None);
        let arena = b.finish();
        assert_eq!(arena.src(first), "a b int");
    }

    #[test]
    fn sub_without_anchor_extends_cursor() {
        let (src, tokens) = fixture();
        let mut b = AstBuilder::new(src, &tokens, "File");
        let decl = b.apply(AstAct::AddAst, "PtrType", (0, 1));
        let scope = b.enter();
        assert_eq!(b.apply(AstAct::SubAst, "Deref", (1, 2)), decl);
        b.exit(scope, decl);
        let arena = b.finish();
        assert_eq!(arena.src(decl), "var a");
        assert_eq!(arena.children(decl).len(), 0);
    }

    impl AstBuilder<'_> {
        fn exit_to(&mut self, cursor: u32) {
            self.cursor = cursor;
        }
    }
}
