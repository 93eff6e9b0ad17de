use std::fmt::Write as _;

use pi_lex::Region;
use serde::{Deserialize, Serialize};

use crate::errors::AstError;

/// One node of the syntax tree.
///
/// `tok_start..tok_end` index the significant token sequence the parser ran
/// over; `region` and `src` are the matching source coordinates and text.
/// `annotation` is the only field written after parsing (by type inference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    pub id: u32,
    pub name: String,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    pub tok_start: usize,
    pub tok_end: usize,
    pub region: Region,
    pub src: String,
    pub annotation: Option<String>,
}

/// Index-addressed node storage. Node ids start at 1; id 0 is never issued.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub(crate) nodes: Vec<AstNode>,
}

impl Arena {
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node added, which the builder always makes the root.
    #[must_use]
    pub fn root(&self) -> Option<u32> {
        self.nodes.first().map(|n| n.id)
    }

    /// Adds a node and records it as the last child of `parent_id`.
    pub fn add_node(
        &mut self,
        name: &str,
        parent_id: Option<u32>,
        region: Region,
        src: String,
        tok_span: (usize, usize),
    ) -> u32 {
        let id = u32::try_from(self.nodes.len() + 1).unwrap_or(u32::MAX);
        self.nodes.push(AstNode {
            id,
            name: name.to_string(),
            parent: parent_id,
            children: Vec::new(),
            tok_start: tok_span.0,
            tok_end: tok_span.1,
            region,
            src,
            annotation: None,
        });
        if let Some(parent) = parent_id.and_then(|p| self.node_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    #[must_use]
    pub fn find_node(&self, id: u32) -> Option<&AstNode> {
        id.checked_sub(1)
            .and_then(|i| self.nodes.get(i as usize))
    }

    pub(crate) fn node_mut(&mut self, id: u32) -> Option<&mut AstNode> {
        id.checked_sub(1)
            .and_then(|i| self.nodes.get_mut(i as usize))
    }

    #[must_use]
    pub fn name(&self, id: u32) -> &str {
        self.find_node(id).map_or("", |n| n.name.as_str())
    }

    #[must_use]
    pub fn src(&self, id: u32) -> &str {
        self.find_node(id).map_or("", |n| n.src.as_str())
    }

    #[must_use]
    pub fn find_parent_node(&self, id: u32) -> Option<u32> {
        self.find_node(id).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, id: u32) -> &[u32] {
        self.find_node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// `idx`-th child of `id`.
    #[must_use]
    pub fn child(&self, id: u32, idx: usize) -> Option<u32> {
        self.children(id).get(idx).copied()
    }

    #[must_use]
    pub fn last_child(&self, id: u32) -> Option<u32> {
        self.children(id).last().copied()
    }

    /// First direct child with the given name.
    #[must_use]
    pub fn child_by_name(&self, id: u32, name: &str) -> Option<u32> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.name(*c) == name)
    }

    /// Follows a `/`-separated path of child names from `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::PathNotFound`] when a segment has no matching child.
    pub fn child_by_path(&self, id: u32, path: &str) -> Result<u32, AstError> {
        let mut cur = id;
        for seg in path.split('/').filter(|s| !s.is_empty()) {
            cur = self
                .child_by_name(cur, seg)
                .ok_or_else(|| AstError::PathNotFound {
                    path: path.to_string(),
                    from: self.path_unique(id),
                })?;
        }
        Ok(cur)
    }

    /// Sibling following `id` under the same parent.
    #[must_use]
    pub fn next_sibling(&self, id: u32) -> Option<u32> {
        let parent = self.find_parent_node(id)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|c| *c == id)?;
        siblings.get(idx + 1).copied()
    }

    /// Index of `id` among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: u32) -> Option<usize> {
        let parent = self.find_parent_node(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Names from the root down to `id`, each with its index among siblings.
    #[must_use]
    pub fn path_unique(&self, id: u32) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            let name = self.name(n);
            match self.index_in_parent(n) {
                Some(i) => parts.push(format!("{name}[{i}]")),
                None => parts.push(name.to_string()),
            }
            cur = self.find_parent_node(n);
        }
        parts.reverse();
        parts.join("/")
    }

    /// Attaches an annotation (e.g. an inferred type) without touching the
    /// tree shape.
    pub fn annotate(&mut self, id: u32, annotation: &str) {
        if let Some(node) = self.node_mut(id) {
            node.annotation = Some(annotation.to_string());
        }
    }

    /// Indented dump of the subtree at `id`, one node per line.
    #[must_use]
    pub fn write_tree(&self, id: u32) -> String {
        let mut out = String::new();
        self.write_tree_into(&mut out, id, 0);
        out
    }

    fn write_tree_into(&self, out: &mut String, id: u32, depth: usize) {
        let Some(node) = self.find_node(id) else {
            return;
        };
        let _ = writeln!(
            out,
            "{:indent$}{}: {}",
            "",
            node.name,
            node.src.replace('\n', " "),
            indent = depth * 2
        );
        for child in &node.children {
            self.write_tree_into(out, *child, depth + 1);
        }
    }

    pub(crate) fn extend_node(&mut self, id: u32, region: Region, src: &str, tok_span: (usize, usize)) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.tok_start == node.tok_end {
            node.tok_start = tok_span.0;
            node.tok_end = tok_span.1;
            node.region = region;
            node.src = src.to_string();
            return;
        }
        node.tok_start = node.tok_start.min(tok_span.0);
        node.tok_end = node.tok_end.max(tok_span.1);
        node.region = node.region.union(&region);
    }

    pub(crate) fn set_src(&mut self, id: u32, src: String) {
        if let Some(node) = self.node_mut(id) {
            node.src = src;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Arena, u32, u32, u32) {
        let mut arena = Arena::default();
        let root = arena.add_node("File", None, Region::default(), String::new(), (0, 0));
        let a = arena.add_node("Decl", Some(root), Region::default(), "a".into(), (0, 1));
        let b = arena.add_node("Name", Some(a), Region::default(), "b".into(), (1, 2));
        (arena, root, a, b)
    }

    #[test]
    fn ids_start_at_one() {
        let (arena, root, a, b) = tree();
        assert_eq!((root, a, b), (1, 2, 3));
        assert!(arena.find_node(0).is_none());
    }

    #[test]
    fn parent_child_links() {
        let (arena, root, a, b) = tree();
        assert_eq!(arena.find_parent_node(b), Some(a));
        assert_eq!(arena.child(root, 0), Some(a));
        assert_eq!(arena.child_by_path(root, "Decl/Name").ok(), Some(b));
        assert!(arena.child_by_path(root, "Decl/Type").is_err());
        assert_eq!(arena.path_unique(b), "File/Decl[0]/Name[0]");
    }
}
