//! Scoped anchor table.
//!
//! Anchors are kept beside the tree, not inside it: a stack of frames, one per
//! applied rule that carries an AST action, each mapping anchor names to node
//! ids. A frame is dropped when its rule finishes, so anchors never outlive
//! the rule that made them.

/// One frame per active rule scope.
#[derive(Debug, Default, Clone)]
pub struct Anchors {
    frames: Vec<Vec<(String, u32)>>,
}

impl Anchors {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Drops the innermost frame and every anchor recorded in it. The
    /// outermost frame is cleared rather than removed.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        } else if let Some(frame) = self.frames.last_mut() {
            frame.clear();
        }
    }

    /// Records `id` under `name` in the innermost frame, replacing any
    /// earlier anchor of that name in the frame. The replacement becomes the
    /// frame's latest anchor.
    pub fn set(&mut self, name: &str, id: u32) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        frame.retain(|(n, _)| n != name);
        frame.push((name.to_string(), id));
    }

    /// Records `id` only if the innermost frame has no anchor named `name`.
    /// Returns the anchor that is in effect afterwards.
    pub fn set_first(&mut self, name: &str, id: u32) -> u32 {
        let Some(frame) = self.frames.last_mut() else {
            return id;
        };
        if let Some((_, existing)) = frame.iter().find(|(n, _)| n == name) {
            return *existing;
        }
        frame.push((name.to_string(), id));
        id
    }

    /// Innermost anchor named `name`, searching outward.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.iter().rev().find(|(n, _)| n == name).map(|(_, id)| *id))
    }

    /// Most recently recorded anchor of the innermost frame that has any.
    #[must_use]
    pub fn latest(&self) -> Option<u32> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.last().map(|(_, id)| *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_do_not_outlive_scope() {
        let mut anchors = Anchors::new();
        anchors.push_scope();
        anchors.set("Name", 4);
        assert_eq!(anchors.get("Name"), Some(4));
        anchors.pop_scope();
        assert_eq!(anchors.get("Name"), None);
        assert_eq!(anchors.latest(), None);
    }

    #[test]
    fn set_first_keeps_first() {
        let mut anchors = Anchors::new();
        assert_eq!(anchors.set_first("Name", 2), 2);
        assert_eq!(anchors.set_first("Name", 3), 2);
        assert_eq!(anchors.get("Name"), Some(2));
        anchors.set("Name", 5);
        assert_eq!(anchors.get("Name"), Some(5));
    }

    #[test]
    fn replaced_anchor_is_latest() {
        let mut anchors = Anchors::new();
        anchors.set("TypeName", 1);
        anchors.set("Name", 2);
        assert_eq!(anchors.latest(), Some(2));
        anchors.set("TypeName", 3);
        assert_eq!(anchors.latest(), Some(3));
        assert_eq!(anchors.get("Name"), Some(2));
    }

    #[test]
    fn inner_frames_shadow_outer() {
        let mut anchors = Anchors::new();
        anchors.set("Type", 1);
        anchors.push_scope();
        anchors.set("Type", 9);
        assert_eq!(anchors.get("Type"), Some(9));
        anchors.pop_scope();
        assert_eq!(anchors.get("Type"), Some(1));
        anchors.pop_scope();
        assert_eq!(anchors.depth(), 1);
        assert_eq!(anchors.get("Type"), None);
    }
}
