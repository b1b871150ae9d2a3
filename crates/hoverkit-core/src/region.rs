#![forbid(unsafe_code)]

//! Arena of hoverable diagram shapes.
//!
//! Every shape that can receive pointer events is a node in a [`RegionTree`].
//! Nodes are addressed by [`RegionId`], a generational key: once a node is
//! removed its id never resolves again, even if the slot is reused. This is
//! what lets the [`ActiveArbiter`](crate::arbiter::ActiveArbiter) hold ids
//! instead of back-references without risking a stale id aliasing a new
//! shape.
//!
//! # Containment rule
//!
//! [`RegionTree::is_in_focusable_child`] answers "is this node inside a
//! nested statement of `root`?". It walks from the node towards `root` and
//! reports whether any node on the way (excluding `root`) is
//! [`RegionKind::Focusable`]. Nodes outside `root`'s subtree are never in a
//! focusable child of `root`.

use slotmap::SlotMap;

use crate::geometry::{Point, Rect};

slotmap::new_key_type! {
    /// Identity of one hoverable shape.
    pub struct RegionId;
}

/// What a node in the tree represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Owns its own highlight: a statement box, compound statement, or
    /// life-line group. Only focusable nodes are registered with the arbiter.
    Focusable,
    /// A plain shape inside a focusable node (heading text, outline, drop zone).
    Decoration,
}

#[derive(Debug, Clone)]
struct RegionNode {
    parent: Option<RegionId>,
    children: Vec<RegionId>,
    kind: RegionKind,
    bounds: Rect,
}

/// Tree of hoverable shapes, stored in an arena.
#[derive(Debug, Default)]
pub struct RegionTree {
    nodes: SlotMap<RegionId, RegionNode>,
    roots: Vec<RegionId>,
}

impl RegionTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node under `parent` (or as a root when `None`).
    ///
    /// Returns `None` if `parent` no longer exists.
    pub fn insert(
        &mut self,
        parent: Option<RegionId>,
        kind: RegionKind,
        bounds: Rect,
    ) -> Option<RegionId> {
        if let Some(p) = parent
            && !self.nodes.contains_key(p)
        {
            return None;
        }

        let id = self.nodes.insert(RegionNode {
            parent,
            children: Vec::new(),
            kind,
            bounds,
        });

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(node) => node.children.push(id),
            None => self.roots.push(id),
        }
        Some(id)
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns the removed ids, parents before children, so the caller can
    /// deregister them from the arbiter. Removing an unknown id returns an
    /// empty list.
    pub fn remove(&mut self, id: RegionId) -> Vec<RegionId> {
        let Some(parent) = self.nodes.get(id).map(|n| n.parent) else {
            return Vec::new();
        };

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                removed.push(next);
                stack.extend(node.children.iter().rev());
            }
        }
        removed
    }

    /// Whether `id` refers to a live node.
    #[inline]
    pub fn contains(&self, id: RegionId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: RegionId) -> Option<RegionId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: RegionId) -> &[RegionId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Root nodes in insertion order.
    pub fn roots(&self) -> &[RegionId] {
        &self.roots
    }

    /// Kind of `id`, if it exists.
    pub fn kind(&self, id: RegionId) -> Option<RegionKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    /// Bounding box of `id`, if it exists.
    pub fn bounds(&self, id: RegionId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.bounds)
    }

    /// Update the bounding box of `id`. Returns `false` for unknown ids.
    pub fn set_bounds(&mut self, id: RegionId, bounds: Rect) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Iterate from `id` up to its root, starting with `id` itself.
    pub fn ancestors(&self, id: RegionId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Nearest focusable node at or above `id`.
    pub fn focusable_owner(&self, id: RegionId) -> Option<RegionId> {
        self.ancestors(id)
            .find(|&n| self.kind(n) == Some(RegionKind::Focusable))
    }

    /// True if `node` is `root` or one of its descendants.
    pub fn is_within(&self, node: RegionId, root: RegionId) -> bool {
        self.ancestors(node).any(|n| n == root)
    }

    /// True if `node` sits inside a focusable descendant of `root`.
    ///
    /// `root` itself does not count, and `None` (the pointer came from or
    /// went to nothing) is never inside a child.
    pub fn is_in_focusable_child(&self, node: Option<RegionId>, root: RegionId) -> bool {
        let Some(node) = node else {
            return false;
        };

        let mut in_focusable = false;
        for n in self.ancestors(node) {
            if n == root {
                return in_focusable;
            }
            if self.kind(n) == Some(RegionKind::Focusable) {
                in_focusable = true;
            }
        }
        // Walked off the top without meeting `root`: not a descendant.
        false
    }

    /// Deepest node whose bounds contain `point`.
    ///
    /// Later siblings are drawn on top, so they win ties. A child may
    /// overflow its parent's bounds and is still hit there, as with nested
    /// SVG groups.
    pub fn hit_test(&self, point: Point) -> Option<RegionId> {
        self.roots
            .iter()
            .rev()
            .find_map(|&root| self.hit_in(root, point))
    }

    fn hit_in(&self, id: RegionId, point: Point) -> Option<RegionId> {
        let node = self.nodes.get(id)?;
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.hit_in(child, point))
            .or_else(|| node.bounds.contains(point).then_some(id))
    }
}

/// Iterator returned by [`RegionTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a RegionTree,
    next: Option<RegionId>,
}

impl Iterator for Ancestors<'_> {
    type Item = RegionId;

    fn next(&mut self) -> Option<RegionId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
