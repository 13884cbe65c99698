//! Id-indexed binary tree storage shared by the BST, AVL and red-black
//! producers and by display reconstruction.
//!
//! Nodes live in slots addressed by [`TreeNodeId`]. Ids are never reused:
//! removing a node empties its slot, and new nodes always take the next
//! unused slot. Parent and child links are ids, so cloning a tree is a flat
//! copy of the slot vector.

use serde::{Deserialize, Serialize};

use crate::step::TreeStep;

/// Stable identifier of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeNodeId(pub usize);

/// Which child link of the parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Red-black node color. Plain BST and AVL nodes are black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    #[default]
    Black,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: TreeNodeId,
    pub value: i64,
    pub left: Option<TreeNodeId>,
    pub right: Option<TreeNodeId>,
    pub parent: Option<TreeNodeId>,
    /// Levels in the subtree rooted here, leaves are 1.
    pub height: i32,
    pub color: Color,
}

/// Serializable view of a tree: root plus live nodes in id order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub root: Option<TreeNodeId>,
    pub nodes: Vec<TreeNode>,
    /// First id never handed out.
    #[serde(default)]
    pub next_id: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeArena {
    slots: Vec<Option<TreeNode>>,
    root: Option<TreeNodeId>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &TreeSnapshot) -> Self {
        let len = snapshot
            .nodes
            .iter()
            .map(|n| n.id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(snapshot.next_id);
        let mut slots = vec![None; len];
        for node in &snapshot.nodes {
            slots[node.id.0] = Some(node.clone());
        }
        Self { slots, root: snapshot.root }
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: self.root,
            nodes: self.slots.iter().flatten().cloned().collect(),
            next_id: self.slots.len(),
        }
    }

    pub fn root(&self) -> Option<TreeNodeId> {
        self.root
    }

    pub fn get(&self, id: TreeNodeId) -> Option<&TreeNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: TreeNodeId) -> Option<&mut TreeNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn value(&self, id: TreeNodeId) -> Option<i64> {
        self.get(id).map(|n| n.value)
    }

    pub fn left(&self, id: TreeNodeId) -> Option<TreeNodeId> {
        self.get(id).and_then(|n| n.left)
    }

    pub fn right(&self, id: TreeNodeId) -> Option<TreeNodeId> {
        self.get(id).and_then(|n| n.right)
    }

    pub fn parent(&self, id: TreeNodeId) -> Option<TreeNodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Id the next placed node will take.
    pub fn next_id(&self) -> TreeNodeId {
        TreeNodeId(self.slots.len())
    }

    /// Stored height, 0 for an empty subtree.
    pub fn height(&self, id: Option<TreeNodeId>) -> i32 {
        id.and_then(|id| self.get(id)).map_or(0, |n| n.height)
    }

    /// Left height minus right height.
    pub fn balance(&self, id: TreeNodeId) -> i32 {
        self.height(self.left(id)) - self.height(self.right(id))
    }

    /// Color of a node; empty subtrees count as black.
    pub fn color(&self, id: Option<TreeNodeId>) -> Color {
        id.and_then(|id| self.get(id)).map_or(Color::Black, |n| n.color)
    }

    /// Which side of its parent `id` hangs from.
    pub fn side_of(&self, id: TreeNodeId) -> Option<Side> {
        let parent = self.parent(id)?;
        if self.left(parent) == Some(id) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Height recomputed from the children's stored heights.
    pub fn computed_height(&self, id: TreeNodeId) -> i32 {
        1 + self.height(self.left(id)).max(self.height(self.right(id)))
    }

    /// Levels in the whole tree, measured by walking it.
    pub fn depth(&self) -> usize {
        fn walk(arena: &TreeArena, id: Option<TreeNodeId>) -> usize {
            match id {
                None => 0,
                Some(id) => 1 + walk(arena, arena.left(id)).max(walk(arena, arena.right(id))),
            }
        }
        walk(self, self.root)
    }

    pub fn in_order(&self) -> Vec<i64> {
        fn walk(arena: &TreeArena, id: Option<TreeNodeId>, out: &mut Vec<i64>) {
            if let Some(id) = id {
                walk(arena, arena.left(id), out);
                if let Some(v) = arena.value(id) {
                    out.push(v);
                }
                walk(arena, arena.right(id), out);
            }
        }
        let mut out = Vec::with_capacity(self.len());
        walk(self, self.root, &mut out);
        out
    }

    /// Leftmost node of the subtree at `id`.
    pub fn min_of(&self, mut id: TreeNodeId) -> TreeNodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    /// Put a new leaf into slot `id` under `parent` (or as root).
    pub fn place(&mut self, id: TreeNodeId, value: i64, parent: Option<(TreeNodeId, Side)>, color: Color) {
        if self.slots.len() <= id.0 {
            self.slots.resize(id.0 + 1, None);
        }
        self.slots[id.0] = Some(TreeNode {
            id,
            value,
            left: None,
            right: None,
            parent: parent.map(|(p, _)| p),
            height: 1,
            color,
        });
        match parent {
            None => self.root = Some(id),
            Some((p, side)) => self.set_child(p, side, Some(id)),
        }
    }

    fn set_child(&mut self, parent: TreeNodeId, side: Side, child: Option<TreeNodeId>) {
        if let Some(node) = self.get_mut(parent) {
            match side {
                Side::Left => node.left = child,
                Side::Right => node.right = child,
            }
        }
    }

    fn set_parent(&mut self, id: Option<TreeNodeId>, parent: Option<TreeNodeId>) {
        if let Some(node) = id.and_then(|id| self.get_mut(id)) {
            node.parent = parent;
        }
    }

    /// Point whatever referenced `old` (its parent or the root) at `new`.
    fn replace_in_parent(&mut self, old: TreeNodeId, new: Option<TreeNodeId>) {
        let parent = self.parent(old);
        match parent {
            None => self.root = new,
            Some(p) => {
                let side = if self.left(p) == Some(old) { Side::Left } else { Side::Right };
                self.set_child(p, side, new);
            }
        }
        self.set_parent(new, parent);
    }

    /// Remove a node with at most one child, lifting that child into its place.
    fn splice(&mut self, id: TreeNodeId) {
        let child = self.left(id).or(self.right(id));
        self.replace_in_parent(id, child);
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = None;
        }
    }

    /// Delete `node`. With a `successor`, the node takes the successor's value
    /// and the successor is spliced out instead.
    pub fn remove(&mut self, node: TreeNodeId, successor: Option<TreeNodeId>) {
        match successor {
            Some(succ) => {
                if let Some(value) = self.value(succ) {
                    if let Some(n) = self.get_mut(node) {
                        n.value = value;
                    }
                    self.splice(succ);
                }
            }
            None => self.splice(node),
        }
    }

    /// Left rotation at `x`. Returns the new subtree root.
    pub fn rotate_left(&mut self, x: TreeNodeId) -> Option<TreeNodeId> {
        let y = self.right(x)?;
        let inner = self.left(y);
        self.set_child(x, Side::Right, inner);
        self.set_parent(inner, Some(x));
        self.replace_in_parent(x, Some(y));
        self.set_child(y, Side::Left, Some(x));
        self.set_parent(Some(x), Some(y));
        self.refresh_height(x);
        self.refresh_height(y);
        Some(y)
    }

    /// Right rotation at `y`. Returns the new subtree root.
    pub fn rotate_right(&mut self, y: TreeNodeId) -> Option<TreeNodeId> {
        let x = self.left(y)?;
        let inner = self.right(x);
        self.set_child(y, Side::Left, inner);
        self.set_parent(inner, Some(y));
        self.replace_in_parent(y, Some(x));
        self.set_child(x, Side::Right, Some(y));
        self.set_parent(Some(y), Some(x));
        self.refresh_height(y);
        self.refresh_height(x);
        Some(x)
    }

    fn refresh_height(&mut self, id: TreeNodeId) {
        let h = self.computed_height(id);
        if let Some(node) = self.get_mut(id) {
            node.height = h;
        }
    }

    pub fn set_height(&mut self, id: TreeNodeId, height: i32) {
        if let Some(node) = self.get_mut(id) {
            node.height = height;
        }
    }

    pub fn set_color(&mut self, id: TreeNodeId, color: Color) {
        if let Some(node) = self.get_mut(id) {
            node.color = color;
        }
    }

    /// Apply the structural effect of a step. Non-structural steps are ignored.
    pub fn apply(&mut self, step: &TreeStep) {
        match step {
            TreeStep::Insert { node, value, parent, side, color, .. } => {
                let anchor = parent.zip(*side);
                self.place(*node, *value, anchor, *color);
            }
            TreeStep::Delete { node, successor, .. } => self.remove(*node, *successor),
            TreeStep::UpdateHeight { node, new_height, .. } => self.set_height(*node, *new_height),
            TreeStep::RotateLeft { node } => {
                self.rotate_left(*node);
            }
            TreeStep::RotateRight { node } => {
                self.rotate_right(*node);
            }
            TreeStep::RotateLeftRight { node } => {
                if let Some(left) = self.left(*node) {
                    self.rotate_left(left);
                }
                self.rotate_right(*node);
            }
            TreeStep::RotateRightLeft { node } => {
                if let Some(right) = self.right(*node) {
                    self.rotate_right(right);
                }
                self.rotate_left(*node);
            }
            TreeStep::Recolor { node, color } => self.set_color(*node, *color),
            TreeStep::Compare { .. }
            | TreeStep::Search { .. }
            | TreeStep::BalanceCheck { .. }
            | TreeStep::CheckBounds { .. }
            | TreeStep::CheckBalance { .. }
            | TreeStep::CheckColor { .. }
            | TreeStep::FixViolation { .. }
            | TreeStep::Done { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 at the root, 1 left, 3 right.
    fn three() -> TreeArena {
        let mut arena = TreeArena::new();
        arena.place(TreeNodeId(0), 2, None, Color::Black);
        arena.place(TreeNodeId(1), 1, Some((TreeNodeId(0), Side::Left)), Color::Black);
        arena.place(TreeNodeId(2), 3, Some((TreeNodeId(0), Side::Right)), Color::Black);
        arena.set_height(TreeNodeId(0), 2);
        arena
    }

    #[test]
    fn rotate_left_relinks_root() {
        let mut arena = three();
        let new_root = arena.rotate_left(TreeNodeId(0));
        assert_eq!(new_root, Some(TreeNodeId(2)));
        assert_eq!(arena.root(), Some(TreeNodeId(2)));
        assert_eq!(arena.left(TreeNodeId(2)), Some(TreeNodeId(0)));
        assert_eq!(arena.parent(TreeNodeId(0)), Some(TreeNodeId(2)));
        assert_eq!(arena.in_order(), vec![1, 2, 3]);
    }

    #[test]
    fn rotations_are_inverse() {
        let mut arena = three();
        let before = arena.in_order();
        let top = arena.rotate_right(TreeNodeId(0)).unwrap();
        arena.rotate_left(top);
        assert_eq!(arena.root(), Some(TreeNodeId(0)));
        assert_eq!(arena.in_order(), before);
    }

    #[test]
    fn remove_with_successor_copies_value() {
        let mut arena = three();
        arena.remove(TreeNodeId(0), Some(TreeNodeId(2)));
        assert_eq!(arena.value(TreeNodeId(0)), Some(3));
        assert!(arena.get(TreeNodeId(2)).is_none());
        assert_eq!(arena.in_order(), vec![1, 3]);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut arena = three();
        arena.remove(TreeNodeId(2), None);
        assert_eq!(arena.next_id(), TreeNodeId(3));
    }

    #[test]
    fn snapshot_keeps_retired_ids() {
        let mut arena = three();
        arena.remove(TreeNodeId(2), None);
        let restored = TreeArena::from_snapshot(&arena.snapshot());
        assert_eq!(restored.next_id(), TreeNodeId(3));
    }

    #[test]
    fn snapshot_round_trip() {
        let mut arena = three();
        arena.remove(TreeNodeId(1), None);
        let restored = TreeArena::from_snapshot(&arena.snapshot());
        assert_eq!(restored.snapshot(), arena.snapshot());
        assert_eq!(restored.next_id(), TreeNodeId(3));
    }
}
