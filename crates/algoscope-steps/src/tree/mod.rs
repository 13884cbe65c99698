//! Binary search tree family: plain BST, AVL and red-black.
//!
//! Every operation starts from a [`TreeSnapshot`] and records its mutations
//! as structural [`TreeStep`]s. Producers apply each structural step to their
//! own [`TreeArena`] at the moment they emit it, so replaying the stream over
//! the starting snapshot reproduces the producer's tree exactly.

mod arena;
pub mod avl;
pub mod bst;
pub mod rbtree;

pub use arena::{Color, Side, TreeArena, TreeNode, TreeNodeId, TreeSnapshot};

use serde::{Deserialize, Serialize};

use crate::step::TreeStep;
use crate::stream::{Recorder, StepStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeOperation {
    Insert,
    Delete,
    Search,
    Build,
    Validate,
}

/// Outcome carried by a tree `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeResult {
    /// False for duplicate inserts, missing deletes, failed searches and
    /// invalid trees.
    pub success: bool,
    pub value: Option<i64>,
    pub size: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeKind {
    Bst,
    Avl,
    RedBlack,
}

/// One requested tree operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum TreeCommand {
    Insert(i64),
    Delete(i64),
    Search(i64),
    Build(Vec<i64>),
    Validate,
}

impl TreeKind {
    pub const ALL: [TreeKind; 3] = [TreeKind::Bst, TreeKind::Avl, TreeKind::RedBlack];

    /// Run `command` against `tree`.
    pub fn run(&self, tree: &TreeSnapshot, command: &TreeCommand) -> StepStream {
        match (self, command) {
            (TreeKind::Bst, TreeCommand::Insert(v)) => bst::insert(tree, *v),
            (TreeKind::Bst, TreeCommand::Delete(v)) => bst::delete(tree, *v),
            (TreeKind::Bst, TreeCommand::Build(values)) => bst::build(values),
            (TreeKind::Bst, TreeCommand::Validate) => bst::validate(tree),
            (TreeKind::Avl, TreeCommand::Insert(v)) => avl::insert(tree, *v),
            (TreeKind::Avl, TreeCommand::Delete(v)) => avl::delete(tree, *v),
            (TreeKind::Avl, TreeCommand::Build(values)) => avl::build(values),
            (TreeKind::Avl, TreeCommand::Validate) => avl::validate(tree),
            (TreeKind::RedBlack, TreeCommand::Insert(v)) => rbtree::insert(tree, *v),
            (TreeKind::RedBlack, TreeCommand::Delete(v)) => rbtree::delete(tree, *v),
            (TreeKind::RedBlack, TreeCommand::Build(values)) => rbtree::build(values),
            (TreeKind::RedBlack, TreeCommand::Validate) => rbtree::validate(tree),
            (_, TreeCommand::Search(v)) => bst::search(tree, *v),
        }
    }
}

/// Where a descent for a value ended.
pub(crate) enum Descent {
    /// The value is stored at `node`.
    Found { node: TreeNodeId, path: Vec<TreeNodeId> },
    /// The value would hang from `parent` on `side`; `None` for an empty tree.
    Vacant {
        anchor: Option<(TreeNodeId, Side)>,
        path: Vec<TreeNodeId>,
    },
}

/// A tree operation in progress: the arena plus the steps recorded so far.
pub(crate) struct TreeRun {
    pub(crate) arena: TreeArena,
    rec: Recorder,
    operation: TreeOperation,
}

impl TreeRun {
    pub(crate) fn new(tree: &TreeSnapshot, operation: TreeOperation) -> Self {
        Self {
            arena: TreeArena::from_snapshot(tree),
            rec: Recorder::new(),
            operation,
        }
    }

    /// Emit a step after applying its structural effect.
    pub(crate) fn commit(&mut self, step: TreeStep) {
        self.arena.apply(&step);
        self.rec.emit(step);
    }

    /// Emit a step with no structural effect.
    pub(crate) fn note(&mut self, step: TreeStep) {
        self.rec.emit(step);
    }

    /// Walk from the root toward `value`, emitting a compare per node.
    pub(crate) fn descend(&mut self, value: i64) -> Descent {
        let mut path = Vec::new();
        let mut current = self.arena.root();
        let mut anchor = None;
        while let Some(node) = current {
            let Some(here) = self.arena.value(node) else { break };
            self.note(TreeStep::Compare { node, value, path: path.clone() });
            if value == here {
                return Descent::Found { node, path };
            }
            path.push(node);
            let side = if value < here { Side::Left } else { Side::Right };
            anchor = Some((node, side));
            current = match side {
                Side::Left => self.arena.left(node),
                Side::Right => self.arena.right(node),
            };
        }
        Descent::Vacant { anchor, path }
    }

    /// Lookup shared by every tree kind.
    pub(crate) fn search(&mut self, value: i64) -> bool {
        match self.descend(value) {
            Descent::Found { node, path } => {
                self.note(TreeStep::Search { node: Some(node), found: true, path });
                true
            }
            Descent::Vacant { path, .. } => {
                self.note(TreeStep::Search { node: None, found: false, path });
                false
            }
        }
    }

    /// Link a new leaf; returns its id.
    pub(crate) fn attach(
        &mut self,
        value: i64,
        anchor: Option<(TreeNodeId, Side)>,
        color: Color,
        path: Vec<TreeNodeId>,
    ) -> TreeNodeId {
        let node = self.arena.next_id();
        self.commit(TreeStep::Insert {
            node,
            value,
            parent: anchor.map(|(p, _)| p),
            side: anchor.map(|(_, s)| s),
            color,
            path,
        });
        node
    }

    pub(crate) fn finish(self, success: bool, value: Option<i64>) -> StepStream {
        let result = TreeResult {
            success,
            value,
            size: self.arena.len(),
            height: self.arena.depth(),
        };
        self.rec.finish(TreeStep::Done {
            tree: self.arena.snapshot(),
            operation: self.operation,
            result,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn every_kind_searches_the_same_way() {
        let values = [8, 3, 10, 1, 6];
        for kind in TreeKind::ALL {
            let built = kind.run(&TreeSnapshot::default(), &TreeCommand::Build(values.to_vec()));
            let (tree, _) = done(&built);
            let hit = kind.run(&tree, &TreeCommand::Search(6));
            assert!(done(&hit).1.success, "{kind:?}");
            let miss = kind.run(&tree, &TreeCommand::Search(7));
            assert!(!done(&miss).1.success, "{kind:?}");
        }
    }

    #[test]
    fn command_wire_format() {
        let json = serde_json::to_string(&TreeCommand::Insert(5)).unwrap();
        assert_eq!(json, r#"{"op":"insert","value":5}"#);
        let json = serde_json::to_string(&TreeCommand::Validate).unwrap();
        assert_eq!(json, r#"{"op":"validate"}"#);
    }

    #[test]
    fn replay_matches_producer_for_every_kind() {
        for kind in TreeKind::ALL {
            let stream = kind.run(&TreeSnapshot::default(), &TreeCommand::Build(vec![5, 2, 8, 1, 9, 3, 7]));
            let (tree, _) = done(&stream);
            assert_eq!(replay(&TreeSnapshot::default(), &stream).snapshot(), tree, "{kind:?}");
            assert!(tags(&stream).contains(&"insert"));
        }
    }
}
