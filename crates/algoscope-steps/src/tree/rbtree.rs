//! Red-black tree insertion, deletion and validation.
//!
//! New nodes are red. A red node under a red parent is repaired by
//! recoloring when the uncle is red, otherwise by one or two rotations at the
//! grandparent. The root is forced black at the end of every insert.
//!
//! Deleting a black node leaves its replacement position one black short.
//! The deficit is pushed up by recoloring the sibling red, or settled by one
//! or two rotations around the parent.

use super::bst::check_order;
use super::{Color, Descent, Side, TreeNodeId, TreeOperation, TreeRun, TreeSnapshot};
use crate::step::TreeStep;
use crate::stream::StepStream;

fn recolor(run: &mut TreeRun, node: TreeNodeId, color: Color) {
    run.commit(TreeStep::Recolor { node, color });
}

fn fix_violations(run: &mut TreeRun, inserted: TreeNodeId) {
    let mut node = inserted;
    while let Some(parent) = run.arena.parent(node) {
        if run.arena.color(Some(parent)) != Color::Red {
            break;
        }
        let Some(grandparent) = run.arena.parent(parent) else { break };
        let parent_side = run.arena.side_of(parent).unwrap_or(Side::Left);
        let uncle = match parent_side {
            Side::Left => run.arena.right(grandparent),
            Side::Right => run.arena.left(grandparent),
        };
        run.note(TreeStep::FixViolation { node: Some(node), parent, uncle, sibling: None });

        if let Some(uncle) = uncle.filter(|u| run.arena.color(Some(*u)) == Color::Red) {
            recolor(run, parent, Color::Black);
            recolor(run, uncle, Color::Black);
            recolor(run, grandparent, Color::Red);
            node = grandparent;
            continue;
        }

        // Straighten an inner grandchild so the final rotation lifts the parent.
        let mut parent = parent;
        if run.arena.side_of(node) != Some(parent_side) {
            let step = match parent_side {
                Side::Left => TreeStep::RotateLeft { node: parent },
                Side::Right => TreeStep::RotateRight { node: parent },
            };
            run.commit(step);
            std::mem::swap(&mut node, &mut parent);
        }

        recolor(run, parent, Color::Black);
        recolor(run, grandparent, Color::Red);
        let step = match parent_side {
            Side::Left => TreeStep::RotateRight { node: grandparent },
            Side::Right => TreeStep::RotateLeft { node: grandparent },
        };
        run.commit(step);
    }

    if let Some(root) = run.arena.root() {
        if run.arena.color(Some(root)) == Color::Red {
            recolor(run, root, Color::Black);
        }
    }
}

fn insert_into(run: &mut TreeRun, value: i64) -> bool {
    match run.descend(value) {
        Descent::Found { .. } => false,
        Descent::Vacant { anchor: None, path } => {
            run.attach(value, None, Color::Black, path);
            true
        }
        Descent::Vacant { anchor, path } => {
            let node = run.attach(value, anchor, Color::Red, path);
            fix_violations(run, node);
            true
        }
    }
}

pub fn insert(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Insert);
    let inserted = insert_into(&mut run, value);
    run.finish(inserted, Some(value))
}

pub fn build(values: &[i64]) -> StepStream {
    let mut run = TreeRun::new(&TreeSnapshot::default(), TreeOperation::Build);
    for &value in values {
        insert_into(&mut run, value);
    }
    run.finish(true, None)
}

/// Rotation that lowers `node` toward `side`.
fn rotate_toward(side: Side, node: TreeNodeId) -> TreeStep {
    match side {
        Side::Left => TreeStep::RotateLeft { node },
        Side::Right => TreeStep::RotateRight { node },
    }
}

fn sibling_of(run: &TreeRun, parent: TreeNodeId, side: Side) -> Option<TreeNodeId> {
    match side {
        Side::Left => run.arena.right(parent),
        Side::Right => run.arena.left(parent),
    }
}

/// Repair a missing black at the `side` child of `parent`. `node` is the
/// subtree now sitting there, `None` when it is an empty leaf.
fn fix_double_black(
    run: &mut TreeRun,
    mut node: Option<TreeNodeId>,
    mut parent: Option<TreeNodeId>,
    mut side: Option<Side>,
) {
    while let (Some(p), Some(s)) = (parent, side) {
        if run.arena.color(node) == Color::Red {
            break;
        }
        let sibling = sibling_of(run, p, s);
        run.note(TreeStep::FixViolation { node, parent: p, uncle: None, sibling });
        let Some(mut sibling) = sibling else { break };

        if run.arena.color(Some(sibling)) == Color::Red {
            recolor(run, sibling, Color::Black);
            recolor(run, p, Color::Red);
            run.commit(rotate_toward(s, p));
            match sibling_of(run, p, s) {
                Some(next) => sibling = next,
                None => break,
            }
        }

        let (near, far) = match s {
            Side::Left => (run.arena.left(sibling), run.arena.right(sibling)),
            Side::Right => (run.arena.right(sibling), run.arena.left(sibling)),
        };
        if run.arena.color(near) == Color::Black && run.arena.color(far) == Color::Black {
            recolor(run, sibling, Color::Red);
            node = Some(p);
            parent = run.arena.parent(p);
            side = run.arena.side_of(p);
            continue;
        }

        if run.arena.color(far) == Color::Black {
            if let Some(near) = near {
                recolor(run, near, Color::Black);
            }
            recolor(run, sibling, Color::Red);
            let away = match s {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            run.commit(rotate_toward(away, sibling));
            match sibling_of(run, p, s) {
                Some(next) => sibling = next,
                None => break,
            }
        }

        let far = match s {
            Side::Left => run.arena.right(sibling),
            Side::Right => run.arena.left(sibling),
        };
        let parent_color = run.arena.color(Some(p));
        recolor(run, sibling, parent_color);
        recolor(run, p, Color::Black);
        if let Some(far) = far {
            recolor(run, far, Color::Black);
        }
        run.commit(rotate_toward(s, p));
        node = run.arena.root();
        break;
    }

    if let Some(node) = node.filter(|n| run.arena.color(Some(*n)) == Color::Red) {
        recolor(run, node, Color::Black);
    }
}

fn delete_from(run: &mut TreeRun, value: i64) -> bool {
    let (node, path) = match run.descend(value) {
        Descent::Found { node, path } => (node, path),
        Descent::Vacant { path, .. } => {
            run.note(TreeStep::Search { node: None, found: false, path });
            return false;
        }
    };

    let successor = match (run.arena.left(node), run.arena.right(node)) {
        (Some(_), Some(right)) => Some(run.arena.min_of(right)),
        _ => None,
    };
    // The node physically unlinked, and the child lifted into its place.
    let removed = successor.unwrap_or(node);
    let removed_color = run.arena.color(Some(removed));
    let child = run.arena.left(removed).or(run.arena.right(removed));
    let child_parent = run.arena.parent(removed);
    let child_side = run.arena.side_of(removed);

    let parent = run.arena.parent(node);
    run.commit(TreeStep::Delete { node, parent, successor, path });
    if removed_color == Color::Black {
        fix_double_black(run, child, child_parent, child_side);
    }
    true
}

pub fn delete(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Delete);
    let removed = delete_from(&mut run, value);
    run.finish(removed, Some(value))
}

/// Children first; returns the black height of the subtree counting the
/// empty leaves, or `None` at the first broken node.
fn check_colors(run: &mut TreeRun, id: Option<TreeNodeId>) -> Option<usize> {
    let Some(node) = id else { return Some(1) };
    let (left, right) = (run.arena.left(node), run.arena.right(node));
    let left_height = check_colors(run, left)?;
    let right_height = check_colors(run, right)?;

    let color = run.arena.color(Some(node));
    let red_child = run.arena.color(left) == Color::Red || run.arena.color(right) == Color::Red;
    let red_root = run.arena.parent(node).is_none();
    let valid = left_height == right_height && !(color == Color::Red && (red_child || red_root));
    let black_height = left_height + usize::from(color == Color::Black);
    run.note(TreeStep::CheckColor { node, color, black_height, valid });
    valid.then_some(black_height)
}

/// Ordering first, then a black root, no red node with a red child, and one
/// black height on every path.
pub fn validate(tree: &TreeSnapshot) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Validate);
    let valid = check_order(&mut run) && {
        let root = run.arena.root();
        check_colors(&mut run, root).is_some()
    };
    run.finish(valid, None)
}
