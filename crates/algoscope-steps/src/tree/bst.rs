//! Unbalanced binary search tree.

use super::{Color, Descent, TreeNodeId, TreeOperation, TreeRun, TreeSnapshot};
use crate::step::TreeStep;
use crate::stream::StepStream;

/// Insert path shared with the build loop. Returns false for duplicates.
fn insert_into(run: &mut TreeRun, value: i64) -> bool {
    match run.descend(value) {
        Descent::Found { .. } => false,
        Descent::Vacant { anchor, path } => {
            run.attach(value, anchor, Color::Black, path);
            true
        }
    }
}

pub fn insert(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Insert);
    let inserted = insert_into(&mut run, value);
    run.finish(inserted, Some(value))
}

pub fn search(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Search);
    let found = run.search(value);
    run.finish(found, Some(value))
}

/// Remove `value` and return the parent of the node that was physically
/// unlinked, which is where rebalancing starts.
pub(crate) fn delete_from(run: &mut TreeRun, value: i64) -> Option<Option<TreeNodeId>> {
    let (node, path) = match run.descend(value) {
        Descent::Found { node, path } => (node, path),
        Descent::Vacant { path, .. } => {
            run.note(TreeStep::Search { node: None, found: false, path });
            return None;
        }
    };

    let successor = match (run.arena.left(node), run.arena.right(node)) {
        (Some(_), Some(right)) => Some(run.arena.min_of(right)),
        _ => None,
    };
    let unlinked_parent = run.arena.parent(successor.unwrap_or(node));
    let parent = run.arena.parent(node);
    run.commit(TreeStep::Delete { node, parent, successor, path });
    Some(unlinked_parent)
}

/// Delete with the in-order successor taking the place of a node with two
/// children.
pub fn delete(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Delete);
    let removed = delete_from(&mut run, value).is_some();
    run.finish(removed, Some(value))
}

/// Insert `values` in order into an empty tree; duplicates are skipped.
pub fn build(values: &[i64]) -> StepStream {
    let mut run = TreeRun::new(&TreeSnapshot::default(), TreeOperation::Build);
    for &value in values {
        insert_into(&mut run, value);
    }
    run.finish(true, None)
}

/// Check the ordering property top-down, narrowing each node's open bounds.
/// Stops at the first violation.
pub(crate) fn check_order(run: &mut TreeRun) -> bool {
    let mut stack: Vec<(TreeNodeId, Option<i64>, Option<i64>)> =
        run.arena.root().map(|r| (r, None, None)).into_iter().collect();

    while let Some((node, min, max)) = stack.pop() {
        let Some(value) = run.arena.value(node) else { continue };
        let ok = min.map_or(true, |m| value > m) && max.map_or(true, |m| value < m);
        run.note(TreeStep::CheckBounds { node, min, max, valid: ok });
        if !ok {
            return false;
        }
        if let Some(right) = run.arena.right(node) {
            stack.push((right, Some(value), max));
        }
        if let Some(left) = run.arena.left(node) {
            stack.push((left, min, Some(value)));
        }
    }
    true
}

pub fn validate(tree: &TreeSnapshot) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Validate);
    let valid = check_order(&mut run);
    run.finish(valid, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::testing::{done, replay, tags};
    use crate::tree::{Side, TreeArena};

    fn built(values: &[i64]) -> TreeSnapshot {
        done(&build(values)).0
    }

    #[test]
    fn insert_into_empty_tree() {
        let stream = insert(&TreeSnapshot::default(), 5);
        assert_eq!(tags(&stream), vec!["insert", "done"]);
        let (tree, result) = done(&stream);
        assert_eq!(tree.root, Some(TreeNodeId(0)));
        assert!(result.success);
        assert_eq!(result.size, 1);
    }

    #[test]
    fn insert_compares_along_path() {
        let tree = built(&[5, 3, 8]);
        let stream = insert(&tree, 4);
        assert_eq!(tags(&stream), vec!["compare", "compare", "insert", "done"]);
        let arena = TreeArena::from_snapshot(&done(&stream).0);
        assert_eq!(arena.in_order(), vec![3, 4, 5, 8]);
        let four = TreeNodeId(3);
        assert_eq!(arena.parent(four), Some(TreeNodeId(1)));
        assert_eq!(arena.side_of(four), Some(Side::Right));
    }

    #[test]
    fn duplicate_insert_fails_without_mutation() {
        let tree = built(&[5, 3]);
        let stream = insert(&tree, 3);
        let (after, result) = done(&stream);
        assert!(!result.success);
        assert_eq!(after, tree);
    }

    #[test]
    fn delete_two_children_uses_successor() {
        let tree = built(&[50, 30, 70, 60, 80, 65]);
        let stream = delete(&tree, 50);
        let (after, result) = done(&stream);
        assert!(result.success);
        let arena = TreeArena::from_snapshot(&after);
        assert_eq!(arena.value(arena.root().unwrap()), Some(60));
        assert_eq!(arena.in_order(), vec![30, 60, 65, 70, 80]);
        assert_eq!(replay(&tree, &stream).snapshot(), after);
    }

    #[test]
    fn delete_leaf_and_missing_value() {
        let tree = built(&[2, 1, 3]);
        let (after, result) = done(&delete(&tree, 1));
        assert!(result.success);
        assert_eq!(TreeArena::from_snapshot(&after).in_order(), vec![2, 3]);

        let (after, result) = done(&delete(&tree, 9));
        assert!(!result.success);
        assert_eq!(after, tree);
    }

    #[test]
    fn delete_only_node_empties_tree() {
        let tree = built(&[4]);
        let (after, result) = done(&delete(&tree, 4));
        assert!(result.success);
        assert_eq!(after.root, None);
        assert_eq!(result.size, 0);
    }

    #[test]
    fn validate_accepts_built_tree() {
        let tree = built(&[8, 3, 10, 1, 6, 14, 4, 7, 13]);
        let stream = validate(&tree);
        assert!(done(&stream).1.success);
        assert_eq!(tags(&stream).iter().filter(|t| **t == "check_bounds").count(), 9);
    }

    #[test]
    fn validate_rejects_misplaced_value() {
        let mut arena = TreeArena::from_snapshot(&built(&[8, 3, 10]));
        arena.place(TreeNodeId(3), 9, Some((TreeNodeId(1), Side::Right)), Color::Black);
        let stream = validate(&arena.snapshot());
        assert!(!done(&stream).1.success);
    }

    #[test]
    fn build_reports_height() {
        let (_, result) = done(&build(&[1, 2, 3, 4]));
        assert_eq!(result.height, 4);
        assert_eq!(result.size, 4);
    }
}
