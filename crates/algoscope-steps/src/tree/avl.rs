//! AVL tree: BST mutations followed by a height and balance walk back to
//! the root.

use super::bst::{check_order, delete_from};
use super::{Color, Descent, TreeNodeId, TreeOperation, TreeRun, TreeSnapshot};
use crate::step::TreeStep;
use crate::stream::StepStream;

/// Walk from `start` to the root, refreshing heights and rotating any node
/// whose balance leaves `[-1, 1]`.
fn rebalance_from(run: &mut TreeRun, start: Option<TreeNodeId>) {
    let mut current = start;
    while let Some(node) = current {
        let up = run.arena.parent(node);

        let old_height = run.arena.height(Some(node));
        let new_height = run.arena.computed_height(node);
        if old_height != new_height {
            run.commit(TreeStep::UpdateHeight { node, old_height, new_height });
        }

        let balance = run.arena.balance(node);
        let needs_rotation = balance.abs() > 1;
        run.note(TreeStep::BalanceCheck { node, balance, needs_rotation });

        if needs_rotation {
            let rotation = if balance > 1 {
                let left_balance = run.arena.left(node).map_or(0, |l| run.arena.balance(l));
                if left_balance >= 0 {
                    TreeStep::RotateRight { node }
                } else {
                    TreeStep::RotateLeftRight { node }
                }
            } else {
                let right_balance = run.arena.right(node).map_or(0, |r| run.arena.balance(r));
                if right_balance <= 0 {
                    TreeStep::RotateLeft { node }
                } else {
                    TreeStep::RotateRightLeft { node }
                }
            };
            run.commit(rotation);
        }

        current = up;
    }
}

fn insert_into(run: &mut TreeRun, value: i64) -> bool {
    match run.descend(value) {
        Descent::Found { .. } => false,
        Descent::Vacant { anchor, path } => {
            run.attach(value, anchor, Color::Black, path);
            rebalance_from(run, anchor.map(|(parent, _)| parent));
            true
        }
    }
}

pub fn insert(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Insert);
    let inserted = insert_into(&mut run, value);
    run.finish(inserted, Some(value))
}

pub fn delete(tree: &TreeSnapshot, value: i64) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Delete);
    let removed = match delete_from(&mut run, value) {
        Some(start) => {
            rebalance_from(&mut run, start);
            true
        }
        None => false,
    };
    run.finish(removed, Some(value))
}

pub fn build(values: &[i64]) -> StepStream {
    let mut run = TreeRun::new(&TreeSnapshot::default(), TreeOperation::Build);
    for &value in values {
        insert_into(&mut run, value);
    }
    run.finish(true, None)
}

/// Children first; returns the true height of the subtree, or `None` once a
/// node is out of balance or carries a stale height.
fn check_balance(run: &mut TreeRun, id: Option<TreeNodeId>) -> Option<i32> {
    let Some(node) = id else { return Some(0) };
    let (left, right) = (run.arena.left(node), run.arena.right(node));
    let left = check_balance(run, left)?;
    let right = check_balance(run, right)?;

    let balance = left - right;
    let actual_height = 1 + left.max(right);
    let stored_height = run.arena.height(Some(node));
    let valid = balance.abs() <= 1 && stored_height == actual_height;
    run.note(TreeStep::CheckBalance { node, balance, stored_height, actual_height, valid });
    valid.then_some(actual_height)
}

/// Ordering first, then balance factors and stored heights.
pub fn validate(tree: &TreeSnapshot) -> StepStream {
    let mut run = TreeRun::new(tree, TreeOperation::Validate);
    let valid = check_order(&mut run) && {
        let root = run.arena.root();
        check_balance(&mut run, root).is_some()
    };
    run.finish(valid, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::testing::{done, replay, tags};
    use crate::step::Step;
    use crate::tree::{Side, TreeArena};
    use proptest::prelude::*;

    fn assert_balanced(arena: &TreeArena) {
        fn check(arena: &TreeArena, id: Option<TreeNodeId>) -> i32 {
            let Some(id) = id else { return 0 };
            let l = check(arena, arena.left(id));
            let r = check(arena, arena.right(id));
            assert!((l - r).abs() <= 1, "unbalanced at {id:?}");
            assert_eq!(arena.height(Some(id)), 1 + l.max(r), "stale height at {id:?}");
            1 + l.max(r)
        }
        check(arena, arena.root());
    }

    #[test]
    fn ascending_inserts_rotate_left() {
        let stream = build(&[1, 2, 3]);
        assert!(tags(&stream).contains(&"rotate_left"));
        let arena = TreeArena::from_snapshot(&done(&stream).0);
        assert_eq!(arena.value(arena.root().unwrap()), Some(2));
        assert_balanced(&arena);
    }

    #[test]
    fn zig_zag_uses_double_rotation() {
        let stream = build(&[3, 1, 2]);
        assert!(tags(&stream).contains(&"rotate_left_right"));
        let stream = build(&[1, 3, 2]);
        assert!(tags(&stream).contains(&"rotate_right_left"));
    }

    #[test]
    fn delete_rebalances() {
        let tree = done(&build(&[2, 1, 3, 4])).0;
        let stream = delete(&tree, 1);
        assert!(tags(&stream).contains(&"rotate_left"));
        let (after, result) = done(&stream);
        assert!(result.success);
        assert_balanced(&TreeArena::from_snapshot(&after));
        assert_eq!(replay(&tree, &stream).snapshot(), after);
    }

    #[test]
    fn balance_check_follows_every_height_walk() {
        let stream = insert(&done(&build(&[5])).0, 3);
        assert_eq!(tags(&stream), vec!["compare", "insert", "update_height", "balance_check", "done"]);
    }

    fn balance_checks(stream: &StepStream) -> Vec<(TreeNodeId, bool)> {
        stream
            .iter()
            .filter_map(|s| match s {
                Step::Tree(TreeStep::CheckBalance { node, valid, .. }) => Some((*node, *valid)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn validate_accepts_built_tree() {
        let tree = done(&build(&[8, 3, 10, 1, 6, 14, 4, 7, 13])).0;
        let stream = validate(&tree);
        assert!(done(&stream).1.success);
        let checks = balance_checks(&stream);
        assert_eq!(checks.len(), 9);
        assert!(checks.iter().all(|(_, valid)| *valid));
        // Children are checked before their parent.
        assert_eq!(checks.last().map(|(node, _)| Some(*node)), Some(tree.root));
    }

    #[test]
    fn validate_rejects_left_heavy_chain() {
        let mut arena = TreeArena::new();
        arena.place(TreeNodeId(0), 3, None, Color::Black);
        arena.place(TreeNodeId(1), 2, Some((TreeNodeId(0), Side::Left)), Color::Black);
        arena.place(TreeNodeId(2), 1, Some((TreeNodeId(1), Side::Left)), Color::Black);
        arena.set_height(TreeNodeId(1), 2);
        arena.set_height(TreeNodeId(0), 3);

        let stream = validate(&arena.snapshot());
        assert!(!done(&stream).1.success);
        let last = stream.iter().rev().find_map(|s| match s {
            Step::Tree(step @ TreeStep::CheckBalance { .. }) => Some(step.clone()),
            _ => None,
        });
        assert_eq!(
            last,
            Some(TreeStep::CheckBalance {
                node: TreeNodeId(0),
                balance: 2,
                stored_height: 3,
                actual_height: 3,
                valid: false,
            })
        );
    }

    #[test]
    fn validate_rejects_stale_height() {
        let mut arena = TreeArena::from_snapshot(&done(&build(&[2, 1, 3])).0);
        let root = arena.root().unwrap();
        arena.set_height(root, 5);
        let stream = validate(&arena.snapshot());
        assert!(!done(&stream).1.success);
        assert_eq!(balance_checks(&stream).last(), Some(&(root, false)));
    }

    #[test]
    fn validate_rejects_disorder_before_balance() {
        let mut arena = TreeArena::from_snapshot(&done(&build(&[2, 1, 3])).0);
        arena.place(TreeNodeId(3), 0, Some((TreeNodeId(2), Side::Left)), Color::Black);
        let stream = validate(&arena.snapshot());
        assert!(!done(&stream).1.success);
        assert!(balance_checks(&stream).is_empty());
    }

    proptest! {
        #[test]
        fn stays_balanced(values in prop::collection::vec(-100i64..100, 0..40), removals in prop::collection::vec(-100i64..100, 0..20)) {
            let built = build(&values);
            let mut tree = done(&built).0;
            assert_balanced(&TreeArena::from_snapshot(&tree));
            for value in removals {
                let stream = delete(&tree, value);
                let after = done(&stream).0;
                prop_assert_eq!(replay(&tree, &stream).snapshot(), after.clone());
                assert_balanced(&TreeArena::from_snapshot(&after));
                tree = after;
            }
            prop_assert!(done(&validate(&tree)).1.success);
            let values = TreeArena::from_snapshot(&tree).in_order();
            prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
