//! Request -> stream -> session -> display, across every family.

use algoscope_graph::GeneratorType;
use algoscope_integration_tests::{graph_request, session_for};
use algoscope_steps::heap::HeapCommand;
use algoscope_steps::list::{ListArena, ListCommand, ListKind};
use algoscope_steps::{HeapStep, ListStep, Step};
use algoscope_vis::{build, reconstruct, DisplayState, PlaybackMode, RunRequest};
use proptest::prelude::*;
use serde_json::json;

fn requests() -> Vec<RunRequest> {
    let raw = vec![
        json!({ "category": "sorting", "algorithm": "quick", "input": [4, 9, 1, 7, 3] }),
        json!({ "category": "graph", "algorithm": "bfs", "generator": "tree", "num_nodes": 9, "target": 8 }),
        json!({ "category": "graph", "algorithm": "prim-mst", "generator": "weighted-random", "num_nodes": 7 }),
        json!({ "category": "grid", "algorithm": "a-star", "rows": 4, "cols": 5, "walls": [[1, 1], [2, 1]], "start": [0, 0], "goal": [3, 4] }),
        json!({ "category": "tree", "kind": "avl", "values": [5, 3, 8, 1], "command": { "op": "insert", "value": 2 } }),
        json!({ "category": "heap", "heap": [9, 5, 7, 1], "command": { "op": "extract" } }),
        json!({ "category": "hash", "strategy": "quadratic-probing", "entries": [{ "key": "a", "value": "1" }], "command": { "op": "insert", "key": "b", "value": "2" } }),
        json!({ "category": "list", "values": [1, 2, 3], "command": { "op": "reverse" } }),
        json!({ "category": "list", "kind": "doubly", "values": [1, 2, 3], "command": { "op": "delete", "value": 2 } }),
        json!({ "category": "tree", "kind": "red-black", "values": [5, 3, 8, 1, 4], "command": { "op": "delete", "value": 5 } }),
        json!({ "category": "ml", "model": "linear_regression", "count": 12, "seed": 4 }),
        json!({ "category": "ml", "model": "knn_batch", "count": 20, "k": 3, "queries": 4 }),
        json!({ "category": "ml", "model": "decision_tree", "count": 20, "max_depth": 3, "min_samples": 2 }),
    ];
    raw.into_iter()
        .map(|value| serde_json::from_value(value).expect("request json"))
        .collect()
}

#[test]
fn every_request_plays_to_finished() {
    for request in requests() {
        let run = build(&request, 42).unwrap();
        let total = run.stream.len();
        let mut session = session_for(run);
        assert_eq!(session.mode(), PlaybackMode::Ready);
        let mut moved = 0;
        while session.step() {
            moved += 1;
        }
        assert_eq!(moved, total, "{request:?}");
        assert_eq!(session.mode(), PlaybackMode::Finished);
        assert_eq!(session.progress(), 1.0);
    }
}

#[test]
fn cursor_display_equals_fresh_reconstruction() {
    for request in requests() {
        let run = build(&request, 42).unwrap();
        let initial = run.initial.clone();
        let stream = run.stream.clone();
        let mut session = session_for(run);
        for cursor in [0, stream.len() / 2, stream.len()] {
            session.seek(cursor);
            assert_eq!(session.display(), Some(&reconstruct(&initial, stream.prefix(cursor))), "{request:?}");
        }
    }
}

#[test]
fn heap_replay_reaches_done_heap_before_done() {
    let request = RunRequest::Heap { heap: vec![9, 5, 7, 1, 3], command: HeapCommand::Extract };
    let run = build(&request, 0).unwrap();
    let Step::Heap(HeapStep::Done { heap, .. }) = run.stream.done().clone() else {
        panic!("heap stream");
    };
    let before_done = reconstruct(&run.initial, run.stream.prefix(run.stream.len() - 1));
    match before_done {
        DisplayState::Heap(display) => assert_eq!(display.heap, heap),
        other => panic!("{other:?}"),
    }
}

#[test]
fn list_replay_reaches_done_list_before_done() {
    let request = RunRequest::List {
        kind: ListKind::Doubly,
        values: vec![4, 5],
        command: ListCommand::InsertTail { value: 6 },
    };
    let run = build(&request, 0).unwrap();
    let Step::List(ListStep::Done { list, .. }) = run.stream.done().clone() else {
        panic!("list stream");
    };
    match reconstruct(&run.initial, run.stream.prefix(run.stream.len() - 1)) {
        DisplayState::List(display) => assert_eq!(
            ListArena::from_snapshot(&display.list).values(),
            ListArena::from_snapshot(&list).values()
        ),
        other => panic!("{other:?}"),
    }
}

#[test]
fn bellman_ford_request_on_weighted_random_is_directed() {
    let run = build(&graph_request("bellman-ford", GeneratorType::WeightedRandom, 6, 8), 42).unwrap();
    let graph = run.graph.unwrap();
    assert!(graph.directed);
    assert!(graph.edges().iter().all(|e| e.directed));
}

proptest! {
    #[test]
    fn graph_runs_are_reproducible(seed in any::<u64>(), n in 1usize..12) {
        let request = graph_request("dijkstra", GeneratorType::WeightedRandom, n, seed);
        let a = build(&request, 0).unwrap();
        let b = build(&request, 0).unwrap();
        prop_assert_eq!(a.stream, b.stream);
        prop_assert_eq!(a.graph, b.graph);
    }

    #[test]
    fn sorting_display_ends_sorted(input in proptest::collection::vec(-50i64..50, 0..12)) {
        let request = RunRequest::Sorting { algorithm: algoscope_steps::sorting::SortAlgorithm::Merge, input: input.clone() };
        let mut session = session_for(build(&request, 0).unwrap());
        session.seek(usize::MAX);
        let mut expected = input;
        expected.sort();
        match session.display() {
            Some(DisplayState::Array(display)) => prop_assert_eq!(&display.array, &expected),
            other => prop_assert!(false, "unexpected display {:?}", other),
        }
    }
}
