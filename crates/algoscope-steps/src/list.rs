//! Singly and doubly linked lists on an id-indexed arena.
//!
//! Node ids are never reused, so a step naming a node stays meaningful for
//! the whole stream. Each producer applies its `insert`, `delete`,
//! `reverse` and `set_prev` steps to its own arena as it emits them.
//!
//! Both kinds share the forward walk. A doubly linked list follows every
//! change of a `next` link with the `set_prev` steps that restore the
//! backward links.

use serde::{Deserialize, Serialize};

use crate::step::ListStep;
use crate::stream::{Recorder, StepStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListNodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    #[default]
    Singly,
    Doubly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNode {
    pub id: ListNodeId,
    pub value: i64,
    pub next: Option<ListNodeId>,
    /// Backward link; always `None` in a singly linked list.
    #[serde(default)]
    pub prev: Option<ListNodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListSnapshot {
    #[serde(default)]
    pub kind: ListKind,
    pub head: Option<ListNodeId>,
    /// Live nodes in id order.
    pub nodes: Vec<ListNode>,
    #[serde(default)]
    pub next_id: usize,
}

impl ListSnapshot {
    /// Singly linked list holding `values` in order.
    pub fn from_values(values: &[i64]) -> Self {
        Self::from_values_as(ListKind::Singly, values)
    }

    pub fn from_values_as(kind: ListKind, values: &[i64]) -> Self {
        let mut arena = ListArena { kind, ..ListArena::default() };
        let mut tail = None;
        for &value in values {
            let id = arena.next_id();
            arena.link(id, value, tail);
            if kind == ListKind::Doubly {
                arena.set_prev(id, tail);
            }
            tail = Some(id);
        }
        arena.snapshot()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListArena {
    kind: ListKind,
    slots: Vec<Option<ListNode>>,
    head: Option<ListNodeId>,
}

impl ListArena {
    pub fn from_snapshot(snapshot: &ListSnapshot) -> Self {
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
        Self { kind: snapshot.kind, slots, head: snapshot.head }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            kind: self.kind,
            head: self.head,
            nodes: self.slots.iter().flatten().cloned().collect(),
            next_id: self.slots.len(),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn head(&self) -> Option<ListNodeId> {
        self.head
    }

    pub fn next_id(&self) -> ListNodeId {
        ListNodeId(self.slots.len())
    }

    pub fn get(&self, id: ListNodeId) -> Option<&ListNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn next(&self, id: ListNodeId) -> Option<ListNodeId> {
        self.get(id).and_then(|n| n.next)
    }

    pub fn prev(&self, id: ListNodeId) -> Option<ListNodeId> {
        self.get(id).and_then(|n| n.prev)
    }

    pub fn value(&self, id: ListNodeId) -> Option<i64> {
        self.get(id).map(|n| n.value)
    }

    /// Node ids from the head, following `next`. Stops on a revisit.
    pub fn ids(&self) -> Vec<ListNodeId> {
        let mut out = Vec::new();
        let mut seen = vec![false; self.slots.len()];
        let mut current = self.head;
        while let Some(id) = current {
            if seen.get(id.0).copied().unwrap_or(true) {
                break;
            }
            seen[id.0] = true;
            out.push(id);
            current = self.next(id);
        }
        out
    }

    pub fn values(&self) -> Vec<i64> {
        self.ids().into_iter().filter_map(|id| self.value(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn set_next(&mut self, id: ListNodeId, next: Option<ListNodeId>) {
        if let Some(node) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, id: ListNodeId, prev: Option<ListNodeId>) {
        if let Some(node) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
            node.prev = prev;
        }
    }

    /// Create `id` after `after`, or at the head. Backward links are left to
    /// `set_prev` steps.
    fn link(&mut self, id: ListNodeId, value: i64, after: Option<ListNodeId>) {
        let next = match after {
            Some(prev) => self.next(prev),
            None => self.head,
        };
        if self.slots.len() <= id.0 {
            self.slots.resize(id.0 + 1, None);
        }
        self.slots[id.0] = Some(ListNode { id, value, next, prev: None });
        match after {
            Some(prev) => self.set_next(prev, Some(id)),
            None => self.head = Some(id),
        }
    }

    fn unlink(&mut self, id: ListNodeId, prev: Option<ListNodeId>) {
        let next = self.next(id);
        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = None;
        }
    }

    /// Apply the structural effect of a step. Other steps are ignored.
    pub fn apply(&mut self, step: &ListStep) {
        match step {
            ListStep::Insert { node, value, after, .. } => self.link(*node, *value, *after),
            ListStep::Delete { node, prev, .. } => self.unlink(*node, *prev),
            ListStep::Reverse { node, next } => {
                self.set_next(*node, *next);
                self.head = Some(*node);
            }
            ListStep::SetPrev { node, prev } => self.set_prev(*node, *prev),
            ListStep::Visit { .. } | ListStep::Compare { .. } | ListStep::Search { .. } | ListStep::Done { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOperation {
    InsertHead,
    InsertTail,
    InsertAt,
    DeleteHead,
    DeleteTail,
    Delete,
    Search,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFault {
    IndexOutOfBounds,
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStats {
    pub found: bool,
    pub index: Option<usize>,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ListFault>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ListCommand {
    InsertHead { value: i64 },
    InsertTail { value: i64 },
    InsertAt { index: usize, value: i64 },
    DeleteHead,
    DeleteTail,
    Delete { value: i64 },
    Search { value: i64 },
    Reverse,
}

impl ListCommand {
    /// Run against `list`; the snapshot's kind decides whether backward
    /// links are maintained.
    pub fn run(&self, list: &ListSnapshot) -> StepStream {
        match self {
            ListCommand::InsertHead { value } => insert_head(list, *value),
            ListCommand::InsertTail { value } => insert_tail(list, *value),
            ListCommand::InsertAt { index, value } => insert_at(list, *index, *value),
            ListCommand::DeleteHead => delete_head(list),
            ListCommand::DeleteTail => delete_tail(list),
            ListCommand::Delete { value } => delete_value(list, *value),
            ListCommand::Search { value } => search(list, *value),
            ListCommand::Reverse => reverse(list),
        }
    }
}

struct ListRun {
    arena: ListArena,
    rec: Recorder,
    operation: ListOperation,
    stats: ListStats,
}

impl ListRun {
    fn new(list: &ListSnapshot, operation: ListOperation) -> Self {
        Self {
            arena: ListArena::from_snapshot(list),
            rec: Recorder::new(),
            operation,
            stats: ListStats::default(),
        }
    }

    fn commit(&mut self, step: ListStep) {
        self.arena.apply(&step);
        self.rec.emit(step);
    }

    /// Visit nodes from the head up to and including position `last`.
    fn walk_to(&mut self, last: usize) -> Option<ListNodeId> {
        let mut current = self.arena.head();
        for index in 0..=last {
            let node = current?;
            self.rec.emit(ListStep::Visit { node, index });
            if index == last {
                return Some(node);
            }
            current = self.arena.next(node);
        }
        None
    }

    fn doubly(&self) -> bool {
        self.arena.kind() == ListKind::Doubly
    }

    fn insert_after(&mut self, after: Option<ListNodeId>, index: usize, value: i64) {
        let node = self.arena.next_id();
        self.commit(ListStep::Insert { node, value, after, index });
        if self.doubly() {
            if let Some(next) = self.arena.next(node) {
                self.commit(ListStep::SetPrev { node: next, prev: Some(node) });
            }
            if after.is_some() {
                self.commit(ListStep::SetPrev { node, prev: after });
            }
        }
        self.stats.found = true;
        self.stats.index = Some(index);
    }

    /// Unlink `node` and, in a doubly linked list, point its successor back
    /// at `prev`.
    fn remove(&mut self, node: ListNodeId, prev: Option<ListNodeId>, index: usize) {
        let next = self.arena.next(node);
        self.commit(ListStep::Delete { node, prev, index });
        if self.doubly() {
            if let Some(next) = next {
                self.commit(ListStep::SetPrev { node: next, prev });
            }
        }
        self.stats.found = true;
        self.stats.index = Some(index);
    }

    fn fail(mut self, fault: ListFault) -> StepStream {
        self.stats.error = Some(fault);
        self.finish()
    }

    fn finish(mut self) -> StepStream {
        self.stats.length = self.arena.len();
        self.rec.finish(ListStep::Done {
            list: self.arena.snapshot(),
            operation: self.operation,
            stats: self.stats,
        })
    }
}

pub fn insert_head(list: &ListSnapshot, value: i64) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::InsertHead);
    run.insert_after(None, 0, value);
    run.finish()
}

pub fn insert_tail(list: &ListSnapshot, value: i64) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::InsertTail);
    let len = run.arena.len();
    let tail = len.checked_sub(1).and_then(|last| run.walk_to(last));
    run.insert_after(tail, len, value);
    run.finish()
}

/// Insert so the new node lands at position `index`; `index == len` appends.
pub fn insert_at(list: &ListSnapshot, index: usize, value: i64) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::InsertAt);
    if index == 0 {
        run.insert_after(None, 0, value);
        return run.finish();
    }
    if index > run.arena.len() {
        return run.fail(ListFault::IndexOutOfBounds);
    }
    let prev = run.walk_to(index - 1);
    run.insert_after(prev, index, value);
    run.finish()
}

pub fn delete_head(list: &ListSnapshot) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::DeleteHead);
    let Some(head) = run.arena.head() else {
        return run.fail(ListFault::Empty);
    };
    run.remove(head, None, 0);
    run.finish()
}

pub fn delete_tail(list: &ListSnapshot) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::DeleteTail);
    let len = run.arena.len();
    let Some(last) = len.checked_sub(1) else {
        return run.fail(ListFault::Empty);
    };
    let prev = last.checked_sub(1).and_then(|p| run.walk_to(p));
    let tail = match prev {
        Some(p) => run.arena.next(p),
        None => run.arena.head(),
    };
    if let Some(node) = tail {
        run.remove(node, prev, last);
    }
    run.finish()
}

/// Remove the first node holding `value`.
pub fn delete_value(list: &ListSnapshot, value: i64) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::Delete);
    let mut prev = None;
    for (index, node) in run.arena.ids().into_iter().enumerate() {
        let here = run.arena.value(node).unwrap_or_default();
        run.rec.emit(ListStep::Compare { node, value: here, target: value });
        if here == value {
            run.remove(node, prev, index);
            break;
        }
        prev = Some(node);
    }
    run.finish()
}

pub fn search(list: &ListSnapshot, value: i64) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::Search);
    let mut hit = None;
    for (index, node) in run.arena.ids().into_iter().enumerate() {
        let here = run.arena.value(node).unwrap_or_default();
        run.rec.emit(ListStep::Compare { node, value: here, target: value });
        if here == value {
            hit = Some((node, index));
            break;
        }
    }
    run.rec.emit(ListStep::Search {
        node: hit.map(|(n, _)| n),
        index: hit.map(|(_, i)| i),
        found: hit.is_some(),
    });
    run.stats.found = hit.is_some();
    run.stats.index = hit.map(|(_, i)| i);
    run.finish()
}

/// Reverse in place, one pointer flip per node. A doubly linked node also
/// takes its old successor as its new predecessor.
pub fn reverse(list: &ListSnapshot) -> StepStream {
    let mut run = ListRun::new(list, ListOperation::Reverse);
    let mut prev = None;
    for node in run.arena.ids() {
        let next = run.arena.next(node);
        run.commit(ListStep::Reverse { node, next: prev });
        if run.doubly() {
            run.commit(ListStep::SetPrev { node, prev: next });
        }
        prev = Some(node);
    }
    run.stats.found = true;
    run.finish()
}
