//! Fixed-size string hash table with chaining or open addressing.
//!
//! Keys hash with `h = (h * 31 + unit) % size` over their UTF-16 code units.
//! Open addressing deletes lazily: a removed entry leaves a tombstone that
//! lookups probe past and inserts may reuse.

use serde::{Deserialize, Serialize};

use crate::step::HashStep;
use crate::stream::{Recorder, StepStream};

pub const DEFAULT_TABLE_SIZE: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "chaining")]
    Chaining,
    #[serde(rename = "linear-probing")]
    Linear,
    #[serde(rename = "quadratic-probing")]
    Quadratic,
}

impl Strategy {
    /// Offset of the `attempt`-th probe from the home slot.
    fn offset(&self, attempt: usize) -> usize {
        match self {
            Strategy::Chaining | Strategy::Linear => attempt,
            Strategy::Quadratic => attempt * attempt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Empty,
    /// A chain under chaining, exactly one entry under open addressing.
    Occupied { entries: Vec<Entry> },
    Deleted,
}

impl Slot {
    fn holds(&self, key: &str) -> bool {
        matches!(self, Slot::Occupied { entries } if entries.iter().any(|e| e.key == key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashTable {
    pub strategy: Strategy,
    pub slots: Vec<Slot>,
}

impl HashTable {
    /// Empty table with at least one slot.
    pub fn new(size: usize, strategy: Strategy) -> Self {
        Self {
            strategy,
            slots: vec![Slot::Empty; size.max(1)],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Occupied { entries } => entries.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.size() as f64
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Occupied { entries } => entries.iter().find(|e| e.key == key).map(|e| e.value.as_str()),
            _ => None,
        })
    }

    /// Apply an `insert` or `delete` step. Other steps are ignored.
    pub fn apply(&mut self, step: &HashStep) {
        match step {
            HashStep::Insert { key, value, index } => {
                let Some(slot) = self.slots.get_mut(*index) else { return };
                match slot {
                    Slot::Occupied { entries } => match entries.iter_mut().find(|e| e.key == *key) {
                        Some(entry) => entry.value = value.clone(),
                        None if self.strategy == Strategy::Chaining => entries.push(Entry {
                            key: key.clone(),
                            value: value.clone(),
                        }),
                        None => {
                            *entries = vec![Entry { key: key.clone(), value: value.clone() }];
                        }
                    },
                    Slot::Empty | Slot::Deleted => {
                        *slot = Slot::Occupied {
                            entries: vec![Entry { key: key.clone(), value: value.clone() }],
                        };
                    }
                }
            }
            HashStep::Delete { key, index } => {
                let strategy = self.strategy;
                let Some(slot) = self.slots.get_mut(*index) else { return };
                if let Slot::Occupied { entries } = slot {
                    entries.retain(|e| e.key != *key);
                    if entries.is_empty() {
                        *slot = match strategy {
                            Strategy::Chaining => Slot::Empty,
                            Strategy::Linear | Strategy::Quadratic => Slot::Deleted,
                        };
                    }
                }
            }
            HashStep::Hash { .. }
            | HashStep::Collision { .. }
            | HashStep::Probe { .. }
            | HashStep::Search { .. }
            | HashStep::Done { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashOperation {
    Insert,
    Search,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashStats {
    /// Slots or chain links inspected past the home position.
    pub probes: usize,
    pub collisions: usize,
    pub found: bool,
    /// Insert found no usable slot.
    pub full: bool,
    pub load_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HashCommand {
    Insert { key: String, value: String },
    Search { key: String },
    Delete { key: String },
}

impl HashCommand {
    pub fn run(&self, table: &HashTable) -> StepStream {
        match self {
            HashCommand::Insert { key, value } => insert(table, key, value),
            HashCommand::Search { key } => search(table, key),
            HashCommand::Delete { key } => delete(table, key),
        }
    }
}

pub fn hash(key: &str, size: usize) -> usize {
    let size = size.max(1) as u64;
    let h = key.encode_utf16().fold(0u64, |h, unit| (h * 31 + u64::from(unit)) % size);
    h as usize
}

struct HashRun {
    table: HashTable,
    rec: Recorder,
    stats: HashStats,
}

impl HashRun {
    fn new(table: &HashTable) -> Self {
        Self {
            table: table.clone(),
            rec: Recorder::new(),
            stats: HashStats::default(),
        }
    }

    fn home(&mut self, key: &str) -> usize {
        let index = hash(key, self.table.size());
        self.rec.emit(HashStep::Hash { key: key.to_string(), index });
        index
    }

    fn commit(&mut self, step: HashStep) {
        self.table.apply(&step);
        self.rec.emit(step);
    }

    fn collision(&mut self, key: &str, index: usize) {
        self.stats.collisions += 1;
        self.rec.emit(HashStep::Collision { key: key.to_string(), index });
    }

    /// Open-addressing probe sequence from `home`, one pass over the table.
    fn probe_sequence(&self, home: usize) -> impl Iterator<Item = usize> + '_ {
        let size = self.table.size();
        (0..size).map(move |attempt| (home + self.table.strategy.offset(attempt)) % size)
    }

    fn finish(mut self, operation: HashOperation) -> StepStream {
        self.stats.load_factor = self.table.load_factor();
        self.rec.finish(HashStep::Done {
            table: self.table,
            operation,
            stats: self.stats,
        })
    }
}

/// Insert or update `key`.
pub fn insert(table: &HashTable, key: &str, value: &str) -> StepStream {
    let mut run = HashRun::new(table);
    let home = run.home(key);
    let write = |index| HashStep::Insert {
        key: key.to_string(),
        value: value.to_string(),
        index,
    };

    if run.table.strategy == Strategy::Chaining {
        if let Slot::Occupied { entries } = &run.table.slots[home] {
            let walked = entries.iter().position(|e| e.key == key).unwrap_or(entries.len());
            run.stats.probes = walked;
            run.collision(key, home);
        }
        run.commit(write(home));
        run.stats.found = true;
        return run.finish(HashOperation::Insert);
    }

    let mut indexes = Vec::new();
    let mut reusable = None;
    let mut target = None;
    let sequence: Vec<usize> = run.probe_sequence(home).collect();
    for (attempt, index) in sequence.into_iter().enumerate() {
        indexes.push(index);
        let slot = &run.table.slots[index];
        if *slot == Slot::Empty {
            target = Some(reusable.unwrap_or(index));
            break;
        } else if slot.holds(key) {
            target = Some(index);
            break;
        } else if *slot == Slot::Deleted {
            reusable.get_or_insert(index);
        } else if attempt == 0 {
            run.collision(key, index);
        }
    }
    let target = target.or(reusable);
    run.stats.probes = indexes.len().saturating_sub(1);
    run.rec.emit(HashStep::Probe { key: key.to_string(), indexes });

    match target {
        Some(index) => {
            run.commit(write(index));
            run.stats.found = true;
        }
        None => run.stats.full = true,
    }
    run.finish(HashOperation::Insert)
}

/// Find the slot holding `key`, emitting probe and search steps.
fn locate(run: &mut HashRun, key: &str) -> Option<usize> {
    let home = run.home(key);

    if run.table.strategy == Strategy::Chaining {
        let position = match &run.table.slots[home] {
            Slot::Occupied { entries } => entries.iter().position(|e| e.key == key),
            _ => None,
        };
        run.stats.probes = position.unwrap_or(0);
        let found = position.map(|_| home);
        run.rec.emit(HashStep::Search { key: key.to_string(), index: found, found: found.is_some() });
        return found;
    }

    let mut indexes = Vec::new();
    let mut found = None;
    let sequence: Vec<usize> = run.probe_sequence(home).collect();
    for index in sequence {
        indexes.push(index);
        match &run.table.slots[index] {
            Slot::Empty => break,
            slot if slot.holds(key) => {
                found = Some(index);
                break;
            }
            _ => {}
        }
    }
    run.stats.probes = indexes.len().saturating_sub(1);
    run.rec.emit(HashStep::Probe { key: key.to_string(), indexes });
    run.rec.emit(HashStep::Search { key: key.to_string(), index: found, found: found.is_some() });
    found
}

pub fn search(table: &HashTable, key: &str) -> StepStream {
    let mut run = HashRun::new(table);
    run.stats.found = locate(&mut run, key).is_some();
    run.finish(HashOperation::Search)
}

pub fn delete(table: &HashTable, key: &str) -> StepStream {
    let mut run = HashRun::new(table);
    if let Some(index) = locate(&mut run, key) {
        run.commit(HashStep::Delete { key: key.to_string(), index });
        run.stats.found = true;
    }
    run.finish(HashOperation::Delete)
}
