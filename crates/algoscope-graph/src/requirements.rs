//! Algorithm requirements and the compatibility matrix.
//!
//! Every algorithm key has one static [`AlgorithmRequirements`] entry. The
//! compatibility check only consults the explicit `incompatible_generators`
//! list; the `requires_*` flags are descriptive. Unknown algorithm keys fail
//! closed.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::generators::GeneratorType;

/// Graph algorithms that consume generated topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum GraphAlgorithm {
    BellmanFord,
    PrimMst,
    TopologicalSort,
    Bfs,
    Dfs,
    Greedy,
    Dijkstra,
}

impl GraphAlgorithm {
    pub const ALL: [GraphAlgorithm; 7] = [
        GraphAlgorithm::BellmanFord,
        GraphAlgorithm::PrimMst,
        GraphAlgorithm::TopologicalSort,
        GraphAlgorithm::Bfs,
        GraphAlgorithm::Dfs,
        GraphAlgorithm::Greedy,
        GraphAlgorithm::Dijkstra,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            GraphAlgorithm::BellmanFord => "bellman-ford",
            GraphAlgorithm::PrimMst => "prim-mst",
            GraphAlgorithm::TopologicalSort => "topological-sort",
            GraphAlgorithm::Bfs => "bfs",
            GraphAlgorithm::Dfs => "dfs",
            GraphAlgorithm::Greedy => "greedy",
            GraphAlgorithm::Dijkstra => "dijkstra",
        }
    }

    pub fn requirements(&self) -> &'static AlgorithmRequirements {
        // REQUIREMENTS is laid out in discriminant order.
        &REQUIREMENTS[*self as usize]
    }

    pub fn supports_targets(&self) -> bool {
        self.requirements().supports_targets
    }

    /// Generator a caller should default to for this algorithm.
    pub const fn optimal_generator(&self) -> GeneratorType {
        match self {
            GraphAlgorithm::BellmanFord | GraphAlgorithm::PrimMst => GeneratorType::WeightedRandom,
            GraphAlgorithm::TopologicalSort => GeneratorType::Dag,
            GraphAlgorithm::Bfs | GraphAlgorithm::Dfs => GeneratorType::Tree,
            GraphAlgorithm::Greedy | GraphAlgorithm::Dijkstra => GeneratorType::Complete,
        }
    }
}

impl fmt::Display for GraphAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GraphAlgorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// Static requirements of one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlgorithmRequirements {
    pub algorithm: GraphAlgorithm,
    pub requires_directed: bool,
    pub requires_weighted: bool,
    pub requires_acyclic: bool,
    pub requires_connected: bool,
    pub supports_targets: bool,
    pub incompatible_generators: &'static [GeneratorType],
}

impl AlgorithmRequirements {
    const fn base(algorithm: GraphAlgorithm) -> Self {
        Self {
            algorithm,
            requires_directed: false,
            requires_weighted: false,
            requires_acyclic: false,
            requires_connected: false,
            supports_targets: false,
            incompatible_generators: &[],
        }
    }

    pub fn is_compatible_with(&self, generator: GeneratorType) -> bool {
        !self.incompatible_generators.contains(&generator)
    }
}

/// Requirements table in declaration order.
pub static REQUIREMENTS: [AlgorithmRequirements; 7] = [
    AlgorithmRequirements {
        requires_directed: true,
        requires_weighted: true,
        incompatible_generators: &[GeneratorType::Tree, GeneratorType::Complete],
        ..AlgorithmRequirements::base(GraphAlgorithm::BellmanFord)
    },
    AlgorithmRequirements {
        requires_weighted: true,
        requires_connected: true,
        incompatible_generators: &[GeneratorType::Dag],
        ..AlgorithmRequirements::base(GraphAlgorithm::PrimMst)
    },
    AlgorithmRequirements {
        requires_directed: true,
        requires_acyclic: true,
        incompatible_generators: &[GeneratorType::Tree, GeneratorType::Complete, GeneratorType::WeightedRandom],
        ..AlgorithmRequirements::base(GraphAlgorithm::TopologicalSort)
    },
    AlgorithmRequirements {
        supports_targets: true,
        ..AlgorithmRequirements::base(GraphAlgorithm::Bfs)
    },
    AlgorithmRequirements {
        supports_targets: true,
        ..AlgorithmRequirements::base(GraphAlgorithm::Dfs)
    },
    AlgorithmRequirements {
        supports_targets: true,
        ..AlgorithmRequirements::base(GraphAlgorithm::Greedy)
    },
    AlgorithmRequirements {
        requires_weighted: true,
        supports_targets: true,
        incompatible_generators: &[GeneratorType::Dag],
        ..AlgorithmRequirements::base(GraphAlgorithm::Dijkstra)
    },
];

/// Outcome of a compatibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Compatibility {
    pub compatible: bool,
    pub reason: Option<String>,
}

impl Compatibility {
    fn ok() -> Self {
        Self { compatible: true, reason: None }
    }

    fn rejected(reason: String) -> Self {
        Self { compatible: false, reason: Some(reason) }
    }
}

/// Check an algorithm key against a generator. Unknown keys are rejected.
pub fn check_compatibility(algorithm: &str, generator: GeneratorType) -> Compatibility {
    let Ok(algo) = algorithm.parse::<GraphAlgorithm>() else {
        return Compatibility::rejected("Unknown algorithm".to_string());
    };
    if algo.requirements().is_compatible_with(generator) {
        Compatibility::ok()
    } else {
        Compatibility::rejected(format!("{generator} graphs are incompatible with {algo}"))
    }
}

/// [`check_compatibility`] as a `Result`.
pub fn ensure_compatible(algorithm: &str, generator: GeneratorType) -> Result<GraphAlgorithm> {
    let algo = algorithm.parse::<GraphAlgorithm>()?;
    match check_compatibility(algorithm, generator) {
        Compatibility { compatible: true, .. } => Ok(algo),
        Compatibility { reason, .. } => Err(Error::Incompatible {
            algorithm: algorithm.to_string(),
            generator: generator.to_string(),
            reason: reason.unwrap_or_default(),
        }),
    }
}

/// Generators an algorithm may run on, in [`GeneratorType::ALL`] order.
/// Empty for unknown keys.
pub fn compatible_generators(algorithm: &str) -> Vec<GeneratorType> {
    GeneratorType::ALL
        .into_iter()
        .filter(|g| check_compatibility(algorithm, *g).compatible)
        .collect()
}

/// Algorithms that may run on a generator, in requirements-table order.
pub fn compatible_algorithms(generator: GeneratorType) -> Vec<GraphAlgorithm> {
    REQUIREMENTS
        .iter()
        .filter(|r| r.is_compatible_with(generator))
        .map(|r| r.algorithm)
        .collect()
}
