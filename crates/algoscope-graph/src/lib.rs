//! Algoscope Graph Layer
//!
//! Canonical graph model, topology synthesis and algorithm compatibility for
//! step-by-step algorithm playback.
//!
//! # Pipeline
//!
//! A graph-family run flows through this crate in a fixed order:
//! 1. [`generate`] builds a [`Graph`] from a seeded [`GeneratorSpec`]
//! 2. [`check_compatibility`] rejects algorithm/topology pairings whose
//!    output would be meaningless (a "topological order" of a cyclic graph)
//! 3. [`to_legacy`] flattens the graph for producers that expect
//!    index-based adjacency
//!
//! Graphs are value objects. The single structural rewrite the pipeline
//! performs, [`orient_for_bellman_ford`], returns a new graph.

mod adapters;
mod error;
mod generators;
mod model;
mod requirements;

pub use adapters::{
    edge_list_to_graph, from_legacy, orient_for_bellman_ford, to_legacy, weighted_edges, LegacyEdge, LegacyNode,
    WeightedEdge,
};
pub use error::{Error, Result};
pub use generators::{
    generate, GeneratorProperties, GeneratorSpec, GeneratorType, CANVAS, CIRCLE_RADIUS, DAG_SKIP_PROBABILITY,
    EDGE_DENSITY, TREE_BRANCHING,
};
pub use model::{Edge, Graph, Node, NodeId, Position};
pub use requirements::{
    check_compatibility, compatible_algorithms, compatible_generators, ensure_compatible, AlgorithmRequirements,
    Compatibility, GraphAlgorithm, REQUIREMENTS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_properties_hold_for_generated_graphs() {
        for kind in GeneratorType::ALL {
            let props = kind.properties();
            let graph = generate(&GeneratorSpec::new(kind, 16).weighted(props.weighted).seed(11));
            if kind == GeneratorType::Custom {
                continue;
            }
            assert_eq!(graph.directed, props.directed, "{kind}");
            assert_eq!(graph.weighted, props.weighted, "{kind}");
            if props.acyclic && props.directed {
                assert_eq!(graph.kahn_order().len(), graph.node_count(), "{kind}");
            }
            if props.connected {
                assert!(graph.is_connected(), "{kind}");
            }
        }
    }

    #[test]
    fn tree_declares_acyclic_connected() {
        let p = GeneratorType::Tree.properties();
        assert!(p.acyclic && p.connected);
        let p = GeneratorType::Dag.properties();
        assert!(p.directed && p.acyclic);
    }
}
