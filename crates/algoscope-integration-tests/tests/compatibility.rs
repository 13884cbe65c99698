//! The run builder agrees with the compatibility table for every pairing.

use algoscope_graph::{check_compatibility, compatible_algorithms, GeneratorType, GraphAlgorithm};
use algoscope_integration_tests::graph_request;
use algoscope_vis::{build, Error};

#[test]
fn build_accepts_exactly_the_compatible_pairings() {
    for algorithm in GraphAlgorithm::ALL {
        for generator in GeneratorType::ALL {
            let check = check_compatibility(algorithm.as_str(), generator);
            let result = build(&graph_request(algorithm.as_str(), generator, 7, 3), 42);
            match result {
                Ok(run) => {
                    assert!(check.compatible, "{algorithm} on {generator} should be refused");
                    assert!(run.stream.done().is_done());
                    assert_eq!(run.stream.iter().filter(|s| s.is_done()).count(), 1);
                }
                Err(Error::Graph(algoscope_graph::Error::Incompatible { reason, .. })) => {
                    assert!(!check.compatible, "{algorithm} on {generator} should run");
                    assert_eq!(Some(reason), check.reason);
                }
                Err(other) => panic!("{algorithm} on {generator}: {other}"),
            }
        }
    }
}

#[test]
fn optimal_generator_is_always_compatible() {
    for algorithm in GraphAlgorithm::ALL {
        let generator = algorithm.optimal_generator();
        assert!(compatible_algorithms(generator).contains(&algorithm), "{algorithm}");
        assert!(build(&graph_request(algorithm.as_str(), generator, 6, 1), 42).is_ok());
    }
}

#[test]
fn unknown_algorithm_is_refused_everywhere() {
    for generator in GeneratorType::ALL {
        assert!(!check_compatibility("bogo-sort", generator).compatible);
        assert!(build(&graph_request("bogo-sort", generator, 4, 0), 42).is_err());
    }
}
