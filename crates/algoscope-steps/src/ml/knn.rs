//! k-nearest-neighbor classification of one query point or a labeled
//! query set.

use std::collections::BTreeMap;

use super::{LabeledPoint, Metrics, MlParams, Neighbor, Point, VoteCount};
use crate::step::MlStep;
use crate::stream::{Recorder, StepStream};

pub const DEFAULT_K: usize = 3;

/// Emit the distances and the vote for one query; returns the prediction
/// and its confidence.
fn classify(rec: &mut Recorder, data: &[LabeledPoint], query: Point, k: usize) -> (u32, f64) {
    let mut neighbors: Vec<Neighbor> = data
        .iter()
        .map(|p| Neighbor { point: *p, distance: query.distance(&p.point()) })
        .collect();
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    neighbors.truncate(k);
    rec.emit(MlStep::Distances { query, neighbors: neighbors.clone() });

    let mut tally: BTreeMap<u32, usize> = BTreeMap::new();
    for n in &neighbors {
        *tally.entry(n.point.label).or_default() += 1;
    }
    let (prediction, max_votes) = tally
        .iter()
        .fold((0, 0), |best, (&label, &votes)| if votes > best.1 { (label, votes) } else { best });
    let confidence = if k == 0 { 0.0 } else { max_votes as f64 / k as f64 };
    let votes = tally.into_iter().map(|(label, votes)| VoteCount { label, votes }).collect();

    rec.emit(MlStep::Vote { votes, prediction, confidence });
    (prediction, confidence)
}

/// Classify `query` by majority vote of its `k` nearest points. Equal
/// distances keep data order; tied votes go to the lowest label. Confidence
/// is the winning vote count over `k`.
pub fn knn(data: &[LabeledPoint], query: Point, k: usize) -> StepStream {
    let mut rec = Recorder::new();
    let params = MlParams::Knn { k, query };
    rec.emit(MlStep::Init { params: params.clone() });
    let (prediction, confidence) = classify(&mut rec, data, query, k);
    rec.finish(MlStep::Done {
        params,
        metrics: Metrics {
            prediction: Some(prediction),
            confidence: Some(confidence),
            ..Metrics::default()
        },
    })
}

/// Classify every point of `queries` in order and score the predictions
/// against their labels. Accuracy is absent for an empty query set.
pub fn knn_batch(data: &[LabeledPoint], queries: &[LabeledPoint], k: usize) -> StepStream {
    let mut rec = Recorder::new();
    let params = MlParams::KnnBatch { k, queries: queries.to_vec() };
    rec.emit(MlStep::Init { params: params.clone() });

    let mut correct = 0;
    for query in queries {
        let (prediction, _) = classify(&mut rec, data, query.point(), k);
        if prediction == query.label {
            correct += 1;
        }
    }
    let accuracy = (!queries.is_empty()).then(|| correct as f64 / queries.len() as f64);

    rec.finish(MlStep::Done { params, metrics: Metrics { accuracy, ..Metrics::default() } })
}
