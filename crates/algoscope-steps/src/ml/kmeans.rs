//! Lloyd's k-means from given starting centroids.

use super::{Metrics, MlParams, Point};
use crate::step::MlStep;
use crate::stream::{Recorder, StepStream};

pub const MAX_ITERATIONS: usize = 8;

/// Index of the nearest centroid; ties go to the lower index.
fn nearest(point: &Point, centroids: &[Point]) -> usize {
    centroids
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, c)| {
            let d = point.distance_squared(c);
            if d < best.1 {
                (i, d)
            } else {
                best
            }
        })
        .0
}

/// Each iteration assigns every point to its nearest centroid, then moves
/// each centroid to the mean of its points. A centroid with no points stays
/// put. Stops after `max_iterations` or once an assignment repeats.
pub fn kmeans(points: &[Point], initial: &[Point], max_iterations: usize) -> StepStream {
    let mut rec = Recorder::new();
    let k = initial.len();
    let mut centroids = initial.to_vec();
    rec.emit(MlStep::Init {
        params: MlParams::KMeans { k, centroids: centroids.clone() },
    });

    let mut previous: Option<Vec<usize>> = None;
    let mut iterations = 0;
    if k > 0 {
        for iteration in 1..=max_iterations {
            iterations = iteration;
            let assignments: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
            rec.emit(MlStep::Assign { iteration, assignments: assignments.clone() });

            let mut sums = vec![(0.0, 0.0, 0usize); k];
            for (p, &cluster) in points.iter().zip(&assignments) {
                let entry = &mut sums[cluster];
                entry.0 += p.x;
                entry.1 += p.y;
                entry.2 += 1;
            }
            for (centroid, (sx, sy, count)) in centroids.iter_mut().zip(sums) {
                if count > 0 {
                    *centroid = Point::new(sx / count as f64, sy / count as f64);
                }
            }
            rec.emit(MlStep::Update { iteration, centroids: centroids.clone() });

            if previous.as_ref() == Some(&assignments) {
                break;
            }
            previous = Some(assignments);
        }
    }

    let inertia = if k == 0 {
        None
    } else {
        Some(points.iter().map(|p| p.distance_squared(&centroids[nearest(p, &centroids)])).sum())
    };
    rec.finish(MlStep::Done {
        params: MlParams::KMeans { k, centroids },
        metrics: Metrics {
            inertia,
            iterations: Some(iterations),
            ..Metrics::default()
        },
    })
}
