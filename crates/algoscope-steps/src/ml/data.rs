//! Seeded synthetic datasets. All coordinates stay inside the unit square.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use super::{LabeledPoint, Point};

/// Noisy samples of `y = slope * x + intercept`, with `y` clamped to `[0, 1]`.
pub fn regression_data(count: usize, slope: f64, intercept: f64, noise: f64, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x: f64 = rng.gen();
            let jitter = (rng.gen::<f64>() - 0.5) * noise * 2.0;
            Point::new(x, (slope * x + intercept + jitter).clamp(0.0, 1.0))
        })
        .collect()
}

/// Labels cycle `0..classes`; each point lands within `separation` of its
/// class center.
pub fn classification_data(count: usize, classes: u32, separation: f64, seed: u64) -> Vec<LabeledPoint> {
    const TWO: [(f64, f64); 2] = [(0.3, 0.3), (0.7, 0.7)];
    const THREE: [(f64, f64); 3] = [(0.25, 0.3), (0.75, 0.3), (0.5, 0.7)];
    let centers: &[(f64, f64)] = if classes <= 2 { &TWO } else { &THREE };
    let classes = classes.max(1);
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let label = i as u32 % classes;
            let (cx, cy) = centers[label as usize % centers.len()];
            let angle = rng.gen::<f64>() * std::f64::consts::TAU;
            let radius = rng.gen::<f64>() * separation;
            LabeledPoint::new(
                (cx + angle.cos() * radius).clamp(0.02, 0.98),
                (cy + angle.sin() * radius).clamp(0.02, 0.98),
                label,
            )
        })
        .collect()
}

/// Two overlapping classes around (0.35, 0.35) and (0.65, 0.65), shuffled.
pub fn binary_classification_data(count: usize, separation: f64, seed: u64) -> Vec<LabeledPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points: Vec<LabeledPoint> = (0..count)
        .map(|i| {
            let label = u32::from(i >= count / 2);
            let base = if label == 0 { 0.35 } else { 0.65 };
            let x = (base + (rng.gen::<f64>() - 0.5) * separation * 3.0).clamp(0.02, 0.98);
            let y = (base + (rng.gen::<f64>() - 0.5) * separation * 3.0).clamp(0.02, 0.98);
            LabeledPoint::new(x, y, label)
        })
        .collect();

    for i in (1..points.len()).rev() {
        let j = rng.gen_range(0..=i);
        points.swap(i, j);
    }
    points
}

pub fn uniform_points(count: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| Point::new(rng.gen(), rng.gen())).collect()
}

/// `k` distinct points drawn from `points` as k-means starting centroids.
pub fn initial_centroids(points: &[Point], k: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let k = k.min(points.len());
    sample(&mut rng, points.len(), k).into_iter().map(|i| points[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_unit_square(x: f64, y: f64) -> bool {
        (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y)
    }

    #[test]
    fn same_seed_same_data() {
        assert_eq!(regression_data(50, 0.7, 0.15, 0.1, 7), regression_data(50, 0.7, 0.15, 0.1, 7));
        assert_eq!(classification_data(60, 2, 0.3, 7), classification_data(60, 2, 0.3, 7));
        assert_ne!(uniform_points(10, 1), uniform_points(10, 2));
    }

    #[test]
    fn everything_in_bounds() {
        assert!(regression_data(100, 0.7, 0.15, 0.1, 3).iter().all(|p| in_unit_square(p.x, p.y)));
        assert!(classification_data(90, 3, 0.3, 3).iter().all(|p| in_unit_square(p.x, p.y) && p.label < 3));
        assert!(uniform_points(100, 3).iter().all(|p| in_unit_square(p.x, p.y)));
    }

    #[test]
    fn binary_classes_are_balanced() {
        let points = binary_classification_data(80, 0.15, 11);
        assert_eq!(points.iter().filter(|p| p.label == 1).count(), 40);
    }

    #[test]
    fn centroids_are_distinct_inputs() {
        let points = uniform_points(20, 5);
        let centroids = initial_centroids(&points, 3, 9);
        assert_eq!(centroids.len(), 3);
        assert!(centroids.iter().all(|c| points.contains(c)));
        assert_eq!(initial_centroids(&points[..2], 3, 9).len(), 2);
    }
}
