//! Gradient-descent regressions.

use super::{LabeledPoint, Metrics, MlParams, Point};
use crate::step::MlStep;
use crate::stream::{Recorder, StepStream};

pub const LINEAR_LEARNING_RATE: f64 = 0.5;
pub const LINEAR_ITERATIONS: usize = 50;
pub const LOGISTIC_LEARNING_RATE: f64 = 0.5;
pub const LOGISTIC_ITERATIONS: usize = 60;

const LOG_EPSILON: f64 = 1e-15;

fn mse(points: &[Point], slope: f64, intercept: f64) -> f64 {
    let sum: f64 = points.iter().map(|p| (slope * p.x + intercept - p.y).powi(2)).sum();
    sum / points.len() as f64
}

/// Coefficient of determination; 1 when every `y` is equal.
fn r_squared(points: &[Point], slope: f64, intercept: f64) -> f64 {
    let mean = points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64;
    let ss_tot: f64 = points.iter().map(|p| (p.y - mean).powi(2)).sum();
    let ss_res: f64 = points.iter().map(|p| (p.y - (slope * p.x + intercept)).powi(2)).sum();
    if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Fit `y = slope * x + intercept` by full-batch gradient descent on MSE,
/// starting from slope 0 and intercept 0.5.
pub fn linear_regression(points: &[Point], learning_rate: f64, iterations: usize) -> StepStream {
    let mut rec = Recorder::new();
    let (mut slope, mut intercept) = (0.0, 0.5);
    rec.emit(MlStep::Init { params: MlParams::Linear { slope, intercept } });

    if points.is_empty() {
        return rec.finish(MlStep::Done {
            params: MlParams::Linear { slope, intercept },
            metrics: Metrics::default(),
        });
    }

    let n = points.len() as f64;
    for iteration in 1..=iterations {
        let (mut d_slope, mut d_intercept) = (0.0, 0.0);
        for p in points {
            let error = slope * p.x + intercept - p.y;
            d_slope += error * p.x;
            d_intercept += error;
        }
        slope -= learning_rate * (2.0 / n) * d_slope;
        intercept -= learning_rate * (2.0 / n) * d_intercept;

        rec.emit(MlStep::Gradient {
            params: MlParams::Linear { slope, intercept },
            loss: mse(points, slope, intercept),
            iteration,
        });
    }

    rec.finish(MlStep::Done {
        params: MlParams::Linear { slope, intercept },
        metrics: Metrics {
            loss: Some(mse(points, slope, intercept)),
            r2: Some(r_squared(points, slope, intercept)),
            ..Metrics::default()
        },
    })
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn probability(p: &LabeledPoint, weights: [f64; 2], bias: f64) -> f64 {
    sigmoid(weights[0] * p.x + weights[1] * p.y + bias)
}

/// Mean binary cross-entropy with probabilities clipped away from 0 and 1.
fn cross_entropy(points: &[LabeledPoint], weights: [f64; 2], bias: f64) -> f64 {
    let total: f64 = points
        .iter()
        .map(|p| {
            let prob = probability(p, weights, bias).clamp(LOG_EPSILON, 1.0 - LOG_EPSILON);
            let label = f64::from(p.label.min(1));
            -(label * prob.ln() + (1.0 - label) * (1.0 - prob).ln())
        })
        .sum();
    total / points.len() as f64
}

/// Binary logistic regression on labels 0 and 1 (any nonzero label counts
/// as 1), starting from zero weights and bias.
pub fn logistic_regression(points: &[LabeledPoint], learning_rate: f64, iterations: usize) -> StepStream {
    let mut rec = Recorder::new();
    let mut weights = [0.0, 0.0];
    let mut bias = 0.0;
    rec.emit(MlStep::Init { params: MlParams::Logistic { weights, bias } });

    if points.is_empty() {
        return rec.finish(MlStep::Done {
            params: MlParams::Logistic { weights, bias },
            metrics: Metrics::default(),
        });
    }

    let n = points.len() as f64;
    for iteration in 1..=iterations {
        let (mut dw0, mut dw1, mut db) = (0.0, 0.0, 0.0);
        for p in points {
            let error = probability(p, weights, bias) - f64::from(p.label.min(1));
            dw0 += error * p.x;
            dw1 += error * p.y;
            db += error;
        }
        weights[0] -= learning_rate * dw0 / n;
        weights[1] -= learning_rate * dw1 / n;
        bias -= learning_rate * db / n;

        rec.emit(MlStep::Gradient {
            params: MlParams::Logistic { weights, bias },
            loss: cross_entropy(points, weights, bias),
            iteration,
        });
    }

    let correct = points
        .iter()
        .filter(|p| u32::from(probability(p, weights, bias) >= 0.5) == p.label.min(1))
        .count();

    rec.finish(MlStep::Done {
        params: MlParams::Logistic { weights, bias },
        metrics: Metrics {
            loss: Some(cross_entropy(points, weights, bias)),
            accuracy: Some(correct as f64 / n),
            ..Metrics::default()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::data::{binary_classification_data, regression_data};
    use crate::step::Step;

    fn gradient_losses(stream: &StepStream) -> Vec<f64> {
        stream
            .iter()
            .filter_map(|s| match s {
                Step::Ml(MlStep::Gradient { loss, .. }) => Some(*loss),
                _ => None,
            })
            .collect()
    }

    fn metrics(stream: &StepStream) -> Metrics {
        match stream.done() {
            Step::Ml(MlStep::Done { metrics, .. }) => metrics.clone(),
            other => panic!("unexpected terminal step {other:?}"),
        }
    }

    #[test]
    fn linear_loss_decreases() {
        let points = regression_data(50, 0.7, 0.15, 0.1, 42);
        let stream = linear_regression(&points, LINEAR_LEARNING_RATE, LINEAR_ITERATIONS);
        assert_eq!(stream.len(), LINEAR_ITERATIONS + 2);
        let losses = gradient_losses(&stream);
        assert!(losses.last().unwrap() < losses.first().unwrap());
        assert!(metrics(&stream).r2.unwrap() > 0.0);
    }

    #[test]
    fn linear_first_update_matches_formula() {
        // one point at (1, 1): error = 0.5 - 1 = -0.5
        let stream = linear_regression(&[Point::new(1.0, 1.0)], 0.5, 1);
        match stream.get(1) {
            Some(Step::Ml(MlStep::Gradient { params: MlParams::Linear { slope, intercept }, .. })) => {
                assert!((slope - 0.5).abs() < 1e-12);
                assert!((intercept - 1.0).abs() < 1e-12);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn flat_data_has_perfect_r2() {
        let points = [Point::new(0.1, 0.5), Point::new(0.9, 0.5)];
        let stream = linear_regression(&points, 0.5, 3);
        assert_eq!(metrics(&stream).r2, Some(1.0));
    }

    #[test]
    fn empty_inputs_terminate() {
        let stream = linear_regression(&[], 0.5, 50);
        assert_eq!(stream.len(), 2);
        let stream = logistic_regression(&[], 0.5, 60);
        assert_eq!(stream.len(), 2);
        assert_eq!(metrics(&stream), Metrics::default());
    }

    #[test]
    fn logistic_separates_clusters() {
        let points = binary_classification_data(80, 0.15, 42);
        let stream = logistic_regression(&points, LOGISTIC_LEARNING_RATE, LOGISTIC_ITERATIONS);
        let losses = gradient_losses(&stream);
        assert_eq!(losses.len(), LOGISTIC_ITERATIONS);
        assert!(losses.last().unwrap() < &std::f64::consts::LN_2);
        assert!(metrics(&stream).accuracy.unwrap() >= 0.5);
    }
}
