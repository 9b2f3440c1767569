//! Distance metrics for exact vector search.
//!
//! All metrics return a distance where **lower is better**. The corpus is
//! small and fully in-memory, so distances are computed exactly in f32 with
//! no quantization.

use serde::{Deserialize, Serialize};

/// Distance metric used for vector similarity computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Squared Euclidean distance (L2²). Range: \[0, ∞). The default.
    SquaredEuclidean,
    /// Cosine distance: `1 - cosine_similarity`. Range: \[0, 2\].
    Cosine,
}

impl Default for DistanceMetric {
    fn default() -> Self {
        DistanceMetric::SquaredEuclidean
    }
}

impl DistanceMetric {
    /// Compute the distance between two equal-length vectors.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::SquaredEuclidean => euclidean_sq(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }
}

fn euclidean_sq(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_sq_identical_is_zero() {
        let v = [1.0, 2.0, 3.0];
        assert_eq!(DistanceMetric::SquaredEuclidean.distance(&v, &v), 0.0);
    }

    #[test]
    fn test_euclidean_sq() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert!((DistanceMetric::SquaredEuclidean.distance(&a, &b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!((DistanceMetric::Cosine.distance(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_parallel_is_zero() {
        let a = [1.0, 1.0];
        let b = [2.0, 2.0];
        assert!(DistanceMetric::Cosine.distance(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = [0.0, 0.0];
        let b = [1.0, 1.0];
        // Zero vectors have undefined angle; treated as maximally distant.
        assert!((DistanceMetric::Cosine.distance(&a, &b) - 1.0).abs() < 1e-6);
    }
}
