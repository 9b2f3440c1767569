//! Flat exact-scan vector index.
//!
//! Stores one f32 vector per internal document id in a contiguous arena and
//! answers k-nearest queries by scanning every stored vector. Exact by
//! design: the corpus is small and rebuilt wholesale, so approximate search
//! structures are out of scope.

use crate::error::RetrievalError;
use crate::search::ranking::top_k;
use crate::vector::distance::DistanceMetric;

/// Exact nearest-neighbor index over per-document embedding vectors.
///
/// Immutable once built. All vectors share one dimensionality, enforced at
/// construction; `&self` queries are safe under concurrent invocation.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    metric: DistanceMetric,
    /// Contiguous arena: vector for internal id `i` lives at
    /// `data[i * dimension .. (i + 1) * dimension]`.
    data: Vec<f32>,
    count: usize,
}

impl VectorIndex {
    /// Builds an index from vectors in internal-id order.
    ///
    /// Fails with [`RetrievalError::DimensionMismatch`] if any vector's
    /// length differs from the first one's, and with `InvalidArgument` if a
    /// vector is empty or contains non-finite values.
    pub fn build(vectors: Vec<Vec<f32>>, metric: DistanceMetric) -> Result<Self, RetrievalError> {
        let dimension = match vectors.first() {
            Some(v) => v.len(),
            None => {
                return Ok(Self {
                    dimension: 0,
                    metric,
                    data: Vec::new(),
                    count: 0,
                })
            }
        };
        if dimension == 0 {
            return Err(RetrievalError::InvalidArgument(
                "embedding vectors must be non-empty".into(),
            ));
        }

        let count = vectors.len();
        let mut data = Vec::with_capacity(count * dimension);
        for v in &vectors {
            if v.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: v.len(),
                });
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(RetrievalError::InvalidArgument(
                    "embedding contains NaN or Inf".into(),
                ));
            }
            data.extend_from_slice(v);
        }

        Ok(Self {
            dimension,
            metric,
            data,
            count,
        })
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Vector dimensionality (0 if the index is empty).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Finds the `k` nearest stored vectors to `query`.
    ///
    /// Distances are converted to a "higher is better" similarity
    /// `1 / (1 + d)`; results are sorted by descending similarity with ties
    /// broken by ascending internal id. An empty index yields an empty
    /// result, not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>, RetrievalError> {
        if self.count == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let scored = (0..self.count).map(|i| {
            let v = &self.data[i * self.dimension..(i + 1) * self.dimension];
            let d = self.metric.distance(query, v);
            (i as u32, 1.0 / (1.0 + d))
        });
        Ok(top_k(scored, k))
    }
}
