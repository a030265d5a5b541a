//! Vector similarity functions.
//!
//! Pure Rust implementations without external dependencies. Every cosine
//! value in the workspace goes through [`cosine_with_norms`] so that the
//! materialized matrix and the blocked neighbor search agree bit for bit.

use crate::error::TopicsError;

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity given precomputed norms.
///
/// Returns 0.0 when either norm is zero. The result is clamped to
/// [-1.0, 1.0] to absorb rounding.
pub fn cosine_with_norms(a: &[f32], b: &[f32], norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Calculate cosine similarity between two vectors.
///
/// Returns value in [-1.0, 1.0] where 1.0 = identical direction.
///
/// # Panics
/// Panics if vectors have different dimensions. Batches should be checked
/// with [`check_dimensions`] first.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same dimension");
    cosine_with_norms(a, b, l2_norm(a), l2_norm(b))
}

/// Normalize a vector to unit length in place.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for val in v.iter_mut() {
            *val /= norm;
        }
    }
}

/// Verify that every row has the dimension of the first one.
///
/// Returns the shared dimension, or 0 for an empty batch.
pub fn check_dimensions<V: AsRef<[f32]>>(rows: &[V]) -> Result<usize, TopicsError> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };
    let expected = first.as_ref().len();

    for (index, row) in rows.iter().enumerate() {
        let actual = row.as_ref().len();
        if actual != expected {
            return Err(TopicsError::DimensionMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    Ok(expected)
}

/// Full pairwise cosine similarity matrix.
///
/// The matrix is symmetric; only the upper triangle is computed. The diagonal
/// holds each row's self-similarity (1.0, or 0.0 for zero vectors).
pub fn similarity_matrix<V: AsRef<[f32]>>(rows: &[V]) -> Result<Vec<Vec<f32>>, TopicsError> {
    check_dimensions(rows)?;

    let n = rows.len();
    let norms: Vec<f32> = rows.iter().map(|r| l2_norm(r.as_ref())).collect();
    let mut matrix = vec![vec![0.0f32; n]; n];

    for i in 0..n {
        for j in i..n {
            let sim = cosine_with_norms(rows[i].as_ref(), rows[j].as_ref(), norms[i], norms[j]);
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }

    Ok(matrix)
}

/// Squared Euclidean distance, accumulated in f64.
pub fn squared_distance(a: &[f32], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y;
            d * d
        })
        .sum()
}
