//! Vector math for spherical k-means.
//!
//! Everything in this crate happens on the unit sphere: input rows are
//! L2-normalized once up front, after which a plain dot product equals cosine
//! similarity. These helpers are the portable hot path the engine runs in its
//! inner loop.
//!
//! ## Important nuance
//!
//! [`cosine_similarity`] is just `dot` and assumes **both** inputs are
//! unit-length. It returns nonsense for unnormalized vectors; normalize first
//! via [`normalize`].

/// Norms below this are treated as zero (vector cannot be normalized).
pub const NORM_EPSILON: f32 = 1e-10;

/// Dot product of two equal-length vectors.
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine similarity for **unit-length** vectors (equivalent to `dot`).
#[inline]
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    dot(a, b)
}

/// Normalize a vector to unit L2 norm.
///
/// Returns `None` when the norm is (numerically) zero; the caller decides how
/// to surface the degenerate row.
#[inline]
#[must_use]
pub fn normalize(v: &[f32]) -> Option<Vec<f32>> {
    let n = norm(v);
    if n < NORM_EPSILON {
        return None;
    }
    Some(v.iter().map(|x| x / n).collect())
}

/// Normalize every row of a row-major `rows × dim` matrix to unit L2 norm.
///
/// Fails on the first zero-norm row, returning its index.
pub fn normalize_rows(data: &[f32], rows: usize, dim: usize) -> Result<Vec<f32>, usize> {
    let mut out = Vec::with_capacity(data.len());
    for i in 0..rows {
        match normalize(&data[i * dim..(i + 1) * dim]) {
            Some(unit) => out.extend_from_slice(&unit),
            None => return Err(i),
        }
    }
    Ok(out)
}
