//! Spherical k-means clustering.
//!
//! k-means over cosine similarity: every input row is L2-normalized so that
//! dot product equals cosine similarity, samples are assigned to the center
//! with the highest dot product, and centers are recomputed as the plain mean
//! of their assigned rows.
//!
//! Two things follow the reference behavior on purpose and are easy to trip
//! over:
//!
//! - Centers are **not** re-normalized after the mean update, so they drift
//!   inside the unit ball between iterations. Similarities against them are
//!   scaled by the center's norm until the next update.
//! - A center that ends an iteration with zero assigned samples keeps its
//!   previous value verbatim. There is no reseeding, so a center can stay
//!   empty for the rest of the fit.
//!
//! For large inputs, [`SphericalKMeans::fit_two_pass`] first stabilizes
//! centers on a random subsample of size `max(2·sqrt(N), 10·K)` before one
//! refinement run over the full data, which amortizes the O(N·K)
//! per-iteration cost.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance;
use crate::error::{ClusterError, Result};

/// Default iteration budget.
pub const DEFAULT_ITERS: usize = 300;
/// Default relative-improvement stopping threshold.
pub const DEFAULT_DELTA: f32 = 0.001;

/// Spherical k-means engine.
///
/// Holds the fitted state (centers, labels, per-sample distances) between
/// calls. Input matrices are row-major flat slices (`num_vectors × dimension`)
/// and are borrowed only for the duration of a fit.
///
/// Not safe for concurrent `fit`/`predict` on the same instance: labels and
/// centers are replaced in place without synchronization.
pub struct SphericalKMeans {
    /// Cluster centers (k x dimension), present once fitted or injected.
    centers: Option<Vec<Vec<f32>>>,
    /// Label per input row from the last fit.
    labels: Vec<usize>,
    /// Cosine distance (`1 - similarity`) per input row from the last fit.
    distances: Vec<f32>,
    dimension: usize,
    k: usize,
    iters: usize,
    delta: f32,
    seed: Option<u64>,
}

impl SphericalKMeans {
    /// Create a new engine for `k` clusters over `dimension`-dim vectors.
    pub fn new(dimension: usize, k: usize) -> Result<Self> {
        if dimension == 0 || k == 0 {
            return Err(ClusterError::InvalidParameter(
                "Dimension and k must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            centers: None,
            labels: Vec::new(),
            distances: Vec::new(),
            dimension,
            k,
            iters: DEFAULT_ITERS,
            delta: DEFAULT_DELTA,
            seed: None,
        })
    }

    /// Configure a deterministic seed for center and subsample draws.
    ///
    /// When set, repeated fits on the same inputs produce identical results.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the iteration budget (default 300).
    #[must_use]
    pub fn with_iters(mut self, iters: usize) -> Self {
        self.iters = iters;
        self
    }

    /// Override the relative-improvement threshold δ (default 0.001).
    ///
    /// The fit stops once an iteration improves average distance by less than
    /// a δ fraction of the previous iteration's average.
    #[must_use]
    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    /// Single-pass fit: sample `k` centers from the input, then iterate over
    /// the full input.
    ///
    /// `vectors` is row-major, `num_vectors × dimension`. Fails before any
    /// state is touched on shape errors or zero-norm rows, so a failed fit
    /// leaves a previous fitted state intact.
    pub fn fit(&mut self, vectors: &[f32], num_vectors: usize) -> Result<()> {
        let normalized = self.validate_and_normalize(vectors, num_vectors)?;
        let mut rng = self.make_rng();

        let mut centers = self.sample_rows(&normalized, num_vectors, self.k, &mut rng);
        let (labels, distances) = self.run_loop(&normalized, num_vectors, &mut centers);

        self.install(centers, labels, distances);
        Ok(())
    }

    /// Two-pass fit: stabilize centers on a random subsample, then refine on
    /// the full input.
    ///
    /// The subsample has `max(2·sqrt(N), 10·K)` rows, drawn uniformly with
    /// replacement (duplicates allowed), independently of the center draw.
    pub fn fit_two_pass(&mut self, vectors: &[f32], num_vectors: usize) -> Result<()> {
        let normalized = self.validate_and_normalize(vectors, num_vectors)?;
        let mut rng = self.make_rng();

        let subsample_size =
            (2.0 * (num_vectors as f64).sqrt()).max((10 * self.k) as f64) as usize;
        let subsample = self
            .sample_rows(&normalized, num_vectors, subsample_size, &mut rng)
            .concat();
        let mut centers = self.sample_rows(&normalized, num_vectors, self.k, &mut rng);

        self.run_loop(&subsample, subsample_size, &mut centers);
        let (labels, distances) = self.run_loop(&normalized, num_vectors, &mut centers);

        self.install(centers, labels, distances);
        Ok(())
    }

    /// Resume-mode fit: iterate from centers previously supplied via
    /// [`set_centers`](Self::set_centers) instead of sampling.
    ///
    /// The injected centers are re-normalized to unit length before the first
    /// iteration. Fails with [`ClusterError::MissingCenters`] when no centers
    /// have been supplied.
    pub fn fit_with_centers(&mut self, vectors: &[f32], num_vectors: usize) -> Result<()> {
        let normalized = self.validate_and_normalize(vectors, num_vectors)?;

        let current = self.centers.as_ref().ok_or(ClusterError::MissingCenters)?;
        let mut centers = Vec::with_capacity(current.len());
        for (i, center) in current.iter().enumerate() {
            let unit = distance::normalize(center)
                .ok_or(ClusterError::DegenerateVector { index: i })?;
            centers.push(unit);
        }

        let (labels, distances) = self.run_loop(&normalized, num_vectors, &mut centers);

        self.install(centers, labels, distances);
        Ok(())
    }

    /// Classify a single vector against the fitted centers.
    ///
    /// Normalizes the query, then returns the index of the center with the
    /// highest dot product (first maximal index on ties). Does not mutate the
    /// fitted state.
    pub fn predict(&self, vector: &[f32]) -> Result<usize> {
        let centers = self.centers.as_ref().ok_or(ClusterError::NoCenters)?;
        if vector.len() != self.dimension {
            return Err(ClusterError::DimensionMismatch {
                input_dim: vector.len(),
                center_dim: self.dimension,
            });
        }
        let query =
            distance::normalize(vector).ok_or(ClusterError::DegenerateVector { index: 0 })?;

        let mut best = 0;
        let mut best_sim = f32::NEG_INFINITY;
        for (idx, center) in centers.iter().enumerate() {
            let sim = distance::dot(&query, center);
            if sim > best_sim {
                best_sim = sim;
                best = idx;
            }
        }
        Ok(best)
    }

    /// Current centers, if any fit or `set_centers` has happened.
    #[must_use]
    pub fn centers(&self) -> Option<&[Vec<f32>]> {
        self.centers.as_deref()
    }

    /// Inject centers, e.g. loaded from a previous run's center files.
    ///
    /// Expects exactly `k` rows of `dimension` components. Centers are stored
    /// as given; `fit_with_centers` normalizes them at fit time.
    pub fn set_centers(&mut self, centers: Vec<Vec<f32>>) -> Result<()> {
        if centers.len() != self.k {
            return Err(ClusterError::InvalidParameter(format!(
                "Expected {} centers, got {}",
                self.k,
                centers.len()
            )));
        }
        for center in &centers {
            if center.len() != self.dimension {
                return Err(ClusterError::DimensionMismatch {
                    input_dim: center.len(),
                    center_dim: self.dimension,
                });
            }
        }
        self.centers = Some(centers);
        Ok(())
    }

    /// Labels from the last fit, in input row order.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Cosine distances to the assigned center from the last fit.
    #[must_use]
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Input dimensionality.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Shape-check the input and return its row-normalized copy.
    ///
    /// All fallible work for a fit happens here, before any state mutation.
    fn validate_and_normalize(&self, vectors: &[f32], num_vectors: usize) -> Result<Vec<f32>> {
        if num_vectors == 0 {
            return Err(ClusterError::InvalidParameter(
                "Input matrix is empty".to_string(),
            ));
        }
        if vectors.len() != num_vectors * self.dimension {
            return Err(ClusterError::InvalidParameter(format!(
                "Expected {} values for {} rows of dimension {}, got {}",
                num_vectors * self.dimension,
                num_vectors,
                self.dimension,
                vectors.len()
            )));
        }
        if num_vectors < self.k {
            return Err(ClusterError::InvalidParameter(format!(
                "Need at least k={} rows for a meaningful fit, got {}",
                self.k, num_vectors
            )));
        }

        distance::normalize_rows(vectors, num_vectors, self.dimension)
            .map_err(|index| ClusterError::DegenerateVector { index })
    }

    /// Assign/update loop. Mutates `centers` in place; returns the final
    /// labels and per-sample distances.
    ///
    /// Assignment takes the FIRST maximal similarity index (strict `>`), so
    /// ties between duplicated centers resolve to the lower index. The stop
    /// rule is skipped on iteration 0 and otherwise triggers BEFORE the
    /// center update when `(1-δ)·prev ≤ avg ≤ prev`.
    fn run_loop(
        &self,
        data: &[f32],
        num_vectors: usize,
        centers: &mut [Vec<f32>],
    ) -> (Vec<usize>, Vec<f32>) {
        let mut labels = vec![0usize; num_vectors];
        let mut distances = vec![0.0f32; num_vectors];
        let mut prev_distance = 0.0f32;

        for iteration in 0..self.iters {
            let mut total = 0.0f64;
            for (i, (label, dist)) in labels.iter_mut().zip(distances.iter_mut()).enumerate() {
                let row = self.row(data, i);
                let mut best = 0;
                let mut best_sim = f32::NEG_INFINITY;
                for (idx, center) in centers.iter().enumerate() {
                    let sim = distance::dot(row, center);
                    if sim > best_sim {
                        best_sim = sim;
                        best = idx;
                    }
                }
                *label = best;
                *dist = 1.0 - best_sim;
                total += f64::from(*dist);
            }
            let avg_distance = (total / num_vectors as f64) as f32;

            if iteration > 0
                && (1.0 - self.delta) * prev_distance <= avg_distance
                && avg_distance <= prev_distance
            {
                break;
            }
            prev_distance = avg_distance;

            let mut sums = vec![vec![0.0f32; self.dimension]; centers.len()];
            let mut counts = vec![0usize; centers.len()];
            for (i, &label) in labels.iter().enumerate() {
                counts[label] += 1;
                for (s, &x) in sums[label].iter_mut().zip(self.row(data, i)) {
                    *s += x;
                }
            }
            for ((center, sum), &count) in centers.iter_mut().zip(&sums).zip(&counts) {
                // Empty cluster: keep the previous center.
                if count > 0 {
                    for (c, &s) in center.iter_mut().zip(sum) {
                        *c = s / count as f32;
                    }
                }
            }
        }

        (labels, distances)
    }

    /// Draw `count` rows uniformly at random, with replacement.
    fn sample_rows(
        &self,
        data: &[f32],
        num_vectors: usize,
        count: usize,
        rng: &mut StdRng,
    ) -> Vec<Vec<f32>> {
        (0..count)
            .map(|_| self.row(data, rng.random_range(0..num_vectors)).to_vec())
            .collect()
    }

    /// Use an explicit seed when configured; otherwise derive one from entropy.
    fn make_rng(&self) -> StdRng {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        StdRng::seed_from_u64(seed)
    }

    /// Get a row from row-major flat storage.
    fn row<'a>(&self, data: &'a [f32], idx: usize) -> &'a [f32] {
        let start = idx * self.dimension;
        &data[start..start + self.dimension]
    }

    fn install(&mut self, centers: Vec<Vec<f32>>, labels: Vec<usize>, distances: Vec<f32>) {
        self.centers = Some(centers);
        self.labels = labels;
        self.distances = distances;
    }
}
