//! corral: spherical k-means clustering for dense embeddings.
//!
//! Clusters high-dimensional vectors by cosine similarity: rows are
//! L2-normalized onto the unit sphere, so nearest-center assignment is a
//! plain dot-product argmax. This is the usual choice for text embeddings,
//! where direction carries the signal and magnitude mostly reflects document
//! length.
//!
//! - [`kmeans`]: the engine — single-pass fit, a two-pass (sample-then-refine)
//!   driver for large inputs, resume-from-persisted-centers fitting, and a
//!   single-point `predict` path.
//! - [`distance`]: the dot/norm/normalize primitives the loop runs on.
//! - [`store`]: flat-text glue — per-item vector files, delimited files,
//!   cluster membership output, and center persistence for incremental runs.
//!
//! # Practical caveats
//!
//! Centers are plain means of assigned rows and are **not** re-normalized
//! between iterations, so they drift inside the unit ball; and a center that
//! loses all its members keeps its old position rather than being reseeded.
//! Both match the reference behavior this engine is compatible with — see the
//! [`kmeans`] module docs before depending on either.
//!
//! ```
//! use corral::SphericalKMeans;
//!
//! // Four 2-d vectors, two obvious directions.
//! let data: Vec<f32> = vec![
//!     1.0, 0.0, //
//!     0.9, 0.1, //
//!     0.0, 1.0, //
//!     -0.1, 0.9,
//! ];
//! let mut km = SphericalKMeans::new(2, 2)?.with_seed(7);
//! km.fit_two_pass(&data, 4)?;
//! let label = km.predict(&[0.8, 0.05])?;
//! assert!(label < 2);
//! # Ok::<(), corral::ClusterError>(())
//! ```

pub mod distance;
pub mod error;
pub mod kmeans;
pub mod store;

// Re-exports
pub use error::{ClusterError, Result};
pub use kmeans::SphericalKMeans;
