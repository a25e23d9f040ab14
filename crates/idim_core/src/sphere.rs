//! Synthetic manifold sampling: uniform point clouds on a 2-sphere and
//! isotropic Gaussian perturbation.

use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

use crate::error::{IdimError, Result};

/// Embedding dimension of the sphere sampler: S^2 lives in R^3.
pub const EMBEDDING_DIM: usize = 3;

/// An ordered sequence of points in R^D. Row i of the backing matrix is
/// point i; a point's identity is its index. Clouds are immutable once
/// produced; `add_noise` derives a new, independent cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    data: DMatrix<f64>,
}

impl PointCloud {
    /// Wraps an N x D matrix of points. Rejects empty matrices.
    pub fn from_matrix(data: DMatrix<f64>) -> Result<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(IdimError::shape(format!(
                "point cloud must be non-empty, got {}x{}",
                data.nrows(),
                data.ncols()
            )));
        }
        Ok(Self { data })
    }

    pub fn n_points(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.data
    }
}

/// Samples `n_points` uniformly on the surface of a 2-sphere of the given
/// radius: each point is an isotropic standard-normal draw normalized to
/// unit length and scaled. Spherical symmetry of the Gaussian makes the
/// projection uniform. Deterministic for a given `seed`.
pub fn generate_sphere(n_points: usize, radius: f64, seed: u64) -> Result<PointCloud> {
    if n_points == 0 {
        return Err(IdimError::invalid("n_points must be at least 1"));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(IdimError::invalid(format!(
            "radius must be positive and finite, got {radius}"
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = DMatrix::zeros(n_points, EMBEDDING_DIM);
    for i in 0..n_points {
        loop {
            let draw: [f64; EMBEDDING_DIM] = [
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
            ];
            let norm = draw.iter().map(|v| v * v).sum::<f64>().sqrt();
            // A zero-norm draw cannot be projected onto the sphere; redraw.
            if norm > 0.0 {
                for (j, v) in draw.iter().enumerate() {
                    data[(i, j)] = radius * v / norm;
                }
                break;
            }
        }
    }
    PointCloud::from_matrix(data)
}

/// Perturbs every coordinate independently with zero-mean Gaussian noise of
/// standard deviation `sigma`. `sigma <= 0` returns an independent copy of
/// the input; the caller never observes shared storage.
pub fn add_noise(cloud: &PointCloud, sigma: f64, seed: u64) -> Result<PointCloud> {
    if !sigma.is_finite() {
        return Err(IdimError::invalid(format!(
            "sigma must be finite, got {sigma}"
        )));
    }
    if sigma <= 0.0 {
        return Ok(cloud.clone());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma)
        .map_err(|e| IdimError::invalid(format!("cannot build noise distribution: {e}")))?;
    let mut data = cloud.as_matrix().clone();
    for value in data.iter_mut() {
        *value += noise.sample(&mut rng);
    }
    PointCloud::from_matrix(data)
}
