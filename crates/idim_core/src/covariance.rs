//! Per-point local covariance eigenspectra.
//!
//! For every point the k nearest neighbors (Euclidean distance, the query
//! point included among the k) are centered and their D x D sample
//! covariance eigen-decomposed. The resulting N x D matrix of descending
//! eigenvalue rows is the input to the spectral-gap estimator.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::error::{IdimError, Result};
use crate::sphere::PointCloud;

/// Negative eigenvalues within this fraction of the largest eigenvalue are
/// treated as round-off from the symmetric eigensolver.
const CLAMP_REL_TOL: f64 = 1e-9;

/// N x D matrix of local covariance eigenspectra; row i holds point i's
/// eigenvalues sorted descending, clamped to be non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvalueMatrix {
    data: DMatrix<f64>,
}

impl EigenvalueMatrix {
    /// Builds a matrix from per-point spectrum rows. All rows must share a
    /// single non-zero length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(IdimError::shape("at least one spectrum row is required"));
        };
        let dim = first.len();
        if dim == 0 {
            return Err(IdimError::shape(
                "spectrum rows must have at least one column",
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(IdimError::shape(format!(
                    "row {i} has length {}, expected {dim}",
                    row.len()
                )));
            }
        }
        let data = DMatrix::from_fn(rows.len(), dim, |i, j| rows[i][j]);
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

    /// Mean eigenvalue per spectrum component across all points.
    pub fn mean_spectrum(&self) -> Vec<f64> {
        self.data.row_mean().iter().copied().collect()
    }

    /// Per-component standard deviation across points (population
    /// convention, dividing by N).
    pub fn std_spectrum(&self) -> Vec<f64> {
        self.data.row_variance().iter().map(|v| v.sqrt()).collect()
    }
}

/// Computes each point's local covariance eigenspectrum from its k nearest
/// neighbors. Row order of the output matches point order of the input.
///
/// The neighbor query deliberately returns the query point itself among the
/// k (it sits at distance zero in its own cloud), so the effective
/// neighborhood is k-1 genuine neighbors. This matches the reference
/// behavior and affects the covariance scale; do not exclude self.
pub fn compute_local_covariance(cloud: &PointCloud, k: usize) -> Result<EigenvalueMatrix> {
    let n = cloud.n_points();
    let dim = cloud.dim();
    if k < 1 || k > n {
        return Err(IdimError::invalid(format!(
            "k must be in [1, {n}], got {k}"
        )));
    }

    let points = cloud.as_matrix();
    let mut spectra = DMatrix::zeros(n, dim);
    let mut roundoff_clamps = 0usize;
    let mut severe_clamps = 0usize;

    for i in 0..n {
        let neighbors = k_nearest(points, i, k);

        let mut block = DMatrix::zeros(k, dim);
        for (r, &idx) in neighbors.iter().enumerate() {
            block.set_row(r, &points.row(idx));
        }
        let mean = block.row_mean();
        for r in 0..k {
            for c in 0..dim {
                block[(r, c)] -= mean[c];
            }
        }

        // Unbiased (k-1) normalization; a singleton neighborhood is already
        // the zero vector, so its covariance is the zero matrix.
        let denom = if k > 1 { (k - 1) as f64 } else { 1.0 };
        let cov = (block.transpose() * &block) / denom;

        let eigen = SymmetricEigen::new(cov);
        let mut values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
        values.sort_unstable_by(|a, b| b.total_cmp(a));

        let largest = values.first().copied().unwrap_or(0.0);
        let tolerance = CLAMP_REL_TOL * largest.max(f64::MIN_POSITIVE);
        for (j, value) in values.iter().enumerate() {
            let mut v = *value;
            if v < 0.0 {
                if v < -tolerance {
                    severe_clamps += 1;
                } else {
                    roundoff_clamps += 1;
                }
                v = 0.0;
            }
            spectra[(i, j)] = v;
        }
    }

    if severe_clamps > 0 {
        log::warn!(
            "clamped {severe_clamps} negative eigenvalues beyond round-off tolerance to zero"
        );
    }
    if roundoff_clamps > 0 {
        log::debug!("clamped {roundoff_clamps} tiny negative eigenvalues to zero");
    }

    Ok(EigenvalueMatrix { data: spectra })
}

/// Brute-force k-nearest-neighbor query over squared Euclidean distance.
/// Returns the k closest indices, the query itself first at distance zero;
/// distance ties break by index for a total order.
fn k_nearest(points: &DMatrix<f64>, query: usize, k: usize) -> Vec<usize> {
    let n = points.nrows();
    let dim = points.ncols();
    let mut by_distance: Vec<(f64, usize)> = Vec::with_capacity(n);
    for j in 0..n {
        let mut dist_sq = 0.0;
        for c in 0..dim {
            let diff = points[(query, c)] - points[(j, c)];
            dist_sq += diff * diff;
        }
        by_distance.push((dist_sq, j));
    }
    by_distance.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    by_distance.truncate(k);
    by_distance.into_iter().map(|(_, j)| j).collect()
}
