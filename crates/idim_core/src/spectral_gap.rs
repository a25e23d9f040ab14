//! Spectral-gap intrinsic-dimension estimation.
//!
//! Each point's descending eigenspectrum is split into "signal" and "noise"
//! groups at the largest consecutive gap; the number of signal directions is
//! that point's dimension estimate. The global estimate is the median of the
//! per-point integers, truncated toward zero.

use serde::{Deserialize, Serialize};

use crate::covariance::EigenvalueMatrix;
use crate::error::{IdimError, Result};

/// Global and per-point intrinsic-dimension estimates for one point cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdEstimate {
    pub global_id: usize,
    pub local_ids: Vec<usize>,
}

/// Estimates intrinsic dimension from an N x D eigenvalue matrix.
///
/// Per point: with gaps `gap_j = lambda_j - lambda_{j+1}`, the estimate is
/// `argmax_j(gap_j) + 1`; the first index wins ties, biasing toward the
/// smallest plausible dimension. A single-column spectrum has no gaps and
/// estimates 0. The global estimate is the truncated median of the
/// per-point values.
pub fn estimate_spectral_gap_id(eigenvalues: &EigenvalueMatrix) -> Result<IdEstimate> {
    let n = eigenvalues.n_points();
    let dim = eigenvalues.dim();
    if n == 0 || dim == 0 {
        return Err(IdimError::shape(format!(
            "eigenvalue matrix must be non-empty, got {n}x{dim}"
        )));
    }

    let matrix = eigenvalues.as_matrix();
    let mut local_ids = Vec::with_capacity(n);
    for i in 0..n {
        if dim == 1 {
            local_ids.push(0);
            continue;
        }
        let mut best_gap = f64::NEG_INFINITY;
        let mut best_idx = 0;
        for j in 0..dim - 1 {
            let gap = matrix[(i, j)] - matrix[(i, j + 1)];
            if gap > best_gap {
                best_gap = gap;
                best_idx = j;
            }
        }
        local_ids.push(best_idx + 1);
    }

    let global_id = truncated_median(&local_ids);
    Ok(IdEstimate {
        global_id,
        local_ids,
    })
}

/// Exact median truncated toward zero. For even counts the two middle
/// values are averaged in integer arithmetic, which floors the half-sum the
/// same way an integer cast of the fractional median would.
fn truncated_median(values: &[usize]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::{estimate_spectral_gap_id, truncated_median};
    use crate::covariance::{compute_local_covariance, EigenvalueMatrix};
    use crate::sphere::{add_noise, generate_sphere, PointCloud};
    use nalgebra::DMatrix;

    #[test]
    fn single_column_spectra_estimate_zero() {
        let spectra =
            EigenvalueMatrix::from_rows(&[vec![3.0], vec![0.5], vec![0.0]]).expect("should build");
        let estimate = estimate_spectral_gap_id(&spectra).expect("estimate should compute");
        assert_eq!(estimate.global_id, 0);
        assert_eq!(estimate.local_ids, vec![0, 0, 0]);
    }

    #[test]
    fn largest_gap_sets_the_local_estimate() {
        // Gaps 1.0 then 3.5: the boundary sits after the second eigenvalue.
        let spectra = EigenvalueMatrix::from_rows(&[vec![5.0, 4.0, 0.5]]).expect("should build");
        let estimate = estimate_spectral_gap_id(&spectra).expect("estimate should compute");
        assert_eq!(estimate.local_ids, vec![2]);
        assert_eq!(estimate.global_id, 2);
    }

    #[test]
    fn equal_gaps_pick_the_lowest_index() {
        let spectra = EigenvalueMatrix::from_rows(&[vec![3.0, 2.0, 1.0]]).expect("should build");
        let estimate = estimate_spectral_gap_id(&spectra).expect("estimate should compute");
        assert_eq!(estimate.local_ids, vec![1]);
    }

    #[test]
    fn even_count_median_truncates() {
        assert_eq!(truncated_median(&[1, 2]), 1);
        assert_eq!(truncated_median(&[1, 1, 2, 2]), 1);
        assert_eq!(truncated_median(&[2, 2, 2, 1]), 2);
        assert_eq!(truncated_median(&[0, 1, 2]), 1);
    }

    #[test]
    fn mixed_local_estimates_produce_truncated_global_median() {
        let spectra = EigenvalueMatrix::from_rows(&[
            vec![5.0, 4.0, 0.5], // gaps 1.0, 3.5 -> 2
            vec![3.0, 1.0, 0.5], // gaps 2.0, 0.5 -> 1
        ])
        .expect("should build");
        let estimate = estimate_spectral_gap_id(&spectra).expect("estimate should compute");
        assert_eq!(estimate.local_ids, vec![2, 1]);
        assert_eq!(estimate.global_id, 1);
    }

    #[test]
    fn planar_grid_estimates_dimension_two() {
        // A 5x5 unit grid in the z = 0 plane. Interior 9-neighborhoods are
        // full 3x3 blocks with equal tangential eigenvalues and a vanishing
        // normal one; boundary points see skewed neighborhoods (a known
        // boundary effect the median absorbs).
        let mut rows = Vec::new();
        for x in 0..5 {
            for y in 0..5 {
                rows.push([x as f64, y as f64, 0.0]);
            }
        }
        let data = DMatrix::from_fn(rows.len(), 3, |i, j| rows[i][j]);
        let cloud = PointCloud::from_matrix(data).expect("cloud should build");
        let spectra = compute_local_covariance(&cloud, 9).expect("covariance should compute");
        let estimate = estimate_spectral_gap_id(&spectra).expect("estimate should compute");
        assert_eq!(estimate.global_id, 2);
        for x in 1..4 {
            for y in 1..4 {
                assert_eq!(estimate.local_ids[x * 5 + y], 2, "interior point ({x}, {y})");
            }
        }
    }

    #[test]
    fn clean_sphere_recovers_dimension_two_deterministically() {
        let cloud = generate_sphere(2500, 1.0, 42).expect("sphere should generate");
        let spectra = compute_local_covariance(&cloud, 15).expect("covariance should compute");
        let estimate = estimate_spectral_gap_id(&spectra).expect("estimate should compute");
        assert_eq!(estimate.global_id, 2);

        // Bit-identical rerun of the full pipeline.
        let cloud_again = generate_sphere(2500, 1.0, 42).expect("sphere should generate");
        let spectra_again =
            compute_local_covariance(&cloud_again, 15).expect("covariance should compute");
        let estimate_again =
            estimate_spectral_gap_id(&spectra_again).expect("estimate should compute");
        assert_eq!(spectra.as_matrix(), spectra_again.as_matrix());
        assert_eq!(estimate, estimate_again);
    }

    #[test]
    fn noise_lifts_the_smallest_eigenvalue() {
        // The mechanism behind gap erosion: isotropic noise inflates the
        // normal-direction eigenvalue that is near zero on the clean sphere.
        let clean = generate_sphere(1200, 1.0, 42).expect("sphere should generate");
        let noisy = add_noise(&clean, 0.5, 42).expect("noise should apply");

        let clean_spectra = compute_local_covariance(&clean, 15).expect("covariance");
        let noisy_spectra = compute_local_covariance(&noisy, 15).expect("covariance");

        let clean_min = *clean_spectra
            .mean_spectrum()
            .last()
            .expect("spectrum has components");
        let noisy_min = *noisy_spectra
            .mean_spectrum()
            .last()
            .expect("spectrum has components");

        assert!(clean_min < 1e-3, "clean normal eigenvalue {clean_min} too large");
        assert!(noisy_min > 10.0 * clean_min);
        assert!(noisy_min > 1e-3);
    }

    #[test]
    fn overwhelming_noise_destroys_the_spectral_gap() {
        // Noise comparable to the radius buries the manifold: local
        // neighborhoods turn near-isotropic, the smallest eigenvalue rises
        // to the order of the largest, and the per-point estimates stop
        // agreeing on the surface dimension.
        let clean = generate_sphere(1500, 1.0, 42).expect("sphere should generate");
        let noisy = add_noise(&clean, 2.0, 42).expect("noise should apply");

        let clean_spectra = compute_local_covariance(&clean, 15).expect("covariance");
        let noisy_spectra = compute_local_covariance(&noisy, 15).expect("covariance");

        let clean_mean = clean_spectra.mean_spectrum();
        let noisy_mean = noisy_spectra.mean_spectrum();
        let clean_ratio = clean_mean[2] / clean_mean[0];
        let noisy_ratio = noisy_mean[2] / noisy_mean[0];
        assert!(clean_ratio < 0.01, "clean ratio {clean_ratio} too large");
        assert!(noisy_ratio > 0.05, "noisy ratio {noisy_ratio} too small");
        assert!(noisy_ratio > 10.0 * clean_ratio);

        let clean_estimate =
            estimate_spectral_gap_id(&clean_spectra).expect("estimate should compute");
        let noisy_estimate =
            estimate_spectral_gap_id(&noisy_spectra).expect("estimate should compute");
        assert_eq!(clean_estimate.global_id, 2);
        // Unanimity on 2 is the clean-sphere signature; the drowned cloud
        // no longer shows it.
        assert!(noisy_estimate.local_ids.iter().any(|&id| id != 2));
    }
}
