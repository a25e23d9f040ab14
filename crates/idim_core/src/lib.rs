//! The `idim_core` crate implements the intrinsic-dimension estimation
//! pipeline: synthetic manifold sampling, per-point local covariance
//! eigenspectra via k-nearest-neighbor neighborhoods, and the spectral-gap
//! rule that turns a sorted eigenvalue vector into an integer dimension
//! estimate.
//!
//! Key components:
//! - **Sphere**: `PointCloud`, uniform sampling on S^2, isotropic Gaussian noise.
//! - **Covariance**: self-inclusive k-NN search, centered local covariance,
//!   symmetric eigen-decomposition, `EigenvalueMatrix`.
//! - **Spectral Gap**: per-point largest-gap estimates and their truncated
//!   median as the global estimate.

pub mod covariance;
pub mod error;
pub mod spectral_gap;
pub mod sphere;

pub use covariance::{compute_local_covariance, EigenvalueMatrix};
pub use error::{IdimError, Result};
pub use spectral_gap::{estimate_spectral_gap_id, IdEstimate};
pub use sphere::{add_noise, generate_sphere, PointCloud};
