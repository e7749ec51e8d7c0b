//! Tolerance defaults for hull construction and distance queries.
//!
//! Policy
//! - Defaults are fixed constants so call sites do not juggle epsilons.
//!   `DistanceCfg` groups the ones a caller may reasonably want to override
//!   (the CLI exposes `--tol`).

/// Relative visibility threshold for quickhull; multiplied by the input extent.
pub(crate) const HULL_EPS: f64 = 1e-10;
/// Normals closer than this (cross/triple product) count as the same plane
/// when deciding which facet corners are hull vertices.
pub(crate) const COPLANAR_EPS: f64 = 1e-9;
/// Facets with `|c|` below this are parallel to the energy axis and skipped.
pub const VERTICAL_EPS: f64 = 1e-6;
/// Boundary/lid detection tolerance for the containment policy.
pub const BOUNDARY_TOL: f64 = 1e-6;
/// Inclusion radius of the projected-triangle test; also the inward nudge.
pub const INCLUSION_RADIUS: f64 = 1e-6;
/// Distances below this on non-vertex points are reported as problematic.
pub const PROBLEM_TOL: f64 = 1e-6;

/// Distance engine configuration (tolerances).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceCfg {
    pub eps_vertical: f64,
    pub tol: f64,
    pub radius: f64,
}

impl Default for DistanceCfg {
    fn default() -> Self {
        Self {
            eps_vertical: VERTICAL_EPS,
            tol: BOUNDARY_TOL,
            radius: INCLUSION_RADIUS,
        }
    }
}

impl DistanceCfg {
    /// Same config with every tolerance set to `tol`.
    pub fn uniform(tol: f64) -> Self {
        Self {
            eps_vertical: tol,
            tol,
            radius: tol,
        }
    }
}
