//! Ternary convex hulls and energy above hull.
//!
//! Data flow
//! - `formation`: raw entries → atomic fractions and formation energies.
//! - `hull`: quickhull over `(x_B, x_C, e)` → facets with plane equations.
//! - `distance`: per-point vertical gap to the lower envelope (the core).
//! - `report`: hull-vertex convention, cutoff filter, diagnostics.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; `api`
//!   is the curated surface for the CLI and experiments.

pub mod api;
pub mod cfg;
pub mod distance;
pub mod formation;
pub mod hull;
pub mod report;
pub mod sample;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::DistanceCfg;
pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::DistanceCfg;
    pub use crate::distance::{compute_distances, compute_distances_with, DistancePolicy, NO_DISTANCE};
    pub use crate::hull::{Facet, Hull, HullError, Plane};
    pub use crate::report::{reported_distances, HullReport};
    pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};
}
