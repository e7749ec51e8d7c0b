//! Curated internal API (UNSTABLE).
//!
//! Important
//! - Not a public API. A convenience surface for the CLI, benches and
//!   experiments; breaking changes are allowed.

// Hull construction
pub use crate::hull::{Facet, Hull, HullError, Plane};
// Distance engine
pub use crate::distance::{
    compute_distances, compute_distances_par, compute_distances_with, lowest_positive, raw_dn,
    DistancePolicy, NO_DISTANCE,
};
// Reporting
pub use crate::report::{problematic_points, reported_distances, HullReport, PointReport, ProblemPoint};
// Inputs
pub use crate::formation::{
    formation_points, keep_non_positive, reference_states, Composition, Entry, FormationError,
};
pub use crate::sample::{draw_entries, ReplayToken as SampleReplay, SampleCfg, SampleError};
pub use crate::cfg::DistanceCfg;

use nalgebra::Vector3;

/// Hull plus reported distances for a set of `(u, v, e)` points.
///
/// Pre: at least 4 non-coplanar points.
/// Post: one distance per point; hull vertices at 0.
pub fn energy_above_hull(
    points: &[Vector3<f64>],
    policy: DistancePolicy,
) -> Result<(Hull, Vec<f64>), HullError> {
    let hull = Hull::build(points)?;
    let raw = compute_distances_with(hull.points(), hull.facets(), policy, &DistanceCfg::default());
    let reported = reported_distances(&hull, &raw);
    Ok((hull, reported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn five_point_scenario_end_to_end() {
        let pts = [
            vector![0.0, 0.0, 0.0],
            vector![0.0, 1.0, 0.0],
            vector![1.0, 1.0, 0.0],
            vector![0.2, 0.3, -1.0],
            vector![0.25, 0.4, -0.5],
        ];
        for policy in [DistancePolicy::LowestPositive, DistancePolicy::Contained] {
            let (hull, d) = energy_above_hull(&pts, policy).unwrap();
            assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
            assert_eq!(&d[..4], &[0.0; 4]);
            assert!((d[4] - 5.0 / 14.0).abs() < 1e-9);
        }
    }

    #[test]
    fn too_few_points_is_an_error() {
        let pts = [vector![0.0, 0.0, 0.0], vector![1.0, 0.0, 0.0]];
        assert!(matches!(
            energy_above_hull(&pts, DistancePolicy::default()),
            Err(HullError::InsufficientPoints { got: 2 })
        ));
    }
}
