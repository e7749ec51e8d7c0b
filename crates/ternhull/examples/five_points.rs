//! Energy above hull for the five-point reference cloud.
//!
//! Prints the hull vertices, the facet equations, and raw vs reported
//! distances under both policies.

use nalgebra::Vector3;
use ternhull::distance::{compute_distances_with, DistancePolicy};
use ternhull::hull::Hull;
use ternhull::report::reported_distances;
use ternhull::DistanceCfg;

fn main() {
    let points = vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.2, 0.3, -1.0),
        Vector3::new(0.25, 0.4, -0.5),
    ];
    let hull = Hull::build(&points).expect("five points span 3D");
    println!("vertices={:?}", hull.vertices());
    for f in hull.facets() {
        println!("facet={:?} eq={}", f.vertices, f.plane);
    }
    for policy in [DistancePolicy::LowestPositive, DistancePolicy::Contained] {
        let raw = compute_distances_with(hull.points(), hull.facets(), policy, &DistanceCfg::default());
        let reported = reported_distances(&hull, &raw);
        println!("policy={policy:?} raw={raw:?} reported={reported:?}");
    }
}
