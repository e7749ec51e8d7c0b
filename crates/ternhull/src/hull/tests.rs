use super::*;
use nalgebra::{vector, Vector3};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::distance::compute_distances;

fn five_points() -> Vec<Vector3<f64>> {
    vec![
        vector![0.0, 0.0, 0.0],
        vector![0.0, 1.0, 0.0],
        vector![1.0, 1.0, 0.0],
        vector![0.2, 0.3, -1.0],
        vector![0.25, 0.4, -0.5],
    ]
}

#[test]
fn tetrahedron_has_four_facets() {
    let pts = vec![
        vector![0.0, 0.0, 0.0],
        vector![1.0, 0.0, 0.0],
        vector![0.0, 1.0, 0.0],
        vector![0.0, 0.0, 1.0],
    ];
    let hull = Hull::build(&pts).unwrap();
    assert_eq!(hull.facets().len(), 4);
    assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
    assert!(hull.is_convex_eps(1e-12));
}

#[test]
fn cube_triangulates_into_twelve_facets() {
    let mut pts = Vec::new();
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                pts.push(vector![x, y, z]);
            }
        }
    }
    // An interior point must not become a vertex.
    pts.push(vector![0.5, 0.5, 0.5]);
    let hull = Hull::build(&pts).unwrap();
    assert_eq!(hull.facets().len(), 12);
    assert_eq!(hull.vertices(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    assert!(!hull.is_vertex(8));
    assert!(hull.is_convex_eps(1e-12));
}

#[test]
fn planes_are_unit_and_outward() {
    let hull = Hull::build(&five_points()).unwrap();
    let centroid = hull.points().iter().sum::<Vector3<f64>>() / hull.points().len() as f64;
    for f in hull.facets() {
        assert!((f.plane.normal.norm() - 1.0).abs() < 1e-12);
        assert!(f.plane.eval(centroid) < 0.0);
        for &v in &f.vertices {
            assert!(f.plane.eval(hull.points()[v]).abs() < 1e-12);
        }
    }
}

#[test]
fn five_point_hull_vertices_and_lid() {
    let hull = Hull::build(&five_points()).unwrap();
    // (0.25, 0.4, -0.5) sits above the facet through (0,1,0), (1,1,0), (0.2,0.3,-1).
    assert_eq!(hull.vertices(), &[0, 1, 2, 3]);
    assert_eq!(hull.facets().len(), 4);
    assert_eq!(hull.lower_facets().count(), 3);
    let lids: Vec<_> = hull.facets().iter().filter(|f| f.plane.is_lid(1e-9)).collect();
    assert_eq!(lids.len(), 1);
    let mut lid = lids[0].vertices;
    lid.sort_unstable();
    assert_eq!(lid, [0, 1, 2]);
}

#[test]
fn rejects_bad_inputs() {
    let three = vec![vector![0.0, 0.0, 0.0]; 3];
    assert_eq!(
        Hull::build(&three).unwrap_err(),
        HullError::InsufficientPoints { got: 3 }
    );

    let flat = vec![
        vector![0.0, 0.0, 0.0],
        vector![1.0, 0.0, 0.0],
        vector![0.0, 1.0, 0.0],
        vector![0.3, 0.3, 0.0],
    ];
    assert!(matches!(
        Hull::build(&flat),
        Err(HullError::Degenerate { .. })
    ));

    let mut nan = five_points();
    nan[2].z = f64::NAN;
    assert_eq!(
        Hull::build(&nan).unwrap_err(),
        HullError::NonFinite { index: 2 }
    );
}

#[test]
fn from_parts_checks_indices() {
    let pts = five_points();
    let plane = Plane::through(pts[0], pts[1], pts[2]).unwrap();
    let ok = Hull::from_parts(pts.clone(), vec![Facet::new([0, 1, 2], plane)]).unwrap();
    assert_eq!(ok.vertices(), &[0, 1, 2]);
    assert_eq!(ok.vertex_mask(), vec![true, true, true, false, false]);

    let err = Hull::from_parts(pts, vec![Facet::new([0, 1, 9], plane)]).unwrap_err();
    assert_eq!(err, HullError::IndexOutOfRange { facet: 0, index: 9 });
}

#[test]
fn plane_helpers() {
    let p = Plane::through(
        vector![0.0, 0.0, -1.0],
        vector![1.0, 0.0, -1.0],
        vector![0.0, 1.0, 0.0],
    )
    .unwrap();
    // e = v - 1
    let e = p.energy_at(0.3, 0.5).unwrap();
    assert!((e + 0.5).abs() < 1e-12);
    assert!(p.vertical_gap(vector![0.3, 0.5, -0.5]).abs() < 1e-12);
    assert!((p.vertical_gap(vector![0.3, 0.5, 0.25]) - 0.75).abs() < 1e-12);

    let vertical = Plane::new(vector![1.0, 0.0, 0.0], 0.0);
    assert!(vertical.is_vertical(1e-6));
    assert!(vertical.energy_at(0.1, 0.1).is_none());
    assert!(Plane::through(vector![0.0, 0.0, 0.0], vector![1.0, 1.0, 1.0], vector![2.0, 2.0, 2.0]).is_none());
}

/// Zero-energy corners plus every other point of an `n`-grid, binary edges
/// included; about a fifth of the compositions appear twice.
fn grid_cloud(n: usize, seed: u64) -> Vec<Vector3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pts = vec![
        vector![0.0, 0.0, 0.0],
        vector![1.0, 0.0, 0.0],
        vector![0.0, 1.0, 0.0],
    ];
    for i in 0..=n {
        for j in 0..=(n - i) {
            if (i == 0 && j == 0) || i == n || j == n {
                continue;
            }
            let (u, v) = (i as f64 / n as f64, j as f64 / n as f64);
            let copies = if rng.gen_bool(0.2) { 2 } else { 1 };
            for _ in 0..copies {
                pts.push(vector![u, v, -100.0 * rng.gen_range(0.05..1.0_f64)]);
            }
        }
    }
    pts
}

fn lower_envelope(hull: &Hull, p: &Vector3<f64>) -> f64 {
    hull.lower_facets()
        .filter_map(|f| f.plane.energy_at(p.x, p.y))
        .fold(f64::NEG_INFINITY, f64::max)
}

#[test]
fn corners_of_one_flat_region_are_not_vertices() {
    // (0.25, 0, -10) is fanned by facets of the v = 0 side only.
    let pts = vec![
        vector![0.0, 0.0, 0.0],
        vector![1.0, 0.0, 0.0],
        vector![0.5, 0.0, -50.0],
        vector![0.25, 0.0, -10.0],
    ];
    let side = Plane::new(vector![0.0, -1.0, 0.0], 0.0);
    let facets = vec![
        Facet::new([0, 1, 3], side),
        Facet::new([1, 2, 3], side),
        Facet::new([2, 0, 3], side),
    ];
    let hull = Hull::from_parts(pts, facets).unwrap();
    assert!(hull.vertices().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grid_vertices_are_the_lower_envelope(n in 3usize..10, seed in 0u64..100_000) {
        let pts = grid_cloud(n, seed);
        let hull = Hull::build(&pts).unwrap();
        let raw = compute_distances(hull.points(), hull.facets());
        for (i, p) in pts.iter().enumerate() {
            let gap = p.z - lower_envelope(&hull, p);
            if hull.is_vertex(i) {
                if p.z < 0.0 {
                    prop_assert!(
                        hull.lower_facets().any(|f| f.vertices.contains(&i)),
                        "vertex {i} at {:?} touches no lower facet", p
                    );
                    prop_assert!(gap.abs() < 1e-6, "vertex {i} sits {gap} above the envelope");
                }
            } else {
                prop_assert!(gap > 0.0, "point {i} at {:?}: gap {gap}", p);
                prop_assert!((raw[i] - gap).abs() < 1e-6, "point {i}: {} vs {gap}", raw[i]);
            }
        }
    }
}

proptest! {
    #[test]
    fn random_clouds_are_enclosed(
        raw in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0, -200.0f64..0.0), 8..60)
    ) {
        let pts: Vec<Vector3<f64>> = raw.iter().map(|&(u, v, e)| vector![u, v, e]).collect();
        if let Ok(hull) = Hull::build(&pts) {
            // Scale-aware: energies are in the hundreds.
            prop_assert!(hull.is_convex_eps(1e-6));
            for &v in hull.vertices() {
                let on_some = hull.facets().iter().any(|f| f.plane.eval(pts[v]).abs() < 1e-6);
                prop_assert!(on_some);
            }
        }
    }
}
