//! Projected-triangle containment for the `Contained` policy.
//!
//! - `triangle_contains`: inclusive test, grown outward by `radius`.
//! - `nudge_inward`: copy of a composition pulled off the simplex boundary so
//!   boundary points do not fall between adjacent triangles numerically.

use nalgebra::Vector2;

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>, p: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ap = p - a;
    ab.x * ap.y - ab.y * ap.x
}

/// True if `p` is inside the triangle or within `radius` of its edge lines.
///
/// Works for either orientation. Degenerate (zero-area) triangles contain
/// nothing.
pub fn triangle_contains(tri: [Vector2<f64>; 3], p: Vector2<f64>, radius: f64) -> bool {
    let area2 = cross(tri[0], tri[1], tri[2]);
    if area2 == 0.0 || !area2.is_finite() {
        return false;
    }
    let sign = area2.signum();
    (0..3).all(|k| {
        let a = tri[k];
        let b = tri[(k + 1) % 3];
        let len = (b - a).norm();
        // signed distance to the edge line, positive on the interior side
        sign * cross(a, b, p) / len >= -radius
    })
}

/// Composition `(u, v)` moved just inside the Gibbs simplex `u, v >= 0, u + v <= 1`.
///
/// - on the `u = 0` edge (with `v > tol`): `u = radius`
/// - on the `v = 0` edge (with `u > tol`): `v = radius`
/// - near the `u + v = 1` edge: both scaled by `1 - radius`
///
/// Only for containment tests; never feed the result into a distance.
pub fn nudge_inward(p: Vector2<f64>, tol: f64, radius: f64) -> Vector2<f64> {
    let mut q = p;
    if p.x < tol && p.y > tol {
        q.x = radius;
    }
    if p.x > tol && p.y < tol {
        q.y = radius;
    }
    if q.x + p.y > 1.0 - tol {
        q *= 1.0 - radius;
    }
    q
}
