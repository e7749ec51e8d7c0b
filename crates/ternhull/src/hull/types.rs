//! Core hull types: plane equations, triangular facets and the hull itself.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::{Vector2, Vector3};

use crate::cfg::{COPLANAR_EPS, VERTICAL_EPS};

/// Supporting plane `normal · x + offset = 0` of a facet.
///
/// Invariants (for planes produced by `Hull::build`):
/// - `normal` is a unit vector pointing out of the hull.
/// - Interior points satisfy `eval(x) <= 0` up to tolerance.
///
/// The coefficient tuple `(a, b, c, d)` is `(normal.x, normal.y, normal.z, offset)`;
/// `c` is the coefficient along the energy axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    #[inline]
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Plane through three points, normal along `(p1 - p0) × (p2 - p0)`.
    /// None if the points are (numerically) collinear.
    pub fn through(p0: Vector3<f64>, p1: Vector3<f64>, p2: Vector3<f64>) -> Option<Self> {
        let n = (p1 - p0).cross(&(p2 - p0));
        let norm = n.norm();
        if !norm.is_finite() || norm <= 0.0 {
            return None;
        }
        let n = n / norm;
        Some(Self::new(n, -n.dot(&p0)))
    }

    #[inline]
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.offset]
    }

    /// Signed plane value `a·u + b·v + c·e + d` (positive = outside).
    #[inline]
    pub fn eval(&self, p: Vector3<f64>) -> f64 {
        self.normal.dot(&p) + self.offset
    }

    /// Vertical gap `(a·u + b·v + c·e + d) / c`.
    ///
    /// Equals `e - e_plane(u, v)`: how far `p` sits above this plane at its own
    /// composition. Zero on the plane. Not finite when `c == 0`; callers screen
    /// with `is_vertical` first.
    #[inline]
    pub fn vertical_gap(&self, p: Vector3<f64>) -> f64 {
        self.eval(p) / self.normal.z
    }

    /// Energy of the plane at composition `(u, v)`, if not vertical.
    pub fn energy_at(&self, u: f64, v: f64) -> Option<f64> {
        if self.normal.z == 0.0 {
            return None;
        }
        Some(-(self.normal.x * u + self.normal.y * v + self.offset) / self.normal.z)
    }

    /// Plane parallel to the energy axis (`|c| < eps`).
    #[inline]
    pub fn is_vertical(&self, eps: f64) -> bool {
        self.normal.z.abs() < eps
    }

    /// The horizontal `e = 0` cap: `a`, `b`, `d` vanish and `|c| ≈ 1`.
    #[inline]
    pub fn is_lid(&self, tol: f64) -> bool {
        self.offset.abs() < tol
            && self.normal.x.abs() < tol
            && self.normal.y.abs() < tol
            && self.normal.z.abs() > 1.0 - tol
    }

    /// Part of the lower envelope (outward normal points down in energy).
    #[inline]
    pub fn is_lower(&self, eps: f64) -> bool {
        self.normal.z < -eps
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.coefficients();
        write!(f, "[{a:.3}, {b:.3}, {c:.3}, {d:.3}]")
    }
}

/// Triangular facet: three point indices plus the supporting plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Facet {
    pub vertices: [usize; 3],
    pub plane: Plane,
}

impl Facet {
    #[inline]
    pub fn new(vertices: [usize; 3], plane: Plane) -> Self {
        Self { vertices, plane }
    }

    /// Facet corners projected onto the composition plane `(u, v)`.
    pub fn projected(&self, points: &[Vector3<f64>]) -> [Vector2<f64>; 3] {
        self.vertices.map(|i| points[i].xy())
    }
}

/// Errors from hull construction.
#[derive(Debug, Clone, PartialEq)]
pub enum HullError {
    InsufficientPoints { got: usize },
    Degenerate { reason: String },
    NonFinite { index: usize },
    IndexOutOfRange { facet: usize, index: usize },
    MaxIterations { iterations: usize },
}

impl HullError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for HullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientPoints { got } => {
                write!(f, "need at least 4 points to build a 3D hull, got {got}")
            }
            Self::Degenerate { reason } => write!(f, "degenerate point cloud: {reason}"),
            Self::NonFinite { index } => write!(f, "point #{index} has a non-finite coordinate"),
            Self::IndexOutOfRange { facet, index } => {
                write!(f, "facet #{facet} references missing point #{index}")
            }
            Self::MaxIterations { iterations } => {
                write!(f, "quickhull did not converge after {iterations} iterations")
            }
        }
    }
}

impl std::error::Error for HullError {}

/// Sorted facet corners that are vertices of the hull proper.
///
/// A corner counts if it touches a lower facet or if the normals of its
/// incident facets span 3D. Coplanar input leaves corners in the interior of
/// a flat region (one normal) or along a straight edge (two normals); those
/// are dropped. Planes must point out of the hull.
pub(crate) fn hull_vertices(facets: &[Facet]) -> Vec<usize> {
    let mut incident: BTreeMap<usize, Vec<Plane>> = BTreeMap::new();
    for f in facets {
        for &v in &f.vertices {
            incident.entry(v).or_default().push(f.plane);
        }
    }
    incident
        .into_iter()
        .filter(|(_, planes)| {
            planes.iter().any(|p| p.is_lower(VERTICAL_EPS)) || spans_space(planes)
        })
        .map(|(v, _)| v)
        .collect()
}

fn spans_space(planes: &[Plane]) -> bool {
    let normals: Vec<Vector3<f64>> = planes
        .iter()
        .filter_map(|p| p.normal.try_normalize(0.0))
        .collect();
    let Some(&first) = normals.first() else {
        return false;
    };
    let Some(axis) = normals
        .iter()
        .map(|n| first.cross(n))
        .find(|c| c.norm() > COPLANAR_EPS)
    else {
        return false;
    };
    normals.iter().any(|n| axis.dot(n).abs() > COPLANAR_EPS)
}

/// Convex hull of a point cloud in (u, v, e) space.
///
/// Invariants:
/// - `points` is the full input, indices are stable.
/// - `vertices` is sorted and is the `hull_vertices` subset of the indices
///   used by `facets`: corners left inside a flat region are not listed.
#[derive(Clone, Debug)]
pub struct Hull {
    points: Vec<Vector3<f64>>,
    facets: Vec<Facet>,
    vertices: Vec<usize>,
}

impl Hull {
    /// Quickhull over `points` (see `quickhull::quickhull_3d`).
    pub fn build(points: &[Vector3<f64>]) -> Result<Self, HullError> {
        super::quickhull::quickhull_3d(points)
    }

    /// Hull from an externally computed triangulation.
    pub fn from_parts(points: Vec<Vector3<f64>>, facets: Vec<Facet>) -> Result<Self, HullError> {
        for (fi, f) in facets.iter().enumerate() {
            if let Some(&index) = f.vertices.iter().find(|&&i| i >= points.len()) {
                return Err(HullError::IndexOutOfRange { facet: fi, index });
            }
        }
        Ok(Self::new_unchecked(points, facets))
    }

    pub(crate) fn new_unchecked(points: Vec<Vector3<f64>>, facets: Vec<Facet>) -> Self {
        let vertices = hull_vertices(&facets);
        Self {
            points,
            facets,
            vertices,
        }
    }

    #[inline]
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    #[inline]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Sorted indices of hull vertices.
    #[inline]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    #[inline]
    pub fn is_vertex(&self, i: usize) -> bool {
        self.vertices.binary_search(&i).is_ok()
    }

    /// Per-point vertex flags, same order as `points()`.
    pub fn vertex_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.points.len()];
        for &v in &self.vertices {
            mask[v] = true;
        }
        mask
    }

    /// Facets of the lower envelope (outward normal points down in energy).
    pub fn lower_facets(&self) -> impl Iterator<Item = &Facet> + '_ {
        self.facets
            .iter()
            .filter(|f| f.plane.is_lower(VERTICAL_EPS))
    }

    /// Check every point against every facet inequality (`eval <= eps`).
    pub fn is_convex_eps(&self, eps: f64) -> bool {
        self.points
            .iter()
            .all(|&p| self.facets.iter().all(|f| f.plane.eval(p) <= eps))
    }
}
