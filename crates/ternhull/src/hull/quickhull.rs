//! Quickhull in 3D (Barber, Dobkin, Huhdanpaa 1996).
//!
//! Conventions
//! - Input indices are preserved: duplicates and coplanar points are never
//!   reindexed, they simply do not become vertices.
//! - Coplanar facets are not merged; a point that ends up inside a flat side
//!   can remain a facet corner. `Hull` filters those out of its vertex set
//!   (`types::hull_vertices`).
//! - Visibility uses a scale-aware threshold `HULL_EPS * extent`, since the
//!   energy axis (meV) and the composition axes (fractions) differ by orders
//!   of magnitude.
//! - Horizon edges are collected in a `BTreeMap`, so facet order is
//!   deterministic for a given input.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use nalgebra::Vector3;

use super::types::{Facet, Hull, HullError, Plane};
use crate::cfg::HULL_EPS;

#[derive(Clone, Debug)]
struct HullFace {
    vertices: [usize; 3],
    normal: Vector3<f64>,
    // normal · v0
    d: f64,
    outside: Vec<usize>,
    furthest: Option<(usize, f64)>,
    deleted: bool,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, pts: &[Vector3<f64>]) -> Self {
        let p0 = pts[v0];
        let normal = (pts[v1] - p0)
            .cross(&(pts[v2] - p0))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::z);
        Self {
            vertices: [v0, v1, v2],
            normal,
            d: normal.dot(&p0),
            outside: Vec::new(),
            furthest: None,
            deleted: false,
        }
    }

    #[inline]
    fn signed_distance(&self, p: &Vector3<f64>) -> f64 {
        self.normal.dot(p) - self.d
    }

    fn assign(&mut self, idx: usize, dist: f64) {
        self.outside.push(idx);
        if self.furthest.is_none_or(|(_, best)| dist > best) {
            self.furthest = Some((idx, dist));
        }
    }

    fn flip(&mut self) {
        self.vertices.swap(1, 2);
        self.normal = -self.normal;
        self.d = -self.d;
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    fn to_facet(&self) -> Facet {
        Facet::new(self.vertices, Plane::new(self.normal, -self.d))
    }
}

/// Build the convex hull of `points`.
pub(crate) fn quickhull_3d(points: &[Vector3<f64>]) -> Result<Hull, HullError> {
    if points.len() < 4 {
        return Err(HullError::InsufficientPoints { got: points.len() });
    }
    if let Some(index) = points.iter().position(|p| !p.iter().all(|x| x.is_finite())) {
        return Err(HullError::NonFinite { index });
    }
    let eps = HULL_EPS * extent(points).max(1.0);

    let simplex = initial_simplex(points, eps)?;
    let centroid = simplex.iter().map(|&i| points[i]).sum::<Vector3<f64>>() / 4.0;
    let mut faces = initial_faces(&simplex, points, &centroid);

    let mut in_simplex = vec![false; points.len()];
    for &i in &simplex {
        in_simplex[i] = true;
    }
    for idx in (0..points.len()).filter(|&i| !in_simplex[i]) {
        assign_to_first_visible(faces.iter_mut(), idx, &points[idx], eps);
    }

    let max_iterations = 4 * points.len() + 16;
    let mut iterations = 0;
    let mut horizon_map: BTreeMap<(usize, usize), (usize, usize)> = BTreeMap::new();
    loop {
        iterations += 1;
        if iterations > max_iterations {
            return Err(HullError::MaxIterations { iterations });
        }
        let deleted = faces.iter().filter(|f| f.deleted).count();
        if deleted * 10 > faces.len() * 3 {
            faces.retain(|f| !f.deleted);
        }

        let Some((face_idx, apex)) = furthest_outside(&faces) else {
            break;
        };
        let p = points[apex];

        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.deleted && f.signed_distance(&p) > eps)
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            let face = &mut faces[face_idx];
            face.outside.retain(|&q| q != apex);
            face.furthest = None;
            recompute_furthest(face, points);
            continue;
        }

        // Edges seen once among visible faces form the horizon.
        horizon_map.clear();
        for &fi in &visible {
            for (a, b) in faces[fi].edges() {
                let key = (a.min(b), a.max(b));
                match horizon_map.entry(key) {
                    Entry::Vacant(e) => {
                        e.insert((a, b));
                    }
                    Entry::Occupied(e) => {
                        e.remove();
                    }
                }
            }
        }

        let mut orphans = Vec::new();
        for &fi in &visible {
            let face = &mut faces[fi];
            orphans.extend(face.outside.drain(..).filter(|&q| q != apex));
            face.furthest = None;
            face.deleted = true;
        }

        let mut new_faces: Vec<HullFace> = horizon_map
            .values()
            .map(|&(a, b)| {
                let mut f = HullFace::new(a, b, apex, points);
                if f.normal.dot(&(centroid - points[a])) > 0.0 {
                    f.flip();
                }
                f
            })
            .collect();

        for q in orphans {
            let pq = &points[q];
            if !assign_to_first_visible(new_faces.iter_mut(), q, pq, eps) {
                assign_to_first_visible(faces.iter_mut().filter(|f| !f.deleted), q, pq, eps);
            }
        }
        faces.append(&mut new_faces);
    }

    let facets: Vec<Facet> = faces
        .iter()
        .filter(|f| !f.deleted)
        .map(HullFace::to_facet)
        .collect();
    tracing::debug!(
        points = points.len(),
        facets = facets.len(),
        iterations,
        "quickhull_done"
    );
    Ok(Hull::new_unchecked(points.to_vec(), facets))
}

fn extent(points: &[Vector3<f64>]) -> f64 {
    let mut lo = points[0];
    let mut hi = points[0];
    for p in points {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (hi - lo).max()
}

fn assign_to_first_visible<'a>(
    faces: impl Iterator<Item = &'a mut HullFace>,
    idx: usize,
    p: &Vector3<f64>,
    eps: f64,
) -> bool {
    for face in faces {
        let dist = face.signed_distance(p);
        if dist > eps {
            face.assign(idx, dist);
            return true;
        }
    }
    false
}

fn recompute_furthest(face: &mut HullFace, points: &[Vector3<f64>]) {
    let mut best: Option<(usize, f64)> = None;
    for &q in &face.outside {
        let dist = face.signed_distance(&points[q]);
        if best.is_none_or(|(_, b)| dist > b) {
            best = Some((q, dist));
        }
    }
    face.furthest = best;
}

fn furthest_outside(faces: &[HullFace]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (fi, f) in faces.iter().enumerate() {
        if f.deleted {
            continue;
        }
        if let Some((q, dist)) = f.furthest {
            if best.is_none_or(|(_, _, b)| dist > b) {
                best = Some((fi, q, dist));
            }
        }
    }
    best.map(|(fi, q, _)| (fi, q))
}

/// Extreme-point tetrahedron: widest pair, furthest from their line, furthest
/// from their plane.
fn initial_simplex(points: &[Vector3<f64>], eps: f64) -> Result<[usize; 4], HullError> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[2 * axis]][axis] {
                extremes[2 * axis] = i;
            }
            if p[axis] > points[extremes[2 * axis + 1]][axis] {
                extremes[2 * axis + 1] = i;
            }
        }
    }

    let (mut v0, mut v1, mut best) = (0, 0, 0.0);
    for i in 0..6 {
        for j in (i + 1)..6 {
            let dist = (points[extremes[i]] - points[extremes[j]]).norm();
            if dist > best {
                best = dist;
                v0 = extremes[i];
                v1 = extremes[j];
            }
        }
    }
    if best < eps {
        return Err(HullError::degenerate("all points coincide"));
    }

    let dir = (points[v1] - points[v0]) / best;
    let (mut v2, mut best) = (0, 0.0);
    for (i, p) in points.iter().enumerate() {
        let w = p - points[v0];
        let dist = (w - dir * w.dot(&dir)).norm();
        if dist > best {
            best = dist;
            v2 = i;
        }
    }
    if best < eps {
        return Err(HullError::degenerate("all points are collinear"));
    }

    let normal = (points[v1] - points[v0])
        .cross(&(points[v2] - points[v0]))
        .normalize();
    let (mut v3, mut best) = (0, 0.0);
    for (i, p) in points.iter().enumerate() {
        let dist = normal.dot(&(p - points[v0])).abs();
        if dist > best {
            best = dist;
            v3 = i;
        }
    }
    if best < eps {
        return Err(HullError::degenerate("all points are coplanar"));
    }
    Ok([v0, v1, v2, v3])
}

fn initial_faces(
    simplex: &[usize; 4],
    points: &[Vector3<f64>],
    centroid: &Vector3<f64>,
) -> Vec<HullFace> {
    let [v0, v1, v2, v3] = *simplex;
    let mut faces = vec![
        HullFace::new(v0, v1, v2, points),
        HullFace::new(v0, v2, v3, points),
        HullFace::new(v0, v3, v1, points),
        HullFace::new(v1, v3, v2, points),
    ];
    for face in &mut faces {
        // Normals must point away from the interior.
        if face.normal.dot(&(centroid - points[face.vertices[0]])) > 0.0 {
            face.flip();
        }
    }
    faces
}
