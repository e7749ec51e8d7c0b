//! Hull distance engine: vertical energy above the lower hull envelope.
//!
//! Purpose
//! - For every point, the vertical gap (energy units) from the point down to
//!   the lower envelope of the hull facets, i.e. the energy above hull.
//!
//! Algorithm
//! - For each facet plane `(a, b, c, d)` the raw gap is
//!   `Dn = (a·u + b·v + c·e + d) / c = e - e_plane(u, v)`.
//! - The lower envelope is the pointwise max of the lower facet planes, so the
//!   energy above hull is the smallest strictly positive `Dn`. Upper facets
//!   (including the lid) give `Dn <= 0` for interior points and drop out.
//! - Brute force over all (point, facet) pairs: O(P·T). Facet counts stay in
//!   the hundreds to low thousands, so no spatial index.
//!
//! Policies
//! - `LowestPositive` (canonical): the rule above; vertical facets skipped;
//!   sentinel `NO_DISTANCE` when nothing is positive (hull vertices, points
//!   outside the footprint).
//! - `Contained` (legacy parity): hull vertices (same rule as
//!   `Hull::vertices`) get 0; a facet counts only if
//!   the point's nudged composition lies in its projected triangle; the lid
//!   and vertical facets are skipped; the last matching facet wins.
//!
//! Raw output is not the reported value: callers map hull vertices to 0 via
//! `crate::report::reported_distances`.
//!
//! Code cross-refs: `Plane::vertical_gap`, `contain::{triangle_contains,nudge_inward}`

mod contain;

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::cfg::DistanceCfg;
use crate::hull::{hull_vertices, Facet};

pub use contain::{nudge_inward, triangle_contains};

/// Sentinel for "no facet produced a positive gap".
pub const NO_DISTANCE: f64 = f64::INFINITY;

/// Which facet-selection rule to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistancePolicy {
    /// Minimum strictly positive vertical gap over all non-vertical facets.
    #[default]
    LowestPositive,
    /// Gap to the (last) facet whose projected triangle contains the point.
    Contained,
}

impl std::str::FromStr for DistancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowest" | "lowest-positive" => Ok(Self::LowestPositive),
            "contained" => Ok(Self::Contained),
            other => Err(format!(
                "unknown distance policy `{other}` (expected `lowest` or `contained`)"
            )),
        }
    }
}

/// Raw vertical gap from `p` to the plane of `facet`.
#[inline]
pub fn raw_dn(facet: &Facet, p: Vector3<f64>) -> f64 {
    facet.plane.vertical_gap(p)
}

/// Smallest strictly positive gap over non-vertical facets, with the facet index.
///
/// First minimum wins on ties. None if no facet yields `Dn > 0`.
pub fn lowest_positive(p: Vector3<f64>, facets: &[Facet], eps_vertical: f64) -> Option<(f64, usize)> {
    let mut best: Option<(f64, usize)> = None;
    for (t, f) in facets.iter().enumerate() {
        if f.plane.is_vertical(eps_vertical) {
            continue;
        }
        let dn = raw_dn(f, p);
        if dn > 0.0 && best.is_none_or(|(d, _)| dn < d) {
            best = Some((dn, t));
        }
    }
    best
}

/// Distances with the canonical policy and default tolerances.
///
/// One value per point, same order; `NO_DISTANCE` where no facet lies below.
pub fn compute_distances(points: &[Vector3<f64>], facets: &[Facet]) -> Vec<f64> {
    compute_distances_with(points, facets, DistancePolicy::LowestPositive, &DistanceCfg::default())
}

/// Distances under an explicit policy and tolerance set.
pub fn compute_distances_with(
    points: &[Vector3<f64>],
    facets: &[Facet],
    policy: DistancePolicy,
    cfg: &DistanceCfg,
) -> Vec<f64> {
    match policy {
        DistancePolicy::LowestPositive => points
            .iter()
            .enumerate()
            .map(|(i, &p)| lowest_positive_traced(i, p, facets, cfg))
            .collect(),
        DistancePolicy::Contained => {
            let vertices = hull_vertices(facets);
            points
                .iter()
                .enumerate()
                .map(|(i, &p)| contained(i, p, points, facets, &vertices, cfg))
                .collect()
        }
    }
}

/// Same results as `compute_distances_with`, evaluated on the rayon pool.
pub fn compute_distances_par(
    points: &[Vector3<f64>],
    facets: &[Facet],
    policy: DistancePolicy,
    cfg: &DistanceCfg,
) -> Vec<f64> {
    match policy {
        DistancePolicy::LowestPositive => points
            .par_iter()
            .enumerate()
            .map(|(i, &p)| lowest_positive_traced(i, p, facets, cfg))
            .collect(),
        DistancePolicy::Contained => {
            let vertices = hull_vertices(facets);
            points
                .par_iter()
                .enumerate()
                .map(|(i, &p)| contained(i, p, points, facets, &vertices, cfg))
                .collect()
        }
    }
}

fn lowest_positive_traced(i: usize, p: Vector3<f64>, facets: &[Facet], cfg: &DistanceCfg) -> f64 {
    match lowest_positive(p, facets, cfg.eps_vertical) {
        Some((d, t)) => {
            tracing::trace!(point = i, facet = t, distance = d, "lowest_positive");
            d
        }
        None => {
            tracing::trace!(point = i, "no facet below point");
            NO_DISTANCE
        }
    }
}

fn contained(
    i: usize,
    p: Vector3<f64>,
    points: &[Vector3<f64>],
    facets: &[Facet],
    vertices: &[usize],
    cfg: &DistanceCfg,
) -> f64 {
    if vertices.binary_search(&i).is_ok() {
        tracing::trace!(point = i, "already on hull");
        return 0.0;
    }
    let probe = nudge_inward(p.xy(), cfg.tol, cfg.radius);
    let mut distance = 0.0;
    for (t, f) in facets.iter().enumerate() {
        if f.plane.is_lid(cfg.tol) {
            continue;
        }
        if !triangle_contains(f.projected(points), probe, cfg.radius) {
            continue;
        }
        if f.plane.is_vertical(cfg.tol) {
            tracing::trace!(point = i, facet = t, "containing facet is vertical; skipped");
            continue;
        }
        distance = raw_dn(f, p);
        tracing::trace!(point = i, facet = t, distance, "contained");
    }
    distance
}
