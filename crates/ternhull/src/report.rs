//! Reporting layer on top of raw engine output.
//!
//! - Hull vertices are reported at distance 0, whatever the raw value.
//! - Non-vertex points whose distance is ~0 or not finite are collected as
//!   `ProblemPoint`s (malformed hull, borderline coplanar input, or a point
//!   outside the hull footprint) instead of being printed.
//! - `within(dmax)` is the cutoff filter applied before export.

use nalgebra::Vector2;

use crate::cfg::{DistanceCfg, PROBLEM_TOL};
use crate::distance::{compute_distances_with, nudge_inward, triangle_contains, DistancePolicy};
use crate::hull::Hull;

/// Raw distances with hull vertices forced to 0.
pub fn reported_distances(hull: &Hull, raw: &[f64]) -> Vec<f64> {
    raw.iter()
        .enumerate()
        .map(|(i, &d)| if hull.is_vertex(i) { 0.0 } else { d })
        .collect()
}

/// One output row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointReport {
    pub index: usize,
    /// Reported distance (0 on hull).
    pub distance: f64,
    /// Engine output before the vertex convention.
    pub raw: f64,
    pub on_hull: bool,
}

/// Non-vertex point without a meaningful positive distance.
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemPoint {
    pub index: usize,
    pub composition: Vector2<f64>,
    pub distance: f64,
    /// Facets whose projected triangle contains the (nudged) composition.
    pub containing_facets: Vec<usize>,
}

/// Diagnose non-vertex points with `|distance| < tol` or a non-finite distance.
pub fn problematic_points(
    hull: &Hull,
    distances: &[f64],
    cfg: &DistanceCfg,
    tol: f64,
) -> Vec<ProblemPoint> {
    let points = hull.points();
    distances
        .iter()
        .enumerate()
        .filter(|&(i, d)| !hull.is_vertex(i) && (!d.is_finite() || d.abs() < tol))
        .map(|(i, &distance)| {
            let composition = points[i].xy();
            let probe = nudge_inward(composition, cfg.tol, cfg.radius);
            let containing_facets = hull
                .facets()
                .iter()
                .enumerate()
                .filter(|(_, f)| triangle_contains(f.projected(points), probe, cfg.radius))
                .map(|(t, _)| t)
                .collect();
            ProblemPoint {
                index: i,
                composition,
                distance,
                containing_facets,
            }
        })
        .collect()
}

/// Distances, hull flags and diagnostics for every point of a hull.
#[derive(Clone, Debug)]
pub struct HullReport {
    pub rows: Vec<PointReport>,
    pub problems: Vec<ProblemPoint>,
}

impl HullReport {
    /// Run the engine on `hull` and assemble the report.
    pub fn new(hull: &Hull, policy: DistancePolicy, cfg: &DistanceCfg) -> Self {
        let raw = compute_distances_with(hull.points(), hull.facets(), policy, cfg);
        Self::from_raw(hull, &raw, cfg)
    }

    /// Assemble from precomputed raw distances (e.g. the parallel engine).
    pub fn from_raw(hull: &Hull, raw: &[f64], cfg: &DistanceCfg) -> Self {
        debug_assert_eq!(raw.len(), hull.points().len());
        let reported = reported_distances(hull, raw);
        let rows = reported
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(index, (&distance, &raw))| PointReport {
                index,
                distance,
                raw,
                on_hull: hull.is_vertex(index),
            })
            .collect();
        let problems = problematic_points(hull, &reported, cfg, PROBLEM_TOL);
        if !problems.is_empty() {
            tracing::debug!(count = problems.len(), "problematic points");
        }
        Self { rows, problems }
    }

    /// Rows with `distance <= dmax`. Sentinel rows fail any finite cutoff.
    pub fn within(&self, dmax: f64) -> impl Iterator<Item = &PointReport> + '_ {
        self.rows.iter().filter(move |r| r.distance <= dmax)
    }

    /// Indices of hull vertices.
    pub fn stable(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|r| r.on_hull)
            .map(|r| r.index)
            .collect()
    }
}
