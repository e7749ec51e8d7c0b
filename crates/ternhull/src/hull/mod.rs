//! Convex hull of (composition, energy) points in 3D.
//!
//! Purpose
//! - Produce the triangular facets, their plane equations and the vertex set
//!   that the distance engine consumes.
//!
//! Conventions
//! - Planes follow the Qhull layout `[a, b, c, d]` with outward unit normals,
//!   so interior points evaluate to `<= 0` and `c` is the energy coefficient.
//! - Lower-envelope facets have `c < 0`; the `e = 0` lid of a
//!   formation-energy hull has `c = 1`.
//!
//! Code cross-refs: `Hull`, `Facet`, `Plane`, `crate::distance`

mod quickhull;
mod types;

pub use types::{Facet, Hull, HullError, Plane};
pub(crate) use types::hull_vertices;

#[cfg(test)]
mod tests;
