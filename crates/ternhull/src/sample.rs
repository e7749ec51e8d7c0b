//! Synthetic ternary datasets (reproducible via replay tokens).
//!
//! Model
//! - The three pure references at fixed energies, followed by `count` random
//!   compositions with integer atom counts in `0..=max_atoms`.
//! - Energy per atom: linear mix of references, minus a symmetric well
//!   `depth · 3 (x_A x_B + x_B x_C + x_A x_C)`, plus uniform noise in
//!   `[0, noise)`. The noise pushes most entries above the hull.
//! - Determinism: a `(seed, index)` token seeds a single `StdRng`.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::formation::Entry;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// Sampler configuration. Energies in eV/atom.
#[derive(Clone, Copy, Debug)]
pub struct SampleCfg {
    pub count: usize,
    pub max_atoms: u32,
    pub ref_energies: [f64; 3],
    pub depth: f64,
    pub noise: f64,
}

impl Default for SampleCfg {
    fn default() -> Self {
        Self {
            count: 200,
            max_atoms: 8,
            ref_energies: [-4.0, -5.5, -3.2],
            depth: 0.4,
            noise: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleError {
    pub reason: String,
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid sampler params: {}", self.reason)
    }
}

impl std::error::Error for SampleError {}

impl SampleCfg {
    fn validate(&self) -> Result<(), SampleError> {
        let invalid = |reason: &str| {
            Err(SampleError {
                reason: reason.to_string(),
            })
        };
        if self.max_atoms == 0 {
            return invalid("max_atoms must be positive");
        }
        if !self.ref_energies.iter().all(|e| e.is_finite()) {
            return invalid("reference energies must be finite");
        }
        if !(self.depth.is_finite() && self.noise.is_finite() && self.noise >= 0.0) {
            return invalid("depth must be finite and noise finite and non-negative");
        }
        Ok(())
    }
}

/// Draw a dataset: references first (ids `1..=3`), then random entries.
pub fn draw_entries(cfg: SampleCfg, tok: ReplayToken) -> Result<Vec<Entry>, SampleError> {
    cfg.validate()?;
    let mut rng = tok.to_std_rng();
    let mut out = Vec::with_capacity(cfg.count + 3);
    for k in 0..3 {
        let mut counts = [0.0; 3];
        counts[k] = 1.0;
        out.push(Entry::new((k + 1).to_string(), counts, cfg.ref_energies[k]));
    }
    while out.len() < cfg.count + 3 {
        let counts = [(); 3].map(|_| rng.gen_range(0..=cfg.max_atoms) as f64);
        let total: f64 = counts.iter().sum();
        if total == 0.0 {
            continue;
        }
        let x = counts.map(|c| c / total);
        let mix: f64 = x.iter().zip(cfg.ref_energies).map(|(xi, e)| xi * e).sum();
        let well = 3.0 * (x[0] * x[1] + x[1] * x[2] + x[0] * x[2]);
        let energy = mix - cfg.depth * well + cfg.noise * rng.gen::<f64>();
        let id = (out.len() + 1).to_string();
        out.push(Entry::new(id, counts, energy));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::{formation_points, keep_non_positive, reference_states};
    use crate::distance::compute_distances;
    use crate::hull::Hull;

    #[test]
    fn replay_is_deterministic() {
        let tok = ReplayToken { seed: 3, index: 1 };
        let a = draw_entries(SampleCfg::default(), tok).unwrap();
        let b = draw_entries(SampleCfg::default(), tok).unwrap();
        assert_eq!(a, b);
        let c = draw_entries(SampleCfg::default(), ReplayToken { seed: 3, index: 2 }).unwrap();
        assert_ne!(a, c);
        assert_eq!(a.len(), SampleCfg::default().count + 3);
    }

    #[test]
    fn samples_feed_a_valid_hull() {
        let es = draw_entries(SampleCfg::default(), ReplayToken { seed: 42, index: 0 }).unwrap();
        assert_eq!(reference_states(&es).unwrap(), [0, 1, 2]);
        let comps = keep_non_positive(formation_points(&es, [0, 1, 2]).unwrap());
        let pts: Vec<_> = comps.iter().map(|c| c.point()).collect();
        let hull = Hull::build(&pts).unwrap();
        assert!(hull.is_convex_eps(1e-6));
        // all three references are vertices
        assert!((0..3).all(|i| hull.is_vertex(i)));
    }

    #[test]
    fn binary_edge_samples_above_the_hull_are_not_stable() {
        // Seeds 0..100 include datasets whose binary edges hold points above
        // the binary lower hull (e.g. seed 41).
        for seed in 0..100 {
            let es = draw_entries(SampleCfg::default(), ReplayToken { seed, index: 0 }).unwrap();
            let comps = keep_non_positive(formation_points(&es, [0, 1, 2]).unwrap());
            let pts: Vec<_> = comps.iter().map(|c| c.point()).collect();
            let hull = Hull::build(&pts).unwrap();
            let raw = compute_distances(hull.points(), hull.facets());
            for (i, p) in pts.iter().enumerate() {
                let envelope = hull
                    .lower_facets()
                    .filter_map(|f| f.plane.energy_at(p.x, p.y))
                    .fold(f64::NEG_INFINITY, f64::max);
                let gap = p.z - envelope;
                if hull.is_vertex(i) {
                    assert!(gap.abs() < 1e-6, "seed {seed}: vertex {} is {gap} above", comps[i].id);
                } else {
                    assert!(gap > 0.0, "seed {seed}: {} gap {gap}", comps[i].id);
                    assert!((raw[i] - gap).abs() < 1e-6, "seed {seed}: {}", comps[i].id);
                }
            }
        }
    }

    #[test]
    fn rejects_bad_params() {
        let cfg = SampleCfg {
            noise: -1.0,
            ..SampleCfg::default()
        };
        assert!(draw_entries(cfg, ReplayToken { seed: 0, index: 0 }).is_err());
    }
}
