//! Formation energies of ternary entries relative to the pure components.
//!
//! Model
//! - An entry has atom counts `(n_A, n_B, n_C)` and an energy per atom `E` (eV).
//! - Reference state of component k: the lowest-energy entry containing only k.
//! - Formation energy: `(E - Σ x_k E_ref_k) · 1000` meV/atom with
//!   `x_k = n_k / Σ n`.
//! - Hull coordinates are `(u, v) = (x_B, x_C)`; `x_A = 1 - u - v`.

use std::fmt;

use nalgebra::Vector3;

/// eV → meV.
pub const MEV_PER_EV: f64 = 1000.0;

/// Raw input row.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: String,
    pub counts: [f64; 3],
    /// Energy per atom (eV).
    pub energy: f64,
}

impl Entry {
    pub fn new(id: impl Into<String>, counts: [f64; 3], energy: f64) -> Self {
        Self {
            id: id.into(),
            counts,
            energy,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Only component `k` present.
    pub fn is_pure(&self, k: usize) -> bool {
        self.counts[k] > 0.0 && (0..3).filter(|&j| j != k).all(|j| self.counts[j] == 0.0)
    }
}

/// Entry mapped to hull coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    pub id: String,
    pub fractions: [f64; 3],
    /// Formation energy (meV/atom).
    pub energy: f64,
}

impl Composition {
    /// `(x_B, x_C, e)`.
    #[inline]
    pub fn point(&self) -> Vector3<f64> {
        Vector3::new(self.fractions[1], self.fractions[2], self.energy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormationError {
    MissingReference { component: usize },
    EmptyComposition { id: String },
    NonFinite { id: String },
}

impl fmt::Display for FormationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReference { component } => {
                write!(f, "no pure entry for component #{component}")
            }
            Self::EmptyComposition { id } => write!(f, "entry `{id}` has no atoms"),
            Self::NonFinite { id } => write!(f, "entry `{id}` has a non-finite value"),
        }
    }
}

impl std::error::Error for FormationError {}

/// Index of the lowest-energy pure entry for each component (first on ties).
pub fn reference_states(entries: &[Entry]) -> Result<[usize; 3], FormationError> {
    let mut refs = [None::<usize>; 3];
    for (k, slot) in refs.iter_mut().enumerate() {
        for (i, e) in entries.iter().enumerate() {
            if e.is_pure(k) && slot.is_none_or(|best| e.energy < entries[best].energy) {
                *slot = Some(i);
            }
        }
    }
    let mut out = [0usize; 3];
    for (k, r) in refs.into_iter().enumerate() {
        out[k] = r.ok_or(FormationError::MissingReference { component: k })?;
    }
    Ok(out)
}

/// Fractions and formation energies of all entries, same order.
pub fn formation_points(
    entries: &[Entry],
    refs: [usize; 3],
) -> Result<Vec<Composition>, FormationError> {
    let e_ref = refs.map(|i| entries[i].energy);
    entries
        .iter()
        .map(|e| {
            if !(e.energy.is_finite() && e.counts.iter().all(|c| c.is_finite())) {
                return Err(FormationError::NonFinite { id: e.id.clone() });
            }
            let total = e.total();
            if total <= 0.0 {
                return Err(FormationError::EmptyComposition { id: e.id.clone() });
            }
            let fractions = e.counts.map(|c| c / total);
            let mix: f64 = fractions.iter().zip(e_ref).map(|(x, er)| x * er).sum();
            Ok(Composition {
                id: e.id.clone(),
                fractions,
                energy: (e.energy - mix) * MEV_PER_EV,
            })
        })
        .collect()
}

/// Entries that can sit on or below the zero-energy lid.
pub fn keep_non_positive(compositions: Vec<Composition>) -> Vec<Composition> {
    compositions.into_iter().filter(|c| c.energy <= 0.0).collect()
}
