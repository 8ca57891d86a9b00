/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Mass functions and Dempster's rule of combination.
//!
//! An [`Evidence`] is a sparse map from [`Subset`] to mass, bound to the Ω of the
//! universe that created it. It is built in two steps:
//!
//! 1. [`Evidence::add_focal_set`] records explicit masses against non-empty subsets.
//! 2. [`Evidence::add_universal_mass`] assigns whatever is left (`1 − Σ`) to Ω and
//!    completes the mass function.
//!
//! Only completed mass functions can be combined or queried.
//!
//! ```text
//! m₁₂(C) = Σ_{A∩B=C} m₁(A)·m₂(B) / (1 − K)      K = Σ_{A∩B=∅} m₁(A)·m₂(B)
//! Bel(A) = Σ_{B⊆A} m(B)
//! Pl(A)  = Σ_{B∩A≠∅} m(B)
//! ```
//!
//! # Invariants
//! - A completed mass function sums to 1 within [`EPSILON`] and `m(∅) = 0`.
//! - Zero masses are never stored.
//! - `combine` never mutates its operands; it is commutative and associative up
//!   to rounding, so any number of sources can be folded left to right.
//! - `K ≥ 1 − EPSILON` is reported as [`DstError::TotalConflict`], never as NaN.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::{DstError, Result};
use crate::subset::{HypothesisId, Subset};
use crate::universe::Universe;

/// Tolerance for every mass threshold comparison in this module.
pub const EPSILON: f64 = 1e-9;

// ─── Evidence ───────────────────────────────────────────────────────────────

/// A (possibly still incomplete) mass function over a fixed Ω.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "EvidenceRecord", try_from = "EvidenceRecord")
)]
pub struct Evidence {
    /// Frame of discernment this mass function is defined over.
    omega: Subset,
    /// Focal set → mass. Never contains `Subset::EMPTY` or a zero mass.
    masses: HashMap<Subset, f64>,
    /// Sum of masses added through `add_focal_set`.
    assigned: f64,
    /// Set once the remaining mass has been moved onto Ω.
    complete: bool,
}

impl Evidence {
    /// An empty mass function over `universe`'s Ω.
    pub fn new_empty(universe: &Universe) -> Self {
        Self::over(universe.universal_set())
    }

    /// An empty mass function over an explicit frame of discernment.
    pub fn over(omega: Subset) -> Self {
        Self {
            omega,
            masses: HashMap::new(),
            assigned: 0.0,
            complete: false,
        }
    }

    /// The vacuous mass function: all mass on Ω ("don't know").
    ///
    /// Neutral element of [`combine`](Self::combine).
    pub fn vacuous(universe: &Universe) -> Result<Self> {
        let mut e = Self::new_empty(universe);
        e.add_universal_mass()?;
        Ok(e)
    }

    // ── Construction ───────────────────────────────────────────────────────

    /// Record `mass` against `subset`.
    ///
    /// `mass` must be finite and in (0, 1], and the running total of added
    /// masses may not exceed 1. Adding the same subset twice accumulates.
    /// On error nothing is recorded.
    pub fn add_focal_set(&mut self, mass: f64, subset: Subset) -> Result<()> {
        if self.complete {
            return Err(DstError::AlreadyComplete);
        }
        if !mass.is_finite() || mass <= 0.0 || mass > 1.0 {
            return Err(DstError::InvalidMass { mass });
        }
        if subset.is_empty() {
            return Err(DstError::EmptySubset);
        }
        if !subset.is_subset_of(self.omega) {
            return Err(DstError::SubsetOutsideUniverse);
        }
        let total = self.assigned + mass;
        if total > 1.0 + EPSILON {
            return Err(DstError::InvalidMass { mass: total });
        }
        *self.masses.entry(subset).or_insert(0.0) += mass;
        self.assigned += mass;
        Ok(())
    }

    /// Assign `1 − Σ(added masses)` to Ω and complete the mass function.
    ///
    /// Must be called exactly once; a second call fails with
    /// [`DstError::IncompleteMassFunction`]. A universe without hypotheses has no
    /// Ω to carry mass and fails with [`DstError::EmptyUniverse`].
    pub fn add_universal_mass(&mut self) -> Result<()> {
        if self.complete {
            return Err(DstError::IncompleteMassFunction);
        }
        if self.omega.is_empty() {
            return Err(DstError::EmptyUniverse);
        }
        let remaining = 1.0 - self.assigned;
        if remaining > EPSILON {
            *self.masses.entry(self.omega).or_insert(0.0) += remaining;
        }
        self.complete = true;
        Ok(())
    }

    // ── Combination ────────────────────────────────────────────────────────

    /// Dempster's rule of combination. Returns a new, complete mass function.
    ///
    /// Fails with [`DstError::TotalConflict`] when every pair of focal sets is
    /// disjoint (K = 1).
    pub fn combine(&self, other: &Evidence) -> Result<Evidence> {
        let (conflict, mut masses) = self.intersect_products(other)?;
        if conflict >= 1.0 - EPSILON {
            #[cfg(feature = "tracing")]
            tracing::debug!(conflict, "dempster combination undefined: total conflict");
            return Err(DstError::TotalConflict { conflict });
        }

        let norm = 1.0 - conflict;
        for mass in masses.values_mut() {
            *mass /= norm;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(conflict, focal_sets = masses.len(), "combined mass functions");

        Ok(Evidence {
            omega: self.omega,
            masses,
            assigned: 1.0,
            complete: true,
        })
    }

    /// Conflict mass K between two mass functions, without combining them.
    pub fn conflict_with(&self, other: &Evidence) -> Result<f64> {
        self.intersect_products(other).map(|(k, _)| k)
    }

    /// Combine any number of mass functions, left to right.
    ///
    /// Fails with [`DstError::NoEvidence`] on empty input and stops at the first
    /// failing combination.
    pub fn combine_all<'a, I>(evidences: I) -> Result<Evidence>
    where
        I: IntoIterator<Item = &'a Evidence>,
    {
        let mut iter = evidences.into_iter();
        let first = iter.next().ok_or(DstError::NoEvidence)?;
        first.ensure_complete()?;
        iter.try_fold(first.clone(), |acc, next| acc.combine(next))
    }

    /// Unnormalised conjunctive products: `(K, m∩)`.
    fn intersect_products(&self, other: &Evidence) -> Result<(f64, HashMap<Subset, f64>)> {
        self.ensure_complete()?;
        other.ensure_complete()?;
        if self.omega != other.omega {
            return Err(DstError::UniverseMismatch);
        }

        let mut conflict = 0.0;
        let mut products: HashMap<Subset, f64> = HashMap::new();
        for (&a, &ma) in self.masses.iter() {
            for (&b, &mb) in other.masses.iter() {
                let c = a & b;
                let product = ma * mb;
                if c.is_empty() {
                    conflict += product;
                } else if product > 0.0 {
                    // underflowed products never become focal sets
                    *products.entry(c).or_insert(0.0) += product;
                }
            }
        }
        Ok((conflict, products))
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Belief: total mass of focal sets contained in `subset`.
    pub fn belief(&self, subset: Subset) -> Result<f64> {
        self.ensure_complete()?;
        let sum: f64 = self
            .masses
            .iter()
            .filter(|(focal, _)| focal.is_subset_of(subset))
            .map(|(_, m)| m)
            .sum();
        Ok(sum.clamp(0.0, 1.0))
    }

    /// Plausibility: total mass of focal sets that intersect `subset`.
    pub fn plausibility(&self, subset: Subset) -> Result<f64> {
        self.ensure_complete()?;
        let sum: f64 = self
            .masses
            .iter()
            .filter(|(focal, _)| focal.intersects(subset))
            .map(|(_, m)| m)
            .sum();
        Ok(sum.clamp(0.0, 1.0))
    }

    /// The single hypothesis with the highest belief.
    ///
    /// Ties go to the lowest hypothesis index.
    pub fn best_match(&self) -> Result<HypothesisId> {
        if self.omega.is_empty() {
            return Err(DstError::EmptyUniverse);
        }
        self.ensure_complete()?;

        let mut best: Option<(HypothesisId, f64)> = None;
        for id in self.omega.iter() {
            let bel = self.belief(Subset::singleton(id))?;
            match best {
                Some((_, top)) if bel <= top => {}
                _ => best = Some((id, bel)),
            }
        }
        best.map(|(id, _)| id).ok_or(DstError::EmptyUniverse)
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// Mass stored for exactly `subset` (0 if it is not a focal set).
    pub fn mass(&self, subset: Subset) -> f64 {
        self.masses.get(&subset).copied().unwrap_or(0.0)
    }

    /// All focal sets with their masses, ordered by subset bits.
    pub fn focal_sets(&self) -> Vec<(Subset, f64)> {
        let mut entries: Vec<(Subset, f64)> =
            self.masses.iter().map(|(&s, &m)| (s, m)).collect();
        entries.sort_by_key(|(s, _)| *s);
        entries
    }

    /// Number of focal sets.
    pub fn focal_count(&self) -> usize {
        self.masses.len()
    }

    /// Sum of all stored masses (≈ 1 once complete).
    pub fn total_mass(&self) -> f64 {
        self.masses.values().sum()
    }

    /// `true` once [`add_universal_mass`](Self::add_universal_mass) has run, or for
    /// any combination result.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The frame of discernment.
    pub fn omega(&self) -> Subset {
        self.omega
    }

    /// Element-wise mass comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Evidence, tolerance: f64) -> bool {
        self.omega == other.omega
            && self.complete == other.complete
            && self
                .masses
                .keys()
                .chain(other.masses.keys())
                .all(|&s| (self.mass(s) - other.mass(s)).abs() <= tolerance)
    }

    fn ensure_complete(&self) -> Result<()> {
        if self.complete {
            Ok(())
        } else {
            Err(DstError::IncompleteMassFunction)
        }
    }
}

// ─── Serde representation ───────────────────────────────────────────────────

/// Serialisable form of an [`Evidence`]: Ω, completion flag and focal sets.
///
/// Deserialisation re-validates every entry, so a record can never produce a
/// mass function that violates the invariants above.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct EvidenceRecord {
    /// Frame of discernment.
    pub omega: Subset,
    /// Whether the universal mass has been assigned.
    pub complete: bool,
    /// Focal sets ordered by subset bits.
    pub focal_sets: Vec<(Subset, f64)>,
}

#[cfg(feature = "serde")]
impl From<Evidence> for EvidenceRecord {
    fn from(e: Evidence) -> Self {
        Self {
            omega: e.omega,
            complete: e.complete,
            focal_sets: e.focal_sets(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<EvidenceRecord> for Evidence {
    type Error = DstError;

    fn try_from(r: EvidenceRecord) -> Result<Self> {
        let mut masses = HashMap::new();
        let mut total = 0.0;
        for (subset, mass) in r.focal_sets {
            if !mass.is_finite() || mass <= 0.0 || mass > 1.0 + EPSILON {
                return Err(DstError::InvalidMass { mass });
            }
            if subset.is_empty() {
                return Err(DstError::EmptySubset);
            }
            if !subset.is_subset_of(r.omega) {
                return Err(DstError::SubsetOutsideUniverse);
            }
            *masses.entry(subset).or_insert(0.0) += mass;
            total += mass;
        }
        let out_of_range = if r.complete {
            (total - 1.0).abs() > 1e-6
        } else {
            total > 1.0 + EPSILON
        };
        if out_of_range {
            return Err(DstError::InvalidMass { mass: total });
        }
        let assigned = if r.complete {
            1.0
        } else {
            total
        };
        Ok(Self {
            omega: r.omega,
            masses,
            assigned,
            complete: r.complete,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
