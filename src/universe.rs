//! The hypothesis universe (frame of discernment Ω).
//!
//! An append-only registry of named hypotheses. The universe is the only
//! place where names are translated to [`HypothesisId`]s and [`Subset`]s;
//! everything downstream works with the compact bit-vector values.
//!
//! ```rust
//! use dst_core::universe::Universe;
//!
//! let mut universe = Universe::new();
//! universe.register_all(["fear", "surprise", "anger"]).unwrap();
//!
//! let fear_or_surprise = universe.subset_of(&["fear", "surprise"]).unwrap();
//! assert_eq!(fear_or_surprise.len(), 2);
//! assert_eq!(universe.universal_set().bits(), 0b111);
//! ```
//!
//! # Invariants
//! - Capacity is fixed at [`MAX_HYPOTHESES`]; the table lives in a `heapless::Vec`.
//! - Names are unique, so name ↔ id translation is a bijection.
//! - Registered hypotheses are never renamed or removed.

use alloc::string::{String, ToString};

use heapless::Vec as HVec;

use crate::error::{DstError, Result};
use crate::evidence::Evidence;
use crate::subset::{HypothesisId, Subset, MAX_HYPOTHESES};

/// Ordered, append-only table of hypothesis names.
#[derive(Clone, Debug, Default)]
pub struct Universe {
    names: HVec<String, MAX_HYPOTHESES>,
}

impl Universe {
    /// An empty universe.
    pub fn new() -> Self {
        Self { names: HVec::new() }
    }

    /// Register a new hypothesis and return its id.
    ///
    /// Fails with [`DstError::CapacityExceeded`] once [`MAX_HYPOTHESES`] names are
    /// registered, and with [`DstError::DuplicateHypothesis`] if `name` is taken.
    pub fn register(&mut self, name: &str) -> Result<HypothesisId> {
        if self.id_of(name).is_some() {
            return Err(DstError::DuplicateHypothesis);
        }
        let index = self.names.len();
        self.names
            .push(name.to_string())
            .map_err(|_| DstError::CapacityExceeded {
                capacity: MAX_HYPOTHESES,
            })?;
        Ok(HypothesisId::new(index))
    }

    /// Register several hypotheses in order.
    ///
    /// Stops at the first failure; hypotheses registered before it are kept.
    pub fn register_all<'a, I>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.register(name)?;
        }
        Ok(())
    }

    /// Build the subset containing exactly the named hypotheses.
    ///
    /// An empty `names` slice yields [`Subset::EMPTY`]. Any unregistered name
    /// fails the whole call with [`DstError::UnknownHypothesis`].
    pub fn subset_of(&self, names: &[&str]) -> Result<Subset> {
        names.iter().try_fold(Subset::EMPTY, |acc, name| {
            self.id_of(name)
                .map(|id| acc.union(Subset::singleton(id)))
                .ok_or(DstError::UnknownHypothesis)
        })
    }

    /// The singleton `{id}`, checked against this universe.
    pub fn singleton(&self, id: HypothesisId) -> Result<Subset> {
        if id.index() < self.len() {
            Ok(Subset::singleton(id))
        } else {
            Err(DstError::UnknownHypothesis)
        }
    }

    /// Ω: the first `len()` bits set.
    pub fn universal_set(&self) -> Subset {
        Subset::first_n(self.names.len())
    }

    /// Look up the id registered for `name`.
    pub fn id_of(&self, name: &str) -> Option<HypothesisId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(HypothesisId::new)
    }

    /// Display name of a registered hypothesis.
    pub fn name(&self, id: HypothesisId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Number of registered hypotheses.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if nothing is registered yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(id, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (HypothesisId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (HypothesisId::new(i), n.as_str()))
    }

    /// `true` if both universes hold the same names in the same order.
    ///
    /// Mass functions only carry Ω as bits, so this is the check to make
    /// before combining evidence built from two separately created universes.
    pub fn same_hypotheses(&self, other: &Universe) -> bool {
        self.names == other.names
    }

    /// Start a new, empty mass function over this universe's Ω.
    pub fn new_evidence(&self) -> Evidence {
        Evidence::new_empty(self)
    }
}
