//! Python FFI bindings via PyO3.
//!
//! Exposes the universe, mass functions and the classifier to Python. Subsets
//! cross the boundary as lists of hypothesis names; errors become `ValueError`.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from dst_core import Universe, Classifier
//!
//! universe = Universe(["fear", "surprise", "anger"])
//! eyes = universe.evidence()
//! eyes.add_focal_set(0.6, ["fear", "surprise"])
//! eyes.add_universal_mass()
//!
//! brow = universe.evidence()
//! brow.add_focal_set(0.3, ["fear"])
//! brow.add_universal_mass()
//!
//! combined = eyes.combine(brow)
//! print(combined.belief(["fear"]), combined.plausibility(["fear"]))
//! print(combined.best_match())     # "fear"
//!
//! classifier = Classifier(learning_rate=0.05, minimum_observations=3)
//! eye = classifier.register_feature(18.0)
//! print(classifier.classify(eye, 25.0))   # 0.0–1.0 above baseline
//! ```

#![allow(non_snake_case)]

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::classifier::{Classifier as RustClassifier, ClassifierConfig, FeatureId};
use crate::error::DstError;
use crate::evidence::Evidence as RustEvidence;
use crate::subset::Subset;
use crate::universe::Universe as RustUniverse;

fn to_py_err(e: DstError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ── Universe ─────────────────────────────────────────────────────────────────

/// Frame of discernment: an ordered set of hypothesis names.
#[pyclass(name = "Universe")]
#[derive(Clone)]
pub struct PyUniverse {
    inner: Arc<RustUniverse>,
}

impl PyUniverse {
    fn subset(&self, names: Vec<String>) -> PyResult<Subset> {
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.inner.subset_of(&refs).map_err(to_py_err)
    }
}

#[pymethods]
impl PyUniverse {
    /// Create a universe with the given hypothesis names, in order.
    #[new]
    pub fn new(names: Vec<String>) -> PyResult<Self> {
        let mut universe = RustUniverse::new();
        universe
            .register_all(names.iter().map(String::as_str))
            .map_err(to_py_err)?;
        Ok(Self {
            inner: Arc::new(universe),
        })
    }

    /// Hypothesis names in registration order.
    #[getter]
    pub fn names(&self) -> Vec<String> {
        self.inner.iter().map(|(_, n)| n.to_string()).collect()
    }

    /// Start an empty mass function over this universe.
    pub fn evidence(&self) -> PyEvidence {
        PyEvidence {
            universe: self.clone(),
            inner: self.inner.new_evidence(),
        }
    }

    /// Number of hypotheses.
    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("Universe({:?})", self.names())
    }
}

// ── Evidence ─────────────────────────────────────────────────────────────────

/// A mass function over a universe's hypotheses.
///
/// Build it with `add_focal_set(...)` calls followed by exactly one
/// `add_universal_mass()`, then combine or query.
#[pyclass(name = "Evidence")]
#[derive(Clone)]
pub struct PyEvidence {
    universe: PyUniverse,
    inner: RustEvidence,
}

#[pymethods]
impl PyEvidence {
    /// Record `mass` in (0, 1] against the named hypotheses.
    pub fn add_focal_set(&mut self, mass: f64, names: Vec<String>) -> PyResult<()> {
        let subset = self.universe.subset(names)?;
        self.inner.add_focal_set(mass, subset).map_err(to_py_err)
    }

    /// Put the remaining mass on the whole universe and complete the mass function.
    pub fn add_universal_mass(&mut self) -> PyResult<()> {
        self.inner.add_universal_mass().map_err(to_py_err)
    }

    /// Dempster's rule of combination. Raises ValueError on total conflict or
    /// when the two universes name different hypotheses.
    pub fn combine(&self, other: &PyEvidence) -> PyResult<PyEvidence> {
        let (mine, theirs) = (&self.universe.inner, &other.universe.inner);
        if !Arc::ptr_eq(mine, theirs) && !mine.same_hypotheses(theirs) {
            return Err(to_py_err(DstError::UniverseMismatch));
        }
        let inner = self.inner.combine(&other.inner).map_err(to_py_err)?;
        Ok(PyEvidence {
            universe: self.universe.clone(),
            inner,
        })
    }

    /// Belief in the named set of hypotheses.
    pub fn belief(&self, names: Vec<String>) -> PyResult<f64> {
        let subset = self.universe.subset(names)?;
        self.inner.belief(subset).map_err(to_py_err)
    }

    /// Plausibility of the named set of hypotheses.
    pub fn plausibility(&self, names: Vec<String>) -> PyResult<f64> {
        let subset = self.universe.subset(names)?;
        self.inner.plausibility(subset).map_err(to_py_err)
    }

    /// Name of the single hypothesis with the highest belief.
    pub fn best_match(&self) -> PyResult<String> {
        let id = self.inner.best_match().map_err(to_py_err)?;
        self.universe
            .inner
            .name(id)
            .map(str::to_string)
            .ok_or_else(|| to_py_err(DstError::UnknownHypothesis))
    }

    /// Focal sets as `(names, mass)` pairs.
    pub fn focal_sets(&self) -> Vec<(Vec<String>, f64)> {
        let universe = &self.universe.inner;
        self.inner
            .focal_sets()
            .into_iter()
            .map(|(subset, mass)| {
                let names = subset
                    .iter()
                    .filter_map(|id| universe.name(id))
                    .map(str::to_string)
                    .collect();
                (names, mass)
            })
            .collect()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Evidence(focal_sets={}, complete={})",
            self.inner.focal_count(),
            self.inner.is_complete()
        )
    }
}

// ── Classifier ───────────────────────────────────────────────────────────────

/// Online-learning classifier: scalar reading → signed deviation in [-1, 1].
#[pyclass(name = "Classifier")]
pub struct PyClassifier {
    inner: RustClassifier,
}

#[pymethods]
impl PyClassifier {
    /// Create a classifier.
    ///
    /// Args:
    ///     learning_rate:        EMA weight of each new reading, in [0, 1] (default 0.05)
    ///     minimum_observations: warm-up hint, see `is_warmed_up` (default 3)
    #[new]
    #[pyo3(signature = (learning_rate=0.05, minimum_observations=3))]
    pub fn new(learning_rate: f64, minimum_observations: u32) -> PyResult<Self> {
        let inner = RustClassifier::new(ClassifierConfig {
            learning_rate,
            minimum_observations,
        })
        .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Register a feature seeded with `initial_baseline`. Returns its integer id.
    pub fn register_feature(&mut self, initial_baseline: f64) -> PyResult<usize> {
        self.inner
            .register_feature(initial_baseline)
            .map(FeatureId::index)
            .map_err(to_py_err)
    }

    /// Classify a raw reading for `feature` and update its baseline.
    pub fn classify(&mut self, feature: usize, raw_value: f64) -> PyResult<f64> {
        let id = self.feature_id(feature)?;
        self.inner.classify(id, raw_value).map_err(to_py_err)
    }

    /// Number of readings classified for `feature`.
    pub fn observation_count(&self, feature: usize) -> PyResult<u32> {
        let id = self.feature_id(feature)?;
        self.inner.observation_count(id).map_err(to_py_err)
    }

    /// True once `feature` has at least `minimum_observations` readings.
    pub fn is_warmed_up(&self, feature: usize) -> PyResult<bool> {
        let id = self.feature_id(feature)?;
        self.inner.is_warmed_up(id).map_err(to_py_err)
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "Classifier(learning_rate={}, features={})",
            self.inner.config().learning_rate,
            self.inner.feature_count()
        )
    }
}

impl PyClassifier {
    fn feature_id(&self, feature: usize) -> PyResult<FeatureId> {
        self.inner
            .feature_ids()
            .nth(feature)
            .ok_or_else(|| to_py_err(DstError::UnknownFeature { feature }))
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// dst_core: Python bindings for Dempster-Shafer evidence combination.
#[pymodule]
pub fn dst_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyUniverse>()?;
    m.add_class::<PyEvidence>()?;
    m.add_class::<PyClassifier>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("MAX_HYPOTHESES", crate::subset::MAX_HYPOTHESES)?;
    Ok(())
}
