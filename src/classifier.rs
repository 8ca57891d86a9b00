/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Online-learning feature classifier.
//!
//! Turns a scalar measurement stream into a signed confidence in [-1, 1]: how
//! far the newest reading sits above or below a running baseline for that
//! feature. No training phase; every feature starts from a caller-supplied seed
//! and tracks slow drift through an exponential moving average.
//!
//! ```text
//! deviation = clamp((raw − baseline) / baseline, −1, 1)
//! baseline ← baseline·(1 − α) + raw·α
//! ```
//!
//! # Invariants
//! - The returned value is always finite and in [-1, 1].
//! - A failing call leaves the feature state untouched.
//! - O(1) memory and time per observation; no history is buffered.
//! - Observation counts are diagnostic only. `minimum_observations` is a warm-up
//!   hint for callers; the classifier never suppresses a result on its own.

use alloc::vec::Vec;

use crate::error::{DstError, Result};

// ─── Configuration ──────────────────────────────────────────────────────────

/// Classifier-wide parameters.
///
/// Defaults: learning rate 0.05, warm-up hint of 3 observations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifierConfig {
    /// EMA weight α given to each new observation, in [0.0, 1.0].
    ///
    /// 0.0 freezes every baseline at its seed; 1.0 replaces it with the last reading.
    pub learning_rate: f64,
    /// Number of observations after which a feature counts as warmed up.
    ///
    /// Advisory; see [`Classifier::is_warmed_up`].
    pub minimum_observations: u32,
}

impl ClassifierConfig {
    /// Construct the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        let rate = self.learning_rate;
        if rate.is_finite() && (0.0..=1.0).contains(&rate) {
            Ok(())
        } else {
            Err(DstError::InvalidLearningRate { rate })
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            minimum_observations: 3,
        }
    }
}

// ─── Feature state ──────────────────────────────────────────────────────────

/// Stable handle for a registered feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureId(usize);

impl FeatureId {
    /// Zero-based registration index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct FeatureState {
    baseline: f64,
    observations: u32,
}

// ─── Classifier ─────────────────────────────────────────────────────────────

/// Per-feature running baselines plus the shared [`ClassifierConfig`].
///
/// Owns and mutates its feature table exclusively. Independent observation
/// streams each need their own `Classifier`.
#[derive(Clone, Debug)]
pub struct Classifier {
    config: ClassifierConfig,
    features: Vec<FeatureState>,
}

impl Classifier {
    /// Create a classifier with `config`.
    ///
    /// Fails with [`DstError::InvalidLearningRate`] unless the rate is finite and
    /// within [0, 1].
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            features: Vec::new(),
        })
    }

    /// Create a classifier with [`ClassifierConfig::default`].
    pub fn with_defaults() -> Self {
        Self {
            config: ClassifierConfig::default(),
            features: Vec::new(),
        }
    }

    /// Register a feature seeded with `initial_baseline`.
    ///
    /// A zero seed is accepted, but every `classify` on that feature will fail
    /// with [`DstError::DegenerateBaseline`].
    pub fn register_feature(&mut self, initial_baseline: f64) -> Result<FeatureId> {
        if !initial_baseline.is_finite() {
            return Err(DstError::NonFiniteObservation);
        }
        self.features.push(FeatureState {
            baseline: initial_baseline,
            observations: 0,
        });
        Ok(FeatureId(self.features.len() - 1))
    }

    /// Classify `raw_value` against the feature's baseline, then learn from it.
    ///
    /// Returns the relative deviation clamped to [-1, 1]: 0 at the baseline,
    /// positive above it, negative below it (for a positive baseline).
    pub fn classify(&mut self, feature: FeatureId, raw_value: f64) -> Result<f64> {
        let rate = self.config.learning_rate;
        let state = self
            .features
            .get_mut(feature.0)
            .ok_or(DstError::UnknownFeature { feature: feature.0 })?;
        if !raw_value.is_finite() {
            return Err(DstError::NonFiniteObservation);
        }
        if state.baseline == 0.0 {
            return Err(DstError::DegenerateBaseline { feature: feature.0 });
        }

        let deviation = ((raw_value - state.baseline) / state.baseline).clamp(-1.0, 1.0);

        // baseline·(1 − α) + raw·α, written so an unchanged reading is exact
        let next = state.baseline + rate * (raw_value - state.baseline);
        if !next.is_finite() {
            return Err(DstError::NonFiniteObservation);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            feature = feature.0,
            raw_value,
            deviation,
            baseline = next,
            "classified observation"
        );

        state.baseline = next;
        state.observations = state.observations.saturating_add(1);
        Ok(deviation)
    }

    /// Number of successful classifications recorded for `feature`.
    pub fn observation_count(&self, feature: FeatureId) -> Result<u32> {
        self.state(feature).map(|s| s.observations)
    }

    /// `true` once `feature` has seen at least `minimum_observations` readings.
    pub fn is_warmed_up(&self, feature: FeatureId) -> Result<bool> {
        self.observation_count(feature)
            .map(|n| n >= self.config.minimum_observations)
    }

    /// Ids of all registered features, in registration order.
    pub fn feature_ids(&self) -> impl Iterator<Item = FeatureId> {
        (0..self.features.len()).map(FeatureId)
    }

    /// Number of registered features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// The active configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn state(&self, feature: FeatureId) -> Result<&FeatureState> {
        self.features
            .get(feature.0)
            .ok_or(DstError::UnknownFeature { feature: feature.0 })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
