//! From classified features to fused belief, one frame at a time.
//!
//! A [`SignedCue`] binds one classifier feature to two focal sets: the one that
//! readings *above* baseline support, and the one that readings *below* it
//! support. [`FrameFusion`] runs a whole frame of raw values through the
//! classifier, turns each classification into an [`Evidence`], and folds them
//! with Dempster's rule.
//!
//! # Mass scaling
//!
//! A classification of ±1.0 would otherwise put all mass on a non-Ω focal set,
//! making any disagreeing cue a total conflict. Cues therefore scale the
//! magnitude by [`DEFAULT_MASS_SCALE`] (0.9) before using it as mass, which
//! keeps at least 10% on Ω. This is application policy and lives here, not in
//! the classifier.

use alloc::vec::Vec;

use crate::classifier::{Classifier, FeatureId};
use crate::error::{DstError, Result};
use crate::evidence::Evidence;
use crate::subset::Subset;
use crate::universe::Universe;

/// Default ceiling applied to classification magnitudes before they become mass.
pub const DEFAULT_MASS_SCALE: f64 = 0.9;

// ─── SignedCue ──────────────────────────────────────────────────────────────

/// A feature together with the focal sets its sign points to.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedCue {
    /// Classifier feature this cue reads.
    pub feature: FeatureId,
    /// Focal set supported by readings at or above baseline.
    pub above: Subset,
    /// Focal set supported by readings below baseline.
    pub below: Subset,
    /// Multiplier applied to the classification before it is used as mass.
    pub mass_scale: f64,
}

impl SignedCue {
    /// A cue using [`DEFAULT_MASS_SCALE`].
    pub fn new(feature: FeatureId, above: Subset, below: Subset) -> Self {
        Self {
            feature,
            above,
            below,
            mass_scale: DEFAULT_MASS_SCALE,
        }
    }

    /// Override the mass scale. Fails with [`DstError::InvalidMassScale`]
    /// unless it is finite and within (0, 1].
    pub fn with_mass_scale(mut self, mass_scale: f64) -> Result<Self> {
        check_mass_scale(mass_scale)?;
        self.mass_scale = mass_scale;
        Ok(self)
    }

    /// The scaled, signed value this cue would use for `classification`.
    pub fn scaled(&self, classification: f64) -> f64 {
        classification * self.mass_scale
    }

    /// Build the complete mass function for one classification.
    ///
    /// `|scaled|` goes to `above` for a non-negative value, to `below` otherwise;
    /// the rest goes to Ω. A zero classification yields the vacuous mass function.
    /// A non-finite classification fails with [`DstError::NonFiniteObservation`],
    /// a scale outside (0, 1] with [`DstError::InvalidMassScale`].
    pub fn to_evidence(&self, universe: &Universe, classification: f64) -> Result<Evidence> {
        if !classification.is_finite() {
            return Err(DstError::NonFiniteObservation);
        }
        check_mass_scale(self.mass_scale)?;
        let value = self.scaled(classification);
        let mut evidence = universe.new_evidence();
        let (mass, focal) = if value >= 0.0 {
            (value, self.above)
        } else {
            (-value, self.below)
        };
        if mass > 0.0 {
            evidence.add_focal_set(mass, focal)?;
        }
        evidence.add_universal_mass()?;
        Ok(evidence)
    }
}

fn check_mass_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 && scale <= 1.0 {
        Ok(())
    } else {
        Err(DstError::InvalidMassScale { scale })
    }
}

// ─── FrameFusion ────────────────────────────────────────────────────────────

/// Everything produced for one frame.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    /// Raw classifier output per cue, in cue order (unscaled, in [-1, 1]).
    pub classifications: Vec<f64>,
    /// Per-cue mass functions, in cue order.
    pub evidences: Vec<Evidence>,
    /// Dempster combination of all per-cue mass functions.
    pub combined: Evidence,
}

/// A universe, a classifier and an ordered list of cues.
///
/// Each call to [`process`](Self::process) consumes one row of raw values, one
/// per cue, in the order the cues were added.
#[derive(Clone, Debug)]
pub struct FrameFusion {
    universe: Universe,
    classifier: Classifier,
    cues: Vec<SignedCue>,
}

impl FrameFusion {
    /// Start a pipeline with no cues.
    pub fn new(universe: Universe, classifier: Classifier) -> Self {
        Self {
            universe,
            classifier,
            cues: Vec::new(),
        }
    }

    /// Register a feature seeded at `initial_baseline` and attach a cue to it.
    ///
    /// Both focal sets must be non-empty subsets of the universe.
    pub fn add_cue(
        &mut self,
        initial_baseline: f64,
        above: Subset,
        below: Subset,
    ) -> Result<FeatureId> {
        let omega = self.universe.universal_set();
        for set in [above, below] {
            if set.is_empty() {
                return Err(DstError::EmptySubset);
            }
            if !set.is_subset_of(omega) {
                return Err(DstError::SubsetOutsideUniverse);
            }
        }
        let feature = self.classifier.register_feature(initial_baseline)?;
        self.cues.push(SignedCue::new(feature, above, below));
        Ok(feature)
    }

    /// Classify one frame and fuse the resulting evidence.
    ///
    /// `raw` must hold exactly one value per cue. Classification runs on a copy
    /// of the classifier that replaces it only once every cue has produced its
    /// evidence: a failing value leaves all baselines untouched, while a frame
    /// that ends in [`DstError::TotalConflict`] has still been learned from.
    pub fn process(&mut self, raw: &[f64]) -> Result<FrameOutcome> {
        if raw.len() != self.cues.len() {
            return Err(DstError::FrameWidthMismatch {
                expected: self.cues.len(),
                got: raw.len(),
            });
        }

        let mut classifier = self.classifier.clone();
        let mut classifications = Vec::with_capacity(self.cues.len());
        for (cue, &value) in self.cues.iter().zip(raw) {
            classifications.push(classifier.classify(cue.feature, value)?);
        }

        let evidences = self
            .cues
            .iter()
            .zip(&classifications)
            .map(|(cue, &c)| cue.to_evidence(&self.universe, c))
            .collect::<Result<Vec<_>>>()?;
        self.classifier = classifier;

        let combined = Evidence::combine_all(&evidences)?;
        Ok(FrameOutcome {
            classifications,
            evidences,
            combined,
        })
    }

    /// The universe the cues are defined over.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// The classifier backing the cues.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Cues in processing order.
    pub fn cues(&self) -> &[SignedCue] {
        &self.cues
    }

    /// Mutable access to a cue, e.g. to change its mass scale.
    pub fn cue_mut(&mut self, feature: FeatureId) -> Option<&mut SignedCue> {
        self.cues.iter_mut().find(|c| c.feature == feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;

    fn universe() -> Universe {
        let mut u = Universe::new();
        u.register_all(["fear", "surprise", "anger"]).unwrap();
        u
    }

    #[test]
    fn test_positive_classification_uses_above_set() {
        let u = universe();
        let above = u.subset_of(&["fear", "surprise"]).unwrap();
        let below = u.subset_of(&["anger"]).unwrap();
        let mut c = Classifier::with_defaults();
        let cue = SignedCue::new(c.register_feature(10.0).unwrap(), above, below);

        let e = cue.to_evidence(&u, 1.0).unwrap();
        assert!((e.mass(above) - 0.9).abs() < 1e-12);
        assert!((e.mass(u.universal_set()) - 0.1).abs() < 1e-12);
        assert_eq!(e.mass(below), 0.0);
    }

    #[test]
    fn test_negative_classification_uses_below_set() {
        let u = universe();
        let above = u.subset_of(&["fear"]).unwrap();
        let below = u.subset_of(&["anger"]).unwrap();
        let mut c = Classifier::with_defaults();
        let cue = SignedCue::new(c.register_feature(10.0).unwrap(), above, below);

        let e = cue.to_evidence(&u, -0.5).unwrap();
        assert!((e.mass(below) - 0.45).abs() < 1e-12);
        assert_eq!(e.mass(above), 0.0);
    }

    #[test]
    fn test_zero_classification_is_vacuous() {
        let u = universe();
        let mut c = Classifier::with_defaults();
        let cue = SignedCue::new(
            c.register_feature(10.0).unwrap(),
            u.subset_of(&["fear"]).unwrap(),
            u.subset_of(&["anger"]).unwrap(),
        );
        let e = cue.to_evidence(&u, 0.0).unwrap();
        assert!(e.approx_eq(&Evidence::vacuous(&u).unwrap(), 1e-12));
    }

    #[test]
    fn test_unscaled_cues_can_conflict_totally() {
        let u = universe();
        let mut fusion = FrameFusion::new(
            u.clone(),
            Classifier::new(ClassifierConfig {
                learning_rate: 0.0,
                minimum_observations: 0,
            })
            .unwrap(),
        );
        let fear = u.subset_of(&["fear"]).unwrap();
        let anger = u.subset_of(&["anger"]).unwrap();
        let a = fusion.add_cue(10.0, fear, anger).unwrap();
        let b = fusion.add_cue(10.0, anger, fear).unwrap();
        for f in [a, b] {
            fusion.cue_mut(f).unwrap().mass_scale = 1.0;
        }

        let err = fusion.process(&[100.0, 100.0]).unwrap_err();
        assert!(err.is_combination_failure(), "err={:?}", err);
        assert_eq!(fusion.classifier().observation_count(a).unwrap(), 1);

        // With the default 0.9 ceiling the same frame combines.
        for f in [a, b] {
            fusion.cue_mut(f).unwrap().mass_scale = DEFAULT_MASS_SCALE;
        }
        let out = fusion.process(&[100.0, 100.0]).unwrap();
        assert!((out.combined.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_width_must_match_cues() {
        let u = universe();
        let mut fusion = FrameFusion::new(u.clone(), Classifier::with_defaults());
        fusion
            .add_cue(
                5.0,
                u.subset_of(&["fear"]).unwrap(),
                u.subset_of(&["anger"]).unwrap(),
            )
            .unwrap();
        assert_eq!(
            fusion.process(&[1.0, 2.0]).unwrap_err(),
            DstError::FrameWidthMismatch {
                expected: 1,
                got: 2
            }
        );
        assert!(fusion.process(&[5.0]).is_ok());
    }

    #[test]
    fn test_add_cue_validates_sets() {
        let u = universe();
        let mut fusion = FrameFusion::new(u.clone(), Classifier::with_defaults());
        let fear = u.subset_of(&["fear"]).unwrap();
        assert_eq!(
            fusion.add_cue(1.0, fear, Subset::EMPTY),
            Err(DstError::EmptySubset)
        );
        assert_eq!(
            fusion.add_cue(1.0, Subset::from_bits(0b1000), fear),
            Err(DstError::SubsetOutsideUniverse)
        );
        assert_eq!(fusion.classifier().feature_count(), 0);
    }

    #[test]
    fn test_non_finite_inputs_are_rejected() {
        let u = universe();
        let mut c = Classifier::with_defaults();
        let cue = SignedCue::new(
            c.register_feature(10.0).unwrap(),
            u.subset_of(&["fear"]).unwrap(),
            u.subset_of(&["anger"]).unwrap(),
        );
        assert_eq!(
            cue.to_evidence(&u, f64::NAN),
            Err(DstError::NonFiniteObservation)
        );

        for bad in [f64::NAN, 0.0, -0.5, 1.5, f64::INFINITY] {
            assert!(
                matches!(
                    cue.clone().with_mass_scale(bad),
                    Err(DstError::InvalidMassScale { .. })
                ),
                "scale {} should be rejected",
                bad
            );
        }
        // the field is public, so the scale is checked again at use
        let mut raw = cue.clone();
        raw.mass_scale = f64::NAN;
        assert!(matches!(
            raw.to_evidence(&u, 0.8),
            Err(DstError::InvalidMassScale { .. })
        ));

        let half = cue.with_mass_scale(0.5).unwrap();
        let e = half.to_evidence(&u, 0.8).unwrap();
        assert!((e.mass(u.subset_of(&["fear"]).unwrap()) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_failed_frame_leaves_every_baseline_untouched() {
        let u = universe();
        let mut fusion = FrameFusion::new(u.clone(), Classifier::with_defaults());
        let fear = u.subset_of(&["fear"]).unwrap();
        let anger = u.subset_of(&["anger"]).unwrap();
        let first = fusion.add_cue(10.0, fear, anger).unwrap();
        let second = fusion.add_cue(10.0, anger, fear).unwrap();

        assert_eq!(
            fusion.process(&[20.0, f64::NAN]).unwrap_err(),
            DstError::NonFiniteObservation
        );
        assert_eq!(fusion.classifier().observation_count(first).unwrap(), 0);
        assert_eq!(fusion.classifier().observation_count(second).unwrap(), 0);

        // the first cue's baseline is still the seed
        let out = fusion.process(&[10.0, 10.0]).unwrap();
        assert_eq!(out.classifications, [0.0, 0.0]);
        assert_eq!(fusion.classifier().observation_count(first).unwrap(), 1);
    }
}
