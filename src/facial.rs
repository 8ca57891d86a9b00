//! Facial-expression reference setup.
//!
//! Five emotions, three facial measurements. Each measurement is classified
//! against its own running baseline and pushes mass toward a group of emotions
//! depending on whether it reads above or below normal:
//!
//! | Feature | Seed | Above baseline | Below baseline |
//! |---------|------|----------------|----------------|
//! | Eye aperture | 18.0 | fear, surprise | disdain, disgust |
//! | Mouth opening | 23.0 | surprise | anger, disgust |
//! | Furrow count | 527.0 | fear, surprise | anger |
//!
//! This is the configuration the crate's demo runs on recorded video frames. It
//! doubles as a template for wiring up your own hypotheses and cues.
//!
//! ```rust
//! use dst_core::facial::{Emotion, FacialExpressionFusion, FacialFrame};
//!
//! let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
//! let frame = FacialFrame { frame: 1, eye_aperture: 30.0, mouth_opening: 40.0, furrow_count: 527.0 };
//! let outcome = fusion.process(&frame).unwrap();
//! assert_eq!(fusion.best_emotion(&outcome).unwrap(), Emotion::Surprise);
//! ```

use core::fmt;

use crate::classifier::{Classifier, ClassifierConfig, FeatureId};
use crate::cue::{FrameFusion, FrameOutcome};
use crate::error::{DstError, Result};
use crate::subset::{HypothesisId, Subset};
use crate::universe::Universe;

/// Running-baseline seed for eye aperture.
pub const EYE_APERTURE_SEED: f64 = 18.0;
/// Running-baseline seed for mouth opening.
pub const MOUTH_OPENING_SEED: f64 = 23.0;
/// Running-baseline seed for furrow count.
pub const FURROW_COUNT_SEED: f64 = 527.0;

/// The five hypotheses of the facial frame of discernment, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Emotion {
    /// Fear.
    Fear,
    /// Surprise.
    Surprise,
    /// Disdain (contempt).
    Disdain,
    /// Disgust.
    Disgust,
    /// Anger.
    Anger,
}

impl Emotion {
    /// All emotions in registration order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disdain,
        Emotion::Disgust,
        Emotion::Anger,
    ];

    /// Hypothesis name registered in the universe.
    pub fn name(self) -> &'static str {
        match self {
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Disdain => "disdain",
            Emotion::Disgust => "disgust",
            Emotion::Anger => "anger",
        }
    }

    /// Hypothesis id in a universe built by [`Emotion::universe`].
    pub fn id(self) -> HypothesisId {
        HypothesisId::new(self as usize)
    }

    /// Inverse of [`Emotion::id`].
    pub fn from_id(id: HypothesisId) -> Option<Emotion> {
        Self::ALL.get(id.index()).copied()
    }

    /// The singleton `{self}`.
    pub fn subset(self) -> Subset {
        Subset::singleton(self.id())
    }

    /// A universe with all five emotions registered in order.
    pub fn universe() -> Result<Universe> {
        let mut universe = Universe::new();
        universe.register_all(Self::ALL.iter().map(|e| e.name()))?;
        Ok(universe)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Union of several emotions.
fn group(emotions: &[Emotion]) -> Subset {
    emotions
        .iter()
        .fold(Subset::EMPTY, |acc, e| acc | e.subset())
}

/// One row of facial measurements.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FacialFrame {
    /// Frame number in the source recording.
    pub frame: i64,
    /// Eye aperture (pixels).
    pub eye_aperture: f64,
    /// Mouth opening (pixels).
    pub mouth_opening: f64,
    /// Number of furrow pixels in the forehead region.
    pub furrow_count: f64,
}

impl FacialFrame {
    /// Measurements in cue order.
    pub fn measurements(&self) -> [f64; 3] {
        [self.eye_aperture, self.mouth_opening, self.furrow_count]
    }
}

/// The facial cue set wired into a [`FrameFusion`].
#[derive(Clone, Debug)]
pub struct FacialExpressionFusion {
    fusion: FrameFusion,
    /// Eye-aperture feature.
    pub eye_aperture: FeatureId,
    /// Mouth-opening feature.
    pub mouth_opening: FeatureId,
    /// Furrow-count feature.
    pub furrow_count: FeatureId,
}

impl FacialExpressionFusion {
    /// Build the reference pipeline with `config`.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        use Emotion::*;

        let mut fusion = FrameFusion::new(Emotion::universe()?, Classifier::new(config)?);
        let eye_aperture = fusion.add_cue(
            EYE_APERTURE_SEED,
            group(&[Fear, Surprise]),
            group(&[Disdain, Disgust]),
        )?;
        let mouth_opening = fusion.add_cue(
            MOUTH_OPENING_SEED,
            group(&[Surprise]),
            group(&[Anger, Disgust]),
        )?;
        let furrow_count =
            fusion.add_cue(FURROW_COUNT_SEED, group(&[Fear, Surprise]), group(&[Anger]))?;

        Ok(Self {
            fusion,
            eye_aperture,
            mouth_opening,
            furrow_count,
        })
    }

    /// Build the reference pipeline with the default classifier configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClassifierConfig::default())
    }

    /// Classify and fuse one frame.
    pub fn process(&mut self, frame: &FacialFrame) -> Result<FrameOutcome> {
        self.fusion.process(&frame.measurements())
    }

    /// Emotion with the highest combined belief.
    pub fn best_emotion(&self, outcome: &FrameOutcome) -> Result<Emotion> {
        let id = outcome.combined.best_match()?;
        // best_match only yields ids inside Ω, and Ω is exactly the five emotions
        Emotion::from_id(id).ok_or(DstError::UnknownHypothesis)
    }

    /// The underlying generic pipeline.
    pub fn fusion(&self) -> &FrameFusion {
        &self.fusion
    }

    /// The five-emotion universe.
    pub fn universe(&self) -> &Universe {
        self.fusion.universe()
    }
}
