//! Error taxonomy for the evidence engine and the adaptive classifier.
//!
//! Four families:
//!
//! - **Configuration**: the [`Universe`](crate::universe::Universe) was misused
//!   (`CapacityExceeded`, `UnknownHypothesis`, `DuplicateHypothesis`, `EmptyUniverse`).
//! - **Mass-function usage**: the construction protocol of an
//!   [`Evidence`](crate::evidence::Evidence) was violated (`InvalidMass`, `EmptySubset`,
//!   `SubsetOutsideUniverse`, `IncompleteMassFunction`, `AlreadyComplete`,
//!   `UniverseMismatch`, `NoEvidence`).
//! - **Combination failure**: `TotalConflict`. Reflects the input data, not a
//!   programming mistake; see [`DstError::is_combination_failure`].
//! - **Numeric / classifier**: `DegenerateBaseline`, `NonFiniteObservation`,
//!   `UnknownFeature`, `InvalidLearningRate`, plus the frame-pipeline errors
//!   `InvalidMassScale` and `FrameWidthMismatch`.
//!
//! A call that returns an error leaves the receiver exactly as it was.

/// Errors returned by every fallible operation in this crate.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum DstError {
    /// The universe already holds the maximum number of hypotheses.
    #[error("universe is full ({capacity} hypotheses)")]
    CapacityExceeded {
        /// Maximum supported universe size.
        capacity: usize,
    },
    /// A hypothesis name or id was never registered.
    #[error("unknown hypothesis")]
    UnknownHypothesis,
    /// A hypothesis with the same name is already registered.
    #[error("hypothesis already registered")]
    DuplicateHypothesis,
    /// The operation needs at least one registered hypothesis.
    #[error("universe has no hypotheses")]
    EmptyUniverse,
    /// Mass outside (0, 1], non-finite, or the running total would exceed 1.
    #[error("invalid mass {mass}")]
    InvalidMass {
        /// The rejected mass, or the running total it would have produced.
        mass: f64,
    },
    /// Focal sets must contain at least one hypothesis.
    #[error("focal set is empty")]
    EmptySubset,
    /// The subset names hypotheses beyond the universe's registered range.
    #[error("subset lies outside the universe")]
    SubsetOutsideUniverse,
    /// The mass function was queried or combined before (or completed after)
    /// its universal mass was assigned.
    #[error("mass function is not in the required completion state")]
    IncompleteMassFunction,
    /// A focal set was added after the mass function was completed.
    #[error("mass function is already complete")]
    AlreadyComplete,
    /// The two mass functions were built over different frames of discernment.
    #[error("mass functions belong to different universes")]
    UniverseMismatch,
    /// A fold over mass functions received no input.
    #[error("no evidence to combine")]
    NoEvidence,
    /// All product mass fell on the empty set; Dempster's rule is undefined.
    #[error("total conflict (K = {conflict})")]
    TotalConflict {
        /// Accumulated conflict mass K.
        conflict: f64,
    },
    /// The running baseline of a feature is zero, so relative deviation is undefined.
    #[error("feature {feature} has a zero baseline")]
    DegenerateBaseline {
        /// Index of the offending feature.
        feature: usize,
    },
    /// No feature with this id was registered.
    #[error("unknown feature {feature}")]
    UnknownFeature {
        /// The requested feature index.
        feature: usize,
    },
    /// A NaN or infinite value was supplied as a baseline or observation.
    #[error("observation is not finite")]
    NonFiniteObservation,
    /// A cue's mass scale must be finite and within (0, 1].
    #[error("mass scale {scale} outside (0, 1]")]
    InvalidMassScale {
        /// The rejected scale.
        scale: f64,
    },
    /// A frame row did not hold exactly one raw value per cue.
    #[error("frame has {got} values, expected {expected}")]
    FrameWidthMismatch {
        /// Number of cues.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
    /// The classifier learning rate must be finite and within [0, 1].
    #[error("learning rate {rate} outside [0, 1]")]
    InvalidLearningRate {
        /// The rejected learning rate.
        rate: f64,
    },
}

impl DstError {
    /// `true` for outcomes caused by the evidence itself rather than by misuse.
    ///
    /// Callers typically skip the frame or fall back to a single source on these
    /// and abort on everything else.
    pub fn is_combination_failure(&self) -> bool {
        matches!(self, DstError::TotalConflict { .. })
    }
}

/// Shorthand result type used across the crate.
pub type Result<T> = core::result::Result<T, DstError>;
