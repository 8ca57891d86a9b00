//! # dst-core
//!
//! Dempster-Shafer evidence combination, fed by an online-learning feature classifier.
//!
//! ---
//!
//! ## Belief over sets, not just outcomes
//!
//! Classical probability has to commit every unit of confidence to a single
//! outcome. Evidence theory lets a sensor say *"it is fear or surprise, I cannot
//! tell which"* and, just as importantly, *"I don't know"*: mass on the whole
//! frame of discernment Ω.
//!
//! **Mass functions** spread one unit of mass over subsets of Ω. Whatever a
//! source does not commit goes to Ω.
//!
//! **Dempster's rule** fuses two independent sources by intersecting their
//! focal sets. Mass landing on the empty set is conflict; it is thrown away and
//! the rest is renormalised. When *everything* conflicts the rule is undefined,
//! and this crate says so with [`DstError::TotalConflict`] instead of dividing
//! by zero.
//!
//! **Belief and plausibility** bracket the confidence in any subset: belief
//! counts mass that certainly supports it, plausibility counts mass that does
//! not rule it out.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! raw readings → Classifier → signed value ∈ [-1, 1] → SignedCue → Evidence
//!                    ↑                                                  ↓
//!              running baseline                           combine (Dempster) → Bel / Pl / best_match
//!                                                                   ↑
//!                                                               Universe (Ω)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`subset`] | [`Subset`], [`HypothesisId`] | 64-bit subsets of Ω |
//! | [`universe`] | [`Universe`] | Append-only hypothesis registry; names → subsets |
//! | [`evidence`] | [`Evidence`] | Mass functions, Dempster's rule, belief, plausibility |
//! | [`classifier`] | [`Classifier`], [`ClassifierConfig`] | EMA-baseline relative deviation classifier |
//! | [`cue`] | [`SignedCue`], [`FrameFusion`] | Classification → evidence → combination per frame |
//! | [`facial`] | [`facial::Emotion`], [`facial::FacialExpressionFusion`] | Reference five-emotion setup |
//! | [`error`] | [`DstError`] | Error taxonomy |
//!
//! ## Example
//!
//! ```rust
//! use dst_core::{Evidence, Universe};
//!
//! let mut universe = Universe::new();
//! universe.register_all(["fear", "surprise", "anger"]).unwrap();
//!
//! let mut eyes = universe.new_evidence();
//! eyes.add_focal_set(0.6, universe.subset_of(&["fear", "surprise"]).unwrap()).unwrap();
//! eyes.add_universal_mass().unwrap();
//!
//! let mut brow = universe.new_evidence();
//! brow.add_focal_set(0.3, universe.subset_of(&["fear"]).unwrap()).unwrap();
//! brow.add_universal_mass().unwrap();
//!
//! let combined = eyes.combine(&brow).unwrap();
//! let fear = universe.subset_of(&["fear"]).unwrap();
//! assert!((combined.belief(fear).unwrap() - 0.3).abs() < 1e-9);
//! assert_eq!(universe.name(combined.best_match().unwrap()), Some("fear"));
//! ```
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default and needs only `alloc`. Enable `std` for
//! the demo, `serde` for serialisation of value types, `tracing` for diagnostic
//! events on combination and classification, and `python-ffi` for PyO3 bindings.
//!
//! ## License
//!
//! Business Source License 1.1. Free for evaluation and non-production use.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// Pull in std when the feature is enabled, and for unit tests.
#[cfg(any(test, feature = "std", feature = "python-ffi"))]
extern crate std;

pub mod classifier;
pub mod cue;
pub mod error;
pub mod evidence;
pub mod facial;
pub mod subset;
pub mod universe;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use classifier::{Classifier, ClassifierConfig, FeatureId};
pub use cue::{FrameFusion, FrameOutcome, SignedCue, DEFAULT_MASS_SCALE};
pub use error::{DstError, Result};
pub use evidence::{Evidence, EPSILON};
pub use subset::{HypothesisId, Subset, MAX_HYPOTHESES};
pub use universe::Universe;
