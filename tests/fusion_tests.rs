//! Integration tests for the per-frame pipeline: classifier → cues → combination.
//!
//! Uses the facial-expression reference setup and a small custom setup to check
//! that the per-cue evidence is well formed and that the fused result reacts
//! to the measurements the way the cue table says it should.

use dst_core::facial::{
    Emotion, FacialExpressionFusion, FacialFrame, EYE_APERTURE_SEED, FURROW_COUNT_SEED,
    MOUTH_OPENING_SEED,
};
use dst_core::{Classifier, DstError, FrameFusion, Universe, DEFAULT_MASS_SCALE, EPSILON};

// ─── helpers ─────────────────────────────────────────────────────────────────

fn frame(n: i64, eye: f64, mouth: f64, furrow: f64) -> FacialFrame {
    FacialFrame {
        frame: n,
        eye_aperture: eye,
        mouth_opening: mouth,
        furrow_count: furrow,
    }
}

// ─── facial reference setup ──────────────────────────────────────────────────

#[test]
fn test_every_per_cue_evidence_is_complete() {
    let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
    let frames = [
        frame(1, 18.0, 23.0, 527.0),
        frame(2, 25.0, 10.0, 600.0),
        frame(3, 9.0, 40.0, 300.0),
    ];
    for f in &frames {
        let out = fusion.process(f).unwrap();
        assert_eq!(out.evidences.len(), 3);
        for e in &out.evidences {
            assert!(e.is_complete());
            assert!((e.total_mass() - 1.0).abs() < EPSILON);
            // the 0.9 ceiling always leaves mass on Ω
            assert!(e.mass(fusion.universe().universal_set()) >= 1.0 - DEFAULT_MASS_SCALE - EPSILON);
        }
        assert!((out.combined.total_mass() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_belief_never_exceeds_plausibility() {
    let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
    let out = fusion.process(&frame(7, 12.0, 35.0, 700.0)).unwrap();
    for emotion in Emotion::ALL {
        let bel = out.combined.belief(emotion.subset()).unwrap();
        let pl = out.combined.plausibility(emotion.subset()).unwrap();
        assert!(bel <= pl + EPSILON, "{}: bel={} pl={}", emotion, bel, pl);
    }
}

#[test]
fn test_surprised_face() {
    let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
    let out = fusion.process(&frame(1, 28.0, 38.0, 650.0)).unwrap();
    assert_eq!(fusion.best_emotion(&out).unwrap(), Emotion::Surprise);
    assert!(out.classifications.iter().all(|&c| c > 0.0));
}

#[test]
fn test_disdainful_face_excludes_surprise() {
    let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
    // narrow eyes only
    let out = fusion
        .process(&frame(1, 6.0, MOUTH_OPENING_SEED, FURROW_COUNT_SEED))
        .unwrap();
    let surprise = Emotion::Surprise.subset();
    let pl = out.combined.plausibility(surprise).unwrap();
    assert!((pl - 0.4).abs() < 1e-9, "pl(surprise)={}", pl);
    let dd = Emotion::Disdain.subset() | Emotion::Disgust.subset();
    assert!(out.combined.belief(dd).unwrap() > 0.5);
}

#[test]
fn test_adaptation_over_a_recording() {
    let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
    // a subject whose resting eye aperture is 24, not 18
    let mut first = None;
    let mut last = 0.0;
    for n in 0..200 {
        let out = fusion
            .process(&frame(n, 24.0, MOUTH_OPENING_SEED, FURROW_COUNT_SEED))
            .unwrap();
        first.get_or_insert(out.classifications[0]);
        last = out.classifications[0];
    }
    let first = first.unwrap();
    assert!(first > 0.3, "first={}", first);
    assert!(last < 0.01, "last={}", last);
    assert_eq!(
        fusion
            .fusion()
            .classifier()
            .observation_count(fusion.eye_aperture)
            .unwrap(),
        200
    );
}

#[test]
fn test_seeds_match_reference_values() {
    let fusion = FacialExpressionFusion::with_defaults().unwrap();
    assert_eq!(EYE_APERTURE_SEED, 18.0);
    assert_eq!(MOUTH_OPENING_SEED, 23.0);
    assert_eq!(FURROW_COUNT_SEED, 527.0);
    assert_eq!(fusion.fusion().cues().len(), 3);
    assert_eq!(fusion.universe().len(), 5);
}

// ─── custom setup ────────────────────────────────────────────────────────────

#[test]
fn test_custom_pipeline() {
    let mut u = Universe::new();
    u.register_all(["idle", "busy", "fault"]).unwrap();
    let busy = u.subset_of(&["busy"]).unwrap();
    let idle = u.subset_of(&["idle"]).unwrap();
    let busy_or_fault = u.subset_of(&["busy", "fault"]).unwrap();

    let mut fusion = FrameFusion::new(u.clone(), Classifier::with_defaults());
    fusion.add_cue(50.0, busy, idle).unwrap(); // cpu load
    fusion.add_cue(200.0, busy_or_fault, idle).unwrap(); // latency

    let out = fusion.process(&[90.0, 400.0]).unwrap();
    assert_eq!(u.name(out.combined.best_match().unwrap()), Some("busy"));

    let out = fusion.process(&[10.0, 50.0]).unwrap();
    assert_eq!(u.name(out.combined.best_match().unwrap()), Some("idle"));

    assert_eq!(
        fusion.process(&[1.0]).unwrap_err(),
        DstError::FrameWidthMismatch {
            expected: 2,
            got: 1
        }
    );
}

#[test]
fn test_rejected_frame_is_not_learned() {
    let mut fusion = FacialExpressionFusion::with_defaults().unwrap();
    let err = fusion
        .process(&frame(1, 30.0, 40.0, f64::INFINITY))
        .unwrap_err();
    assert_eq!(err, DstError::NonFiniteObservation);

    let classifier = fusion.fusion().classifier();
    for feature in classifier.feature_ids() {
        assert_eq!(classifier.observation_count(feature).unwrap(), 0);
    }
    // eye and mouth baselines are still at their seeds
    let out = fusion
        .process(&frame(2, EYE_APERTURE_SEED, MOUTH_OPENING_SEED, FURROW_COUNT_SEED))
        .unwrap();
    assert_eq!(out.classifications, [0.0, 0.0, 0.0]);
}
