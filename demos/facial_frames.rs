//! # Facial expression frames
//!
//! Reads a CSV of per-frame facial measurements and prints, for every frame,
//! the classifier output of each feature, a belief/plausibility bar per
//! emotion, and the best-matching emotion.
//!
//! ```text
//! cargo run --example facial_frames -- video.csv
//! ```
//!
//! The file starts with the header `frame,eye_aperture,mouth_opening,furrow_count`,
//! followed by one row per frame. A malformed record stops the run with its
//! position and a non-zero exit status.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;
use dst_core::facial::{Emotion, FacialExpressionFusion, FacialFrame};
use dst_core::{DstError, Evidence};

/// Fuse facial measurements into emotion beliefs, frame by frame.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV file with video data (frame, eye aperture, mouth opening, furrow count).
    input: PathBuf,
}

const BAR_LENGTH: usize = 50;
const RULE: &str = "---------------------------------";

/// One CSV record, matched to the header by column name.
#[derive(Debug, Deserialize)]
struct Row {
    frame: i64,
    eye_aperture: f64,
    mouth_opening: f64,
    furrow_count: f64,
}

impl From<Row> for FacialFrame {
    fn from(row: Row) -> Self {
        FacialFrame {
            frame: row.frame,
            eye_aperture: row.eye_aperture,
            mouth_opening: row.mouth_opening,
            furrow_count: row.furrow_count,
        }
    }
}

/// Read every frame, failing on the first malformed record.
fn read_frames<R: io::Read>(input: R) -> Result<Vec<FacialFrame>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input)
        .deserialize::<Row>()
        .map(|row| row.map(FacialFrame::from))
        .collect()
}

/// `#` for belief, `-` for the extra plausibility, `.` for the rest.
fn bar(combined: &Evidence, emotion: Emotion) -> Result<String, DstError> {
    let belief = combined.belief(emotion.subset())?;
    let plausibility = combined.plausibility(emotion.subset())?;
    let hashes = (belief * BAR_LENGTH as f64) as usize;
    let dashes = ((plausibility - belief) * BAR_LENGTH as f64) as usize;
    let hashes = hashes.min(BAR_LENGTH);
    let dashes = dashes.min(BAR_LENGTH - hashes);
    Ok(format!(
        "{}{}{}",
        "#".repeat(hashes),
        "-".repeat(dashes),
        ".".repeat(BAR_LENGTH - hashes - dashes)
    ))
}

fn report(fusion: &mut FacialExpressionFusion, frame: &FacialFrame) -> Result<(), DstError> {
    let outcome = fusion.process(frame)?;
    // the values actually used as mass, as the cues scale them
    let scaled: Vec<f64> = fusion
        .fusion()
        .cues()
        .iter()
        .zip(&outcome.classifications)
        .map(|(cue, &c)| cue.scaled(c))
        .collect();
    let (eye, mouth, furrow) = (scaled[0], scaled[1], scaled[2]);

    println!("{RULE}");
    println!("### Frame: {:03} ###", frame.frame);
    println!("{RULE}");
    println!("(-1.0: far below average, +1.0 far above average)");
    println!("Eye Aperture:  {:3} -> {:04.2}", frame.eye_aperture, eye);
    println!("Mouth Opening: {:3} -> {:04.2}", frame.mouth_opening, mouth);
    println!("Furrow Count:  {:3} -> {:04.2}", frame.furrow_count, furrow);
    println!("{RULE}");
    println!("(#: Belief, -: Plausibility, .: nothing)");
    for emotion in Emotion::ALL {
        let mut title = emotion.to_string();
        title[..1].make_ascii_uppercase();
        println!("{:<8} | {} ", title, bar(&outcome.combined, emotion)?);
    }
    println!("{RULE}");
    println!("classified as: {}", fusion.best_emotion(&outcome)?);
    println!("{RULE}");
    println!();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let frames = match File::open(&args.input)
        .map_err(csv::Error::from)
        .and_then(read_frames)
    {
        Ok(frames) => frames,
        Err(e) => {
            eprintln!("cannot read {}: {e}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let mut fusion = match FacialExpressionFusion::with_defaults() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for frame in &frames {
        match report(&mut fusion, frame) {
            Ok(()) => {}
            Err(e) if e.is_combination_failure() => {
                println!("frame {:03}: skipped ({e})", frame.frame);
            }
            Err(e) => {
                eprintln!("frame {:03}: {e}", frame.frame);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
