//! Minimal interactive tracking: CSRT on a user-selected region.
//!
//! Prompts for a video source, lets the user draw a box on the first
//! frame, then tracks it until the stream ends or `q` is pressed.

use anyhow::Result;

use roitrack::capture::CaptureSource;
use roitrack::ui::HighguiOperator;
use roitrack::{session, OperatorInterface, SessionConfig, TrackError, TrackerBackend};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut operator = HighguiOperator::default();
    let source = operator.select_source()?;

    let mut capture = match CaptureSource::open(&source) {
        Ok(capture) => capture,
        Err(e) => {
            eprintln!("Error: could not open video source ({e}).");
            return Ok(());
        }
    };

    let mut tracker = TrackerBackend::Csrt.create()?;

    match session::run(
        &mut capture,
        &mut operator,
        tracker.as_mut(),
        &SessionConfig::default(),
    ) {
        Ok(_) => {
            println!("End of video or camera feed.");
            Ok(())
        }
        Err(TrackError::EmptyFirstFrame) => {
            eprintln!("Failed to grab first frame.");
            Ok(())
        }
        Err(TrackError::NoRegionSelected) => {
            eprintln!("No region selected, nothing to track.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
