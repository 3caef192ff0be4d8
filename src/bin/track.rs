//! Interactive tracking with a backend menu and a final accuracy/FPS
//! report.
//!
//! Prompts for a video source and one of five tracking algorithms, lets
//! the user draw a box around the target, then follows it until the
//! stream ends or `q` is pressed.

use anyhow::Result;

use roitrack::capture::CaptureSource;
use roitrack::ui::HighguiOperator;
use roitrack::{session, OperatorInterface, SessionConfig, TrackError};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut operator = HighguiOperator::default();

    let source = operator.select_source()?;

    let backend = match operator.select_backend() {
        Ok(backend) => backend,
        Err(TrackError::InvalidBackendChoice(choice)) => {
            eprintln!("Error: invalid selection `{choice}`.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut capture = match CaptureSource::open(&source) {
        Ok(capture) => capture,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(());
        }
    };

    let mut tracker = backend.create()?;

    let report = match session::run(
        &mut capture,
        &mut operator,
        tracker.as_mut(),
        &SessionConfig::default(),
    ) {
        Ok(report) => report,
        Err(TrackError::EmptyFirstFrame) => {
            eprintln!("Failed to grab first frame.");
            return Ok(());
        }
        Err(TrackError::NoRegionSelected) => {
            eprintln!("No region selected, nothing to track.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n--- {backend} run summary ---");
    println!("Frames processed: {}", report.total_frames);
    println!("Accuracy: {:.2}%", report.accuracy());
    println!("FPS: {:.2}", report.fps());
    Ok(())
}
