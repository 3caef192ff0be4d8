//! The render loop driving a whole tracking run

use crate::error::{Result, TrackError};
use crate::operator::OperatorInterface;
use crate::overlay;
use crate::source::FrameSource;
use crate::stats::{RunReport, RunStats};
use crate::tracker_trait::ObjectTracker;

/// Presentation options for the per-frame overlay
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub box_thickness: i32,
    pub label_success: &'static str,
    pub label_lost: &'static str,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            box_thickness: 2,
            label_success: "Tracking",
            label_lost: "Lost",
        }
    }
}

/// Run one tracking session to completion.
///
/// Reads the first frame, asks the operator for a region, initializes the
/// tracker, then loops: read, update, overlay, display, quit poll. Ends on
/// stream exhaustion or a quit request and returns the run statistics.
///
/// The first frame is consumed by region selection and tracker
/// initialization; it is not counted in the statistics.
pub fn run(
    source: &mut dyn FrameSource,
    operator: &mut dyn OperatorInterface,
    tracker: &mut dyn ObjectTracker,
    config: &SessionConfig,
) -> Result<RunReport> {
    let first = source.read_frame()?.ok_or(TrackError::EmptyFirstFrame)?;

    let roi = operator.select_region(&first)?;
    if roi.is_empty() {
        return Err(TrackError::NoRegionSelected);
    }
    tracker.init(&first, roi)?;
    log::info!("{} tracker initialized on {:?}", tracker.name(), roi);

    let mut stats = RunStats::new();

    loop {
        let Some(mut frame) = source.read_frame()? else {
            log::info!("end of video stream after {} frames", stats.total_frames());
            break;
        };

        let update = tracker.update(&frame)?;
        stats.record(update.located);

        if update.located {
            overlay::draw_box(&mut frame, &update.roi, overlay::GREEN, config.box_thickness);
            overlay::draw_label(&mut frame, config.label_success, 20, 20, overlay::GREEN, None);
        } else {
            overlay::draw_label(&mut frame, config.label_lost, 20, 20, overlay::RED, None);
        }
        tracker.annotate(&mut frame);

        operator.show_frame(&frame)?;
        if operator.poll_quit()? {
            log::info!("quit requested after {} frames", stats.total_frames());
            break;
        }
    }

    Ok(stats.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    use crate::source::{FrameSequence, VideoSource};
    use crate::tracker_trait::{TrackUpdate, TrackerBackend};
    use crate::types::BoundingBox;

    /// Scripted operator: fixed region, counts displayed frames, can quit
    /// after a set number of frames.
    struct ScriptedOperator {
        region: Option<BoundingBox>,
        shown: usize,
        quit_after: Option<usize>,
    }

    impl ScriptedOperator {
        fn with_region(region: BoundingBox) -> Self {
            Self {
                region: Some(region),
                shown: 0,
                quit_after: None,
            }
        }

        fn cancelling() -> Self {
            Self {
                region: None,
                shown: 0,
                quit_after: None,
            }
        }
    }

    impl OperatorInterface for ScriptedOperator {
        fn select_source(&mut self) -> Result<VideoSource> {
            Ok(VideoSource::Camera(0))
        }

        fn select_backend(&mut self) -> Result<TrackerBackend> {
            Ok(TrackerBackend::OpticalFlow)
        }

        fn select_region(&mut self, _frame: &RgbImage) -> Result<BoundingBox> {
            self.region.ok_or(TrackError::NoRegionSelected)
        }

        fn show_frame(&mut self, _frame: &RgbImage) -> Result<()> {
            self.shown += 1;
            Ok(())
        }

        fn poll_quit(&mut self) -> Result<bool> {
            Ok(matches!(self.quit_after, Some(n) if self.shown >= n))
        }
    }

    /// Tracker stub replaying a fixed outcome script
    struct ScriptedTracker {
        outcomes: Vec<bool>,
        updates: usize,
    }

    impl ScriptedTracker {
        fn new(outcomes: Vec<bool>) -> Self {
            Self {
                outcomes,
                updates: 0,
            }
        }
    }

    impl ObjectTracker for ScriptedTracker {
        fn init(&mut self, _frame: &RgbImage, _roi: BoundingBox) -> Result<()> {
            Ok(())
        }

        fn update(&mut self, _frame: &RgbImage) -> Result<TrackUpdate> {
            let located = self.outcomes.get(self.updates).copied().unwrap_or(false);
            self.updates += 1;
            Ok(TrackUpdate {
                located,
                roi: BoundingBox::new(10.0, 10.0, 20.0, 20.0),
            })
        }

        fn name(&self) -> &'static str {
            "Scripted"
        }
    }

    fn frames(n: usize) -> FrameSequence {
        FrameSequence::new(vec![RgbImage::from_pixel(64, 48, image::Rgb([9, 9, 9])); n])
    }

    #[test]
    fn test_runs_until_stream_exhaustion() {
        let mut source = frames(6);
        let mut operator = ScriptedOperator::with_region(BoundingBox::new(5.0, 5.0, 10.0, 10.0));
        let mut tracker = ScriptedTracker::new(vec![true; 5]);

        let report = run(
            &mut source,
            &mut operator,
            &mut tracker,
            &SessionConfig::default(),
        )
        .unwrap();

        // first frame goes to selection, five remain for tracking
        assert_eq!(report.total_frames, 5);
        assert_eq!(report.tracked_frames, 5);
        assert_eq!(operator.shown, 5);
        assert_eq!(tracker.updates, 5);
    }

    #[test]
    fn test_quit_stops_early() {
        let mut source = frames(20);
        let mut operator = ScriptedOperator::with_region(BoundingBox::new(5.0, 5.0, 10.0, 10.0));
        operator.quit_after = Some(3);
        let mut tracker = ScriptedTracker::new(vec![true; 20]);

        let report = run(
            &mut source,
            &mut operator,
            &mut tracker,
            &SessionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.total_frames, 3);
        assert_eq!(source.remaining(), 16);
    }

    #[test]
    fn test_empty_source_reports_empty_first_frame() {
        let mut source = frames(0);
        let mut operator = ScriptedOperator::with_region(BoundingBox::new(5.0, 5.0, 10.0, 10.0));
        let mut tracker = ScriptedTracker::new(vec![]);

        let result = run(
            &mut source,
            &mut operator,
            &mut tracker,
            &SessionConfig::default(),
        );
        assert!(matches!(result, Err(TrackError::EmptyFirstFrame)));
        assert_eq!(operator.shown, 0);
        assert_eq!(tracker.updates, 0);
    }

    #[test]
    fn test_cancelled_selection_aborts_before_init() {
        let mut source = frames(5);
        let mut operator = ScriptedOperator::cancelling();
        let mut tracker = ScriptedTracker::new(vec![true; 5]);

        let result = run(
            &mut source,
            &mut operator,
            &mut tracker,
            &SessionConfig::default(),
        );
        assert!(matches!(result, Err(TrackError::NoRegionSelected)));
        assert_eq!(tracker.updates, 0);
    }

    #[test]
    fn test_lost_frames_counted_in_accuracy() {
        let mut source = frames(5);
        let mut operator = ScriptedOperator::with_region(BoundingBox::new(5.0, 5.0, 10.0, 10.0));
        let mut tracker = ScriptedTracker::new(vec![true, false, true, false]);

        let report = run(
            &mut source,
            &mut operator,
            &mut tracker,
            &SessionConfig::default(),
        )
        .unwrap();

        assert_eq!(report.total_frames, 4);
        assert_eq!(report.tracked_frames, 2);
        assert!((report.accuracy() - 50.0).abs() < 1e-9);
    }
}
