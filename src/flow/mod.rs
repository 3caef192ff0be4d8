//! Sparse optical-flow tracking
//!
//! Detects corners once inside the selected region, then follows them
//! frame to frame with pyramidal Lucas-Kanade. Points whose flow cannot
//! be found are dropped and never re-detected, so the tracked set only
//! shrinks. The reported box is the bounding hull of the survivors.

pub mod corners;
pub mod lk;
pub mod pyramid;

use image::RgbImage;

use crate::error::{Result, TrackError};
use crate::overlay::{self, TrailOverlay};
use crate::tracker_trait::{ObjectTracker, TrackUpdate};
use crate::types::{BoundingBox, Point};

pub use corners::CornerConfig;
pub use lk::LkParams;
pub use pyramid::{gray_from_rgb, Pyramid};

/// Configuration of the optical-flow tracker
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub corners: CornerConfig,
    pub lk: LkParams,
    /// Pyramid depth used for both frames
    pub pyramid_levels: usize,
    /// Optional cap on accumulated trail segments. `None` keeps the
    /// full run's trails, which grows without bound on long runs.
    pub trail_limit: Option<usize>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            corners: CornerConfig::default(),
            lk: LkParams::default(),
            pyramid_levels: 3,
            trail_limit: None,
        }
    }
}

/// Sparse Lucas-Kanade point tracker with cumulative motion trails
pub struct FlowTracker {
    config: FlowConfig,
    prev: Option<Pyramid>,
    points: Vec<Point>,
    last_roi: BoundingBox,
    trail: TrailOverlay,
}

impl FlowTracker {
    pub fn new(config: FlowConfig) -> Self {
        let trail = match config.trail_limit {
            Some(cap) => TrailOverlay::with_limit(cap),
            None => TrailOverlay::new(),
        };
        Self {
            config,
            prev: None,
            points: Vec::new(),
            last_roi: BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            trail,
        }
    }

    /// Currently surviving feature points
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl Default for FlowTracker {
    fn default() -> Self {
        Self::new(FlowConfig::default())
    }
}

impl ObjectTracker for FlowTracker {
    fn init(&mut self, frame: &RgbImage, roi: BoundingBox) -> Result<()> {
        let gray = gray_from_rgb(frame);
        let pyramid = Pyramid::build(gray, self.config.pyramid_levels);
        let points = corners::detect_in_region(&pyramid.levels[0], &roi, &self.config.corners);
        if points.is_empty() {
            return Err(TrackError::backend(
                "no trackable corners in the selected region",
            ));
        }
        log::info!("optical flow: {} corners selected", points.len());
        self.points = points;
        self.last_roi = roi;
        self.prev = Some(pyramid);
        self.trail.clear();
        Ok(())
    }

    fn update(&mut self, frame: &RgbImage) -> Result<TrackUpdate> {
        let prev = self
            .prev
            .as_ref()
            .ok_or_else(|| TrackError::backend("update called before init"))?;

        let gray = gray_from_rgb(frame);
        let curr = Pyramid::build(gray, self.config.pyramid_levels);

        let tracked = lk::track_points(prev, &curr, &self.points, &self.config.lk);

        let mut survivors = Vec::with_capacity(self.points.len());
        for (old, new) in self.points.iter().zip(tracked) {
            if let Some(new) = new {
                self.trail.push(*old, new);
                survivors.push(new);
            }
        }
        log::debug!(
            "optical flow: {} of {} points survived",
            survivors.len(),
            self.points.len()
        );

        self.points = survivors;
        self.prev = Some(curr);

        if let Some(hull) = BoundingBox::hull_of(&self.points) {
            self.last_roi = hull.clamp_to(frame.width(), frame.height());
        }

        Ok(TrackUpdate {
            located: !self.points.is_empty(),
            roi: self.last_roi,
        })
    }

    fn name(&self) -> &'static str {
        "OpticalFlow"
    }

    fn annotate(&self, frame: &mut RgbImage) {
        self.trail.render(frame, overlay::YELLOW);
        for p in &self.points {
            overlay::draw_marker(frame, p, overlay::GREEN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame with a textured square whose pattern moves with the square
    fn textured_frame(w: u32, h: u32, ox: u32, oy: u32, size: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(w, h, image::Rgb([25, 25, 25]));
        for y in oy..(oy + size).min(h) {
            for x in ox..(ox + size).min(w) {
                let lx = x - ox;
                let ly = y - oy;
                let v = (90 + (lx * 37 + ly * 59) % 113) as u8;
                img.put_pixel(x, y, image::Rgb([v, v, v]));
            }
        }
        img
    }

    #[test]
    fn test_init_fails_on_flat_region() {
        let frame = RgbImage::from_pixel(160, 120, image::Rgb([80, 80, 80]));
        let mut tracker = FlowTracker::default();
        let result = tracker.init(&frame, BoundingBox::new(40.0, 30.0, 40.0, 40.0));
        assert!(matches!(result, Err(TrackError::Backend(_))));
    }

    #[test]
    fn test_update_before_init_is_an_error() {
        let frame = textured_frame(160, 120, 40, 30, 40);
        let mut tracker = FlowTracker::default();
        assert!(tracker.update(&frame).is_err());
    }

    #[test]
    fn test_hull_follows_motion() {
        let mut tracker = FlowTracker::default();
        let roi = BoundingBox::new(40.0, 30.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 40, 30, 40), roi)
            .unwrap();

        let update = tracker
            .update(&textured_frame(160, 120, 44, 33, 40))
            .unwrap();
        assert!(update.located);
        let shift = update.roi.center();
        let start = roi.center();
        assert!(
            (shift.x - start.x - 4.0).abs() < 2.0,
            "center moved by {}",
            shift.x - start.x
        );
        assert!(
            (shift.y - start.y - 3.0).abs() < 2.0,
            "center moved by {}",
            shift.y - start.y
        );
    }

    #[test]
    fn test_point_count_never_increases() {
        let mut tracker = FlowTracker::default();
        let roi = BoundingBox::new(40.0, 30.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 40, 30, 40), roi)
            .unwrap();

        let mut previous = tracker.points().len();
        for step in 1..6u32 {
            tracker
                .update(&textured_frame(160, 120, 40 + step * 3, 30 + step * 2, 40))
                .unwrap();
            let now = tracker.points().len();
            assert!(now <= previous, "point set grew: {previous} -> {now}");
            previous = now;
        }
    }

    #[test]
    fn test_all_points_lost_reports_not_located() {
        let mut tracker = FlowTracker::default();
        let roi = BoundingBox::new(40.0, 30.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 40, 30, 40), roi)
            .unwrap();

        // target vanishes entirely
        let update = tracker
            .update(&RgbImage::from_pixel(160, 120, image::Rgb([25, 25, 25])))
            .unwrap();
        assert!(!update.located);
        assert!(tracker.points().is_empty());
    }

    #[test]
    fn test_trails_accumulate_across_updates() {
        let mut tracker = FlowTracker::default();
        let roi = BoundingBox::new(40.0, 30.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 40, 30, 40), roi)
            .unwrap();

        tracker
            .update(&textured_frame(160, 120, 42, 31, 40))
            .unwrap();
        let after_one = tracker.trail.len();
        assert!(after_one > 0);
        tracker
            .update(&textured_frame(160, 120, 44, 32, 40))
            .unwrap();
        assert!(tracker.trail.len() >= after_one);
    }
}
