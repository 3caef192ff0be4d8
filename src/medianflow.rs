//! Forward-backward median-flow tracking
//!
//! Seeds a uniform point grid inside the current box every frame, tracks
//! it forward and backward with pyramidal Lucas-Kanade, keeps the half of
//! the points with the best forward-backward agreement, then moves the box
//! by the median displacement and rescales it by the median change in
//! pairwise point distances.

use image::RgbImage;

use crate::error::{Result, TrackError};
use crate::flow::{gray_from_rgb, lk, LkParams, Pyramid};
use crate::tracker_trait::{ObjectTracker, TrackUpdate};
use crate::types::{BoundingBox, Point};

/// Configuration of the median-flow tracker
#[derive(Debug, Clone)]
pub struct MedianFlowConfig {
    /// Points are seeded on a `grid_size` x `grid_size` lattice
    pub grid_size: usize,
    /// Fraction of the box inset on each side before seeding
    pub margin_frac: f32,
    /// Pyramid depth used for both frames
    pub pyramid_levels: usize,
    /// Points with forward-backward error above this are always dropped
    pub fb_max_error: f32,
    /// Minimum surviving points for the update to count as located
    pub min_points: usize,
    pub lk: LkParams,
}

impl Default for MedianFlowConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            margin_frac: 0.1,
            pyramid_levels: 3,
            fb_max_error: 2.0,
            min_points: 8,
            lk: LkParams::default(),
        }
    }
}

/// Native forward-backward median-flow tracker
pub struct MedianFlowTracker {
    config: MedianFlowConfig,
    prev: Option<Pyramid>,
    roi: Option<BoundingBox>,
}

impl MedianFlowTracker {
    pub fn new(config: MedianFlowConfig) -> Self {
        Self {
            config,
            prev: None,
            roi: None,
        }
    }

    /// Uniform lattice of seed points inside the inset box
    fn seed_points(&self, roi: &BoundingBox) -> Vec<Point> {
        let n = self.config.grid_size;
        let inset_x = roi.width * self.config.margin_frac;
        let inset_y = roi.height * self.config.margin_frac;
        let x0 = roi.x + inset_x;
        let y0 = roi.y + inset_y;
        let span_x = (roi.width - 2.0 * inset_x).max(0.0);
        let span_y = (roi.height - 2.0 * inset_y).max(0.0);

        let mut points = Vec::with_capacity(n * n);
        for gy in 0..n {
            for gx in 0..n {
                let fx = if n > 1 { gx as f32 / (n - 1) as f32 } else { 0.5 };
                let fy = if n > 1 { gy as f32 / (n - 1) as f32 } else { 0.5 };
                points.push(Point::new(x0 + fx * span_x, y0 + fy * span_y));
            }
        }
        points
    }
}

impl Default for MedianFlowTracker {
    fn default() -> Self {
        Self::new(MedianFlowConfig::default())
    }
}

impl ObjectTracker for MedianFlowTracker {
    fn init(&mut self, frame: &RgbImage, roi: BoundingBox) -> Result<()> {
        if roi.is_empty() {
            return Err(TrackError::NoRegionSelected);
        }
        let gray = gray_from_rgb(frame);
        self.prev = Some(Pyramid::build(gray, self.config.pyramid_levels));
        self.roi = Some(roi);
        Ok(())
    }

    fn update(&mut self, frame: &RgbImage) -> Result<TrackUpdate> {
        let prev = self
            .prev
            .as_ref()
            .ok_or_else(|| TrackError::backend("update called before init"))?;
        let roi = self
            .roi
            .ok_or_else(|| TrackError::backend("update called before init"))?;

        let gray = gray_from_rgb(frame);
        let curr = Pyramid::build(gray, self.config.pyramid_levels);

        let seeds = self.seed_points(&roi);
        let forward = lk::track_points(prev, &curr, &seeds, &self.config.lk);

        // Forward-backward consistency: track the forward matches back to
        // the previous frame and measure how far they land from the seed.
        let mut pairs: Vec<(Point, Point, f32)> = Vec::new();
        for (seed, fwd) in seeds.iter().zip(&forward) {
            if let Some(fwd) = fwd {
                if let Some(back) = lk::track_point(&curr, prev, *fwd, &self.config.lk) {
                    pairs.push((*seed, *fwd, seed.distance(&back)));
                }
            }
        }

        let not_located = |roi| {
            Ok(TrackUpdate {
                located: false,
                roi,
            })
        };

        if pairs.len() < self.config.min_points {
            log::debug!("median flow: only {} consistent points", pairs.len());
            self.prev = Some(curr);
            return not_located(roi);
        }

        // Keep the better half by forward-backward error, with an
        // absolute cap on top.
        let mut errors: Vec<f32> = pairs.iter().map(|(_, _, e)| *e).collect();
        let median_error = median(&mut errors).unwrap_or(f32::INFINITY);
        pairs.retain(|(_, _, e)| *e <= median_error && *e <= self.config.fb_max_error);
        if pairs.len() < self.config.min_points {
            self.prev = Some(curr);
            return not_located(roi);
        }

        let mut dxs: Vec<f32> = pairs.iter().map(|(s, f, _)| f.x - s.x).collect();
        let mut dys: Vec<f32> = pairs.iter().map(|(s, f, _)| f.y - s.y).collect();
        let dx = median(&mut dxs).unwrap_or(0.0);
        let dy = median(&mut dys).unwrap_or(0.0);

        // Scale estimate: median ratio of pairwise distances
        let mut ratios = Vec::new();
        for i in 0..pairs.len() {
            for j in (i + 1)..pairs.len() {
                let before = pairs[i].0.distance(&pairs[j].0);
                let after = pairs[i].1.distance(&pairs[j].1);
                if before > 1.0 {
                    ratios.push(after / before);
                }
            }
        }
        let scale = match median(&mut ratios) {
            Some(s) if s.is_finite() && s > 0.0 => s,
            _ => 1.0,
        };

        let center = roi.center();
        let new_width = roi.width * scale;
        let new_height = roi.height * scale;
        let moved = BoundingBox::new(
            center.x + dx - new_width / 2.0,
            center.y + dy - new_height / 2.0,
            new_width,
            new_height,
        );
        let clamped = moved.clamp_to(frame.width(), frame.height());

        self.prev = Some(curr);
        if clamped.is_empty() {
            return not_located(roi);
        }
        self.roi = Some(clamped);

        Ok(TrackUpdate {
            located: true,
            roi: clamped,
        })
    }

    fn name(&self) -> &'static str {
        "MedianFlow"
    }
}

/// Median of an unsorted slice. `None` when empty.
fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Frame with a textured square whose pattern moves and scales with
    /// the square. The pattern is a coarse block mosaic so a small scale
    /// change keeps local appearance trackable.
    fn textured_frame(w: u32, h: u32, ox: f32, oy: f32, size: f32) -> RgbImage {
        let mut img = RgbImage::from_pixel(w, h, image::Rgb([25, 25, 25]));
        for y in 0..h {
            for x in 0..w {
                let lx = (x as f32 - ox) / size;
                let ly = (y as f32 - oy) / size;
                if (0.0..1.0).contains(&lx) && (0.0..1.0).contains(&ly) {
                    let ix = (lx * 8.0) as u32;
                    let iy = (ly * 8.0) as u32;
                    let v = (80 + (ix * 53 + iy * 97) % 140) as u8;
                    img.put_pixel(x, y, image::Rgb([v, v, v]));
                }
            }
        }
        img
    }

    #[test]
    fn test_median_of_odd_and_even() {
        assert_abs_diff_eq!(median(&mut [3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_abs_diff_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]).unwrap(), 2.5);
        assert!(median(&mut []).is_none());
    }

    #[test]
    fn test_init_rejects_empty_region() {
        let frame = textured_frame(160, 120, 40.0, 30.0, 40.0);
        let mut tracker = MedianFlowTracker::default();
        let result = tracker.init(&frame, BoundingBox::new(10.0, 10.0, 0.0, 0.0));
        assert!(matches!(result, Err(TrackError::NoRegionSelected)));
    }

    #[test]
    fn test_follows_translation() {
        let mut tracker = MedianFlowTracker::default();
        let roi = BoundingBox::new(40.0, 30.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 40.0, 30.0, 40.0), roi)
            .unwrap();

        let update = tracker
            .update(&textured_frame(160, 120, 44.0, 32.0, 40.0))
            .unwrap();
        assert!(update.located);
        let c = update.roi.center();
        assert!((c.x - 64.0).abs() < 1.5, "center x = {}", c.x);
        assert!((c.y - 52.0).abs() < 1.5, "center y = {}", c.y);
    }

    #[test]
    fn test_scale_growth_is_detected() {
        let mut tracker = MedianFlowTracker::default();
        let roi = BoundingBox::new(50.0, 35.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 50.0, 35.0, 40.0), roi)
            .unwrap();

        let update = tracker
            .update(&textured_frame(160, 120, 48.0, 33.0, 44.0))
            .unwrap();
        assert!(update.located);
        assert!(
            update.roi.width > roi.width,
            "width {} should grow",
            update.roi.width
        );
    }

    #[test]
    fn test_vanished_target_is_lost() {
        let mut tracker = MedianFlowTracker::default();
        let roi = BoundingBox::new(40.0, 30.0, 40.0, 40.0);
        tracker
            .init(&textured_frame(160, 120, 40.0, 30.0, 40.0), roi)
            .unwrap();

        let update = tracker
            .update(&RgbImage::from_pixel(160, 120, image::Rgb([25, 25, 25])))
            .unwrap();
        assert!(!update.located);
        // box estimate stays at the last known region
        assert_abs_diff_eq!(update.roi.x, roi.x);
    }

    #[test]
    fn test_update_before_init_is_an_error() {
        let frame = textured_frame(160, 120, 40.0, 30.0, 40.0);
        let mut tracker = MedianFlowTracker::default();
        assert!(tracker.update(&frame).is_err());
    }
}
