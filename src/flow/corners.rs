//! Shi-Tomasi corner detection restricted to a region of interest

use ndarray::Array2;

use crate::types::{BoundingBox, Point};

/// Corner detection parameters
#[derive(Debug, Clone)]
pub struct CornerConfig {
    /// Keep at most this many corners
    pub max_points: usize,
    /// Response threshold relative to the strongest corner found
    pub quality_level: f32,
    /// Minimum spacing between accepted corners, in pixels
    pub min_distance: f32,
    /// Half-width of the structure-tensor summation block
    pub block_radius: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            max_points: 100,
            quality_level: 0.3,
            min_distance: 7.0,
            block_radius: 2,
        }
    }
}

/// Detect corners inside `region` of a gray-scale plane.
///
/// Response is the minimum eigenvalue of the local structure tensor;
/// candidates below `quality_level` of the strongest response are
/// discarded, the rest are greedily thinned by `min_distance` and capped
/// at `max_points`, strongest first.
pub fn detect_in_region(
    gray: &Array2<f32>,
    region: &BoundingBox,
    config: &CornerConfig,
) -> Vec<Point> {
    let (rows, cols) = gray.dim();
    let clamped = region.clamp_to(cols as u32, rows as u32);
    if clamped.is_empty() {
        return Vec::new();
    }

    let margin = config.block_radius + 1;
    let x0 = (clamped.x as usize).max(margin);
    let y0 = (clamped.y as usize).max(margin);
    let x1 = (clamped.right() as usize).min(cols - margin);
    let y1 = (clamped.bottom() as usize).min(rows - margin);
    if x0 >= x1 || y0 >= y1 {
        return Vec::new();
    }

    let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
    let mut max_response = 0.0f32;
    let r = config.block_radius as isize;

    for y in y0..y1 {
        for x in x0..x1 {
            let mut gxx = 0.0f32;
            let mut gxy = 0.0f32;
            let mut gyy = 0.0f32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let yy = (y as isize + dy) as usize;
                    let xx = (x as isize + dx) as usize;
                    let ix = (gray[(yy, xx + 1)] - gray[(yy, xx - 1)]) / 2.0;
                    let iy = (gray[(yy + 1, xx)] - gray[(yy - 1, xx)]) / 2.0;
                    gxx += ix * ix;
                    gxy += ix * iy;
                    gyy += iy * iy;
                }
            }
            let trace = gxx + gyy;
            let diff = gxx - gyy;
            let response = (trace - (diff * diff + 4.0 * gxy * gxy).sqrt()) / 2.0;
            if response > 0.0 {
                max_response = max_response.max(response);
                candidates.push((response, x, y));
            }
        }
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    let threshold = config.quality_level * max_response;
    candidates.retain(|(response, _, _)| *response >= threshold);
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let min_dist_sq = config.min_distance * config.min_distance;
    let mut accepted: Vec<Point> = Vec::new();
    for (_, x, y) in candidates {
        if accepted.len() >= config.max_points {
            break;
        }
        let p = Point::new(x as f32, y as f32);
        let spaced = accepted.iter().all(|q| {
            let dx = q.x - p.x;
            let dy = q.y - p.y;
            dx * dx + dy * dy >= min_dist_sq
        });
        if spaced {
            accepted.push(p);
        }
    }
    accepted
}
