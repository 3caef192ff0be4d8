//! Pyramidal Lucas-Kanade sparse point tracking

use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;

use super::pyramid::{bilinear, Pyramid};
use crate::types::Point;

/// Parameters of the iterative Lucas-Kanade solver
#[derive(Debug, Clone)]
pub struct LkParams {
    /// Half-width of the tracking window; the window is
    /// `(2 * radius + 1)` pixels square
    pub window_radius: usize,
    /// Maximum solver iterations per pyramid level
    pub max_iterations: usize,
    /// Convergence threshold on the iteration step, in pixels
    pub epsilon: f32,
    /// Minimum normalized eigenvalue of the gradient matrix; windows
    /// below this have too little texture to track
    pub min_eigenvalue: f32,
    /// Maximum mean absolute intensity residual between the matched
    /// windows; larger residuals mark the point as not found
    pub max_residual: f32,
}

impl Default for LkParams {
    fn default() -> Self {
        Self {
            window_radius: 7,
            max_iterations: 10,
            epsilon: 0.03,
            min_eigenvalue: 1e-4,
            max_residual: 20.0,
        }
    }
}

/// Track a single point from `prev` to `curr`.
///
/// Returns the new position, or `None` when the point left the image,
/// sits on a textureless window, or the solve diverged.
pub fn track_point(prev: &Pyramid, curr: &Pyramid, p: Point, params: &LkParams) -> Option<Point> {
    let levels = prev.num_levels().min(curr.num_levels());
    let radius = params.window_radius as isize;
    let window_area = ((2 * radius + 1) * (2 * radius + 1)) as f32;

    let mut flow = Vector2::new(0.0f32, 0.0f32);

    for level in (0..levels).rev() {
        let scale = 1.0 / (1 << level) as f32;
        let px = p.x * scale;
        let py = p.y * scale;

        let prev_img = &prev.levels[level];
        let curr_img = &curr.levels[level];

        if !in_bounds(prev_img.dim(), px, py, radius) {
            return None;
        }

        // Template values and spatial gradients around the point in the
        // previous image. Gradients use central differences on bilinear
        // samples, so sub-pixel positions are handled uniformly.
        let side = (2 * radius + 1) as usize;
        let mut template = vec![0.0f32; side * side];
        let mut grad_x = vec![0.0f32; side * side];
        let mut grad_y = vec![0.0f32; side * side];

        let mut gxx = 0.0f32;
        let mut gxy = 0.0f32;
        let mut gyy = 0.0f32;

        for (wi, dy) in (-radius..=radius).enumerate() {
            for (wj, dx) in (-radius..=radius).enumerate() {
                let sx = px + dx as f32;
                let sy = py + dy as f32;
                let idx = wi * side + wj;
                template[idx] = bilinear(prev_img, sx, sy);
                let ix = (bilinear(prev_img, sx + 1.0, sy) - bilinear(prev_img, sx - 1.0, sy)) / 2.0;
                let iy = (bilinear(prev_img, sx, sy + 1.0) - bilinear(prev_img, sx, sy - 1.0)) / 2.0;
                grad_x[idx] = ix;
                grad_y[idx] = iy;
                gxx += ix * ix;
                gxy += ix * iy;
                gyy += iy * iy;
            }
        }

        let trace = gxx + gyy;
        let diff = gxx - gyy;
        let min_eig = (trace - (diff * diff + 4.0 * gxy * gxy).sqrt()) / 2.0;
        if min_eig / window_area < params.min_eigenvalue {
            return None;
        }

        let gradient_matrix = Matrix2::new(gxx, gxy, gxy, gyy);
        let inv = gradient_matrix.try_inverse()?;

        for _ in 0..params.max_iterations {
            let tx = px + flow.x;
            let ty = py + flow.y;
            if !in_bounds(curr_img.dim(), tx, ty, radius) {
                return None;
            }

            let mut bx = 0.0f32;
            let mut by = 0.0f32;
            for (wi, dy) in (-radius..=radius).enumerate() {
                for (wj, dx) in (-radius..=radius).enumerate() {
                    let idx = wi * side + wj;
                    let residual =
                        template[idx] - bilinear(curr_img, tx + dx as f32, ty + dy as f32);
                    bx += residual * grad_x[idx];
                    by += residual * grad_y[idx];
                }
            }

            let step = inv * Vector2::new(bx, by);
            flow += step;
            if step.norm() < params.epsilon {
                break;
            }
        }

        if level > 0 {
            flow *= 2.0;
        }
    }

    let result = Point::new(p.x + flow.x, p.y + flow.y);
    let prev_base = &prev.levels[0];
    let curr_base = &curr.levels[0];
    if !in_bounds(curr_base.dim(), result.x, result.y, radius) {
        return None;
    }

    // Reject matches whose appearance no longer agrees with the template
    let mut residual = 0.0f32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let t = bilinear(prev_base, p.x + dx as f32, p.y + dy as f32);
            let m = bilinear(curr_base, result.x + dx as f32, result.y + dy as f32);
            residual += (t - m).abs();
        }
    }
    if residual / window_area > params.max_residual {
        return None;
    }

    Some(result)
}

/// Track many points in parallel. Output order matches input order;
/// lost points come back as `None`.
pub fn track_points(
    prev: &Pyramid,
    curr: &Pyramid,
    points: &[Point],
    params: &LkParams,
) -> Vec<Option<Point>> {
    points
        .par_iter()
        .map(|p| track_point(prev, curr, *p, params))
        .collect()
}

fn in_bounds(dim: (usize, usize), x: f32, y: f32, radius: isize) -> bool {
    let (rows, cols) = dim;
    let margin = (radius + 1) as f32;
    x >= margin && y >= margin && x < cols as f32 - margin && y < rows as f32 - margin
}
