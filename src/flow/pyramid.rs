//! Gray-scale image pyramids for coarse-to-fine tracking

use image::RgbImage;
use ndarray::Array2;

/// Convert an RGB frame to a float gray-scale plane (BT.601 weights).
///
/// Layout is `(row, col)`, values in `[0, 255]`.
pub fn gray_from_rgb(img: &RgbImage) -> Array2<f32> {
    let (width, height) = img.dimensions();
    let mut gray = Array2::zeros((height as usize, width as usize));
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        gray[(y as usize, x as usize)] =
            0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    }
    gray
}

/// Gaussian-style image pyramid. Level 0 is the full-resolution plane;
/// each further level is blurred and decimated by two.
#[derive(Debug, Clone)]
pub struct Pyramid {
    pub levels: Vec<Array2<f32>>,
}

impl Pyramid {
    /// Build a pyramid with up to `n_levels` levels. Construction stops
    /// early once a level would get smaller than the tracking window
    /// could use.
    pub fn build(base: Array2<f32>, n_levels: usize) -> Self {
        let mut levels = Vec::with_capacity(n_levels.max(1));
        levels.push(base);

        while levels.len() < n_levels {
            let prev = &levels[levels.len() - 1];
            let (rows, cols) = prev.dim();
            if rows / 2 < 16 || cols / 2 < 16 {
                break;
            }
            let blurred = binomial_blur(prev);
            let mut next = Array2::zeros((rows / 2, cols / 2));
            for r in 0..rows / 2 {
                for c in 0..cols / 2 {
                    next[(r, c)] = blurred[(r * 2, c * 2)];
                }
            }
            levels.push(next);
        }

        Self { levels }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }
}

/// Separable 5-tap binomial blur (1 4 6 4 1)/16 with clamped borders
fn binomial_blur(img: &Array2<f32>) -> Array2<f32> {
    const KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];
    let (rows, cols) = img.dim();

    let mut horizontal = Array2::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, weight) in KERNEL.iter().enumerate() {
                let cc = (c as isize + k as isize - 2).clamp(0, cols as isize - 1) as usize;
                acc += weight * img[(r, cc)];
            }
            horizontal[(r, c)] = acc;
        }
    }

    let mut out = Array2::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, weight) in KERNEL.iter().enumerate() {
                let rr = (r as isize + k as isize - 2).clamp(0, rows as isize - 1) as usize;
                acc += weight * horizontal[(rr, c)];
            }
            out[(r, c)] = acc;
        }
    }
    out
}

/// Bilinear sample at a sub-pixel position, clamped to the image bounds
pub fn bilinear(img: &Array2<f32>, x: f32, y: f32) -> f32 {
    let (rows, cols) = img.dim();
    let x = x.clamp(0.0, cols as f32 - 1.0);
    let y = y.clamp(0.0, rows as f32 - 1.0);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(cols - 1);
    let y1 = (y0 + 1).min(rows - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let top = img[(y0, x0)] * (1.0 - fx) + img[(y0, x1)] * fx;
    let bottom = img[(y1, x0)] * (1.0 - fx) + img[(y1, x1)] * fx;
    top * (1.0 - fy) + bottom * fy
}
