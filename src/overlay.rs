//! Frame overlay drawing: boxes, status labels, point markers, motion trails

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::types::{BoundingBox, Point};

/// Color used for successful tracking overlays
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
/// Color used for the lost-target label
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
/// Color used for flow trails
pub const YELLOW: Rgb<u8> = Rgb([255, 220, 0]);

/// Draw a thick hollow rectangle for a bounding box
pub fn draw_box(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: i32) {
    let (x, y, w, h) = bbox.to_pixels();
    let rect = Rect::at(x, y).of_size(w, h);

    for offset in 0..thickness {
        let expanded = Rect::at(rect.left() - offset, rect.top() - offset).of_size(
            rect.width() + (offset * 2) as u32,
            rect.height() + (offset * 2) as u32,
        );
        draw_hollow_rect_mut(img, expanded, color);
    }
}

/// Draw a small filled dot at a point
pub fn draw_marker(img: &mut RgbImage, p: &Point, color: Rgb<u8>) {
    draw_filled_circle_mut(img, (p.x.round() as i32, p.y.round() as i32), 2, color);
}

/// 5x7 bitmap pattern for a label character.
///
/// Only the glyphs the status labels and report overlay need; anything
/// else renders as a filled box.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0b00000; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

const CHAR_WIDTH: i32 = 6;
const CHAR_HEIGHT: i32 = 7;

/// Draw a text label using the built-in 5x7 bitmap font.
///
/// Text is uppercased; the font has no lowercase glyphs.
pub fn draw_label(
    img: &mut RgbImage,
    text: &str,
    x: i32,
    y: i32,
    color: Rgb<u8>,
    bg_color: Option<Rgb<u8>>,
) {
    if let Some(bg) = bg_color {
        let w = text.chars().count() as i32 * CHAR_WIDTH + 2;
        let h = CHAR_HEIGHT + 2;
        for dy in 0..h {
            for dx in 0..w {
                put_pixel_checked(img, x + dx, y + dy, bg);
            }
        }
    }

    for (i, ch) in text.to_uppercase().chars().enumerate() {
        let cx = x + 1 + i as i32 * CHAR_WIDTH;
        let cy = y + 1;
        let pattern = glyph(ch);
        for (row, &bits) in pattern.iter().enumerate() {
            for col in 0..5 {
                if (bits >> (4 - col)) & 1 == 1 {
                    put_pixel_checked(img, cx + col, cy + row as i32, color);
                }
            }
        }
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Accumulated motion trails for the optical-flow display.
///
/// Segments are kept for the whole run by default, so trails build up over
/// time. `with_limit` bounds memory for long-running use by discarding the
/// oldest segments once the cap is reached.
#[derive(Debug, Clone)]
pub struct TrailOverlay {
    segments: Vec<(Point, Point)>,
    max_segments: Option<usize>,
}

impl TrailOverlay {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            max_segments: None,
        }
    }

    pub fn with_limit(max_segments: usize) -> Self {
        Self {
            segments: Vec::new(),
            max_segments: Some(max_segments),
        }
    }

    pub fn push(&mut self, from: Point, to: Point) {
        self.segments.push((from, to));
        if let Some(cap) = self.max_segments {
            if self.segments.len() > cap {
                let excess = self.segments.len() - cap;
                self.segments.drain(..excess);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Render all accumulated segments onto a frame
    pub fn render(&self, img: &mut RgbImage, color: Rgb<u8>) {
        for (from, to) in &self.segments {
            draw_line_segment_mut(img, (from.x, from.y), (to.x, to.y), color);
        }
    }
}

impl Default for TrailOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_box_marks_border_pixels() {
        let mut img = RgbImage::new(40, 40);
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 15.0);
        draw_box(&mut img, &bbox, GREEN, 2);
        assert_eq!(*img.get_pixel(10, 10), GREEN);
        assert_eq!(*img.get_pixel(29, 24), GREEN);
        // interior untouched
        assert_eq!(*img.get_pixel(20, 17), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_box_clips_at_frame_edge() {
        let mut img = RgbImage::new(20, 20);
        let bbox = BoundingBox::new(15.0, 15.0, 30.0, 30.0);
        // must not panic on out-of-frame extents
        draw_box(&mut img, &bbox, RED, 2);
    }

    #[test]
    fn test_label_renders_pixels() {
        let mut img = RgbImage::new(120, 20);
        draw_label(&mut img, "Tracking", 2, 2, GREEN, None);
        let lit = img.pixels().filter(|p| **p == GREEN).count();
        assert!(lit > 20, "expected glyph pixels, got {lit}");
    }

    #[test]
    fn test_label_background_fills_behind_text() {
        let mut img = RgbImage::new(120, 20);
        let bg = Rgb([1, 2, 3]);
        draw_label(&mut img, "Lost", 0, 0, RED, Some(bg));
        assert_eq!(*img.get_pixel(0, 0), bg);
    }

    #[test]
    fn test_trail_unbounded_accumulates() {
        let mut trail = TrailOverlay::new();
        for i in 0..100 {
            let p = Point::new(i as f32, i as f32);
            trail.push(p, Point::new(p.x + 1.0, p.y));
        }
        assert_eq!(trail.len(), 100);
    }

    #[test]
    fn test_trail_limit_drops_oldest() {
        let mut trail = TrailOverlay::with_limit(10);
        for i in 0..25 {
            let p = Point::new(i as f32, 0.0);
            trail.push(p, Point::new(p.x, 1.0));
        }
        assert_eq!(trail.len(), 10);
        // oldest segments are gone; newest survive
        let mut img = RgbImage::new(30, 3);
        trail.render(&mut img, YELLOW);
        assert_eq!(*img.get_pixel(24, 0), YELLOW);
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
