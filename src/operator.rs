//! Operator interface: every interactive surface behind one trait
//!
//! The session loop talks only to this trait, which keeps it free of
//! console and window concerns and lets tests script a whole run.

use image::RgbImage;

use crate::error::Result;
use crate::source::VideoSource;
use crate::tracker_trait::TrackerBackend;
use crate::types::BoundingBox;

/// Interactive collaborator for a tracking run.
///
/// `select_source` and `select_backend` run once before capture opens;
/// `select_region` runs once on the first frame and blocks until the
/// operator confirms or cancels; `show_frame` and `poll_quit` run once
/// per loop iteration.
pub trait OperatorInterface {
    fn select_source(&mut self) -> Result<VideoSource>;

    fn select_backend(&mut self) -> Result<TrackerBackend>;

    fn select_region(&mut self, frame: &RgbImage) -> Result<BoundingBox>;

    fn show_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Check for a quit request. Called once per displayed frame.
    fn poll_quit(&mut self) -> Result<bool>;
}
