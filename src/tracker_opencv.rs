//! Adapters over OpenCV's pre-built single-object trackers

use image::RgbImage;
use opencv::{
    core::{Ptr, Rect, Rect2d},
    prelude::*,
    tracking::{self, TrackerCSRT, TrackerCSRT_Params, TrackerKCF, TrackerKCF_Params},
};

use crate::capture::rgb_to_bgr_mat;
use crate::error::{Result, TrackError};
use crate::tracker_trait::{ObjectTracker, TrackUpdate};
use crate::types::BoundingBox;

fn to_rect(bbox: &BoundingBox) -> Rect {
    let (x, y, w, h) = bbox.to_pixels();
    Rect::new(x, y, w as i32, h as i32)
}

fn from_rect(rect: &Rect) -> BoundingBox {
    BoundingBox::new(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

/// Discriminative correlation filter tracker with channel and spatial
/// reliability. The most accurate backend here, and the slowest.
pub struct CsrtTracker {
    inner: Ptr<TrackerCSRT>,
    last: Rect,
}

impl CsrtTracker {
    pub fn new() -> Result<Self> {
        let params = TrackerCSRT_Params::default()
            .map_err(|e| TrackError::backend(format!("CSRT params: {e}")))?;
        let inner = TrackerCSRT::create(&params)
            .map_err(|e| TrackError::backend(format!("CSRT create: {e}")))?;
        Ok(Self {
            inner,
            last: Rect::default(),
        })
    }
}

impl ObjectTracker for CsrtTracker {
    fn init(&mut self, frame: &RgbImage, roi: BoundingBox) -> Result<()> {
        let mat = rgb_to_bgr_mat(frame)?;
        self.last = to_rect(&roi);
        self.inner
            .init(&mat, self.last)
            .map_err(|e| TrackError::backend(format!("CSRT init: {e}")))
    }

    fn update(&mut self, frame: &RgbImage) -> Result<TrackUpdate> {
        let mat = rgb_to_bgr_mat(frame)?;
        let mut rect = self.last;
        // A per-frame failure from the wrapped tracker means the target
        // was not located; it is not fatal to the session.
        let located = matches!(self.inner.update(&mat, &mut rect), Ok(true));
        if located {
            self.last = rect;
        }
        Ok(TrackUpdate {
            located,
            roi: from_rect(&self.last),
        })
    }

    fn name(&self) -> &'static str {
        "CSRT"
    }
}

/// Kernelized correlation filter tracker. Several times faster than CSRT
/// with good accuracy.
pub struct KcfTracker {
    inner: Ptr<TrackerKCF>,
    last: Rect,
}

impl KcfTracker {
    pub fn new() -> Result<Self> {
        let params = TrackerKCF_Params::default()
            .map_err(|e| TrackError::backend(format!("KCF params: {e}")))?;
        let inner = TrackerKCF::create(params)
            .map_err(|e| TrackError::backend(format!("KCF create: {e}")))?;
        Ok(Self {
            inner,
            last: Rect::default(),
        })
    }
}

impl ObjectTracker for KcfTracker {
    fn init(&mut self, frame: &RgbImage, roi: BoundingBox) -> Result<()> {
        let mat = rgb_to_bgr_mat(frame)?;
        self.last = to_rect(&roi);
        self.inner
            .init(&mat, self.last)
            .map_err(|e| TrackError::backend(format!("KCF init: {e}")))
    }

    fn update(&mut self, frame: &RgbImage) -> Result<TrackUpdate> {
        let mat = rgb_to_bgr_mat(frame)?;
        let mut rect = self.last;
        let located = matches!(self.inner.update(&mat, &mut rect), Ok(true));
        if located {
            self.last = rect;
        }
        Ok(TrackUpdate {
            located,
            roi: from_rect(&self.last),
        })
    }

    fn name(&self) -> &'static str {
        "KCF"
    }
}

/// Minimum output sum of squared error filter tracker, via OpenCV's
/// legacy tracking API. Very fast, grayscale only.
pub struct MosseTracker {
    inner: Ptr<tracking::legacy::TrackerMOSSE>,
    last: Rect2d,
}

impl MosseTracker {
    pub fn new() -> Result<Self> {
        let inner = tracking::legacy::TrackerMOSSE::create()
            .map_err(|e| TrackError::backend(format!("MOSSE create: {e}")))?;
        Ok(Self {
            inner,
            last: Rect2d::default(),
        })
    }
}

impl ObjectTracker for MosseTracker {
    fn init(&mut self, frame: &RgbImage, roi: BoundingBox) -> Result<()> {
        let mat = rgb_to_bgr_mat(frame)?;
        self.last = Rect2d::new(
            roi.x as f64,
            roi.y as f64,
            roi.width as f64,
            roi.height as f64,
        );
        let ok = self
            .inner
            .init(&mat, self.last)
            .map_err(|e| TrackError::backend(format!("MOSSE init: {e}")))?;
        if !ok {
            return Err(TrackError::backend("MOSSE init rejected the region"));
        }
        Ok(())
    }

    fn update(&mut self, frame: &RgbImage) -> Result<TrackUpdate> {
        let mat = rgb_to_bgr_mat(frame)?;
        let mut rect = self.last;
        let located = matches!(self.inner.update(&mat, &mut rect), Ok(true));
        if located {
            self.last = rect;
        }
        Ok(TrackUpdate {
            located,
            roi: BoundingBox::new(
                self.last.x as f32,
                self.last.y as f32,
                self.last.width as f32,
                self.last.height as f32,
            ),
        })
    }

    fn name(&self) -> &'static str {
        "MOSSE"
    }
}
