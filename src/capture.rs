//! OpenCV-backed video capture

use image::RgbImage;
use opencv::{
    core::{AlgorithmHint, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

use crate::error::{Result, TrackError};
use crate::source::{FrameSource, VideoSource};

/// Live capture from a camera device or a video file.
///
/// The OS capture handle is released when the value drops, on every exit
/// path.
pub struct CaptureSource {
    cap: VideoCapture,
}

impl CaptureSource {
    /// Open the given source. A source that cannot be opened is fatal to
    /// the run; there is no retry.
    pub fn open(source: &VideoSource) -> Result<Self> {
        let cap = match source {
            VideoSource::Camera(index) => VideoCapture::new(*index, videoio::CAP_ANY),
            VideoSource::File(path) => VideoCapture::from_file(path, videoio::CAP_ANY),
        }
        .map_err(|e| TrackError::source_open(format!("{source}: {e}")))?;

        let opened = cap
            .is_opened()
            .map_err(|e| TrackError::source_open(format!("{source}: {e}")))?;
        if !opened {
            return Err(TrackError::source_open(source.to_string()));
        }

        log::info!("opened video source: {source}");
        Ok(Self { cap })
    }
}

impl FrameSource for CaptureSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut mat = Mat::default();
        let grabbed = self
            .cap
            .read(&mut mat)
            .map_err(|e| TrackError::backend(format!("frame read failed: {e}")))?;
        if !grabbed || mat.empty() {
            return Ok(None);
        }
        Ok(Some(mat_to_rgb(&mat)?))
    }
}

/// Convert a BGR capture Mat into an `RgbImage`
pub fn mat_to_rgb(mat: &Mat) -> Result<RgbImage> {
    let mut rgb_mat = Mat::default();
    imgproc::cvt_color(
        mat,
        &mut rgb_mat,
        imgproc::COLOR_BGR2RGB,
        0,
        AlgorithmHint::ALGO_HINT_DEFAULT,
    )
    .map_err(|e| TrackError::backend(format!("color conversion failed: {e}")))?;

    let width = rgb_mat.cols() as u32;
    let height = rgb_mat.rows() as u32;
    let data = rgb_mat
        .data_bytes()
        .map_err(|e| TrackError::backend(format!("frame data extraction failed: {e}")))?
        .to_vec();

    RgbImage::from_vec(width, height, data)
        .ok_or_else(|| TrackError::backend("frame buffer size mismatch"))
}

/// Convert an `RgbImage` into a BGR Mat for display or OpenCV trackers
pub fn rgb_to_bgr_mat(img: &RgbImage) -> Result<Mat> {
    let data = img.as_raw();
    let rgb_mat = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            img.height() as i32,
            img.width() as i32,
            opencv::core::CV_8UC3,
            data.as_ptr() as *mut _,
            opencv::core::Mat_AUTO_STEP,
        )
    }
    .map_err(|e| TrackError::backend(format!("frame wrap failed: {e}")))?;

    let mut bgr_mat = Mat::default();
    imgproc::cvt_color(
        &rgb_mat,
        &mut bgr_mat,
        imgproc::COLOR_RGB2BGR,
        0,
        AlgorithmHint::ALGO_HINT_DEFAULT,
    )
    .map_err(|e| TrackError::backend(format!("color conversion failed: {e}")))?;
    Ok(bgr_mat)
}
