//! Console and window operator backed by OpenCV's highgui

use std::io::{self, Write};

use image::RgbImage;
use opencv::highgui;

use crate::capture::rgb_to_bgr_mat;
use crate::error::{Result, TrackError};
use crate::operator::OperatorInterface;
use crate::source::VideoSource;
use crate::tracker_trait::TrackerBackend;
use crate::types::BoundingBox;

const QUIT_KEY: i32 = 'q' as i32;

/// Interactive operator: console prompts plus a highgui display window
pub struct HighguiOperator {
    window: String,
}

impl HighguiOperator {
    pub fn new(window: &str) -> Self {
        Self {
            window: window.to_string(),
        }
    }

    fn prompt(&self, text: &str) -> Result<String> {
        print!("{text}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Default for HighguiOperator {
    fn default() -> Self {
        Self::new("Tracking")
    }
}

impl OperatorInterface for HighguiOperator {
    fn select_source(&mut self) -> Result<VideoSource> {
        let input =
            self.prompt("Enter the path to the video file (or press Enter to use the webcam): ")?;
        Ok(VideoSource::parse(&input))
    }

    fn select_backend(&mut self) -> Result<TrackerBackend> {
        println!("Select tracking algorithm:");
        for (i, backend) in TrackerBackend::all().iter().enumerate() {
            println!("  {}. {}", i + 1, backend.menu_line());
        }
        let choice = self.prompt("Choice: ")?;
        TrackerBackend::from_menu_choice(&choice)
            .ok_or(TrackError::InvalidBackendChoice(choice))
    }

    fn select_region(&mut self, frame: &RgbImage) -> Result<BoundingBox> {
        println!("Select the object to track and press ENTER or SPACE. Press 'c' to cancel.");
        let mat = rgb_to_bgr_mat(frame)?;
        let rect = highgui::select_roi(&self.window, &mat, false, false, true)
            .map_err(|e| TrackError::backend(format!("region selection failed: {e}")))?;
        highgui::destroy_window(&self.window)
            .map_err(|e| TrackError::backend(format!("window teardown failed: {e}")))?;

        if rect.width <= 0 || rect.height <= 0 {
            return Err(TrackError::NoRegionSelected);
        }
        Ok(BoundingBox::new(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ))
    }

    fn show_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let mat = rgb_to_bgr_mat(frame)?;
        highgui::imshow(&self.window, &mat)
            .map_err(|e| TrackError::backend(format!("display failed: {e}")))
    }

    fn poll_quit(&mut self) -> Result<bool> {
        let key = highgui::wait_key(1)
            .map_err(|e| TrackError::backend(format!("key poll failed: {e}")))?;
        Ok(key == QUIT_KEY)
    }
}

impl Drop for HighguiOperator {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}
