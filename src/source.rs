//! Video sources and the frame-source abstraction

use std::collections::VecDeque;
use std::fmt;

use image::RgbImage;

use crate::error::Result;

/// Where frames come from: a camera device or a video file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Camera(i32),
    File(String),
}

impl VideoSource {
    /// Parse free-form console input into a source.
    ///
    /// Empty input selects the default camera, a bare integer selects that
    /// camera index, anything else is taken as a file path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Camera(0);
        }
        match trimmed.parse::<i32>() {
            Ok(index) => Self::Camera(index),
            Err(_) => Self::File(trimmed.to_string()),
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera(index) => write!(f, "camera {index}"),
            Self::File(path) => write!(f, "{path}"),
        }
    }
}

/// A sequential supplier of frames.
///
/// `Ok(None)` signals end of stream; it is a normal termination condition,
/// not an error.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// In-memory frame source backed by a pre-built sequence.
///
/// Used by tests and offline runs; satisfies the same contract as a live
/// capture device.
pub struct FrameSequence {
    frames: VecDeque<RgbImage>,
}

impl FrameSequence {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for FrameSequence {
    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }
}
