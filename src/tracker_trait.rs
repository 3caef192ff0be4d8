//! Unified tracker interface and the closed set of selectable backends

use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::types::BoundingBox;

/// Result of one tracker update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackUpdate {
    /// Whether the backend located the target in this frame
    pub located: bool,
    /// Best estimate of the target region. May be stale when `located`
    /// is false.
    pub roi: BoundingBox,
}

/// Common interface for single-object trackers.
///
/// `init` is called exactly once with the user-selected region; `update`
/// is called once per frame, strictly in frame order. Backends report
/// whether the target was located but not why tracking failed.
pub trait ObjectTracker {
    fn init(&mut self, frame: &RgbImage, roi: BoundingBox) -> Result<()>;

    fn update(&mut self, frame: &RgbImage) -> Result<TrackUpdate>;

    /// Backend name for logging and display
    fn name(&self) -> &'static str;

    /// Draw backend-specific extras (e.g. flow trails) onto the output
    /// frame. Most backends have nothing to add.
    fn annotate(&self, _frame: &mut RgbImage) {}
}

/// The selectable tracker backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerBackend {
    /// Discriminative correlation filter with channel and spatial
    /// reliability. Most accurate of the set, slowest.
    Csrt,
    /// Kernelized correlation filter. Good accuracy at several times CSRT
    /// speed.
    Kcf,
    /// Minimum output sum of squared error filter. Very fast, grayscale
    /// only, drifts under appearance change.
    Mosse,
    /// Forward-backward median flow. Fast, handles smooth motion and
    /// scale change, fails on occlusion.
    MedianFlow,
    /// Sparse Lucas-Kanade point tracking over corners detected in the
    /// selected region, with cumulative motion trails.
    OpticalFlow,
}

impl TrackerBackend {
    pub fn all() -> [TrackerBackend; 5] {
        [
            Self::Csrt,
            Self::Kcf,
            Self::Mosse,
            Self::MedianFlow,
            Self::OpticalFlow,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Csrt => "CSRT",
            Self::Kcf => "KCF",
            Self::Mosse => "MOSSE",
            Self::MedianFlow => "MedianFlow",
            Self::OpticalFlow => "OpticalFlow",
        }
    }

    /// One-line menu description shown by the interactive selector
    pub fn menu_line(&self) -> &'static str {
        match self {
            Self::Csrt => "CSRT (high accuracy, slower)",
            Self::Kcf => "KCF (balanced speed and accuracy)",
            Self::Mosse => "MOSSE (fastest, least robust)",
            Self::MedianFlow => "MedianFlow (fast, good for smooth motion)",
            Self::OpticalFlow => "Optical flow points (draws motion trails)",
        }
    }

    /// Map a single-character menu selection to a backend
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Csrt),
            "2" => Some(Self::Kcf),
            "3" => Some(Self::Mosse),
            "4" => Some(Self::MedianFlow),
            "5" => Some(Self::OpticalFlow),
            _ => None,
        }
    }

    /// Instantiate the backend.
    ///
    /// CSRT, KCF and MOSSE wrap OpenCV trackers and are only available
    /// with the `opencv` feature; MedianFlow and OpticalFlow are native.
    pub fn create(self) -> Result<Box<dyn ObjectTracker>> {
        match self {
            Self::MedianFlow => Ok(Box::new(crate::medianflow::MedianFlowTracker::default())),
            Self::OpticalFlow => Ok(Box::new(crate::flow::FlowTracker::default())),
            #[cfg(feature = "opencv")]
            Self::Csrt => Ok(Box::new(crate::tracker_opencv::CsrtTracker::new()?)),
            #[cfg(feature = "opencv")]
            Self::Kcf => Ok(Box::new(crate::tracker_opencv::KcfTracker::new()?)),
            #[cfg(feature = "opencv")]
            Self::Mosse => Ok(Box::new(crate::tracker_opencv::MosseTracker::new()?)),
            #[cfg(not(feature = "opencv"))]
            Self::Csrt | Self::Kcf | Self::Mosse => {
                Err(TrackError::BackendUnavailable(self.name()))
            }
        }
    }
}

impl fmt::Display for TrackerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TrackerBackend {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csrt" => Ok(Self::Csrt),
            "kcf" => Ok(Self::Kcf),
            "mosse" => Ok(Self::Mosse),
            "medianflow" | "median-flow" => Ok(Self::MedianFlow),
            "flow" | "opticalflow" | "optical-flow" => Ok(Self::OpticalFlow),
            other => Err(TrackError::InvalidBackendChoice(other.to_string())),
        }
    }
}
