//! Interactive single-object video tracking.
//!
//! A small library and two interactive binaries for following a
//! user-selected region through a video stream. Backends cover OpenCV's
//! CSRT, KCF and MOSSE trackers (behind the `opencv` feature) plus two
//! native paths: forward-backward median flow and sparse Lucas-Kanade
//! point tracking with motion trails.
//!
//! The session loop is I/O-free: frames come through the [`source::FrameSource`]
//! trait and every interactive surface sits behind
//! [`operator::OperatorInterface`], so full runs are testable on synthetic
//! frame sequences.

pub mod error;
pub mod flow;
pub mod medianflow;
pub mod operator;
pub mod overlay;
pub mod session;
pub mod source;
pub mod stats;
pub mod tracker_trait;
pub mod types;

#[cfg(feature = "opencv")]
pub mod capture;
#[cfg(feature = "opencv")]
pub mod tracker_opencv;
#[cfg(feature = "opencv")]
pub mod ui;

pub use error::{Result, TrackError};
pub use operator::OperatorInterface;
pub use session::SessionConfig;
pub use source::{FrameSequence, FrameSource, VideoSource};
pub use stats::{RunReport, RunStats};
pub use tracker_trait::{ObjectTracker, TrackUpdate, TrackerBackend};
pub use types::{BoundingBox, Point};
