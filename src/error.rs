//! Error types for the tracking library

use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors that can occur while setting up or running a tracking session
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("could not open video source: {0}")]
    SourceOpen(String),

    #[error("failed to grab first frame from source")]
    EmptyFirstFrame,

    #[error("invalid tracker choice: {0}")]
    InvalidBackendChoice(String),

    #[error("no region selected")]
    NoRegionSelected,

    #[error("tracker backend `{0}` requires the `opencv` feature")]
    BackendUnavailable(&'static str),

    #[error("tracker backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl TrackError {
    pub fn source_open<S: Into<String>>(msg: S) -> Self {
        Self::SourceOpen(msg.into())
    }

    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }
}
