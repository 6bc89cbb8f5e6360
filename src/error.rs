//! Error type for the frame pipeline.
//!
//! The tracker itself never fails; errors only come from the external
//! collaborators driven by the pipeline.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("frame source failed: {0}")]
    FrameSource(#[source] BoxError),

    #[error("shape detector failed on frame {frame_index}: {source}")]
    Detector {
        frame_index: u64,
        #[source]
        source: BoxError,
    },

    #[error("frame {frame_index} is {got:?}, expected {expected:?}")]
    FrameSizeMismatch {
        frame_index: u64,
        expected: (u32, u32),
        got: (u32, u32),
    },

    #[error("invalid label font: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error("pipeline worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
