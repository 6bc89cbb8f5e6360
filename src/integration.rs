//! Integration module connecting the tracker to its external collaborators.
//!
//! This module provides the frame source and shape detector boundaries, the
//! conversion of raw detector output into tracker candidates, and the
//! per-frame pipeline that drives detection, tracking, rendering and
//! notification of a consumer.

mod builder;
mod detector;
mod pipeline;
mod source;

pub use builder::{CandidateBuilder, sample_color};
pub use detector::{RawShape, ShapeDetector};
pub use pipeline::{FrameSnapshot, PipelineConfig, PipelineEvent, PipelineHandle, TrackerPipeline};
pub use source::{FrameSource, IterFrameSource, VecFrameSource};
