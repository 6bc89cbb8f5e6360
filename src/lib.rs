//! Online identity tracking for circles and rectangles detected in video
//! frames, with per-frame annotation and a cumulative trajectory map.
//!
//! - [`tracker`]: association of per-frame candidates to persisted tracks
//! - [`render`]: frame annotation and trajectory drawing
//! - [`integration`]: frame source / detector boundary and the per-frame pipeline

pub mod error;
pub mod integration;
pub mod render;
pub mod tracker;

pub use error::{Error, Result};
pub use integration::{
    CandidateBuilder, FrameSnapshot, FrameSource, IterFrameSource, PipelineConfig, PipelineEvent,
    PipelineHandle, RawShape, ShapeDetector, TrackerPipeline, VecFrameSource,
};
pub use render::{RenderConfig, Renderer};
pub use tracker::{
    Bounding, Color, ConflictPolicy, DetectionCandidate, FrameReport, HistoryEntry,
    HistorySegment, Point, ShapeTracker, ShapeType, Track, TrackerConfig, split_history,
};
