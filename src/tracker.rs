mod candidate;
mod history;
mod shape;
mod shape_tracker;
mod store;
mod track;

pub use candidate::DetectionCandidate;
pub use history::{
    DEFAULT_GAP_THRESHOLD, HistoryEntry, HistorySegment, next_valid_point, previous_valid_point,
    split_history, split_history_with,
};
pub use shape::{
    Bounding, Color, Point, ShapeType, circle_area, color_distance, euclidean_distance,
    rectangle_area,
};
pub use shape_tracker::{ConflictPolicy, FrameReport, ShapeTracker, TrackerConfig};
pub use store::TrackStore;
pub use track::Track;
