//! Detection candidates and the gating rule used to associate them with tracks.

use crate::tracker::shape::{Bounding, Color, Point, ShapeType, color_distance, euclidean_distance};
use crate::tracker::track::Track;

/// Detection input for the tracker.
///
/// A candidate lives for one frame only: it is either absorbed into an
/// existing track or promoted into a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionCandidate {
    /// Raw geometry reported by the detector
    pub bounding: Bounding,
    /// Reference point used for matching
    pub center: Point,
    /// Color sampled from the frame at `center`
    pub color: Color,
}

impl DetectionCandidate {
    /// Create a candidate whose center is the centroid of `bounding`.
    pub fn new(bounding: Bounding, color: Color) -> Self {
        Self {
            bounding,
            center: bounding.centroid(),
            color,
        }
    }

    pub fn circle(x: i32, y: i32, radius: i32, color: Color) -> Self {
        Self::new(Bounding::circle(x, y, radius), color)
    }

    pub fn rectangle(x1: i32, y1: i32, x2: i32, y2: i32, color: Color) -> Self {
        Self::new(Bounding::rectangle(x1, y1, x2, y2), color)
    }

    #[inline]
    pub fn shape_type(&self) -> ShapeType {
        self.bounding.shape_type()
    }

    /// Whether this candidate may continue `track`.
    ///
    /// Requires the same shape kind, a normalized color distance below
    /// `max_color_distance` and a centroid within `max_distance` of the
    /// track's most recent valid center. Absence length plays no role.
    pub fn matches(&self, track: &Track, max_distance: f64, max_color_distance: f64) -> bool {
        if self.shape_type() != track.shape_type() {
            return false;
        }
        let Some(anchor) = track.last_valid_center() else {
            return false;
        };
        color_distance(&self.color, &track.color()) < max_color_distance
            && euclidean_distance(&self.center, &anchor) < max_distance
    }
}
