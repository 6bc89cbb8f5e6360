//! Builder for creating DetectionCandidate objects from raw detector output.

use image::RgbImage;

use super::RawShape;
use crate::tracker::{Bounding, Color, DetectionCandidate, Point};

/// Color of `frame` at `point`, or `None` when the point lies outside it.
pub fn sample_color(frame: &RgbImage, point: Point) -> Option<Color> {
    let x = u32::try_from(point.x).ok()?;
    let y = u32::try_from(point.y).ok()?;
    frame.get_pixel_checked(x, y).copied()
}

/// Builder for creating `DetectionCandidate` objects.
///
/// The center defaults to the centroid of the bounding geometry; the color
/// is either given explicitly or sampled from the frame at the center.
#[derive(Debug, Clone, Default)]
pub struct CandidateBuilder {
    bounding: Option<Bounding>,
    center: Option<Point>,
    color: Option<Color>,
}

impl CandidateBuilder {
    /// Create a new candidate builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a raw detector shape.
    pub fn from_raw(shape: RawShape) -> Self {
        Self::new().bounding(shape.bounding())
    }

    pub fn bounding(mut self, bounding: Bounding) -> Self {
        self.bounding = Some(bounding);
        self
    }

    /// Set a circle by center and radius.
    pub fn circle(self, x: i32, y: i32, radius: i32) -> Self {
        self.bounding(Bounding::circle(x, y, radius))
    }

    /// Set a rectangle by two opposite corners (x1, y1) and (x2, y2).
    pub fn rectangle(self, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        self.bounding(Bounding::rectangle(x1, y1, x2, y2))
    }

    /// Override the reference point used for matching.
    pub fn center(mut self, center: Point) -> Self {
        self.center = Some(center);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Sample the color from `frame` at the candidate's center.
    ///
    /// Leaves the color unset when the center lies outside the frame.
    pub fn sample_color(mut self, frame: &RgbImage) -> Self {
        if let Some(center) = self.resolved_center() {
            self.color = sample_color(frame, center);
        }
        self
    }

    /// Build the final `DetectionCandidate`, or `None` when the geometry or
    /// the color is missing.
    pub fn build(self) -> Option<DetectionCandidate> {
        let center = self.resolved_center()?;
        Some(DetectionCandidate {
            bounding: self.bounding?,
            center,
            color: self.color?,
        })
    }

    fn resolved_center(&self) -> Option<Point> {
        self.center.or_else(|| self.bounding.map(|b| b.centroid()))
    }
}
