//! Trait for external shape detectors.

use image::RgbImage;

use crate::tracker::{Bounding, ShapeType};

/// Raw geometry of one detected shape, before color sampling and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawShape {
    Circle { x: i32, y: i32, radius: i32 },
    /// Axis-aligned rectangle given by two opposite corners
    Rectangle { x1: i32, y1: i32, x2: i32, y2: i32 },
}

impl RawShape {
    pub fn shape_type(&self) -> ShapeType {
        self.bounding().shape_type()
    }

    pub fn bounding(&self) -> Bounding {
        match *self {
            Self::Circle { x, y, radius } => Bounding::circle(x, y, radius),
            Self::Rectangle { x1, y1, x2, y2 } => Bounding::rectangle(x1, y1, x2, y2),
        }
    }

    pub fn area(&self) -> f64 {
        self.bounding().area()
    }
}

/// Trait for shape detection backends.
///
/// Implement this trait to feed circles and rectangles from any detector
/// (Hough transform, contour approximation, a neural model, ...) into the
/// pipeline. Detectors are expected to be stateless across frames.
///
/// # Example
///
/// ```ignore
/// use shapetrack::{RawShape, ShapeDetector};
///
/// struct MyDetector;
///
/// impl ShapeDetector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &image::RgbImage) -> Result<Vec<RawShape>, Self::Error> {
///         Ok(vec![RawShape::Circle { x: 10, y: 10, radius: 5 }])
///     }
/// }
/// ```
pub trait ShapeDetector {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Detect every circle and rectangle in `frame`.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<RawShape>, Self::Error>;
}

impl<F, E> ShapeDetector for F
where
    F: FnMut(&RgbImage) -> Result<Vec<RawShape>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<RawShape>, Self::Error> {
        self(frame)
    }
}
