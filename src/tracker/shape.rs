//! Shape geometry and color primitives.
//!
//! Bounding data is a tagged union keyed on the shape kind:
//! - Circle: center point and radius
//! - Rectangle: two opposite corner points

use nalgebra::Vector3;

/// Integer pixel coordinate.
pub type Point = nalgebra::Point2<i32>;

/// RGB color triple, one byte per channel.
pub type Color = image::Rgb<u8>;

/// Kind of geometric shape a track follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Circle,
    Rectangle,
}

/// Bounding geometry of a detected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounding {
    Circle { center: Point, radius: i32 },
    Rectangle { a: Point, b: Point },
}

impl Bounding {
    #[inline]
    pub fn circle(x: i32, y: i32, radius: i32) -> Self {
        Self::Circle {
            center: Point::new(x, y),
            radius,
        }
    }

    /// Rectangle from two opposite corners (x1, y1) and (x2, y2).
    #[inline]
    pub fn rectangle(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::Rectangle {
            a: Point::new(x1, y1),
            b: Point::new(x2, y2),
        }
    }

    #[inline]
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Circle { .. } => ShapeType::Circle,
            Self::Rectangle { .. } => ShapeType::Rectangle,
        }
    }

    /// Reference point used for spatial matching.
    ///
    /// Rectangles use the integer midpoint of their corners.
    #[inline]
    pub fn centroid(&self) -> Point {
        match *self {
            Self::Circle { center, .. } => center,
            Self::Rectangle { a, b } => {
                Point::new((a.x + b.x).div_euclid(2), (a.y + b.y).div_euclid(2))
            }
        }
    }

    /// Area of the shape in square pixels.
    pub fn area(&self) -> f64 {
        match *self {
            Self::Circle { radius, .. } => circle_area(radius),
            Self::Rectangle { a, b } => rectangle_area(a, b) as f64,
        }
    }
}

/// Euclidean distance between two pixel coordinates.
#[inline]
pub fn euclidean_distance(a: &Point, b: &Point) -> f64 {
    nalgebra::distance(&a.cast::<f64>(), &b.cast::<f64>())
}

/// Euclidean distance between two colors after scaling each channel to [0, 1].
///
/// Ranges from 0.0 (identical) to sqrt(3) (black vs. white).
pub fn color_distance(a: &Color, b: &Color) -> f64 {
    let normalize = |c: &Color| Vector3::from(c.0).cast::<f64>() / 255.0;
    (normalize(a) - normalize(b)).norm()
}

/// Area of the axis-aligned rectangle spanned by two opposite corners.
#[inline]
pub fn rectangle_area(a: Point, b: Point) -> u64 {
    let width = (i64::from(b.x) - i64::from(a.x)).unsigned_abs();
    let height = (i64::from(b.y) - i64::from(a.y)).unsigned_abs();
    width * height
}

#[inline]
pub fn circle_area(radius: i32) -> f64 {
    let r = f64::from(radius);
    std::f64::consts::PI * r * r
}
