use std::fmt;

use nalgebra::Unit;

use crate::error::{Result, SolidkitError};
use crate::math::{Point2, Point3, Vector2, Vector3};

use super::{Axis, Axis2D, PlaneAxis};

/// A point in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub(crate) Point3);

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Point3::new(x, y, z))
    }

    #[must_use]
    pub fn origin() -> Self {
        Self(Point3::origin())
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.0.z
    }

    #[must_use]
    pub fn get_coordinates(&self) -> (f64, f64, f64) {
        (self.0.x, self.0.y, self.0.z)
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.0 - other.0).norm()
    }

    /// An axis located at this point.
    #[must_use]
    pub fn axis_with(&self, direction: &Direction) -> Axis {
        Axis::new(self, direction)
    }

    /// A plane axis (local coordinate system) located at this point with the
    /// given main direction.
    #[must_use]
    pub fn plane_axis_with(&self, direction: &Direction) -> PlaneAxis {
        PlaneAxis::new(self, direction)
    }
}

impl From<Point3> for Point {
    fn from(p: Point3) -> Self {
        Self(p)
    }
}

impl From<Point> for Point3 {
    fn from(p: Point) -> Self {
        p.0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

/// A free vector in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector(pub(crate) Vector3);

impl Vector {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    #[must_use]
    pub fn z(&self) -> f64 {
        self.0.z
    }

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.0.norm()
    }
}

impl From<&Direction> for Vector {
    fn from(d: &Direction) -> Self {
        Self(d.0.into_inner())
    }
}

/// A unit direction in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction(pub(crate) Unit<Vector3>);

impl Direction {
    /// Normalizes `(x, y, z)` into a direction.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] for a zero-length vector.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        Self::from_vector(&Vector3::new(x, y, z))
    }

    pub(crate) fn from_vector(v: &Vector3) -> Result<Self> {
        Unit::try_new(*v, f64::EPSILON)
            .map(Self)
            .ok_or_else(|| SolidkitError::DegenerateGeometry("zero-length direction".into()))
    }

    /// Unit X direction.
    #[must_use]
    pub fn x() -> Self {
        Self(Vector3::x_axis())
    }

    /// Unit Y direction.
    #[must_use]
    pub fn y() -> Self {
        Self(Vector3::y_axis())
    }

    /// Unit Z direction.
    #[must_use]
    pub fn z() -> Self {
        Self(Vector3::z_axis())
    }

    #[must_use]
    pub fn get_components(&self) -> (f64, f64, f64) {
        (self.0.x, self.0.y, self.0.z)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.0.x, self.0.y, self.0.z)
    }
}

/// A point in a 2D parameter plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D(pub(crate) Point2);

impl Point2D {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }

    #[must_use]
    pub fn origin() -> Self {
        Self(Point2::origin())
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    #[must_use]
    pub fn get_coordinates(&self) -> (f64, f64) {
        (self.0.x, self.0.y)
    }

    /// A 2D axis located at this point.
    #[must_use]
    pub fn axis2d_with(&self, direction: &Direction2D) -> Axis2D {
        Axis2D::new(self, direction)
    }
}

/// A unit direction in a 2D parameter plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction2D(pub(crate) Unit<Vector2>);

impl Direction2D {
    /// Normalizes `(x, y)` into a direction.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] for a zero-length vector.
    pub fn new(x: f64, y: f64) -> Result<Self> {
        Unit::try_new(Vector2::new(x, y), f64::EPSILON)
            .map(Self)
            .ok_or_else(|| SolidkitError::DegenerateGeometry("zero-length 2D direction".into()))
    }

    #[must_use]
    pub fn x() -> Self {
        Self(Vector2::x_axis())
    }

    #[must_use]
    pub fn y() -> Self {
        Self(Vector2::y_axis())
    }

    #[must_use]
    pub fn get_components(&self) -> (f64, f64) {
        (self.0.x, self.0.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn direction_is_normalized() {
        let d = Direction::new(3.0, 0.0, 4.0).unwrap();
        let (x, y, z) = d.get_components();
        assert_relative_eq!(x, 0.6);
        assert_relative_eq!(y, 0.0);
        assert_relative_eq!(z, 0.8);
    }

    #[test]
    fn zero_direction_is_degenerate() {
        assert!(matches!(
            Direction::new(0.0, 0.0, 0.0),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
        assert!(Direction2D::new(0.0, 0.0).is_err());
    }

    #[test]
    fn point_accessors() {
        let p = Point::new(1.0, 2.0, 3.0);
        assert_eq!(p.get_coordinates(), (1.0, 2.0, 3.0));
        assert_relative_eq!(p.distance(&Point::origin()), 14f64.sqrt());
        assert_eq!(Point2D::new(4.0, 5.0).get_coordinates(), (4.0, 5.0));
    }
}
