use nalgebra::Unit;

use crate::error::{Result, SolidkitError};
use crate::math::{perpendicular, Point2, Point3, Vector2, Vector3};

use super::{Direction, Direction2D, Point, Point2D};

/// A located direction: a line in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub(crate) location: Point3,
    pub(crate) direction: Unit<Vector3>,
}

impl Axis {
    #[must_use]
    pub fn new(location: &Point, direction: &Direction) -> Self {
        Self {
            location: location.0,
            direction: direction.0,
        }
    }

    #[must_use]
    pub fn location(&self) -> Point {
        Point(self.location)
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction(self.direction)
    }
}

/// A located direction in a 2D parameter plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis2D {
    pub(crate) location: Point2,
    pub(crate) direction: Unit<Vector2>,
}

impl Axis2D {
    #[must_use]
    pub fn new(location: &Point2D, direction: &Direction2D) -> Self {
        Self {
            location: location.0,
            direction: direction.0,
        }
    }

    #[must_use]
    pub fn location(&self) -> Point2D {
        Point2D(self.location)
    }

    #[must_use]
    pub fn direction(&self) -> Direction2D {
        Direction2D(self.direction)
    }
}

/// A right-handed local frame: origin, main (normal) direction and X direction.
///
/// Used to place planes, circles and cylinders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneAxis {
    pub(crate) location: Point3,
    pub(crate) normal: Unit<Vector3>,
    pub(crate) x_dir: Unit<Vector3>,
}

impl PlaneAxis {
    /// A frame at `location` with main direction `direction`; the X direction
    /// is chosen perpendicular to it.
    #[must_use]
    pub fn new(location: &Point, direction: &Direction) -> Self {
        let normal = direction.0;
        let x_dir = Unit::new_normalize(perpendicular(&normal));
        Self {
            location: location.0,
            normal,
            x_dir,
        }
    }

    /// Replaces the X direction, projecting it onto the plane.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if `x_direction` is
    /// parallel to the main direction.
    pub fn with_x_direction(mut self, x_direction: &Direction) -> Result<Self> {
        let n = self.normal.into_inner();
        let projected = x_direction.0.into_inner() - n * n.dot(&x_direction.0);
        self.x_dir = Unit::try_new(projected, 1e-12).ok_or_else(|| {
            SolidkitError::DegenerateGeometry("x direction is parallel to the normal".into())
        })?;
        Ok(self)
    }

    #[must_use]
    pub fn location(&self) -> Point {
        Point(self.location)
    }

    /// The main direction (plane normal).
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction(self.normal)
    }

    #[must_use]
    pub fn x_direction(&self) -> Direction {
        Direction(self.x_dir)
    }

    #[must_use]
    pub fn y_direction(&self) -> Direction {
        Direction(Unit::new_normalize(self.normal.cross(&self.x_dir)))
    }

    pub(crate) fn y_vector(&self) -> Vector3 {
        self.normal.cross(&self.x_dir)
    }
}

/// A local coordinate system located in space, which may be left-handed
/// after a reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceAxis {
    pub(crate) frame: PlaneAxis,
    pub(crate) direct: bool,
}

impl SpaceAxis {
    #[must_use]
    pub fn new(location: &Point, direction: &Direction) -> Self {
        Self {
            frame: PlaneAxis::new(location, direction),
            direct: true,
        }
    }

    #[must_use]
    pub fn location(&self) -> Point {
        self.frame.location()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.frame.direction()
    }

    /// Whether the frame is right-handed.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.direct
    }

    /// The plane axis sharing this frame's origin and directions.
    #[must_use]
    pub fn plane_axis(&self) -> PlaneAxis {
        self.frame
    }
}

impl From<PlaneAxis> for SpaceAxis {
    fn from(frame: PlaneAxis) -> Self {
        Self {
            frame,
            direct: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_axis_frame_is_orthonormal() {
        let pa = Point::new(1.0, 2.0, 3.0).plane_axis_with(&Direction::new(1.0, 1.0, 0.0).unwrap());
        let n = pa.normal.into_inner();
        let x = pa.x_dir.into_inner();
        let y = pa.y_vector();
        assert_relative_eq!(n.dot(&x), 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.dot(&y), 0.0, epsilon = 1e-12);
        assert_relative_eq!(x.cross(&y).dot(&n), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn x_direction_is_projected() {
        let pa = Point::origin()
            .plane_axis_with(&Direction::z())
            .with_x_direction(&Direction::new(1.0, 0.0, 1.0).unwrap())
            .unwrap();
        let (x, _, z) = pa.x_direction().get_components();
        assert_relative_eq!(x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(z, 0.0, epsilon = 1e-12);
        assert!(Point::origin()
            .plane_axis_with(&Direction::z())
            .with_x_direction(&Direction::z())
            .is_err());
    }

    #[test]
    fn space_axis_wraps_frame() {
        let sa = SpaceAxis::new(&Point::origin(), &Direction::y());
        assert!(sa.is_direct());
        assert_eq!(sa.direction(), Direction::y());
    }
}
