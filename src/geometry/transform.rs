use nalgebra::{Rotation3, Unit};

use crate::math::{Matrix3, Point3, Vector3};

use super::{Axis, Direction, PlaneAxis, Point, SpaceAxis, Vector};

/// Something that can be mapped through a [`Transformation`], producing a
/// new value and leaving the original untouched.
pub trait Transformable: Sized {
    #[must_use]
    fn transformed(&self, transformation: &Transformation) -> Self;
}

/// An affine isometry: `x -> linear * x + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    pub(crate) linear: Matrix3,
    pub(crate) translation: Vector3,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }
}

impl Transformation {
    /// The identity transformation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn translation(vector: &Vector) -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: vector.0,
        }
    }

    /// Rotation by `angle` radians about `axis` (right-hand rule).
    #[must_use]
    pub fn rotation(axis: &Axis, angle: f64) -> Self {
        let linear = Rotation3::from_axis_angle(&axis.direction, angle).into_inner();
        Self::about_point(linear, &axis.location)
    }

    /// Composes a symmetry about the line `axis` after this transformation.
    ///
    /// The symmetry is a half turn about the axis, so handedness is kept.
    pub fn mirror(&mut self, axis: &Axis) {
        let a = axis.direction.into_inner();
        let linear = a * a.transpose() * 2.0 - Matrix3::identity();
        *self = self.then(&Self::about_point(linear, &axis.location));
    }

    /// Composes a reflection through the plane of `plane` after this
    /// transformation. The result reverses handedness.
    pub fn mirror_plane(&mut self, plane: &PlaneAxis) {
        let n = plane.normal.into_inner();
        let linear = Matrix3::identity() - n * n.transpose() * 2.0;
        *self = self.then(&Self::about_point(linear, &plane.location));
    }

    /// This transformation followed by `next`.
    #[must_use]
    pub fn then(&self, next: &Transformation) -> Self {
        Self {
            linear: next.linear * self.linear,
            translation: next.linear * self.translation + next.translation,
        }
    }

    /// Maps `object` through this transformation.
    #[must_use]
    pub fn apply<T: Transformable>(&self, object: &T) -> T {
        object.transformed(self)
    }

    /// Whether the transformation flips orientation (negative determinant).
    #[must_use]
    pub fn is_reflection(&self) -> bool {
        self.linear.determinant() < 0.0
    }

    pub(crate) fn point(&self, p: &Point3) -> Point3 {
        Point3::from(self.linear * p.coords + self.translation)
    }

    pub(crate) fn vector(&self, v: &Vector3) -> Vector3 {
        self.linear * v
    }

    pub(crate) fn unit(&self, v: &Unit<Vector3>) -> Unit<Vector3> {
        Unit::new_normalize(self.linear * v.into_inner())
    }

    fn about_point(linear: Matrix3, center: &Point3) -> Self {
        Self {
            linear,
            translation: center.coords - linear * center.coords,
        }
    }
}

impl Transformable for Point {
    fn transformed(&self, t: &Transformation) -> Self {
        Point(t.point(&self.0))
    }
}

impl Transformable for Vector {
    fn transformed(&self, t: &Transformation) -> Self {
        Vector(t.vector(&self.0))
    }
}

impl Transformable for Direction {
    fn transformed(&self, t: &Transformation) -> Self {
        Direction(t.unit(&self.0))
    }
}

impl Transformable for Axis {
    fn transformed(&self, t: &Transformation) -> Self {
        Axis {
            location: t.point(&self.location),
            direction: t.unit(&self.direction),
        }
    }
}

impl Transformable for PlaneAxis {
    fn transformed(&self, t: &Transformation) -> Self {
        PlaneAxis {
            location: t.point(&self.location),
            normal: t.unit(&self.normal),
            x_dir: t.unit(&self.x_dir),
        }
    }
}

impl Transformable for SpaceAxis {
    fn transformed(&self, t: &Transformation) -> Self {
        SpaceAxis {
            frame: self.frame.transformed(t),
            direct: self.direct != t.is_reflection(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn mirror_about_x_axis_negates_y_and_z() {
        let mut t = Transformation::new();
        t.mirror(&Point::origin().axis_with(&Direction::x()));
        let p = t.apply(&Point::new(1.0, 2.0, 3.0));
        assert_relative_eq!(p.x(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y(), -2.0, epsilon = 1e-12);
        assert_relative_eq!(p.z(), -3.0, epsilon = 1e-12);
        assert!(!t.is_reflection());
    }

    #[test]
    fn plane_mirror_reverses_handedness() {
        let mut t = Transformation::new();
        t.mirror_plane(&Point::new(0.0, 0.0, 1.0).plane_axis_with(&Direction::z()));
        let p = t.apply(&Point::new(1.0, 1.0, 3.0));
        assert_relative_eq!(p.z(), -1.0, epsilon = 1e-12);
        assert!(t.is_reflection());
        let frame = t.apply(&SpaceAxis::new(&Point::origin(), &Direction::z()));
        assert!(!frame.is_direct());
    }

    #[test]
    fn rotation_then_translation() {
        let r = Transformation::rotation(&Point::origin().axis_with(&Direction::z()), FRAC_PI_2);
        let t = r.then(&Transformation::translation(&Vector::new(0.0, 0.0, 5.0)));
        let p = t.apply(&Point::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn mirror_mutates_in_place() {
        let mut t = Transformation::new();
        let before = t;
        t.mirror(&Point::origin().axis_with(&Direction::y()));
        assert_ne!(before, t);
    }
}
