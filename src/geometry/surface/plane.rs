use std::sync::Arc;

use nalgebra::Unit;

use crate::geometry::{Direction, PlaneAxis, Point, Transformation};
use crate::math::{Point2, Point3, Vector3};

use super::{ParametricSurface, SurfaceDomain};

#[derive(Debug)]
pub(crate) struct PlaneGeometry {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
}

/// An infinite plane `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane(pub(crate) Arc<PlaneGeometry>);

impl Plane {
    /// The plane through the axis origin, perpendicular to its direction.
    #[must_use]
    pub fn new(axis: &PlaneAxis) -> Self {
        Self::from_frame(axis.location, axis.x_dir.into_inner(), axis.y_vector())
    }

    pub(crate) fn from_frame(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Self {
        Self(Arc::new(PlaneGeometry {
            origin,
            u_dir,
            v_dir,
        }))
    }

    /// A plane through `origin` with the given unit normal.
    pub(crate) fn from_normal(origin: Point3, normal: &Vector3) -> Self {
        let u_dir = crate::math::perpendicular(normal);
        let v_dir = normal.cross(&u_dir);
        Self::from_frame(origin, u_dir, v_dir)
    }

    /// The origin of the plane's parametrization.
    #[must_use]
    pub fn location(&self) -> Point {
        Point(self.0.origin)
    }

    /// The plane normal `u_dir × v_dir`.
    #[must_use]
    pub fn normal(&self) -> Direction {
        Direction(Unit::new_normalize(self.normal_vector()))
    }

    /// The plane's local frame.
    #[must_use]
    pub fn axis(&self) -> PlaneAxis {
        PlaneAxis {
            location: self.0.origin,
            normal: Unit::new_normalize(self.normal_vector()),
            x_dir: Unit::new_normalize(self.0.u_dir),
        }
    }

    pub(crate) fn normal_vector(&self) -> Vector3 {
        self.0.u_dir.cross(&self.0.v_dir)
    }

    /// Parameters of the orthogonal projection of `p`.
    pub(crate) fn project(&self, p: &Point3) -> Point2 {
        let d = p - self.0.origin;
        Point2::new(d.dot(&self.0.u_dir), d.dot(&self.0.v_dir))
    }

    /// Signed distance of `p` along the normal.
    pub(crate) fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.0.origin).dot(&self.normal_vector())
    }

    pub(crate) fn offset(&self, distance: f64) -> Self {
        Self::from_frame(
            self.0.origin + self.normal_vector() * distance,
            self.0.u_dir,
            self.0.v_dir,
        )
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self::from_frame(
            t.point(&self.0.origin),
            t.vector(&self.0.u_dir),
            t.vector(&self.0.v_dir),
        )
    }
}

impl ParametricSurface for PlaneGeometry {
    fn value(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.u_dir * u + self.v_dir * v
    }

    fn derivatives(&self, u: f64, v: f64) -> (Point3, Vector3, Vector3) {
        (self.value(u, v), self.u_dir, self.v_dir)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn project_round_trips_through_value() {
        let plane = Plane::from_normal(Point3::new(1.0, 2.0, 3.0), &Vector3::new(0.0, 0.6, 0.8));
        let p = Point3::new(4.0, -1.0, 2.0);
        let uv = plane.project(&p);
        let back = plane.0.value(uv.x, uv.y);
        let offset = p - back;
        assert_relative_eq!(offset.cross(&plane.normal_vector()).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(&p), offset.dot(&plane.normal_vector()), epsilon = 1e-12);
    }

    #[test]
    fn offset_moves_along_normal() {
        let plane = Plane::from_normal(Point3::origin(), &Vector3::z());
        assert_relative_eq!(plane.offset(-2.0).location().z(), -2.0, epsilon = 1e-12);
    }
}
