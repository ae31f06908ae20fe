use std::f64::consts::TAU;

use crate::error::{Result, SolidkitError};
use crate::geometry::Transformation;
use crate::math::{points_coincide, Point3, Vector3};

use super::Curve;

/// Full circle `P(t) = center + radius * (cos(t) * x_dir + sin(t) * y_dir)`.
///
/// Period `2π`. The normal is `x_dir × y_dir`; after a reflection the stored
/// frame may be left-handed, which keeps parameters meaningful.
#[derive(Debug, Clone)]
pub(crate) struct Circle {
    center: Point3,
    x_dir: Vector3,
    y_dir: Vector3,
    radius: f64,
}

impl Circle {
    pub(crate) fn new(center: Point3, x_dir: Vector3, y_dir: Vector3, radius: f64) -> Self {
        Self {
            center,
            x_dir,
            y_dir,
            radius,
        }
    }

    /// The circle through three points, oriented so that walking from `p1`
    /// through `p2` reaches `p3`. Returns the circle and the sweep angle of
    /// `p3`; `p1` sits at parameter 0.
    pub(crate) fn through_points(p1: &Point3, p2: &Point3, p3: &Point3) -> Result<(Self, f64)> {
        if points_coincide(p1, p2) || points_coincide(p2, p3) || points_coincide(p1, p3) {
            return Err(SolidkitError::DegenerateGeometry(
                "arc points coincide".into(),
            ));
        }
        let a = p1 - p3;
        let b = p2 - p3;
        let axb = a.cross(&b);
        if axb.norm() <= 1e-12 * a.norm() * b.norm() {
            return Err(SolidkitError::DegenerateGeometry(
                "arc points are collinear".into(),
            ));
        }
        let center = p3 + (b * a.norm_squared() - a * b.norm_squared()).cross(&axb)
            / (2.0 * axb.norm_squared());
        let radius = (p1 - center).norm();
        let normal = (p2 - p1).cross(&(p3 - p1)).normalize();
        let x_dir = (p1 - center) / radius;
        let y_dir = normal.cross(&x_dir);

        let d3 = p3 - center;
        let mut sweep = d3.dot(&y_dir).atan2(d3.dot(&x_dir));
        if sweep <= 0.0 {
            sweep += TAU;
        }
        Ok((Self::new(center, x_dir, y_dir, radius), sweep))
    }

    pub(crate) fn center(&self) -> Point3 {
        self.center
    }

    pub(crate) fn radius(&self) -> f64 {
        self.radius
    }

    pub(crate) fn normal(&self) -> Vector3 {
        self.x_dir.cross(&self.y_dir)
    }

    pub(crate) fn x_dir(&self) -> Vector3 {
        self.x_dir
    }

    pub(crate) fn y_dir(&self) -> Vector3 {
        self.y_dir
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self {
            center: t.point(&self.center),
            x_dir: t.vector(&self.x_dir),
            y_dir: t.vector(&self.y_dir),
            radius: self.radius,
        }
    }
}

impl Curve for Circle {
    fn value(&self, t: f64) -> Point3 {
        self.center + (self.x_dir * t.cos() + self.y_dir * t.sin()) * self.radius
    }

    fn derivative(&self, t: f64) -> Vector3 {
        (self.y_dir * t.cos() - self.x_dir * t.sin()) * self.radius
    }
}
