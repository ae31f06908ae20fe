use std::f64::consts::TAU;
use std::sync::Arc;

use nalgebra::Unit;

use crate::error::{Result, SolidkitError};
use crate::geometry::{Axis, PlaneAxis, Point, Transformation};
use crate::math::{Point3, Vector3};

use super::{ParametricSurface, SurfaceDomain};

#[derive(Debug)]
pub(crate) struct CylinderGeometry {
    origin: Point3,
    x_dir: Vector3,
    y_dir: Vector3,
    axis: Vector3,
    radius: f64,
}

/// Infinite circular cylinder
/// `P(u, v) = origin + radius * (cos(u) * x + sin(u) * y) + v * axis`.
#[derive(Debug, Clone)]
pub struct CylindricalSurface(pub(crate) Arc<CylinderGeometry>);

impl CylindricalSurface {
    /// A cylinder of `radius` around the main direction of `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if `radius` is not positive.
    pub fn new(axis: &PlaneAxis, radius: f64) -> Result<Self> {
        if radius <= 0.0 {
            return Err(SolidkitError::DegenerateGeometry(format!(
                "cylinder radius must be positive, got {radius}"
            )));
        }
        Ok(Self::from_frame(
            axis.location,
            axis.x_dir.into_inner(),
            axis.y_vector(),
            axis.normal.into_inner(),
            radius,
        ))
    }

    pub(crate) fn from_frame(
        origin: Point3,
        x_dir: Vector3,
        y_dir: Vector3,
        axis: Vector3,
        radius: f64,
    ) -> Self {
        Self(Arc::new(CylinderGeometry {
            origin,
            x_dir,
            y_dir,
            axis,
            radius,
        }))
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.0.radius
    }

    /// The cylinder's axis line.
    #[must_use]
    pub fn axis(&self) -> Axis {
        Axis {
            location: self.0.origin,
            direction: Unit::new_normalize(self.0.axis),
        }
    }

    #[must_use]
    pub fn location(&self) -> Point {
        Point(self.0.origin)
    }

    /// Whether `S_u × S_v` points away from the axis.
    fn outward(&self) -> bool {
        self.0.x_dir.cross(&self.0.y_dir).dot(&self.0.axis) > 0.0
    }

    pub(crate) fn offset(&self, distance: f64) -> Option<Self> {
        let radius = if self.outward() {
            self.0.radius + distance
        } else {
            self.0.radius - distance
        };
        (radius > 0.0).then(|| {
            Self::from_frame(self.0.origin, self.0.x_dir, self.0.y_dir, self.0.axis, radius)
        })
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self::from_frame(
            t.point(&self.0.origin),
            t.vector(&self.0.x_dir),
            t.vector(&self.0.y_dir),
            t.vector(&self.0.axis),
            self.0.radius,
        )
    }
}

impl ParametricSurface for CylinderGeometry {
    fn value(&self, u: f64, v: f64) -> Point3 {
        self.origin + (self.x_dir * u.cos() + self.y_dir * u.sin()) * self.radius + self.axis * v
    }

    fn derivatives(&self, u: f64, v: f64) -> (Point3, Vector3, Vector3) {
        let su = (self.y_dir * u.cos() - self.x_dir * u.sin()) * self.radius;
        (self.value(u, v), su, self.axis)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain {
            u: Some((0.0, TAU)),
            v: None,
            u_periodic: true,
            v_periodic: false,
        }
    }
}
