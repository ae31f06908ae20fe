use std::f64::consts::TAU;

use crate::error::{Result, SolidkitError};
use crate::geometry::{Circle, CurveGeometry, PlaneAxis, Plane, TrimmedCurve};
use crate::operations::shaping::Extrude;
use crate::topology::{Edge, Face, OrientedEdge, Shape, Wire};

/// Creates a solid cylinder standing on a plane axis.
pub(crate) struct MakeCylinder {
    axis: PlaneAxis,
    radius: f64,
    height: f64,
}

impl MakeCylinder {
    pub(crate) fn new(axis: &PlaneAxis, radius: f64, height: f64) -> Self {
        Self {
            axis: *axis,
            radius,
            height,
        }
    }

    /// Extrudes the base disc along the axis direction.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the radius or height
    /// is not positive.
    pub(crate) fn execute(&self) -> Result<Shape> {
        if !(self.radius > 0.0 && self.height > 0.0) {
            return Err(SolidkitError::DegenerateGeometry(format!(
                "cylinder needs positive radius and height, got {} and {}",
                self.radius, self.height
            )));
        }
        let center = self.axis.location;
        let x = self.axis.x_dir.into_inner();
        let y = self.axis.y_vector();
        let circle = Circle::new(center, x, y, self.radius);
        let rim = Edge::from_curve(TrimmedCurve::new(CurveGeometry::Circle(circle), 0.0, TAU));
        let base = Face::planar(
            Plane::from_frame(center, x, y),
            vec![Wire::from_edges(vec![OrientedEdge::new(rim, true)])],
        );
        Extrude::new(&base, &(self.axis.normal.into_inner() * self.height)).execute()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, Point};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn volume_matches_closed_form() {
        let axis = Point::new(1.0, -2.0, 0.5).plane_axis_with(&Direction::new(1.0, 1.0, 0.0).unwrap());
        let c = MakeCylinder::new(&axis, 0.5, 3.0).execute().unwrap();
        assert_relative_eq!(c.mass(), PI * 0.25 * 3.0, epsilon = 1e-9);
        assert!(c.is_closed());
    }

    #[test]
    fn side_face_is_cylindrical() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        let c = MakeCylinder::new(&axis, 1.0, 2.0).execute().unwrap();
        let curved: Vec<_> = c.faces().filter(|f| !f.surface().is_plane()).collect();
        assert_eq!(curved.len(), 1);
        assert_relative_eq!(curved[0].surface().as_cylinder().unwrap().radius(), 1.0);
    }

    #[test]
    fn zero_height_is_rejected() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        assert!(MakeCylinder::new(&axis, 1.0, 0.0).execute().is_err());
    }
}
