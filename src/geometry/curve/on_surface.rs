use crate::geometry::surface::{ParametricSurface, Surface};
use crate::geometry::{Curve2D, Transformation};
use crate::math::{Point2, Point3, Vector3};

use super::Curve;

/// A parameter-space curve lifted onto a surface: `P(t) = S(c(t))`.
#[derive(Debug, Clone)]
pub(crate) struct CurveOnSurface {
    pub(crate) curve: Curve2D,
    pub(crate) surface: Surface,
}

impl CurveOnSurface {
    pub(crate) fn new(curve: Curve2D, surface: Surface) -> Self {
        Self { curve, surface }
    }

    /// The parameter-space point at `t`.
    pub(crate) fn uv(&self, t: f64) -> Point2 {
        self.curve.geometry.value(t)
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self::new(self.curve.clone(), self.surface.transformed(t))
    }
}

impl Curve for CurveOnSurface {
    fn value(&self, t: f64) -> Point3 {
        let uv = self.uv(t);
        ParametricSurface::value(&self.surface, uv.x, uv.y)
    }

    fn derivative(&self, t: f64) -> Vector3 {
        let uv = self.uv(t);
        let duv = self.curve.geometry.derivative(t);
        let (_, su, sv) = self.surface.derivatives(uv.x, uv.y);
        su * duv.x + sv * duv.y
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{CylindricalSurface, Direction, Point, Point2D, TrimmedCurve2D};
    use approx::assert_relative_eq;

    #[test]
    fn helix_segment_on_cylinder() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        let cylinder = Surface::from(&CylindricalSurface::new(&axis, 2.0).unwrap());
        let seg = TrimmedCurve2D::line(&Point2D::new(0.0, 0.0), &Point2D::new(1.0, 1.0)).unwrap();
        let c = CurveOnSurface::new(Curve2D::from(&seg), cylinder);
        let t = seg.last();
        let p = c.value(t);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!((p.x * p.x + p.y * p.y).sqrt(), 2.0, epsilon = 1e-12);
        let d = c.derivative(0.3);
        let h = 1e-6;
        let fd = (c.value(0.3 + h) - c.value(0.3 - h)) / (2.0 * h);
        assert_relative_eq!(d, fd, epsilon = 1e-6);
    }
}
