mod circle;
mod line;
mod on_surface;
mod polyline;

pub(crate) use circle::Circle;
pub(crate) use line::Line;
pub(crate) use on_surface::CurveOnSurface;
pub(crate) use polyline::Polyline;

use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

use crate::error::{Result, SolidkitError};
use crate::math::quadrature::{integrate_panels, uniform_breaks};
use crate::math::{points_coincide, Point3, Vector3};

use super::{Point, Transformation};

/// Parametric curve evaluation shared by every curve kind.
pub(crate) trait Curve {
    /// Point at parameter `t`.
    fn value(&self, t: f64) -> Point3;

    /// First derivative with respect to `t`.
    fn derivative(&self, t: f64) -> Vector3;
}

/// The closed set of 3D curve kinds.
#[derive(Debug, Clone)]
pub(crate) enum CurveGeometry {
    Line(Line),
    Circle(Circle),
    Polyline(Polyline),
    OnSurface(CurveOnSurface),
}

impl Curve for CurveGeometry {
    fn value(&self, t: f64) -> Point3 {
        match self {
            Self::Line(c) => c.value(t),
            Self::Circle(c) => c.value(t),
            Self::Polyline(c) => c.value(t),
            Self::OnSurface(c) => c.value(t),
        }
    }

    fn derivative(&self, t: f64) -> Vector3 {
        match self {
            Self::Line(c) => c.derivative(t),
            Self::Circle(c) => c.derivative(t),
            Self::Polyline(c) => c.derivative(t),
            Self::OnSurface(c) => c.derivative(t),
        }
    }
}

impl CurveGeometry {
    fn transformed(&self, t: &Transformation) -> Self {
        match self {
            Self::Line(c) => Self::Line(c.transformed(t)),
            Self::Circle(c) => Self::Circle(c.transformed(t)),
            Self::Polyline(c) => Self::Polyline(c.transformed(t)),
            Self::OnSurface(c) => Self::OnSurface(c.transformed(t)),
        }
    }

    /// Quadrature panel boundaries covering `[first, last]`.
    pub(crate) fn breaks(&self, first: f64, last: f64) -> Vec<f64> {
        match self {
            Self::Line(_) => vec![first, last],
            Self::Circle(_) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = ((last - first).abs() / FRAC_PI_4).ceil() as usize;
                uniform_breaks(first, last, n)
            }
            Self::Polyline(p) => p.breaks(first, last),
            Self::OnSurface(_) => uniform_breaks(first, last, 16),
        }
    }
}

/// A bounded 3D curve: shared curve geometry restricted to `[first, last]`.
#[derive(Debug, Clone)]
pub struct TrimmedCurve {
    pub(crate) geometry: Arc<CurveGeometry>,
    pub(crate) first: f64,
    pub(crate) last: f64,
}

impl TrimmedCurve {
    /// Circular arc starting at `p1`, passing through `p2` and ending at `p3`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if two points coincide or
    /// the three points are collinear.
    pub fn arc_of_circle(p1: &Point, p2: &Point, p3: &Point) -> Result<Self> {
        let (circle, sweep) = Circle::through_points(&p1.0, &p2.0, &p3.0)?;
        Ok(Self::new(CurveGeometry::Circle(circle), 0.0, sweep))
    }

    /// Straight segment from `p1` to `p2`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the points coincide.
    pub fn line(p1: &Point, p2: &Point) -> Result<Self> {
        Self::segment(&p1.0, &p2.0)
    }

    /// The start point, at the first parameter.
    #[must_use]
    pub fn start_point(&self) -> Point {
        Point(self.point_at(self.first))
    }

    /// The end point, at the last parameter.
    #[must_use]
    pub fn end_point(&self) -> Point {
        Point(self.point_at(self.last))
    }

    /// Evaluates the underlying curve at parameter `t`.
    #[must_use]
    pub fn value(&self, t: f64) -> Point {
        Point(self.point_at(t))
    }

    /// First parameter of the trimmed range.
    #[must_use]
    pub fn first(&self) -> f64 {
        self.first
    }

    /// Last parameter of the trimmed range.
    #[must_use]
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Arc length of the trimmed range.
    #[must_use]
    pub fn length(&self) -> f64 {
        let breaks = self.geometry.breaks(self.first, self.last);
        integrate_panels(&breaks, |t| self.geometry.derivative(t).norm()).abs()
    }

    pub(crate) fn new(geometry: CurveGeometry, first: f64, last: f64) -> Self {
        Self {
            geometry: Arc::new(geometry),
            first,
            last,
        }
    }

    pub(crate) fn segment(a: &Point3, b: &Point3) -> Result<Self> {
        if points_coincide(a, b) {
            return Err(SolidkitError::DegenerateGeometry(
                "segment end points coincide".into(),
            ));
        }
        let (line, length) = Line::between(a, b);
        Ok(Self::new(CurveGeometry::Line(line), 0.0, length))
    }

    /// A polyline through `points`, parametrized by vertex index.
    pub(crate) fn polyline(points: Vec<Point3>) -> Result<Self> {
        let polyline = Polyline::new(points)?;
        #[allow(clippy::cast_precision_loss)]
        let last = (polyline.points().len() - 1) as f64;
        Ok(Self::new(CurveGeometry::Polyline(polyline), 0.0, last))
    }

    pub(crate) fn point_at(&self, t: f64) -> Point3 {
        self.geometry.value(t)
    }

    pub(crate) fn derivative_at(&self, t: f64) -> Vector3 {
        self.geometry.derivative(t)
    }

    /// Point at normalized parameter `s` in `[0, 1]` over the trimmed range.
    pub(crate) fn point_normalized(&self, s: f64) -> Point3 {
        self.point_at(self.first + s * (self.last - self.first))
    }

    /// Derivative with respect to the normalized parameter.
    pub(crate) fn derivative_normalized(&self, s: f64) -> Vector3 {
        self.derivative_at(self.first + s * (self.last - self.first)) * (self.last - self.first)
    }

    /// Normalized quadrature breaks in `[0, 1]`.
    pub(crate) fn normalized_breaks(&self) -> Vec<f64> {
        let span = self.last - self.first;
        if span.abs() <= f64::EPSILON {
            return vec![0.0, 1.0];
        }
        self.geometry
            .breaks(self.first, self.last)
            .into_iter()
            .map(|t| (t - self.first) / span)
            .collect()
    }

    pub(crate) fn as_line(&self) -> Option<&Line> {
        match self.geometry.as_ref() {
            CurveGeometry::Line(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        points_coincide(&self.point_at(self.first), &self.point_at(self.last))
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self {
            geometry: Arc::new(self.geometry.transformed(t)),
            first: self.first,
            last: self.last,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn arc_endpoints_match_inputs() {
        let cases = [
            (p(-25.0, -7.5, 0.0), p(0.0, -15.0, 0.0), p(25.0, -7.5, 0.0)),
            (p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(-1.0, 0.0, 0.0)),
            (p(0.0, 0.0, 3.0), p(1.0, 2.0, 4.0), p(-2.0, 5.0, 1.0)),
        ];
        for (a, b, c) in cases {
            let arc = TrimmedCurve::arc_of_circle(&a, &b, &c).unwrap();
            assert_relative_eq!(arc.start_point().0, a.0, epsilon = 1e-9);
            assert_relative_eq!(arc.end_point().0, c.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn arc_passes_through_middle_point() {
        let a = p(1.0, 0.0, 0.0);
        let b = p(0.0, 1.0, 0.0);
        let c = p(-1.0, 0.0, 0.0);
        let arc = TrimmedCurve::arc_of_circle(&a, &b, &c).unwrap();
        assert_relative_eq!(arc.last(), PI, epsilon = 1e-12);
        assert_relative_eq!(arc.value(PI / 2.0).0, b.0, epsilon = 1e-9);
        assert_relative_eq!(arc.length(), PI, epsilon = 1e-9);
    }

    #[test]
    fn collinear_or_coincident_points_are_degenerate() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 1.0, 1.0);
        let c = p(2.0, 2.0, 2.0);
        assert!(matches!(
            TrimmedCurve::arc_of_circle(&a, &b, &c),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
        assert!(TrimmedCurve::arc_of_circle(&a, &a, &c).is_err());
        assert!(matches!(
            TrimmedCurve::line(&a, &a),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn line_length_and_endpoints() {
        let l = TrimmedCurve::line(&p(0.0, 0.0, 0.0), &p(3.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(l.length(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(l.end_point().0, Point3::new(3.0, 4.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn transformed_arc_keeps_parameters() {
        let arc = TrimmedCurve::arc_of_circle(&p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(-1.0, 0.0, 0.0))
            .unwrap();
        let mut t = Transformation::new();
        t.mirror(&Point::origin().axis_with(&crate::geometry::Direction::x()));
        let m = arc.transformed(&t);
        assert_relative_eq!(m.value(PI / 2.0).0, Point3::new(0.0, -1.0, 0.0), epsilon = 1e-9);
    }
}
