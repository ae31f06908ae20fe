use std::f64::consts::TAU;
use std::sync::Arc;

use nalgebra::Unit;

use crate::error::{Result, SolidkitError};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::{Axis2D, Point2D};

/// The closed set of 2D parameter-space curve kinds.
#[derive(Debug, Clone)]
pub(crate) enum Curve2dGeometry {
    /// `P(u) = origin + u * direction`, parametrized by arc length.
    Line {
        origin: Point2,
        direction: Unit<Vector2>,
    },
    /// `P(u) = center + major * cos(u) * d + minor * sin(u) * d⊥`.
    Ellipse {
        center: Point2,
        major_dir: Unit<Vector2>,
        major: f64,
        minor: f64,
    },
}

impl Curve2dGeometry {
    pub(crate) fn value(&self, u: f64) -> Point2 {
        match self {
            Self::Line { origin, direction } => origin + direction.into_inner() * u,
            Self::Ellipse {
                center,
                major_dir,
                major,
                minor,
            } => {
                let d = major_dir.into_inner();
                let perp = Vector2::new(-d.y, d.x);
                center + d * (major * u.cos()) + perp * (minor * u.sin())
            }
        }
    }

    pub(crate) fn derivative(&self, u: f64) -> Vector2 {
        match self {
            Self::Line { direction, .. } => direction.into_inner(),
            Self::Ellipse {
                major_dir,
                major,
                minor,
                ..
            } => {
                let d = major_dir.into_inner();
                let perp = Vector2::new(-d.y, d.x);
                d * (-major * u.sin()) + perp * (minor * u.cos())
            }
        }
    }

    fn is_periodic(&self) -> bool {
        matches!(self, Self::Ellipse { .. })
    }
}

/// A 2D curve, possibly restricted to a parameter range.
///
/// Unrestricted lines are unbounded; unrestricted ellipses span one period.
#[derive(Debug, Clone)]
pub struct Curve2D {
    pub(crate) geometry: Arc<Curve2dGeometry>,
    pub(crate) bounds: Option<(f64, f64)>,
}

impl Curve2D {
    /// Restricts the curve to `[u1, u2]`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the range is empty.
    pub fn trim(&self, u1: f64, u2: f64) -> Result<TrimmedCurve2D> {
        if (u2 - u1).abs() <= TOLERANCE {
            return Err(SolidkitError::DegenerateGeometry(
                "empty trimming range".into(),
            ));
        }
        Ok(TrimmedCurve2D {
            geometry: Arc::clone(&self.geometry),
            first: u1,
            last: u2,
        })
    }

    /// Evaluates the curve at `u`, ignoring any restriction.
    #[must_use]
    pub fn value(&self, u: f64) -> Point2D {
        Point2D(self.geometry.value(u))
    }

    /// The finite parameter range, `None` for an unbounded line.
    #[must_use]
    pub fn domain(&self) -> Option<(f64, f64)> {
        self.bounds
            .or_else(|| self.geometry.is_periodic().then_some((0.0, TAU)))
    }
}

impl From<&TrimmedCurve2D> for Curve2D {
    fn from(curve: &TrimmedCurve2D) -> Self {
        Self {
            geometry: Arc::clone(&curve.geometry),
            bounds: Some((curve.first, curve.last)),
        }
    }
}

impl From<&Ellipse2D> for Curve2D {
    fn from(ellipse: &Ellipse2D) -> Self {
        ellipse.curve()
    }
}

/// A bounded 2D curve.
#[derive(Debug, Clone)]
pub struct TrimmedCurve2D {
    pub(crate) geometry: Arc<Curve2dGeometry>,
    pub(crate) first: f64,
    pub(crate) last: f64,
}

impl TrimmedCurve2D {
    /// Straight segment from `p1` to `p2`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the points coincide.
    pub fn line(p1: &Point2D, p2: &Point2D) -> Result<Self> {
        let d = p2.0 - p1.0;
        let length = d.norm();
        if length <= TOLERANCE * (1.0 + p1.0.coords.amax()) {
            return Err(SolidkitError::DegenerateGeometry(
                "2D segment end points coincide".into(),
            ));
        }
        Ok(Self {
            geometry: Arc::new(Curve2dGeometry::Line {
                origin: p1.0,
                direction: Unit::new_normalize(d),
            }),
            first: 0.0,
            last: length,
        })
    }

    #[must_use]
    pub fn start_point(&self) -> Point2D {
        Point2D(self.geometry.value(self.first))
    }

    #[must_use]
    pub fn end_point(&self) -> Point2D {
        Point2D(self.geometry.value(self.last))
    }

    #[must_use]
    pub fn value(&self, u: f64) -> Point2D {
        Point2D(self.geometry.value(u))
    }

    #[must_use]
    pub fn first(&self) -> f64 {
        self.first
    }

    #[must_use]
    pub fn last(&self) -> f64 {
        self.last
    }
}

/// An ellipse in a 2D parameter plane. Its major axis follows the axis
/// direction.
#[derive(Debug, Clone)]
pub struct Ellipse2D {
    geometry: Arc<Curve2dGeometry>,
}

impl Ellipse2D {
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if a radius is not
    /// positive or the minor radius exceeds the major radius.
    pub fn new(axis: &Axis2D, major_radius: f64, minor_radius: f64) -> Result<Self> {
        if minor_radius <= 0.0 || major_radius < minor_radius {
            return Err(SolidkitError::DegenerateGeometry(format!(
                "invalid ellipse radii: major {major_radius}, minor {minor_radius}"
            )));
        }
        Ok(Self {
            geometry: Arc::new(Curve2dGeometry::Ellipse {
                center: axis.location,
                major_dir: axis.direction,
                major: major_radius,
                minor: minor_radius,
            }),
        })
    }

    /// Evaluates the periodic curve at `u`; any real `u` is accepted.
    #[must_use]
    pub fn value(&self, u: f64) -> Point2D {
        Point2D(self.geometry.value(u))
    }

    /// The ellipse as an unrestricted 2D curve.
    #[must_use]
    pub fn curve(&self) -> Curve2D {
        Curve2D {
            geometry: Arc::clone(&self.geometry),
            bounds: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Direction2D;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn ellipse() -> Ellipse2D {
        let axis = Point2D::new(1.0, 2.0).axis2d_with(&Direction2D::x());
        Ellipse2D::new(&axis, 3.0, 1.0).unwrap()
    }

    #[test]
    fn ellipse_value_is_periodic() {
        let e = ellipse();
        let a = e.value(0.25);
        let b = e.value(0.25 + 2.0 * PI);
        assert_relative_eq!(a.0, b.0, epsilon = 1e-12);
        assert_relative_eq!(e.value(0.0).0, Point2::new(4.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(e.value(PI / 2.0).0, Point2::new(1.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn invalid_radii_are_rejected() {
        let axis = Point2D::origin().axis2d_with(&Direction2D::x());
        assert!(Ellipse2D::new(&axis, 1.0, 2.0).is_err());
        assert!(Ellipse2D::new(&axis, 1.0, 0.0).is_err());
    }

    #[test]
    fn trimmed_domain_is_kept() {
        let arc = ellipse().curve().trim(0.0, PI).unwrap();
        let curve = Curve2D::from(&arc);
        assert_eq!(curve.domain(), Some((0.0, PI)));
        assert_eq!(ellipse().curve().domain(), Some((0.0, 2.0 * PI)));
    }

    #[test]
    fn unbounded_line_has_no_domain() {
        let seg = TrimmedCurve2D::line(&Point2D::new(0.0, 0.0), &Point2D::new(3.0, 4.0)).unwrap();
        assert_relative_eq!(seg.end_point().0, Point2::new(3.0, 4.0), epsilon = 1e-12);
        let unbounded = Curve2D {
            geometry: Arc::clone(&seg.geometry),
            bounds: None,
        };
        assert_eq!(unbounded.domain(), None);
        assert!(TrimmedCurve2D::line(&Point2D::origin(), &Point2D::origin()).is_err());
    }
}
