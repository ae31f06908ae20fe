use crate::error::{Result, SolidkitError};
use crate::geometry::Transformation;
use crate::math::{lerp, points_coincide, Point3, Vector3};

use super::Curve;

/// Piecewise-linear curve through its vertices; vertex `i` sits at `t = i`.
#[derive(Debug, Clone)]
pub(crate) struct Polyline {
    points: Vec<Point3>,
}

impl Polyline {
    pub(crate) fn new(mut points: Vec<Point3>) -> Result<Self> {
        points.dedup_by(|b, a| points_coincide(a, b));
        if points.len() < 2 {
            return Err(SolidkitError::DegenerateGeometry(
                "polyline needs two distinct points".into(),
            ));
        }
        Ok(Self { points })
    }

    pub(crate) fn points(&self) -> &[Point3] {
        &self.points
    }

    /// The vertex parameters inside `[first, last]`, bracketed by the ends.
    pub(crate) fn breaks(&self, first: f64, last: f64) -> Vec<f64> {
        let (lo, hi) = (first.min(last), first.max(last));
        #[allow(clippy::cast_possible_truncation)]
        let (start, end) = (lo.floor() as i64 + 1, hi.ceil() as i64);
        #[allow(clippy::cast_precision_loss)]
        let mut inner: Vec<f64> = (start..end).map(|i| i as f64).filter(|&t| t > lo && t < hi).collect();
        if first > last {
            inner.reverse();
        }
        let mut out = Vec::with_capacity(inner.len() + 2);
        out.push(first);
        out.extend(inner);
        out.push(last);
        out
    }

    fn segment(&self, t: f64) -> (usize, f64) {
        let last = self.points.len() - 2;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = if t <= 0.0 {
            0
        } else {
            (t.floor() as usize).min(last)
        };
        #[allow(clippy::cast_precision_loss)]
        let f = t - i as f64;
        (i, f)
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self {
            points: self.points.iter().map(|p| t.point(p)).collect(),
        }
    }
}

impl Curve for Polyline {
    fn value(&self, t: f64) -> Point3 {
        let (i, f) = self.segment(t);
        lerp(&self.points[i], &self.points[i + 1], f)
    }

    fn derivative(&self, t: f64) -> Vector3 {
        let (i, _) = self.segment(t);
        self.points[i + 1] - self.points[i]
    }
}
