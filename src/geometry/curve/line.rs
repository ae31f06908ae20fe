use nalgebra::Unit;

use crate::geometry::Transformation;
use crate::math::{Point3, Vector3};

use super::Curve;

/// Unbounded straight line parametrized by arc length: `P(t) = origin + t * direction`.
#[derive(Debug, Clone)]
pub(crate) struct Line {
    origin: Point3,
    direction: Unit<Vector3>,
}

impl Line {
    /// The line through `a` and `b`, with the distance between them.
    pub(crate) fn between(a: &Point3, b: &Point3) -> (Self, f64) {
        let d = b - a;
        let length = d.norm();
        (
            Self {
                origin: *a,
                direction: Unit::new_normalize(d),
            },
            length,
        )
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self {
            origin: t.point(&self.origin),
            direction: t.unit(&self.direction),
        }
    }
}

impl Curve for Line {
    fn value(&self, t: f64) -> Point3 {
        self.origin + self.direction.into_inner() * t
    }

    fn derivative(&self, _t: f64) -> Vector3 {
        self.direction.into_inner()
    }
}
