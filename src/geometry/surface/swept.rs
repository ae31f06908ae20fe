use std::sync::Arc;

use crate::geometry::curve::TrimmedCurve;
use crate::geometry::{Point, Transformation};
use crate::math::{Point3, Vector3};

use super::{angular_breaks, numeric_derivatives, ParametricSurface, Surface, SurfaceDomain};

/// One boundary curve of a ruled or conical surface, traversed over the
/// normalized parameter `s` in `[0, 1]`, optionally backwards.
#[derive(Debug, Clone)]
pub(crate) struct Rail {
    pub(crate) curve: TrimmedCurve,
    pub(crate) reversed: bool,
}

impl Rail {
    pub(crate) fn new(curve: TrimmedCurve, reversed: bool) -> Self {
        Self { curve, reversed }
    }

    fn param(&self, s: f64) -> f64 {
        if self.reversed {
            1.0 - s
        } else {
            s
        }
    }

    pub(crate) fn value(&self, s: f64) -> Point3 {
        self.curve.point_normalized(self.param(s))
    }

    pub(crate) fn derivative(&self, s: f64) -> Vector3 {
        let d = self.curve.derivative_normalized(self.param(s));
        if self.reversed {
            -d
        } else {
            d
        }
    }

    fn breaks(&self) -> Vec<f64> {
        let mut breaks: Vec<f64> = self
            .curve
            .normalized_breaks()
            .into_iter()
            .map(|s| self.param(s))
            .collect();
        breaks.sort_by(f64::total_cmp);
        breaks
    }

    fn transformed(&self, t: &Transformation) -> Self {
        Self::new(self.curve.transformed(t), self.reversed)
    }
}

/// Surfaces generated by sweeping curves, plus offsets of other surfaces.
#[derive(Debug)]
pub(crate) enum SweptSurface {
    /// `S(u, v) = profile(u) + v * direction`.
    Extrusion { profile: Rail, direction: Vector3 },
    /// `S(u, v) = (1 - v) * a(u) + v * b(u)`.
    Ruled { rails: [Rail; 2] },
    /// `S(u, v) = (1 - v) * rail(u) + v * apex`.
    Apex { rail: Rail, apex: Point3 },
    /// Tube of `radius` around `spine`. `v` is the angle from the component
    /// of `up` orthogonal to the spine tangent.
    Pipe {
        spine: TrimmedCurve,
        up: Vector3,
        radius: f64,
        handedness: f64,
    },
    /// `S(u, v) = basis(u, v) + distance * n(u, v)`.
    Offset { basis: Surface, distance: f64 },
}

impl SweptSurface {
    fn pipe_frame(spine: &TrimmedCurve, up: &Vector3, handedness: f64, u: f64) -> (Vector3, Vector3) {
        let tangent = spine.derivative_normalized(u);
        let t = tangent.try_normalize(1e-14).unwrap_or_else(Vector3::z);
        let projected = up - t * up.dot(&t);
        let n1 = projected
            .try_normalize(1e-12)
            .unwrap_or_else(|| crate::math::perpendicular(&t));
        let n2 = t.cross(&n1) * handedness;
        (n1, n2)
    }

    pub(crate) fn u_breaks(&self, u0: f64, u1: f64) -> Vec<f64> {
        let raw = match self {
            Self::Extrusion { profile, .. } => profile.breaks(),
            Self::Pipe { spine, .. } => spine.normalized_breaks(),
            Self::Ruled { rails } => {
                let mut breaks = rails[0].breaks();
                breaks.extend(rails[1].breaks());
                breaks
            }
            Self::Apex { rail, .. } => rail.breaks(),
            Self::Offset { basis, .. } => return refine(&basis.u_breaks(u0, u1)),
        };
        clip_breaks(raw, u0, u1)
    }

    pub(crate) fn v_breaks(&self, v0: f64, v1: f64) -> Vec<f64> {
        match self {
            Self::Pipe { .. } => angular_breaks(v0, v1),
            Self::Offset { basis, .. } => refine(&basis.v_breaks(v0, v1)),
            _ => vec![v0, v1],
        }
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        match self {
            Self::Extrusion { profile, direction } => Self::Extrusion {
                profile: profile.transformed(t),
                direction: t.vector(direction),
            },
            Self::Ruled { rails } => Self::Ruled {
                rails: [rails[0].transformed(t), rails[1].transformed(t)],
            },
            Self::Apex { rail, apex } => Self::Apex {
                rail: rail.transformed(t),
                apex: t.point(apex),
            },
            Self::Pipe {
                spine,
                up,
                radius,
                handedness,
            } => Self::Pipe {
                spine: spine.transformed(t),
                up: t.vector(up),
                radius: *radius,
                handedness: if t.is_reflection() {
                    -handedness
                } else {
                    *handedness
                },
            },
            // A reflection flips the basis normal relative to its points.
            Self::Offset { basis, distance } => Self::Offset {
                basis: basis.transformed(t),
                distance: if t.is_reflection() {
                    -distance
                } else {
                    *distance
                },
            },
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Extrusion { .. } => "surface of linear extrusion",
            Self::Ruled { .. } => "ruled surface",
            Self::Apex { .. } => "conical surface",
            Self::Pipe { .. } => "pipe surface",
            Self::Offset { .. } => "offset surface",
        }
    }
}

impl ParametricSurface for SweptSurface {
    fn value(&self, u: f64, v: f64) -> Point3 {
        match self {
            Self::Extrusion { profile, direction } => profile.value(u) + direction * v,
            Self::Ruled { rails } => {
                let a = rails[0].value(u);
                let b = rails[1].value(u);
                a + (b - a) * v
            }
            Self::Apex { rail, apex } => {
                let a = rail.value(u);
                a + (apex - a) * v
            }
            Self::Pipe {
                spine,
                up,
                radius,
                handedness,
            } => {
                let (n1, n2) = Self::pipe_frame(spine, up, *handedness, u);
                spine.point_normalized(u) + (n1 * v.cos() + n2 * v.sin()) * *radius
            }
            Self::Offset { basis, distance } => {
                let p = ParametricSurface::value(basis, u, v);
                basis
                    .unit_normal(u, v)
                    .map_or(p, |n| p + n * *distance)
            }
        }
    }

    fn derivatives(&self, u: f64, v: f64) -> (Point3, Vector3, Vector3) {
        match self {
            Self::Extrusion { profile, direction } => (
                self.value(u, v),
                profile.derivative(u),
                *direction,
            ),
            Self::Ruled { rails } => {
                let (a, b) = (rails[0].value(u), rails[1].value(u));
                let (da, db) = (rails[0].derivative(u), rails[1].derivative(u));
                (a + (b - a) * v, da * (1.0 - v) + db * v, b - a)
            }
            Self::Apex { rail, apex } => {
                let a = rail.value(u);
                (a + (apex - a) * v, rail.derivative(u) * (1.0 - v), apex - a)
            }
            Self::Pipe { .. } | Self::Offset { .. } => {
                numeric_derivatives(|a, b| self.value(a, b), u, v)
            }
        }
    }

    fn domain(&self) -> SurfaceDomain {
        match self {
            Self::Extrusion { .. } => SurfaceDomain {
                u: Some((0.0, 1.0)),
                v: None,
                u_periodic: false,
                v_periodic: false,
            },
            Self::Ruled { .. } | Self::Apex { .. } => SurfaceDomain::bounded((0.0, 1.0), (0.0, 1.0)),
            Self::Pipe { .. } => SurfaceDomain {
                u: Some((0.0, 1.0)),
                v: Some((0.0, std::f64::consts::TAU)),
                u_periodic: false,
                v_periodic: true,
            },
            Self::Offset { basis, .. } => ParametricSurface::domain(basis),
        }
    }
}

/// Breaks strictly inside `(u0, u1)`, framed by the end points.
fn clip_breaks(raw: Vec<f64>, u0: f64, u1: f64) -> Vec<f64> {
    let (lo, hi) = if u0 <= u1 { (u0, u1) } else { (u1, u0) };
    let mut breaks = vec![u0];
    let mut inner: Vec<f64> = raw
        .into_iter()
        .filter(|&b| b > lo + 1e-12 && b < hi - 1e-12)
        .collect();
    if u0 > u1 {
        inner.reverse();
    }
    breaks.extend(inner);
    breaks.push(u1);
    breaks
}

/// Halves every panel.
fn refine(breaks: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(breaks.len() * 2);
    for pair in breaks.windows(2) {
        out.push(pair[0]);
        out.push(0.5 * (pair[0] + pair[1]));
    }
    if let Some(last) = breaks.last() {
        out.push(*last);
    }
    out
}

/// A carrier surface with no analytic narrowing: ruled, conical, extruded,
/// pipe and offset surfaces.
#[derive(Debug, Clone)]
pub struct OpaqueSurface(pub(crate) Arc<SweptSurface>);

impl OpaqueSurface {
    pub(crate) fn new(surface: SweptSurface) -> Self {
        Self(Arc::new(surface))
    }

    /// A human readable name for the kind of surface.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.0.kind_name()
    }

    /// Evaluates the surface at `(u, v)`.
    #[must_use]
    pub fn value(&self, u: f64, v: f64) -> Point {
        Point(self.0.value(u, v))
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        Self::new(self.0.transformed(t))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use approx::assert_relative_eq;

    fn segment(a: [f64; 3], b: [f64; 3]) -> TrimmedCurve {
        TrimmedCurve::segment(&Point3::from(a), &Point3::from(b)).unwrap()
    }

    #[test]
    fn ruled_surface_interpolates_rails() {
        let s = SweptSurface::Ruled {
            rails: [
                Rail::new(segment([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]), false),
                Rail::new(segment([1.0, 0.0, 1.0], [0.0, 0.0, 1.0]), true),
            ],
        };
        assert_relative_eq!(s.value(0.25, 0.0), Point3::new(0.25, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(s.value(0.25, 1.0), Point3::new(0.25, 0.0, 1.0), epsilon = 1e-12);
        let (_, su, sv) = s.derivatives(0.5, 0.5);
        assert_relative_eq!(su, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(sv, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn pipe_stays_at_radius_from_spine() {
        let spine = segment([0.0, 0.0, 0.0], [0.0, 0.0, 4.0]);
        let s = SweptSurface::Pipe {
            spine: spine.clone(),
            up: Vector3::x(),
            radius: 0.5,
            handedness: 1.0,
        };
        for (u, v) in [(0.1, 0.3), (0.7, 2.0), (1.0, 5.5)] {
            let p = s.value(u, v);
            let axis_point = spine.point_normalized(u);
            assert_relative_eq!((p - axis_point).norm(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn transformed_pipe_matches_transformed_points() {
        let spine = segment([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        let s = SweptSurface::Pipe {
            spine,
            up: Vector3::z(),
            radius: 0.25,
            handedness: 1.0,
        };
        let mut t = Transformation::new();
        t.mirror_plane(&Point::origin().plane_axis_with(&Direction::y()));
        let m = s.transformed(&t);
        assert_relative_eq!(m.value(0.4, 1.1), t.point(&s.value(0.4, 1.1)), epsilon = 1e-12);
    }

    #[test]
    fn offset_surface_follows_reflection() {
        let plane = super::super::Plane::from_normal(Point3::origin(), &Vector3::z());
        let s = SweptSurface::Offset {
            basis: Surface::Plane(plane),
            distance: 1.0,
        };
        let t = Transformation::rotation(&Point::origin().axis_with(&Direction::x()), 0.3);
        assert_relative_eq!(s.transformed(&t).value(0.2, 0.3), t.point(&s.value(0.2, 0.3)), epsilon = 1e-9);
        let mut m = Transformation::new();
        m.mirror_plane(&Point::origin().plane_axis_with(&Direction::x()));
        assert_relative_eq!(s.transformed(&m).value(0.2, 0.3), m.point(&s.value(0.2, 0.3)), epsilon = 1e-9);
    }

    #[test]
    fn clipped_breaks_keep_orientation() {
        assert_eq!(clip_breaks(vec![0.0, 0.5, 1.0], 1.0, 0.0), vec![1.0, 0.5, 0.0]);
        assert_eq!(refine(&[0.0, 1.0]), vec![0.0, 0.5, 1.0]);
    }
}
