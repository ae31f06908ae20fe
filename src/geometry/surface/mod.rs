mod cylinder;
mod plane;
mod swept;

pub use cylinder::CylindricalSurface;
pub use plane::Plane;
pub use swept::OpaqueSurface;
pub(crate) use swept::{Rail, SweptSurface};

use std::f64::consts::FRAC_PI_4;

use crate::error::{Result, SolidkitError};
use crate::math::quadrature::uniform_breaks;
use crate::math::{Point3, Vector3};

use super::{Direction, Point, Transformation};

/// Parameter domain for a surface. `None` means unbounded in that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    pub u: Option<(f64, f64)>,
    pub v: Option<(f64, f64)>,
    /// Whether `u` wraps around with period `2π`.
    pub u_periodic: bool,
    /// Whether `v` wraps around with period `2π`.
    pub v_periodic: bool,
}

impl SurfaceDomain {
    pub(crate) fn unbounded() -> Self {
        Self {
            u: None,
            v: None,
            u_periodic: false,
            v_periodic: false,
        }
    }

    pub(crate) fn bounded(u: (f64, f64), v: (f64, f64)) -> Self {
        Self {
            u: Some(sorted(u)),
            v: Some(sorted(v)),
            u_periodic: false,
            v_periodic: false,
        }
    }

    /// Whether `(u, v)` lies inside the domain, up to `tol`.
    #[must_use]
    pub fn contains(&self, u: f64, v: f64, tol: f64) -> bool {
        let inside = |x: f64, range: Option<(f64, f64)>, periodic: bool| {
            periodic || range.map_or(true, |(lo, hi)| x >= lo - tol && x <= hi + tol)
        };
        inside(u, self.u, self.u_periodic) && inside(v, self.v, self.v_periodic)
    }
}

fn sorted((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Evaluation shared by every surface kind.
pub(crate) trait ParametricSurface {
    fn value(&self, u: f64, v: f64) -> Point3;

    /// Point and first partial derivatives `(S, S_u, S_v)`.
    fn derivatives(&self, u: f64, v: f64) -> (Point3, Vector3, Vector3);

    fn domain(&self) -> SurfaceDomain;

    /// Unit normal `S_u × S_v`, `None` at a singular point.
    fn unit_normal(&self, u: f64, v: f64) -> Option<Vector3> {
        let (_, su, sv) = self.derivatives(u, v);
        let n = su.cross(&sv);
        let len = n.norm();
        (len > 1e-14).then(|| n / len)
    }
}

/// The closed set of carrier surfaces a face can report.
///
/// Narrow with [`Surface::as_plane`] or pattern matching; each variant shares
/// its geometry with every face built on it.
#[derive(Debug, Clone)]
pub enum Surface {
    Plane(Plane),
    Cylindrical(CylindricalSurface),
    Other(OpaqueSurface),
}

impl Surface {
    #[must_use]
    pub fn is_plane(&self) -> bool {
        matches!(self, Self::Plane(_))
    }

    /// Narrows to the plane sharing this surface's geometry.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::TypeMismatch`] if the surface is not a plane.
    pub fn as_plane(&self) -> Result<Plane> {
        match self {
            Self::Plane(p) => Ok(p.clone()),
            other => Err(SolidkitError::TypeMismatch(format!(
                "expected a plane, found {}",
                other.kind_name()
            ))),
        }
    }

    /// Narrows to the cylinder sharing this surface's geometry.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::TypeMismatch`] if the surface is not cylindrical.
    pub fn as_cylinder(&self) -> Result<CylindricalSurface> {
        match self {
            Self::Cylindrical(c) => Ok(c.clone()),
            other => Err(SolidkitError::TypeMismatch(format!(
                "expected a cylinder, found {}",
                other.kind_name()
            ))),
        }
    }

    /// Evaluates the surface at `(u, v)`.
    #[must_use]
    pub fn value(&self, u: f64, v: f64) -> Point {
        Point(ParametricSurface::value(self, u, v))
    }

    /// Unit normal `S_u × S_v` at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] at a singular point.
    pub fn normal(&self, u: f64, v: f64) -> Result<Direction> {
        let n = self.unit_normal(u, v).ok_or_else(|| {
            SolidkitError::DegenerateGeometry(format!("surface is singular at ({u}, {v})"))
        })?;
        Direction::from_vector(&n)
    }

    #[must_use]
    pub fn parameter_domain(&self) -> SurfaceDomain {
        ParametricSurface::domain(self)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Plane(_) => "plane",
            Self::Cylindrical(_) => "cylindrical surface",
            Self::Other(o) => o.kind_name(),
        }
    }

    pub(crate) fn transformed(&self, t: &Transformation) -> Self {
        match self {
            Self::Plane(p) => Self::Plane(p.transformed(t)),
            Self::Cylindrical(c) => Self::Cylindrical(c.transformed(t)),
            Self::Other(o) => Self::Other(o.transformed(t)),
        }
    }

    /// The surface displaced by `distance` along its unit normal `S_u × S_v`.
    pub(crate) fn offset(&self, distance: f64) -> Self {
        match self {
            Self::Plane(p) => Self::Plane(p.offset(distance)),
            Self::Cylindrical(c) => c.offset(distance).map_or_else(
                || Self::Other(OpaqueSurface::new(SweptSurface::Offset {
                    basis: self.clone(),
                    distance,
                })),
                Self::Cylindrical,
            ),
            Self::Other(_) => Self::Other(OpaqueSurface::new(SweptSurface::Offset {
                basis: self.clone(),
                distance,
            })),
        }
    }

    /// Quadrature panel boundaries along `u`.
    pub(crate) fn u_breaks(&self, u0: f64, u1: f64) -> Vec<f64> {
        match self {
            Self::Plane(_) => vec![u0, u1],
            Self::Cylindrical(_) => angular_breaks(u0, u1),
            Self::Other(o) => o.0.u_breaks(u0, u1),
        }
    }

    /// Quadrature panel boundaries along `v`.
    pub(crate) fn v_breaks(&self, v0: f64, v1: f64) -> Vec<f64> {
        match self {
            Self::Plane(_) | Self::Cylindrical(_) => vec![v0, v1],
            Self::Other(o) => o.0.v_breaks(v0, v1),
        }
    }
}

impl ParametricSurface for Surface {
    fn value(&self, u: f64, v: f64) -> Point3 {
        match self {
            Self::Plane(p) => p.0.value(u, v),
            Self::Cylindrical(c) => c.0.value(u, v),
            Self::Other(o) => o.0.value(u, v),
        }
    }

    fn derivatives(&self, u: f64, v: f64) -> (Point3, Vector3, Vector3) {
        match self {
            Self::Plane(p) => p.0.derivatives(u, v),
            Self::Cylindrical(c) => c.0.derivatives(u, v),
            Self::Other(o) => o.0.derivatives(u, v),
        }
    }

    fn domain(&self) -> SurfaceDomain {
        match self {
            Self::Plane(p) => p.0.domain(),
            Self::Cylindrical(c) => c.0.domain(),
            Self::Other(o) => o.0.domain(),
        }
    }
}

impl From<&CylindricalSurface> for Surface {
    fn from(cylinder: &CylindricalSurface) -> Self {
        Self::Cylindrical(cylinder.clone())
    }
}

impl From<&Plane> for Surface {
    fn from(plane: &Plane) -> Self {
        Self::Plane(plane.clone())
    }
}

pub(crate) fn angular_breaks(a: f64, b: f64) -> Vec<f64> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = ((b - a).abs() / FRAC_PI_4).ceil() as usize;
    uniform_breaks(a, b, n)
}

/// Central-difference partial derivatives for surfaces without closed forms.
pub(crate) fn numeric_derivatives<F: Fn(f64, f64) -> Point3>(
    f: F,
    u: f64,
    v: f64,
) -> (Point3, Vector3, Vector3) {
    let hu = 1e-6 * (1.0 + u.abs());
    let hv = 1e-6 * (1.0 + v.abs());
    let su = (f(u + hu, v) - f(u - hu, v)) / (2.0 * hu);
    let sv = (f(u, v + hv) - f(u, v - hv)) / (2.0 * hv);
    (f(u, v), su, sv)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, Point};

    fn cylinder() -> Surface {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        Surface::from(&CylindricalSurface::new(&axis, 2.0).unwrap())
    }

    #[test]
    fn narrowing_to_plane() {
        let plane = Plane::new(&Point::new(0.0, 0.0, 5.0).plane_axis_with(&Direction::z()));
        let s = Surface::from(&plane);
        assert!(s.is_plane());
        assert!((s.as_plane().unwrap().location().z() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn cylinder_is_not_a_plane() {
        let s = cylinder();
        assert!(!s.is_plane());
        assert!(matches!(s.as_plane(), Err(SolidkitError::TypeMismatch(_))));
        assert!(s.as_cylinder().is_ok());
    }

    #[test]
    fn domain_containment() {
        let d = SurfaceDomain::bounded((0.0, 1.0), (2.0, 3.0));
        assert!(d.contains(0.5, 2.5, 1e-9));
        assert!(!d.contains(1.5, 2.5, 1e-9));
        assert!(cylinder().parameter_domain().contains(100.0, -4.0, 0.0));
    }

    #[test]
    fn offset_cylinder_grows_radius() {
        let s = cylinder().offset(0.5);
        let c = s.as_cylinder().unwrap();
        assert!((c.radius() - 2.5).abs() < 1e-12);
    }
}
