mod axis;
pub(crate) mod curve;
mod curve2d;
mod primitives;
pub(crate) mod surface;
mod transform;

pub use axis::{Axis, Axis2D, PlaneAxis, SpaceAxis};
pub use curve::TrimmedCurve;
pub use curve2d::{Curve2D, Ellipse2D, TrimmedCurve2D};
pub use primitives::{Direction, Direction2D, Point, Point2D, Vector};
pub use surface::{CylindricalSurface, OpaqueSurface, Plane, Surface, SurfaceDomain};
pub use transform::{Transformable, Transformation};

pub(crate) use curve::{Circle, CurveGeometry, CurveOnSurface};
pub(crate) use surface::{ParametricSurface, Rail, SweptSurface};
