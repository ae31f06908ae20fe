use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SolidkitError};
use crate::geometry::{
    Curve2D, CurveGeometry, CurveOnSurface, Point, Surface, Transformable, Transformation,
    TrimmedCurve,
};
use crate::math::{scaled_tolerance, Point3, Vector3};

use super::Vertex;

/// Samples checked against the surface domain when lifting a 2D curve.
const DOMAIN_SAMPLES: usize = 32;

#[derive(Debug)]
pub(crate) struct EdgeNode {
    pub(crate) curve: TrimmedCurve,
    pub(crate) start: Vertex,
    pub(crate) end: Vertex,
}

/// A bounded curve between two vertices.
///
/// Edges are shared: the two faces meeting along an edge hold the same
/// `Edge`, traversed in opposite directions.
#[derive(Clone)]
pub struct Edge(pub(crate) Arc<EdgeNode>);

impl Edge {
    /// Builds an edge on a 3D curve.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the curve collapses to
    /// a point.
    pub fn new(curve: &TrimmedCurve) -> Result<Self> {
        let start = curve.point_at(curve.first);
        if curve.length() <= scaled_tolerance(start.coords.amax()) {
            return Err(SolidkitError::DegenerateGeometry(
                "edge curve collapses to a point".into(),
            ));
        }
        Ok(Self::from_curve(curve.clone()))
    }

    /// A straight edge from `p1` to `p2`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the points coincide.
    pub fn line(p1: &Point, p2: &Point) -> Result<Self> {
        Self::new(&TrimmedCurve::line(p1, p2)?)
    }

    /// A circular arc edge from `p1` through `p2` to `p3`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the points are
    /// collinear or two of them coincide.
    pub fn arc_of_circle(p1: &Point, p2: &Point, p3: &Point) -> Result<Self> {
        Self::new(&TrimmedCurve::arc_of_circle(p1, p2, p3)?)
    }

    /// Lifts a parameter-space curve onto `surface`.
    ///
    /// The 3D curve is built immediately, so the edge can be used in wires,
    /// faces and lofts without further repair.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::InvalidParametrization`] if the 2D curve is
    /// unbounded or leaves the surface's parameter domain, and
    /// [`SolidkitError::DegenerateGeometry`] if the lifted curve collapses.
    pub fn new_with_surface(curve: &Curve2D, surface: &Surface) -> Result<Self> {
        let (first, last) = curve.domain().ok_or_else(|| {
            SolidkitError::InvalidParametrization("2D curve has an unbounded domain".into())
        })?;
        let domain = surface.parameter_domain();
        for i in 0..=DOMAIN_SAMPLES {
            #[allow(clippy::cast_precision_loss)]
            let t = first + (last - first) * (i as f64 / DOMAIN_SAMPLES as f64);
            let uv = curve.geometry.value(t);
            if !domain.contains(uv.x, uv.y, 1e-9) {
                return Err(SolidkitError::InvalidParametrization(format!(
                    "2D curve leaves the surface domain at ({}, {})",
                    uv.x, uv.y
                )));
            }
        }
        let lifted = CurveOnSurface::new(curve.clone(), surface.clone());
        Self::new(&TrimmedCurve::new(CurveGeometry::OnSurface(lifted), first, last))
    }

    /// Point at the start vertex.
    #[must_use]
    pub fn start(&self) -> Point {
        self.0.start.point()
    }

    /// Point at the end vertex.
    #[must_use]
    pub fn end(&self) -> Point {
        self.0.end.point()
    }

    #[must_use]
    pub fn start_vertex(&self) -> Vertex {
        self.0.start.clone()
    }

    #[must_use]
    pub fn end_vertex(&self) -> Vertex {
        self.0.end.clone()
    }

    /// The underlying trimmed curve.
    #[must_use]
    pub fn curve(&self) -> TrimmedCurve {
        self.0.curve.clone()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.curve.length()
    }

    /// Whether the edge starts and ends on the same vertex.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.start.ptr_eq(&self.0.end)
    }

    /// An edge on `curve` with fresh vertices; a closed curve gets one vertex.
    pub(crate) fn from_curve(curve: TrimmedCurve) -> Self {
        let start = Vertex::at(curve.point_at(curve.first));
        let end = if curve.is_closed() {
            start.clone()
        } else {
            Vertex::at(curve.point_at(curve.last))
        };
        Self::with_vertices(curve, start, end)
    }

    pub(crate) fn with_vertices(curve: TrimmedCurve, start: Vertex, end: Vertex) -> Self {
        Self(Arc::new(EdgeNode { curve, start, end }))
    }

    /// Straight edge between two existing vertices.
    pub(crate) fn segment(start: &Vertex, end: &Vertex) -> Result<Self> {
        let curve = TrimmedCurve::segment(&start.position(), &end.position())?;
        Ok(Self::with_vertices(curve, start.clone(), end.clone()))
    }

    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Transformable for Edge {
    fn transformed(&self, transformation: &Transformation) -> Self {
        super::transform::TransformMemo::new(transformation).edge(self)
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("start", &self.0.start.position())
            .field("end", &self.0.end.position())
            .field("length", &self.length())
            .finish()
    }
}

/// An edge as used by a wire: the shared edge plus a traversal direction.
#[derive(Debug, Clone)]
pub(crate) struct OrientedEdge {
    pub(crate) edge: Edge,
    pub(crate) forward: bool,
}

impl OrientedEdge {
    pub(crate) fn new(edge: Edge, forward: bool) -> Self {
        Self { edge, forward }
    }

    pub(crate) fn reversed(&self) -> Self {
        Self::new(self.edge.clone(), !self.forward)
    }

    pub(crate) fn start_vertex(&self) -> &Vertex {
        if self.forward {
            &self.edge.0.start
        } else {
            &self.edge.0.end
        }
    }

    pub(crate) fn end_vertex(&self) -> &Vertex {
        if self.forward {
            &self.edge.0.end
        } else {
            &self.edge.0.start
        }
    }

    /// The same traversal starting on `vertex`; the edge is rebuilt only when
    /// it does not already start there.
    pub(crate) fn with_start_vertex(&self, vertex: &Vertex) -> Self {
        self.relinked(self.forward, vertex)
    }

    /// The same traversal ending on `vertex`.
    pub(crate) fn with_end_vertex(&self, vertex: &Vertex) -> Self {
        self.relinked(!self.forward, vertex)
    }

    fn relinked(&self, edge_start: bool, vertex: &Vertex) -> Self {
        let node = &self.edge.0;
        let current = if edge_start { &node.start } else { &node.end };
        if current.ptr_eq(vertex) {
            return self.clone();
        }
        let (start, end) = if node.start.ptr_eq(&node.end) {
            (vertex.clone(), vertex.clone())
        } else if edge_start {
            (vertex.clone(), node.end.clone())
        } else {
            (node.start.clone(), vertex.clone())
        };
        Self::new(Edge::with_vertices(node.curve.clone(), start, end), self.forward)
    }

    pub(crate) fn start_point(&self) -> Point3 {
        self.start_vertex().position()
    }

    pub(crate) fn end_point(&self) -> Point3 {
        self.end_vertex().position()
    }

    /// Maps a traversal fraction to the edge's own normalized parameter.
    pub(crate) fn edge_fraction(&self, f: f64) -> f64 {
        if self.forward {
            f
        } else {
            1.0 - f
        }
    }

    /// Point at traversal fraction `f` in `[0, 1]`.
    pub(crate) fn point_at(&self, f: f64) -> Point3 {
        self.edge.0.curve.point_normalized(self.edge_fraction(f))
    }

    /// Tangent in the traversal direction at fraction `f`.
    pub(crate) fn tangent_at(&self, f: f64) -> Vector3 {
        let d = self.edge.0.curve.derivative_normalized(self.edge_fraction(f));
        if self.forward {
            d
        } else {
            -d
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, OpaqueSurface, Point2D, Rail, SweptSurface, TrimmedCurve2D};
    use crate::math::TOLERANCE;
    use approx::assert_relative_eq;

    fn unit_ruled_patch() -> Surface {
        let bottom = TrimmedCurve::segment(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0)).unwrap();
        let top =
            TrimmedCurve::segment(&Point3::new(0.0, 1.0, 0.0), &Point3::new(1.0, 1.0, 1.0)).unwrap();
        Surface::Other(OpaqueSurface::new(SweptSurface::Ruled {
            rails: [Rail::new(bottom, false), Rail::new(top, false)],
        }))
    }

    fn line_2d(a: (f64, f64), b: (f64, f64)) -> Curve2D {
        let seg = TrimmedCurve2D::line(&Point2D::new(a.0, a.1), &Point2D::new(b.0, b.1)).unwrap();
        Curve2D::from(&seg)
    }

    #[test]
    fn collapsed_curve_is_degenerate() {
        let seg = TrimmedCurve::line(&Point::origin(), &Point::new(2.0, 0.0, 0.0)).unwrap();
        let collapsed = TrimmedCurve {
            last: seg.first + TOLERANCE * 1e-3,
            ..seg.clone()
        };
        assert!(matches!(
            Edge::new(&collapsed),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
        let edge = Edge::new(&seg).unwrap();
        assert_relative_eq!(edge.length(), 2.0, epsilon = 1e-12);
        assert!(!edge.is_closed());
    }

    #[test]
    fn coincident_line_points_are_rejected() {
        let p = Point::new(1.0, 1.0, 1.0);
        assert!(matches!(
            Edge::line(&p, &p),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn unbounded_2d_curve_is_rejected() {
        let bounded = line_2d((0.0, 0.0), (1.0, 0.0));
        let unbounded = Curve2D {
            bounds: None,
            ..bounded
        };
        let plane = Surface::from(&crate::geometry::Plane::new(
            &Point::origin().plane_axis_with(&Direction::z()),
        ));
        assert!(matches!(
            Edge::new_with_surface(&unbounded, &plane),
            Err(SolidkitError::InvalidParametrization(_))
        ));
    }

    #[test]
    fn curve_leaving_the_surface_domain_is_rejected() {
        let patch = unit_ruled_patch();
        assert!(matches!(
            Edge::new_with_surface(&line_2d((0.5, 0.5), (3.0, 0.5)), &patch),
            Err(SolidkitError::InvalidParametrization(_))
        ));

        let inside = Edge::new_with_surface(&line_2d((0.0, 0.0), (1.0, 1.0)), &patch).unwrap();
        assert_relative_eq!(inside.start().0, Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(inside.end().0, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn closed_curve_gets_one_vertex() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        let cylinder = Surface::from(&crate::geometry::CylindricalSurface::new(&axis, 1.0).unwrap());
        let ring = Edge::new_with_surface(&line_2d((0.0, 0.5), (std::f64::consts::TAU, 0.5)), &cylinder)
            .unwrap();
        assert!(ring.is_closed());
        assert_relative_eq!(ring.length(), std::f64::consts::TAU, max_relative = 1e-6);
    }
}
