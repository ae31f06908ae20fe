use crate::error::{Result, SolidkitError};
use crate::geometry::Plane;
use crate::math::{Point3, Vector3};
use crate::operations::shaping::Extrude;
use crate::topology::{Edge, Face, OrientedEdge, Shape, Vertex, Wire};

/// Creates an axis-aligned box from one corner and its extent.
pub(crate) struct MakeBox {
    corner: Point3,
    size: Vector3,
}

impl MakeBox {
    pub(crate) fn new(corner: Point3, size: Vector3) -> Self {
        Self { corner, size }
    }

    /// Extrudes the bottom rectangle upwards.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if any extent is not
    /// positive.
    pub(crate) fn execute(&self) -> Result<Shape> {
        let s = self.size;
        if !(s.x > 0.0 && s.y > 0.0 && s.z > 0.0) {
            return Err(SolidkitError::DegenerateGeometry(format!(
                "box extents must be positive, got ({}, {}, {})",
                s.x, s.y, s.z
            )));
        }
        let c = self.corner;
        let corners = [
            c,
            c + Vector3::new(s.x, 0.0, 0.0),
            c + Vector3::new(s.x, s.y, 0.0),
            c + Vector3::new(0.0, s.y, 0.0),
        ]
        .map(Vertex::at);
        let mut edges = Vec::with_capacity(4);
        for i in 0..4 {
            let edge = Edge::segment(&corners[i], &corners[(i + 1) % 4])?;
            edges.push(OrientedEdge::new(edge, true));
        }
        let base = Face::planar(
            Plane::from_frame(c, Vector3::x(), Vector3::y()),
            vec![Wire::from_edges(edges)],
        );
        Extrude::new(&base, &Vector3::new(0.0, 0.0, s.z)).execute()
    }
}
