use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SolidkitError};
use crate::geometry::{Plane, Surface, Transformable, Transformation, Vector};
use crate::math::polygon::{area_vector, segments_intersect_2d, vertex_centroid};
use crate::math::{Point2, Point3};
use crate::tessellation::{curve::wire_polygon, TessellationParams};

use super::{OrientedEdge, Shape, Wire};

/// How the face's extent on its carrier surface is described.
#[derive(Debug, Clone)]
pub(crate) enum FaceRegion {
    /// The plane area enclosed by the face wires.
    Planar,
    /// The image of `[u.0, u.1] x [v.0, v.1]` under `map`.
    ///
    /// `sides` run bottom (+u), right (+v), top (-u), left (-v); `None`
    /// marks a side collapsed to a point.
    Patch {
        map: Surface,
        u: (f64, f64),
        v: (f64, f64),
        sides: [Option<OrientedEdge>; 4],
    },
    /// Convex planar polygons, counter-clockwise around the outward normal.
    Faceted(Arc<Vec<Vec<Point3>>>),
}

#[derive(Debug)]
pub(crate) struct FaceNode {
    pub(crate) surface: Surface,
    pub(crate) region: FaceRegion,
    /// Outer wire first. Every wire runs counter-clockwise around the
    /// outward normal, so holes run clockwise when seen from outside.
    pub(crate) wires: Vec<Wire>,
    /// Outward normal is `-(S_u x S_v)` of the carrier (or patch map).
    pub(crate) reversed: bool,
}

/// A bounded region of a surface.
///
/// Faces are made from closed planar wires with [`Wire::face`], or come out
/// of solids through [`Shape::faces`](super::Shape::faces).
#[derive(Clone)]
pub struct Face(pub(crate) Arc<FaceNode>);

impl Face {
    /// The carrier surface. Faces split by booleans keep the surface of the
    /// face they came from.
    #[must_use]
    pub fn surface(&self) -> Surface {
        self.0.surface.clone()
    }

    /// Sweeps the face along `vector` into a solid.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the vector is zero
    /// or parallel to a planar face.
    pub fn extrude(&self, vector: &Vector) -> Result<Shape> {
        crate::operations::shaping::Extrude::new(self, &vector.0).execute()
    }

    #[must_use]
    pub fn outer_wire(&self) -> Wire {
        self.0.wires[0].clone()
    }

    #[must_use]
    pub fn inner_wires(&self) -> Vec<Wire> {
        self.0.wires[1..].to_vec()
    }

    pub(crate) fn from_node(node: FaceNode) -> Self {
        Self(Arc::new(node))
    }

    /// A planar face whose loops run counter-clockwise around the plane normal.
    pub(crate) fn planar(plane: Plane, wires: Vec<Wire>) -> Self {
        Self::from_node(FaceNode {
            surface: Surface::Plane(plane),
            region: FaceRegion::Planar,
            wires,
            reversed: false,
        })
    }

    /// A rectangular patch of `map`; the wire is assembled from `sides`.
    pub(crate) fn patch(
        carrier: Surface,
        map: Surface,
        u: (f64, f64),
        v: (f64, f64),
        sides: [Option<OrientedEdge>; 4],
        reversed: bool,
    ) -> Self {
        let loop_edges: Vec<OrientedEdge> = sides.iter().flatten().cloned().collect();
        let wire = Wire::from_edges(loop_edges);
        let wire = if reversed { wire.reversed() } else { wire };
        Self::from_node(FaceNode {
            surface: carrier,
            region: FaceRegion::Patch { map, u, v, sides },
            wires: vec![wire],
            reversed,
        })
    }

    pub(crate) fn faceted(surface: Surface, polygons: Vec<Vec<Point3>>, wires: Vec<Wire>) -> Self {
        Self::from_node(FaceNode {
            surface,
            region: FaceRegion::Faceted(Arc::new(polygons)),
            wires,
            reversed: false,
        })
    }

    /// The same face with its outward side swapped. Edges stay shared.
    pub(crate) fn flipped(&self) -> Self {
        let region = match &self.0.region {
            FaceRegion::Faceted(polygons) => FaceRegion::Faceted(Arc::new(
                polygons
                    .iter()
                    .map(|p| p.iter().rev().copied().collect())
                    .collect(),
            )),
            other => other.clone(),
        };
        let reversed = match region {
            FaceRegion::Faceted(_) => false,
            _ => !self.0.reversed,
        };
        Self::from_node(FaceNode {
            surface: self.0.surface.clone(),
            region,
            wires: self.0.wires.iter().map(Wire::reversed).collect(),
            reversed,
        })
    }

    /// `1.0` when the outward normal follows the carrier normal, else `-1.0`.
    pub(crate) fn sense(&self) -> f64 {
        if self.0.reversed {
            -1.0
        } else {
            1.0
        }
    }

    pub(crate) fn oriented_edges(&self) -> impl Iterator<Item = &OrientedEdge> {
        self.0.wires.iter().flat_map(|w| w.oriented().iter())
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Validates `wire` as the boundary of a plane region.
    pub(crate) fn from_wire(wire: &Wire) -> Result<Self> {
        if !wire.is_closed() {
            return Err(SolidkitError::NonPlanarOrSelfIntersecting(
                "wire is not closed".into(),
            ));
        }
        let points = wire_polygon(wire, &TessellationParams::default());
        let area = area_vector(&points);
        let (min, max) = bounds(&points);
        let size = (max - min).norm();
        let tol = 1e-6 * (1.0 + size);
        if points.len() < 3 || area.norm() <= tol * tol {
            return Err(SolidkitError::NonPlanarOrSelfIntersecting(
                "wire encloses no area".into(),
            ));
        }
        let normal = area.normalize();
        let centroid = vertex_centroid(&points);
        if let Some(off) = points
            .iter()
            .map(|p| (p - centroid).dot(&normal).abs())
            .find(|d| *d > tol)
        {
            return Err(SolidkitError::NonPlanarOrSelfIntersecting(format!(
                "wire leaves its mean plane by {off}"
            )));
        }

        let plane = Plane::from_normal(wire.oriented()[0].start_point(), &normal);
        let flat: Vec<Point2> = points.iter().map(|p| plane.project(p)).collect();
        if let Some((i, j)) = first_crossing(&flat, tol) {
            return Err(SolidkitError::NonPlanarOrSelfIntersecting(format!(
                "boundary segments {i} and {j} cross"
            )));
        }
        debug!(edges = wire.edge_count(), samples = points.len(), "built planar face");
        Ok(Self::planar(plane, vec![wire.clone()]))
    }
}

fn bounds(points: &[Point3]) -> (Point3, Point3) {
    let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min = min.inf(p);
        max = max.sup(p);
    }
    (min, max)
}

/// First pair of non-adjacent segments of the closed polygon that touch.
fn first_crossing(points: &[Point2], tol: f64) -> Option<(usize, usize)> {
    let n = points.len();
    for i in 0..n {
        let (a0, a1) = (points[i], points[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b0, b1) = (points[j], points[(j + 1) % n]);
            if segments_intersect_2d(&a0, &a1, &b0, &b1, tol) {
                return Some((i, j));
            }
        }
    }
    None
}

impl Transformable for Face {
    fn transformed(&self, transformation: &Transformation) -> Self {
        super::transform::TransformMemo::new(transformation).face(self)
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self.0.region {
            FaceRegion::Planar => "planar",
            FaceRegion::Patch { .. } => "patch",
            FaceRegion::Faceted(_) => "faceted",
        };
        f.debug_struct("Face")
            .field("region", &region)
            .field("wires", &self.0.wires.len())
            .field("reversed", &self.0.reversed)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::topology::Edge;

    fn polygon_wire(points: &[(f64, f64, f64)]) -> Wire {
        let edges: Vec<Edge> = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(a, b)| Edge::line(&Point::new(a.0, a.1, a.2), &Point::new(b.0, b.1, b.2)).unwrap())
            .collect();
        let segments: Vec<&dyn crate::topology::WireSegment> =
            edges.iter().map(|e| e as &dyn crate::topology::WireSegment).collect();
        Wire::new(&segments).unwrap()
    }

    #[test]
    fn square_face_is_planar() {
        let wire = polygon_wire(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)]);
        let face = wire.face().unwrap();
        assert!(face.surface().is_plane());
        let n = face.surface().as_plane().unwrap().normal();
        assert!((n.0.z - 1.0).abs() < 1e-12);
        assert_eq!(face.outer_wire().edge_count(), 4);
    }

    #[test]
    fn open_wire_has_no_face() {
        let a = Edge::line(&Point::new(0.0, 0.0, 0.0), &Point::new(1.0, 0.0, 0.0)).unwrap();
        let b = Edge::line(&Point::new(1.0, 0.0, 0.0), &Point::new(1.0, 1.0, 0.0)).unwrap();
        let wire = Wire::new(&[&a, &b]).unwrap();
        assert!(matches!(wire.face(), Err(SolidkitError::NonPlanarOrSelfIntersecting(_))));
    }

    #[test]
    fn non_planar_wire_is_rejected() {
        let wire = polygon_wire(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.5), (0.0, 1.0, 0.0)]);
        assert!(matches!(wire.face(), Err(SolidkitError::NonPlanarOrSelfIntersecting(_))));
    }

    #[test]
    fn bow_tie_is_rejected() {
        let wire = polygon_wire(&[(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)]);
        assert!(matches!(wire.face(), Err(SolidkitError::NonPlanarOrSelfIntersecting(_))));
    }

    #[test]
    fn flipping_reverses_loops_and_keeps_edges() {
        let wire = polygon_wire(&[(0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (0.0, 2.0, 0.0)]);
        let face = wire.face().unwrap();
        let flipped = face.flipped();
        assert!(flipped.0.reversed);
        let original = face.outer_wire();
        let back = flipped.outer_wire();
        assert!(original.oriented()[0].edge.key() == back.oriented()[2].edge.key());
        assert!(!back.oriented()[2].forward);
    }
}
