use tracing::debug;

use crate::error::{Result, SolidkitError};
use crate::geometry::{
    CurveGeometry, CylindricalSurface, Plane, Rail, Surface, SweptSurface, Transformation,
    Vector, OpaqueSurface,
};
use crate::math::{Vector3, TOLERANCE};
use crate::topology::transform::TransformMemo;
use crate::topology::{Edge, Face, FaceRegion, OrientedEdge, Shape, Solid, Wire};

/// Sweeps a planar face along a vector into a prism-like solid.
///
/// Side faces are rectangular patches of the extrusion surface over each
/// boundary edge; straight edges get a plane carrier and circles swept along
/// their axis get a cylinder.
pub(crate) struct Extrude {
    face: Face,
    direction: Vector3,
}

impl Extrude {
    pub(crate) fn new(face: &Face, direction: &Vector3) -> Self {
        Self {
            face: face.clone(),
            direction: *direction,
        }
    }

    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] if the direction is zero
    /// or lies in the face plane, and [`SolidkitError::TypeMismatch`] if the
    /// face is not planar.
    pub(crate) fn execute(&self) -> Result<Shape> {
        let d = self.direction;
        let length = d.norm();
        if length <= TOLERANCE {
            return Err(SolidkitError::DegenerateGeometry(
                "extrusion vector must be non-zero".into(),
            ));
        }
        if !matches!(self.face.0.region, FaceRegion::Planar) {
            return Err(SolidkitError::TypeMismatch(
                "only planar faces can be extruded".into(),
            ));
        }
        let plane = self.face.0.surface.as_plane()?;
        let normal = plane.normal_vector() * self.face.sense();
        let along = normal.dot(&d);
        if along.abs() <= 1e-9 * length {
            return Err(SolidkitError::DegenerateGeometry(
                "extrusion vector lies in the face plane".into(),
            ));
        }

        // Loops counter-clockwise around the side the sweep moves towards.
        let (up, loops): (Vector3, Vec<Wire>) = if along > 0.0 {
            (normal, self.face.0.wires.clone())
        } else {
            (-normal, self.face.0.wires.iter().map(Wire::reversed).collect())
        };

        let shift = Transformation::translation(&Vector(d));
        let mut memo = TransformMemo::new(&shift);
        let mut faces = Vec::new();

        let anchor = loops[0].oriented()[0].start_point();
        faces.push(Face::planar(
            Plane::from_normal(anchor, &(-up)),
            loops.iter().map(Wire::reversed).collect(),
        ));
        faces.push(Face::planar(
            Plane::from_normal(anchor + d, &up),
            loops.iter().map(|w| memo.wire(w)).collect(),
        ));

        let mut risers: std::collections::HashMap<usize, Edge> = std::collections::HashMap::new();
        for wire in &loops {
            for oe in wire.oriented() {
                let mut riser = |v: &crate::topology::Vertex| -> Result<Edge> {
                    if let Some(e) = risers.get(&v.key()) {
                        return Ok(e.clone());
                    }
                    let top = memo.vertex(v);
                    let e = Edge::segment(v, &top)?;
                    risers.insert(v.key(), e.clone());
                    Ok(e)
                };
                let left = riser(oe.start_vertex())?;
                let right = riser(oe.end_vertex())?;
                let top = OrientedEdge::new(memo.edge(&oe.edge), oe.forward).reversed();
                faces.push(side_face(
                    oe,
                    &d,
                    [
                        Some(oe.clone()),
                        Some(OrientedEdge::new(right, true)),
                        Some(top),
                        Some(OrientedEdge::new(left, false)),
                    ],
                ));
            }
        }
        debug!(faces = faces.len(), "extruded face");
        Ok(Shape::from_solids(vec![Solid::from_faces(faces)]))
    }
}

/// The side face swept by `oe`, outward normal `tangent x d`.
fn side_face(oe: &OrientedEdge, d: &Vector3, sides: [Option<OrientedEdge>; 4]) -> Face {
    let curve = oe.edge.curve();
    let map = Surface::Other(OpaqueSurface::new(SweptSurface::Extrusion {
        profile: Rail::new(curve.clone(), !oe.forward),
        direction: *d,
    }));
    let carrier = match curve.geometry.as_ref() {
        CurveGeometry::Line(_) => {
            let p = oe.start_point();
            let t = (oe.end_point() - p).normalize();
            let v = (d - t * t.dot(d)).normalize();
            Surface::Plane(Plane::from_frame(p, t, v))
        }
        CurveGeometry::Circle(circle) if circle.normal().cross(d).norm() <= 1e-9 * d.norm() => {
            Surface::Cylindrical(CylindricalSurface::from_frame(
                circle.center(),
                circle.x_dir(),
                circle.y_dir(),
                d.normalize(),
                circle.radius(),
            ))
        }
        _ => map.clone(),
    };
    Face::patch(carrier, map, (0.0, 1.0), (0.0, 1.0), sides, false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Vector};
    use crate::topology::WireSegment;
    use approx::assert_relative_eq;

    fn triangle() -> Face {
        let a = Edge::line(&Point::new(0.0, 0.0, 0.0), &Point::new(3.0, 0.0, 0.0)).unwrap();
        let b = Edge::line(&Point::new(3.0, 0.0, 0.0), &Point::new(1.5, 2.0, 0.0)).unwrap();
        let c = Edge::line(&Point::new(1.5, 2.0, 0.0), &Point::new(0.0, 0.0, 0.0)).unwrap();
        let segs: [&dyn WireSegment; 3] = [&a, &b, &c];
        Wire::new(&segs).unwrap().face().unwrap()
    }

    #[test]
    fn triangle_prism_is_closed_with_five_faces() {
        let prism = triangle().extrude(&Vector::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(prism.faces().count(), 5);
        assert_eq!(prism.edges().count(), 9);
        assert!(prism.is_closed());
        assert_relative_eq!(prism.mass(), 9.0, epsilon = 1e-9);
    }

    #[test]
    fn extruding_against_the_normal_keeps_volume_positive() {
        let prism = triangle().extrude(&Vector::new(0.0, 0.0, -2.0)).unwrap();
        assert!(prism.is_closed());
        assert_relative_eq!(prism.mass(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn oblique_extrusion_has_planar_side_carriers() {
        let prism = triangle().extrude(&Vector::new(1.0, 0.0, 1.0)).unwrap();
        assert!(prism.faces().all(|f| f.surface().is_plane()));
        assert_relative_eq!(prism.mass(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn in_plane_or_zero_vector_is_rejected() {
        let face = triangle();
        assert!(matches!(
            face.extrude(&Vector::new(1.0, 0.0, 0.0)),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
        assert!(matches!(
            face.extrude(&Vector::new(0.0, 0.0, 0.0)),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
    }
}
