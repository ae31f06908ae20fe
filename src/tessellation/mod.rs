//! Triangle meshes of shapes.
//!
//! Edges are sampled once per mesh and shared by both faces that use them,
//! so neighbouring faces meet without cracks.

pub(crate) mod curve;
pub(crate) mod face;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Result, SolidkitError};
use crate::geometry::Point;
use crate::math::Point3;
use crate::topology::{Face, Shape};

pub(crate) use curve::EdgeCache;

/// Chordal and angular limits for approximating curved geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParams {
    /// Maximum distance between a chord and the curve it replaces.
    pub linear_deflection: f64,
    /// Maximum turning angle, in radians, across one chord.
    pub angular_deflection: f64,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            linear_deflection: 0.01,
            angular_deflection: 0.5,
        }
    }
}

impl TessellationParams {
    /// Checks both deflections are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`] otherwise.
    pub fn validate(&self) -> Result<()> {
        let ok = |x: f64| x.is_finite() && x > 0.0;
        if ok(self.linear_deflection) && ok(self.angular_deflection) {
            Ok(())
        } else {
            Err(SolidkitError::DegenerateGeometry(format!(
                "deflections must be positive, got linear {} and angular {}",
                self.linear_deflection, self.angular_deflection
            )))
        }
    }
}

/// A flat triangle soup: every three consecutive indices form one triangle,
/// counter-clockwise seen from outside, with its own three vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    indices: Vec<usize>,
    vertices: Vec<Point>,
}

impl Mesh {
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_triangle(&mut self, triangle: &[Point3; 3]) {
        for p in triangle {
            self.indices.push(self.vertices.len());
            self.vertices.push(Point(*p));
        }
    }
}

/// Tessellates every face of a shape.
pub(crate) struct TessellateShape {
    shape: Shape,
    params: TessellationParams,
    skip_failures: bool,
}

impl TessellateShape {
    pub(crate) fn new(shape: &Shape, params: TessellationParams) -> Self {
        Self {
            shape: shape.clone(),
            params,
            skip_failures: false,
        }
    }

    /// Leaves faces that cannot be triangulated out of the mesh instead of
    /// failing.
    pub(crate) fn skip_failed_faces(mut self) -> Self {
        self.skip_failures = true;
        self
    }

    /// Faces are triangulated in parallel and appended in face-iteration
    /// order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first face that cannot be triangulated,
    /// unless failures are skipped.
    pub(crate) fn execute(&self) -> Result<Mesh> {
        let faces: Vec<Face> = self.shape.faces().collect();
        let cache = EdgeCache::build(self.shape.edges(), &self.params);
        let per_face: Vec<Result<Vec<[Point3; 3]>>> = faces
            .par_iter()
            .map(|f| face::triangulate(f, &self.params, &cache))
            .collect();

        let mut mesh = Mesh::default();
        let mut skipped = 0;
        for (face, triangles) in faces.iter().zip(per_face) {
            let triangles = match triangles {
                Ok(triangles) => triangles,
                Err(err) if self.skip_failures => {
                    warn!(%err, ?face, "skipping face that could not be tessellated");
                    skipped += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };
            for tri in &triangles {
                mesh.push_triangle(tri);
            }
        }
        debug!(
            faces = faces.len(),
            skipped,
            triangles = mesh.triangle_count(),
            "tessellated shape"
        );
        Ok(mesh)
    }
}

/// Triangles of each face, sharing one edge sampling so the soup is closed
/// wherever the faces are.
pub(crate) fn face_triangles(
    faces: &[Face],
    params: &TessellationParams,
) -> Result<Vec<Vec<[Point3; 3]>>> {
    let edges = faces
        .iter()
        .flat_map(|f| f.oriented_edges().map(|oe| oe.edge.clone()).collect::<Vec<_>>());
    let cache = EdgeCache::build(edges, params);
    faces
        .par_iter()
        .map(|f| face::triangulate(f, params, &cache))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, Vector};
    use crate::math::polygon::area_vector;
    use crate::math::Vector3;

    #[test]
    fn default_params_are_valid() {
        assert!(TessellationParams::default().validate().is_ok());
        let bad = TessellationParams {
            linear_deflection: 0.0,
            ..TessellationParams::default()
        };
        assert!(matches!(bad.validate(), Err(SolidkitError::DegenerateGeometry(_))));
    }

    #[test]
    fn cube_mesh_has_twelve_outward_triangles() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap();
        let mesh = cube.mesh();
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertices().len(), mesh.indices().len());
        let center = Point3::new(0.5, 0.5, 0.5);
        for tri in mesh.indices().chunks(3) {
            let pts: Vec<Point3> = tri.iter().map(|&i| mesh.vertices()[i].0).collect();
            let n = area_vector(&pts);
            let c = (pts[0].coords + pts[1].coords + pts[2].coords) / 3.0;
            assert!(n.dot(&(c - center.coords)) > 0.0);
        }
    }

    #[test]
    fn finer_deflection_gives_more_triangles() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        let cylinder = Shape::cylinder(&axis, 1.0, 2.0).unwrap();
        let coarse = cylinder.mesh();
        let fine = cylinder
            .mesh_with(TessellationParams {
                linear_deflection: 0.001,
                angular_deflection: 0.1,
            })
            .unwrap();
        assert!(fine.triangle_count() > coarse.triangle_count());
        assert_eq!(fine.indices().len() % 3, 0);
    }

    /// A planar face bounded by two edges running back and forth.
    fn sliver_face() -> Face {
        use crate::geometry::Plane;
        use crate::topology::{Edge, Wire, WireSegment};

        let a = Point::origin();
        let b = Point::new(1.0, 0.0, 0.0);
        let out = Edge::line(&a, &b).unwrap();
        let back = Edge::line(&b, &a).unwrap();
        let segments: [&dyn WireSegment; 2] = [&out, &back];
        let wire = Wire::new(&segments).unwrap();
        Face::planar(Plane::from_normal(Point3::origin(), &Vector3::z()), vec![wire])
    }

    #[test]
    fn untriangulable_face_is_reported() {
        let shape = Shape::from(sliver_face());
        let err = shape.mesh_with(TessellationParams::default()).unwrap_err();
        assert!(matches!(err, SolidkitError::DegenerateGeometry(_)));
    }

    #[test]
    fn default_mesh_leaves_untriangulable_faces_out() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap();
        let both = crate::operations::CompoundBuilder::new()
            .add(&cube)
            .add(&Shape::from(sliver_face()))
            .build();
        assert!(both.mesh_with(TessellationParams::default()).is_err());
        assert_eq!(both.mesh().triangle_count(), 12);
    }

    #[test]
    fn mesh_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mesh>();
        assert_send_sync::<Shape>();
    }
}
