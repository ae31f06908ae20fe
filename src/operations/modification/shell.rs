use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{BuildError, Result, SolidkitError};
use crate::geometry::Surface;
use crate::math::polygon::area_vector;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::boolean::{face_facets, Polygon, Sew, VertexKey, VertexMerger};
use crate::operations::query::{planes_meet, BoundingBox};
use crate::topology::{Face, Shape};

/// Hollows a solid into a wall of constant thickness.
///
/// A negative offset grows the wall inward from the original surface, a
/// positive one outward. Removed faces become openings of the wall.
///
/// ```
/// use solidkit::{Point, Shape, Vector};
///
/// let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0))?;
/// let top = cube
///     .faces()
///     .find(|f| f.surface().as_plane().is_ok_and(|p| p.location().z() > 0.5))
///     .unwrap();
/// let hollow = cube.shell().remove_face(&top).offset(-0.1).build()?;
/// assert!(hollow.mass() < 0.5);
/// # Ok::<(), solidkit::SolidkitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ShellBuilder {
    shape: Shape,
    removed: Vec<Face>,
    offset: f64,
    tolerance: f64,
}

impl ShellBuilder {
    #[must_use]
    pub fn new(shape: &Shape) -> Self {
        Self {
            shape: shape.clone(),
            removed: Vec::new(),
            offset: 0.0,
            tolerance: 1e-3,
        }
    }

    /// Opens the wall at `face`.
    #[must_use]
    pub fn remove_face(mut self, face: &Face) -> Self {
        self.removed.push(face.clone());
        self
    }

    #[must_use]
    pub fn faces_to_remove(mut self, faces: &[Face]) -> Self {
        self.removed.extend(faces.iter().cloned());
        self
    }

    /// Signed wall thickness along the outward normal.
    #[must_use]
    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Distance under which offset vertices are merged.
    #[must_use]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// # Errors
    ///
    /// Returns the builder with [`SolidkitError::ShellFailure`] if the offset
    /// is zero, the tolerance is not positive, a removed face is not part of
    /// the shape, the shape holds no solid, or the wall folds over itself.
    pub fn build(self) -> std::result::Result<Shape, BuildError<Self>> {
        match self.apply() {
            Ok(shape) => Ok(shape),
            Err(err) => Err(BuildError::new(self, err)),
        }
    }

    fn apply(&self) -> Result<Shape> {
        let failure = SolidkitError::ShellFailure;
        if self.offset.abs() <= TOLERANCE || !self.offset.is_finite() {
            return Err(failure(format!("offset {} must be non-zero", self.offset)));
        }
        if self.tolerance <= 0.0 || !self.tolerance.is_finite() {
            return Err(failure(format!(
                "tolerance {} must be positive",
                self.tolerance
            )));
        }
        let solids = self.shape.solids();
        if solids.is_empty() {
            return Err(failure("shape contains no solid".into()));
        }
        let known: HashSet<usize> = self.shape.faces().map(|f| f.key()).collect();
        let removed: HashSet<usize> = self.removed.iter().map(Face::key).collect();
        if !removed.is_subset(&known) {
            return Err(failure("removed face is not part of the shape".into()));
        }
        let faces: Vec<Face> = solids.iter().flat_map(|s| s.faces().cloned()).collect();
        let diag = BoundingBox::new(&self.shape).execute().diagonal();

        let t = self.offset.abs();
        let boolean_failure =
            |err: SolidkitError| SolidkitError::ShellFailure(format!("cannot hollow shape: {err}"));
        let result = if self.offset < 0.0 {
            let cavity = self.displaced(&faces, &removed, -t, t, diag)?;
            self.shape.subtract(&cavity).map_err(boolean_failure)?
        } else {
            let outer = self.displaced(&faces, &removed, t, 0.0, diag)?;
            let inner = self.displaced(&faces, &removed, 0.0, t, diag)?;
            outer.subtract(&inner).map_err(boolean_failure)?
        };
        debug!(
            offset = self.offset,
            faces = faces.len(),
            removed = removed.len(),
            "hollowed shape"
        );
        Ok(result)
    }

    /// The solid bounded by `faces` moved along their outward normals,
    /// `kept` for ordinary faces and `opened` for removed ones.
    fn displaced(
        &self,
        faces: &[Face],
        removed: &HashSet<usize>,
        kept: f64,
        opened: f64,
        diag: f64,
    ) -> Result<Shape> {
        let shift = |face: &Face| {
            if removed.contains(&face.key()) {
                opened
            } else {
                kept
            }
        };
        if faces.iter().all(|f| shift(f).abs() <= TOLERANCE) {
            return Ok(self.shape.clone());
        }
        let facets = face_facets(faces)
            .map_err(|err| SolidkitError::ShellFailure(format!("cannot tessellate face: {err}")))?;

        let mut merger = VertexMerger::new(self.tolerance);
        let mut triangles: Vec<([VertexKey; 3], usize)> = Vec::new();
        for (index, polygons) in facets.iter().enumerate() {
            for polygon in polygons {
                let keys: Vec<VertexKey> =
                    polygon.iter().map(|p| merger.get_or_insert(p)).collect();
                for k in 1..keys.len().saturating_sub(1) {
                    let tri = [keys[0], keys[k], keys[k + 1]];
                    if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
                        triangles.push((tri, index));
                    }
                }
            }
        }

        // Area weighted normal of every face around each vertex.
        let mut normals: HashMap<VertexKey, HashMap<usize, Vector3>> = HashMap::new();
        for (tri, index) in &triangles {
            let area = area_vector(&tri.map(|k| merger.point(k)));
            for &key in tri {
                *normals.entry(key).or_default().entry(*index).or_insert_with(Vector3::zeros) += area;
            }
        }
        let moved: HashMap<VertexKey, Point3> = normals
            .iter()
            .map(|(&key, around)| {
                let p = merger.point(key);
                let planes: Vec<(Vector3, f64)> = around
                    .iter()
                    .filter_map(|(&index, n)| {
                        let n = n.try_normalize(1e-300)?;
                        Some((n, n.dot(&p.coords) + shift(&faces[index])))
                    })
                    .collect();
                (key, planes_meet(&planes, &p))
            })
            .collect();

        let min_area = self.tolerance * self.tolerance / 4.0;
        let mut polygons = Vec::with_capacity(triangles.len());
        let mut folded = 0;
        for (tri, index) in &triangles {
            let before = area_vector(&tri.map(|k| merger.point(k)));
            let after_points = tri.map(|k| moved[&k]);
            let after = area_vector(&after_points);
            if before.dot(&after) < 0.0 {
                if after.norm() > min_area {
                    return Err(SolidkitError::ShellFailure(format!(
                        "offset {} folds the wall over itself",
                        self.offset
                    )));
                }
                folded += 1;
                continue;
            }
            polygons.extend(Polygon::new(after_points.to_vec(), *index));
        }
        if folded > 0 {
            warn!(folded, "dropped collapsed triangles of the offset surface");
        }

        let surfaces: Vec<Surface> = faces
            .iter()
            .map(|f| f.surface().offset(shift(f) * f.sense()))
            .collect();
        let bounds = diag + 2.0 * kept.abs().max(opened.abs());
        Sew::new(polygons, &surfaces, 1e-6 * (1.0 + bounds), bounds)
            .execute()
            .map_err(|err| SolidkitError::ShellFailure(format!("cannot close offset wall: {err}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Vector};
    use crate::topology::ShapeType;
    use approx::assert_relative_eq;

    fn unit_cube() -> Shape {
        Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap()
    }

    fn top_face(shape: &Shape) -> Face {
        shape
            .faces()
            .filter(|f| f.surface().is_plane())
            .max_by(|a, b| {
                let z = |f: &Face| f.surface().as_plane().unwrap().location().z();
                z(a).total_cmp(&z(b))
            })
            .unwrap()
    }

    #[test]
    fn inward_wall_with_open_top() {
        let cube = unit_cube();
        let top = top_face(&cube);
        let hollow = cube.shell().remove_face(&top).offset(-0.1).build().unwrap();
        assert_eq!(hollow.shape_type(), ShapeType::Solid);
        assert!(hollow.is_closed());
        assert_relative_eq!(hollow.mass(), 1.0 - 0.8 * 0.8 * 0.9, epsilon = 1e-6);
    }

    #[test]
    fn outward_wall_with_open_top() {
        let cube = unit_cube();
        let top = top_face(&cube);
        let hollow = cube
            .shell()
            .faces_to_remove(&[top])
            .offset(0.1)
            .build()
            .unwrap();
        assert_relative_eq!(hollow.mass(), 1.2 * 1.2 * 1.1 - 1.0, epsilon = 1e-6);
    }

    #[test]
    fn closed_shell_leaves_a_void() {
        let cube = unit_cube();
        let hollow = cube.shell().offset(-0.25).build().unwrap();
        assert_relative_eq!(hollow.mass(), 1.0 - 0.125, epsilon = 1e-6);
    }

    #[test]
    fn invalid_requests_return_the_builder() {
        let cube = unit_cube();
        let err = cube.shell().build().unwrap_err();
        assert!(matches!(err.error(), SolidkitError::ShellFailure(_)));
        let builder = err.into_builder().offset(-0.1).tolerance(0.0);
        assert!(builder.build().is_err());

        let other = unit_cube();
        let foreign = top_face(&other);
        let err = cube.shell().remove_face(&foreign).offset(-0.1).build();
        assert!(matches!(
            err.unwrap_err().error(),
            SolidkitError::ShellFailure(_)
        ));
    }

    #[test]
    fn wall_thicker_than_the_solid_fails() {
        let cube = unit_cube();
        let top = top_face(&cube);
        let err = cube.shell().remove_face(&top).offset(-0.6).build();
        assert!(matches!(
            err.unwrap_err().error(),
            SolidkitError::ShellFailure(_)
        ));
    }
}
