//! Boolean operations on solids.
//!
//! Both operands are reduced to closed polygon soups, combined with BSP
//! clipping, and sewn back into faces, edges and shells. Faces of the result
//! keep the carrier surface of the input face they were cut from.

mod bsp;
mod polygon;
mod sew;

use tracing::debug;

use crate::error::{Result, SolidkitError};
use crate::geometry::Surface;
use crate::math::Point3;
use crate::operations::query::{Aabb, BoundingBox};
use crate::tessellation::{face_triangles, TessellationParams};
use crate::topology::{Face, FaceRegion, Shape, Solid};

use bsp::Bsp;

pub(crate) use polygon::Polygon;
pub(crate) use sew::{Sew, VertexKey, VertexMerger};

/// The kind of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BooleanOp {
    Union,
    Subtract,
    Intersect,
}

pub(crate) struct BooleanOperation {
    a: Shape,
    b: Shape,
    op: BooleanOp,
}

impl BooleanOperation {
    pub(crate) fn new(a: &Shape, b: &Shape, op: BooleanOp) -> Self {
        Self {
            a: a.clone(),
            b: b.clone(),
            op,
        }
    }

    /// # Errors
    ///
    /// Returns [`SolidkitError::BooleanOpFailure`] if an operand holds no
    /// solid, the bounding boxes are disjoint for an intersection, or the
    /// result is empty.
    pub(crate) fn execute(&self) -> Result<Shape> {
        let solids_a = self.a.solids();
        let solids_b = self.b.solids();
        if solids_a.is_empty() || solids_b.is_empty() {
            return Err(SolidkitError::BooleanOpFailure(
                "both operands must contain a solid".into(),
            ));
        }

        let box_a = BoundingBox::new(&self.a).execute();
        let box_b = BoundingBox::new(&self.b).execute();
        let mut bounds = Aabb::empty();
        for p in [&box_a.min, &box_a.max, &box_b.min, &box_b.max] {
            bounds.include(p);
        }
        let diag = bounds.diagonal();
        let eps = 1e-6 * (1.0 + diag);

        if !box_a.overlaps(&box_b, eps) {
            debug!(op = ?self.op, "operands are apart");
            return match self.op {
                BooleanOp::Union => Ok(Shape::compound(vec![self.a.clone(), self.b.clone()])),
                BooleanOp::Subtract => Ok(self.a.clone()),
                BooleanOp::Intersect => Err(SolidkitError::BooleanOpFailure(
                    "operands do not overlap".into(),
                )),
            };
        }

        let mut surfaces = Vec::new();
        let polygons_a = operand_polygons(&solids_a, &mut surfaces)?;
        let polygons_b = operand_polygons(&solids_b, &mut surfaces)?;
        let (count_a, count_b) = (polygons_a.len(), polygons_b.len());

        let mut a = Bsp::new(polygons_a, eps);
        let mut b = Bsp::new(polygons_b, eps);
        match self.op {
            BooleanOp::Union => {
                a.clip_to(&b);
                b.clip_to(&a);
                b.invert();
                b.clip_to(&a);
                b.invert();
                a.build(b.all_polygons());
            }
            BooleanOp::Subtract => {
                a.invert();
                a.clip_to(&b);
                b.clip_to(&a);
                b.invert();
                b.clip_to(&a);
                b.invert();
                a.build(b.all_polygons());
                a.invert();
            }
            BooleanOp::Intersect => {
                a.invert();
                b.clip_to(&a);
                b.invert();
                a.clip_to(&b);
                b.clip_to(&a);
                a.build(b.all_polygons());
                a.invert();
            }
        }
        let result = a.all_polygons();
        debug!(
            op = ?self.op,
            polygons_a = count_a,
            polygons_b = count_b,
            result = result.len(),
            "clipped operands"
        );
        if result.is_empty() {
            return Err(SolidkitError::BooleanOpFailure("result is empty".into()));
        }
        Sew::new(result, &surfaces, eps, diag).execute()
    }
}

/// Closed polygon soup of `solids`. Each face gets a source index into
/// `surfaces` so the sewn result can recover its carrier.
fn operand_polygons(solids: &[Solid], surfaces: &mut Vec<Surface>) -> Result<Vec<Polygon>> {
    let faces: Vec<Face> = solids.iter().flat_map(|s| s.faces().cloned()).collect();
    let facets = face_facets(&faces)
        .map_err(|err| SolidkitError::BooleanOpFailure(format!("cannot tessellate operand: {err}")))?;

    let mut polygons = Vec::new();
    for (face, face_facets) in faces.iter().zip(facets) {
        let source = surfaces.len();
        surfaces.push(face.surface());
        polygons.extend(
            face_facets
                .into_iter()
                .filter_map(|p| Polygon::new(p, source)),
        );
    }
    Ok(polygons)
}

/// Convex polygons covering each face, counter-clockwise around the outward
/// normal. Faceted faces give their own polygons, the rest are triangulated.
///
/// # Errors
///
/// Propagates tessellation failures of curved faces.
pub(crate) fn face_facets(faces: &[Face]) -> Result<Vec<Vec<Vec<Point3>>>> {
    let curved: Vec<Face> = faces
        .iter()
        .filter(|f| !matches!(f.0.region, FaceRegion::Faceted(_)))
        .cloned()
        .collect();
    let mut triangles = face_triangles(&curved, &TessellationParams::default())?.into_iter();
    Ok(faces
        .iter()
        .map(|face| match &face.0.region {
            FaceRegion::Faceted(facets) => facets.to_vec(),
            _ => triangles
                .next()
                .map(|tris| tris.iter().map(|t| t.to_vec()).collect())
                .unwrap_or_default(),
        })
        .collect())
}
