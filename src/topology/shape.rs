use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::geometry::{PlaneAxis, Point, Transformable, Transformation, Vector};
use crate::operations::boolean::{BooleanOp, BooleanOperation};
use crate::operations::creation::{MakeBox, MakeCylinder};
use crate::operations::modification::{FilletBuilder, ShellBuilder};
use crate::operations::query::Volume;
use crate::tessellation::{Mesh, TessellateShape, TessellationParams};

use super::{Edge, EdgeIterator, Face, FaceIterator, Shell, Solid, Vertex, Wire};

/// The kind of entity a [`Shape`] holds, from the largest container down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeType {
    Compound,
    CompoundSolid,
    Solid,
    Shell,
    Face,
    Wire,
    Edge,
    Vertex,
}

impl ShapeType {
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Compound => "Compound",
            Self::CompoundSolid => "CompoundSolid",
            Self::Solid => "Solid",
            Self::Shell => "Shell",
            Self::Face => "Face",
            Self::Wire => "Wire",
            Self::Edge => "Edge",
            Self::Vertex => "Vertex",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ShapeNode {
    Compound(Arc<Vec<Shape>>),
    CompoundSolid(Arc<Vec<Solid>>),
    Solid(Solid),
    Shell(Shell),
    Face(Face),
    Wire(Wire),
    Edge(Edge),
    Vertex(Vertex),
}

/// Any topological entity, tagged with its [`ShapeType`].
///
/// Shapes are immutable; every operation returns a new shape that shares
/// unchanged sub-entities with its inputs.
#[derive(Clone)]
pub struct Shape(pub(crate) ShapeNode);

impl Shape {
    /// A solid cylinder standing on `axis`: base circle in the axis plane,
    /// extruded along the axis direction.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`](crate::SolidkitError::DegenerateGeometry)
    /// if the radius or height is not positive.
    pub fn cylinder(axis: &PlaneAxis, radius: f64, height: f64) -> Result<Self> {
        MakeCylinder::new(axis, radius, height).execute()
    }

    /// An axis-aligned box with one corner at `corner`, spanning `size`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`](crate::SolidkitError::DegenerateGeometry)
    /// if a component of `size` is not positive.
    pub fn cuboid(corner: &Point, size: &Vector) -> Result<Self> {
        MakeBox::new(corner.0, size.0).execute()
    }

    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        match &self.0 {
            ShapeNode::Compound(_) => ShapeType::Compound,
            ShapeNode::CompoundSolid(_) => ShapeType::CompoundSolid,
            ShapeNode::Solid(_) => ShapeType::Solid,
            ShapeNode::Shell(_) => ShapeType::Shell,
            ShapeNode::Face(_) => ShapeType::Face,
            ShapeNode::Wire(_) => ShapeType::Wire,
            ShapeNode::Edge(_) => ShapeType::Edge,
            ShapeNode::Vertex(_) => ShapeType::Vertex,
        }
    }

    /// Whether the shape holds nothing (an empty compound).
    #[must_use]
    pub fn is_null(&self) -> bool {
        match &self.0 {
            ShapeNode::Compound(children) => children.is_empty(),
            ShapeNode::CompoundSolid(solids) => solids.is_empty(),
            _ => false,
        }
    }

    /// Whether the boundary has no free edges: closed edges and wires,
    /// watertight shells and solids, and compounds of closed shapes.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match &self.0 {
            ShapeNode::Compound(children) => {
                !children.is_empty() && children.iter().all(Shape::is_closed)
            }
            ShapeNode::CompoundSolid(solids) => {
                !solids.is_empty() && solids.iter().all(|s| s.shells().iter().all(Shell::is_closed))
            }
            ShapeNode::Solid(solid) => solid.shells().iter().all(Shell::is_closed),
            ShapeNode::Shell(shell) => shell.is_closed(),
            ShapeNode::Face(face) => face.0.wires.iter().all(Wire::is_closed),
            ShapeNode::Wire(wire) => wire.is_closed(),
            ShapeNode::Edge(edge) => edge.is_closed(),
            ShapeNode::Vertex(_) => false,
        }
    }

    /// Enclosed volume, summed over the solids in the shape. Shapes without
    /// solids have zero mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        Volume::new(self).execute()
    }

    /// Every distinct edge, in depth-first order.
    #[must_use]
    pub fn edges(&self) -> EdgeIterator {
        EdgeIterator::new(self)
    }

    /// Every distinct face, in depth-first order.
    #[must_use]
    pub fn faces(&self) -> FaceIterator {
        FaceIterator::new(self)
    }

    /// Boolean union.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::BooleanOpFailure`](crate::SolidkitError::BooleanOpFailure)
    /// if either shape holds no solid or the result is empty.
    pub fn fuse(&self, other: &Self) -> Result<Self> {
        BooleanOperation::new(self, other, BooleanOp::Union).execute()
    }

    /// Boolean difference `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::BooleanOpFailure`](crate::SolidkitError::BooleanOpFailure)
    /// if either shape holds no solid or nothing is left.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        BooleanOperation::new(self, other, BooleanOp::Subtract).execute()
    }

    /// Boolean intersection.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::BooleanOpFailure`](crate::SolidkitError::BooleanOpFailure)
    /// if either shape holds no solid or the solids do not overlap.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        BooleanOperation::new(self, other, BooleanOp::Intersect).execute()
    }

    /// Starts rounding edges of this shape.
    #[must_use]
    pub fn fillet(&self) -> FilletBuilder {
        FilletBuilder::new(self)
    }

    /// Starts hollowing this shape.
    #[must_use]
    pub fn shell(&self) -> ShellBuilder {
        ShellBuilder::new(self)
    }

    /// Triangulates every face with the default deflections.
    ///
    /// A face that cannot be triangulated is logged and left out of the
    /// mesh. Use [`mesh_with`](Self::mesh_with) to get the error instead.
    #[must_use]
    pub fn mesh(&self) -> Mesh {
        TessellateShape::new(self, TessellationParams::default())
            .skip_failed_faces()
            .execute()
            .unwrap_or_default()
    }

    /// Triangulates every face with custom deflections.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DegenerateGeometry`](crate::SolidkitError::DegenerateGeometry)
    /// if a deflection is not positive, and the error of the first face (in
    /// iteration order) that cannot be triangulated.
    pub fn mesh_with(&self, params: TessellationParams) -> Result<Mesh> {
        params.validate()?;
        TessellateShape::new(self, params).execute()
    }

    pub(crate) fn compound(children: Vec<Shape>) -> Self {
        Self(ShapeNode::Compound(Arc::new(children)))
    }

    /// One solid stays a solid; several become a compound solid.
    pub(crate) fn from_solids(mut solids: Vec<Solid>) -> Self {
        if solids.len() == 1 {
            if let Some(solid) = solids.pop() {
                return Self(ShapeNode::Solid(solid));
            }
        }
        Self(ShapeNode::CompoundSolid(Arc::new(solids)))
    }

    pub(crate) fn from_shell(shell: Shell) -> Self {
        Self(ShapeNode::Shell(shell))
    }

    /// Every solid in the shape, depth first.
    pub(crate) fn solids(&self) -> Vec<Solid> {
        let mut out = Vec::new();
        self.collect_solids(&mut out);
        out
    }

    fn collect_solids(&self, out: &mut Vec<Solid>) {
        match &self.0 {
            ShapeNode::Compound(children) => {
                for child in children.iter() {
                    child.collect_solids(out);
                }
            }
            ShapeNode::CompoundSolid(solids) => out.extend(solids.iter().cloned()),
            ShapeNode::Solid(solid) => out.push(solid.clone()),
            _ => {}
        }
    }
}

impl From<Vertex> for Shape {
    fn from(vertex: Vertex) -> Self {
        Self(ShapeNode::Vertex(vertex))
    }
}

impl From<Edge> for Shape {
    fn from(edge: Edge) -> Self {
        Self(ShapeNode::Edge(edge))
    }
}

impl From<Wire> for Shape {
    fn from(wire: Wire) -> Self {
        Self(ShapeNode::Wire(wire))
    }
}

impl From<Face> for Shape {
    fn from(face: Face) -> Self {
        Self(ShapeNode::Face(face))
    }
}

impl Transformable for Shape {
    fn transformed(&self, transformation: &Transformation) -> Self {
        super::transform::TransformMemo::new(transformation).shape(self)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({})", self.shape_type())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type", &self.shape_type().to_str())
            .field("is_null", &self.is_null())
            .field("is_closed", &self.is_closed())
            .finish()
    }
}
