use std::fmt;
use std::sync::Arc;

use crate::geometry::{Point, Transformable, Transformation};
use crate::math::Point3;

#[derive(Debug)]
pub(crate) struct VertexNode {
    pub(crate) point: Point3,
}

/// A topological vertex: one point in space, shared by the edges meeting there.
#[derive(Clone)]
pub struct Vertex(pub(crate) Arc<VertexNode>);

impl Vertex {
    #[must_use]
    pub fn new(point: &Point) -> Self {
        Self::at(point.0)
    }

    pub(crate) fn at(point: Point3) -> Self {
        Self(Arc::new(VertexNode { point }))
    }

    #[must_use]
    pub fn point(&self) -> Point {
        Point(self.0.point)
    }

    #[must_use]
    pub fn get_coordinates(&self) -> (f64, f64, f64) {
        self.point().get_coordinates()
    }

    pub(crate) fn position(&self) -> Point3 {
        self.0.point
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Transformable for Vertex {
    fn transformed(&self, transformation: &Transformation) -> Self {
        Self::at(transformation.point(&self.0.point))
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.get_coordinates();
        f.debug_struct("Vertex")
            .field("x", &x)
            .field("y", &y)
            .field("z", &z)
            .finish()
    }
}
