use std::collections::HashMap;
use std::sync::Arc;

use crate::geometry::{Transformable, Transformation};

use super::{
    Edge, Face, FaceNode, FaceRegion, OrientedEdge, Shape, ShapeNode, Shell, Solid, Vertex, Wire,
};

/// Applies one transformation to a shape graph, mapping every shared node
/// exactly once so sharing survives.
///
/// A reflection turns counter-clockwise loops clockwise, so face loops are
/// reversed and the face sense toggled to keep outward normals outward.
pub(crate) struct TransformMemo<'a> {
    t: &'a Transformation,
    reflect: bool,
    vertices: HashMap<usize, Vertex>,
    edges: HashMap<usize, Edge>,
    faces: HashMap<usize, Face>,
}

impl<'a> TransformMemo<'a> {
    pub(crate) fn new(t: &'a Transformation) -> Self {
        Self {
            t,
            reflect: t.is_reflection(),
            vertices: HashMap::new(),
            edges: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    pub(crate) fn vertex(&mut self, vertex: &Vertex) -> Vertex {
        let t = self.t;
        self.vertices
            .entry(vertex.key())
            .or_insert_with(|| vertex.transformed(t))
            .clone()
    }

    pub(crate) fn edge(&mut self, edge: &Edge) -> Edge {
        if let Some(done) = self.edges.get(&edge.key()) {
            return done.clone();
        }
        let start = self.vertex(&edge.0.start);
        let end = self.vertex(&edge.0.end);
        let mapped = Edge::with_vertices(edge.0.curve.transformed(self.t), start, end);
        self.edges.insert(edge.key(), mapped.clone());
        mapped
    }

    fn oriented(&mut self, oe: &OrientedEdge) -> OrientedEdge {
        OrientedEdge::new(self.edge(&oe.edge), oe.forward)
    }

    pub(crate) fn wire(&mut self, wire: &Wire) -> Wire {
        let edges = wire.oriented().iter().map(|oe| self.oriented(oe)).collect();
        Wire::from_edges(edges)
    }

    pub(crate) fn face(&mut self, face: &Face) -> Face {
        if let Some(done) = self.faces.get(&face.key()) {
            return done.clone();
        }
        let node = &face.0;
        let region = match &node.region {
            FaceRegion::Planar => FaceRegion::Planar,
            FaceRegion::Patch { map, u, v, sides } => FaceRegion::Patch {
                map: map.transformed(self.t),
                u: *u,
                v: *v,
                sides: [0, 1, 2, 3].map(|i| sides[i].as_ref().map(|oe| self.oriented(oe))),
            },
            FaceRegion::Faceted(polygons) => {
                let t = self.t;
                let reflect = self.reflect;
                FaceRegion::Faceted(Arc::new(
                    polygons
                        .iter()
                        .map(|poly| {
                            let mut mapped: Vec<_> = poly.iter().map(|p| t.point(p)).collect();
                            if reflect {
                                mapped.reverse();
                            }
                            mapped
                        })
                        .collect(),
                ))
            }
        };
        let wires = node
            .wires
            .iter()
            .map(|w| {
                let mapped = self.wire(w);
                if self.reflect {
                    mapped.reversed()
                } else {
                    mapped
                }
            })
            .collect();
        let reversed = match region {
            FaceRegion::Faceted(_) => false,
            _ => node.reversed != self.reflect,
        };
        let mapped = Face::from_node(FaceNode {
            surface: node.surface.transformed(self.t),
            region,
            wires,
            reversed,
        });
        self.faces.insert(face.key(), mapped.clone());
        mapped
    }

    fn shell(&mut self, shell: &Shell) -> Shell {
        Shell::new(shell.faces().iter().map(|f| self.face(f)).collect())
    }

    fn solid(&mut self, solid: &Solid) -> Solid {
        Solid::new(solid.shells().iter().map(|s| self.shell(s)).collect())
    }

    pub(crate) fn shape(&mut self, shape: &Shape) -> Shape {
        let node = match &shape.0 {
            ShapeNode::Compound(children) => {
                ShapeNode::Compound(Arc::new(children.iter().map(|c| self.shape(c)).collect()))
            }
            ShapeNode::CompoundSolid(solids) => {
                ShapeNode::CompoundSolid(Arc::new(solids.iter().map(|s| self.solid(s)).collect()))
            }
            ShapeNode::Solid(solid) => ShapeNode::Solid(self.solid(solid)),
            ShapeNode::Shell(shell) => ShapeNode::Shell(self.shell(shell)),
            ShapeNode::Face(face) => ShapeNode::Face(self.face(face)),
            ShapeNode::Wire(wire) => ShapeNode::Wire(self.wire(wire)),
            ShapeNode::Edge(edge) => ShapeNode::Edge(self.edge(edge)),
            ShapeNode::Vertex(vertex) => ShapeNode::Vertex(self.vertex(vertex)),
        };
        Shape(node)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, Point, Vector};
    use approx::assert_relative_eq;

    #[test]
    fn translated_cube_keeps_topology_and_volume() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 2.0, 3.0)).unwrap();
        let moved = Transformation::translation(&Vector::new(5.0, 0.0, 0.0)).apply(&cube);
        assert_eq!(moved.edges().count(), 12);
        assert!(moved.is_closed());
        assert_relative_eq!(moved.mass(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn mirrored_cube_keeps_positive_volume() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap();
        let mut t = Transformation::new();
        t.mirror(&Point::origin().axis_with(&Direction::x()));
        let mirrored = t.apply(&cube);
        assert!(mirrored.is_closed());
        assert_relative_eq!(mirrored.mass(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn shared_edges_stay_shared() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap();
        let mut t = Transformation::new();
        t.mirror_plane(&Point::origin().plane_axis_with(&Direction::z()));
        let mirrored = t.apply(&cube);
        let ShapeNode::Solid(solid) = &mirrored.0 else {
            panic!("expected a solid");
        };
        assert!(solid.shells()[0].is_closed());
    }
}
