use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, SolidkitError};

use super::{Edge, Face, Shape, ShapeNode, Wire};

enum Node {
    Shape(Shape),
    Face(Face),
    Wire(Wire),
    Edge(Edge),
}

/// Depth-first walk over a snapshot of a shape, visiting children in
/// storage order.
struct Walk {
    stack: Vec<Node>,
    seen: HashSet<usize>,
}

impl Walk {
    fn new(shape: &Shape) -> Self {
        Self {
            stack: vec![Node::Shape(shape.clone())],
            seen: HashSet::new(),
        }
    }

    fn push_reversed<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = Node>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.stack.extend(nodes.into_iter().rev());
    }

    fn expand_shape(&mut self, shape: Shape) {
        match shape.0 {
            ShapeNode::Compound(children) => {
                let nodes: Vec<Node> = children.iter().cloned().map(Node::Shape).collect();
                self.push_reversed(nodes);
            }
            ShapeNode::CompoundSolid(solids) => {
                let nodes: Vec<Node> = solids
                    .iter()
                    .map(|s| Node::Shape(Shape(ShapeNode::Solid(s.clone()))))
                    .collect();
                self.push_reversed(nodes);
            }
            ShapeNode::Solid(solid) => {
                let nodes: Vec<Node> = solid.faces().cloned().map(Node::Face).collect();
                self.push_reversed(nodes);
            }
            ShapeNode::Shell(shell) => {
                let nodes: Vec<Node> = shell.faces().iter().cloned().map(Node::Face).collect();
                self.push_reversed(nodes);
            }
            ShapeNode::Face(face) => self.stack.push(Node::Face(face)),
            ShapeNode::Wire(wire) => self.stack.push(Node::Wire(wire)),
            ShapeNode::Edge(edge) => self.stack.push(Node::Edge(edge)),
            ShapeNode::Vertex(_) => {}
        }
    }

    fn next_face(&mut self) -> Option<Face> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Shape(shape) => self.expand_shape(shape),
                Node::Face(face) => {
                    if self.seen.insert(face.key()) {
                        return Some(face);
                    }
                }
                Node::Wire(_) | Node::Edge(_) => {}
            }
        }
        None
    }

    fn next_edge(&mut self) -> Option<Edge> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Shape(shape) => self.expand_shape(shape),
                Node::Face(face) => {
                    let nodes: Vec<Node> = face.0.wires.iter().cloned().map(Node::Wire).collect();
                    self.push_reversed(nodes);
                }
                Node::Wire(wire) => {
                    let nodes: Vec<Node> = wire
                        .oriented()
                        .iter()
                        .map(|oe| Node::Edge(oe.edge.clone()))
                        .collect();
                    self.push_reversed(nodes);
                }
                Node::Edge(edge) => {
                    if self.seen.insert(edge.key()) {
                        return Some(edge);
                    }
                }
            }
        }
        None
    }
}

/// Lazily yields each distinct edge of a shape once.
///
/// The iterator holds its own snapshot of the shape; dropping the shape it
/// came from does not affect it.
pub struct EdgeIterator {
    walk: Walk,
    peeked: Option<Edge>,
    yielded: usize,
}

impl EdgeIterator {
    pub(crate) fn new(shape: &Shape) -> Self {
        Self {
            walk: Walk::new(shape),
            peeked: None,
            yielded: 0,
        }
    }

    /// Whether another edge is available. Calling it repeatedly does not
    /// advance the iterator.
    pub fn more(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.walk.next_edge();
        }
        self.peeked.is_some()
    }

    /// The next edge.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::IteratorExhausted`] once every edge has been
    /// yielded.
    pub fn try_next(&mut self) -> Result<Edge> {
        self.next().ok_or(SolidkitError::IteratorExhausted)
    }
}

impl Iterator for EdgeIterator {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let edge = self.peeked.take().or_else(|| self.walk.next_edge())?;
        self.yielded += 1;
        Some(edge)
    }
}

impl fmt::Debug for EdgeIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeIterator")
            .field("yielded", &self.yielded)
            .field("pending", &self.walk.stack.len())
            .finish()
    }
}

/// Lazily yields each distinct face of a shape once.
pub struct FaceIterator {
    walk: Walk,
    peeked: Option<Face>,
    yielded: usize,
}

impl FaceIterator {
    pub(crate) fn new(shape: &Shape) -> Self {
        Self {
            walk: Walk::new(shape),
            peeked: None,
            yielded: 0,
        }
    }

    /// Whether another face is available, without advancing.
    pub fn more(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.walk.next_face();
        }
        self.peeked.is_some()
    }

    /// The next face.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::IteratorExhausted`] once every face has been
    /// yielded.
    pub fn try_next(&mut self) -> Result<Face> {
        self.next().ok_or(SolidkitError::IteratorExhausted)
    }
}

impl Iterator for FaceIterator {
    type Item = Face;

    fn next(&mut self) -> Option<Face> {
        let face = self.peeked.take().or_else(|| self.walk.next_face())?;
        self.yielded += 1;
        Some(face)
    }
}

impl fmt::Debug for FaceIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceIterator")
            .field("yielded", &self.yielded)
            .field("pending", &self.walk.stack.len())
            .finish()
    }
}
