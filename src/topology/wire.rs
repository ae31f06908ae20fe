use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BuildError, Result, SolidkitError};
use crate::geometry::{Transformable, Transformation};
use crate::math::points_coincide;

use super::{Edge, Face, OrientedEdge};

#[derive(Debug)]
pub(crate) struct WireNode {
    pub(crate) edges: Vec<OrientedEdge>,
}

/// An ordered chain of connected edges.
///
/// Wires are assembled with a [`WireBuilder`] (or [`Wire::new`]); each edge
/// starts where the previous one ends.
#[derive(Clone)]
pub struct Wire(pub(crate) Arc<WireNode>);

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Edge {}
    impl Sealed for super::Wire {}
}

/// Something a wire can be assembled from: an [`Edge`] or another [`Wire`].
pub trait WireSegment: sealed::Sealed {
    /// The segment's edges in traversal order; `true` marks forward traversal.
    fn oriented_edges(&self) -> Vec<(Edge, bool)>;
}

impl WireSegment for Edge {
    fn oriented_edges(&self) -> Vec<(Edge, bool)> {
        vec![(self.clone(), true)]
    }
}

impl WireSegment for Wire {
    fn oriented_edges(&self) -> Vec<(Edge, bool)> {
        self.0
            .edges
            .iter()
            .map(|oe| (oe.edge.clone(), oe.forward))
            .collect()
    }
}

/// Accumulates edges and wires into one connected chain.
///
/// Each addition after the first must touch either end of the chain; the
/// fragment is reversed when needed so the chain stays head-to-tail.
#[derive(Debug, Default, Clone)]
pub struct WireBuilder {
    edges: Vec<OrientedEdge>,
}

impl WireBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends (or prepends) a fragment that shares an end point with the
    /// chain. Touching ends are welded onto the chain's vertex, and a chain
    /// whose ends meet is closed onto its first vertex. A failed addition
    /// leaves the builder unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DisconnectedWire`] if the fragment touches
    /// neither end of the chain, and [`SolidkitError::NullEntity`] for an
    /// empty fragment.
    pub fn add<S: WireSegment + ?Sized>(&mut self, segment: &S) -> Result<&mut Self> {
        let mut fragment: Vec<OrientedEdge> = segment
            .oriented_edges()
            .into_iter()
            .map(|(edge, forward)| OrientedEdge::new(edge, forward))
            .collect();
        let (Some(first), Some(last)) = (fragment.first(), fragment.last()) else {
            return Err(SolidkitError::NullEntity("empty wire segment".into()));
        };
        let (frag_start, frag_end) = (first.start_point(), last.end_point());

        let (Some(head), Some(tail)) = (self.edges.first(), self.edges.last()) else {
            self.edges = fragment;
            self.close_loop();
            return Ok(self);
        };
        let (chain_start, chain_end) = (head.start_point(), tail.end_point());
        let (head_vertex, tail_vertex) = (head.start_vertex().clone(), tail.end_vertex().clone());

        if points_coincide(&chain_end, &frag_start) {
            fragment[0] = fragment[0].with_start_vertex(&tail_vertex);
            self.edges.extend(fragment);
        } else if points_coincide(&chain_end, &frag_end) {
            let mut back = reversed(&fragment);
            back[0] = back[0].with_start_vertex(&tail_vertex);
            self.edges.extend(back);
        } else if points_coincide(&chain_start, &frag_end) {
            let last = fragment.len() - 1;
            fragment[last] = fragment[last].with_end_vertex(&head_vertex);
            fragment.append(&mut self.edges);
            self.edges = fragment;
        } else if points_coincide(&chain_start, &frag_start) {
            let mut front = reversed(&fragment);
            let last = front.len() - 1;
            front[last] = front[last].with_end_vertex(&head_vertex);
            front.append(&mut self.edges);
            self.edges = front;
        } else {
            return Err(SolidkitError::DisconnectedWire(format!(
                "fragment from {frag_start} to {frag_end} does not touch the chain ends {chain_start} and {chain_end}"
            )));
        }
        self.close_loop();
        Ok(self)
    }

    /// Welds the chain's last vertex onto its first once the ends meet.
    fn close_loop(&mut self) {
        let (Some(head), Some(tail)) = (self.edges.first(), self.edges.last()) else {
            return;
        };
        if self.edges.len() < 2
            || head.start_vertex().ptr_eq(tail.end_vertex())
            || !points_coincide(&head.start_point(), &tail.end_point())
        {
            return;
        }
        let first = head.start_vertex().clone();
        let last = self.edges.len() - 1;
        self.edges[last] = self.edges[last].with_end_vertex(&first);
    }

    /// Number of edges accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Finishes the chain.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::NullEntity`] (with the builder) when nothing
    /// was added.
    pub fn build(self) -> std::result::Result<Wire, BuildError<Self>> {
        if self.edges.is_empty() {
            return Err(BuildError::new(
                self,
                SolidkitError::NullEntity("wire builder has no edges".into()),
            ));
        }
        debug!(edges = self.edges.len(), "built wire");
        Ok(Wire::from_edges(self.edges))
    }
}

fn reversed(edges: &[OrientedEdge]) -> Vec<OrientedEdge> {
    edges.iter().rev().map(OrientedEdge::reversed).collect()
}

impl Wire {
    /// Assembles a wire from edges and wires, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::DisconnectedWire`] if a segment does not
    /// connect to the chain, or [`SolidkitError::NullEntity`] if `segments`
    /// is empty.
    pub fn new(segments: &[&dyn WireSegment]) -> Result<Self> {
        let mut builder = WireBuilder::new();
        for segment in segments {
            builder.add(*segment)?;
        }
        Ok(Self::create(builder)?)
    }

    /// Consumes a builder, producing its wire.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::NullEntity`] if the builder is empty.
    pub fn create(builder: WireBuilder) -> std::result::Result<Self, BuildError<WireBuilder>> {
        builder.build()
    }

    /// The planar face bounded by this wire.
    ///
    /// # Errors
    ///
    /// Returns [`SolidkitError::NonPlanarOrSelfIntersecting`] if the wire is
    /// open, not planar, or crosses itself.
    pub fn face(&self) -> Result<Face> {
        Face::from_wire(self)
    }

    /// A transformed copy; the original is untouched.
    #[must_use]
    pub fn transform(&self, transformation: &Transformation) -> Self {
        self.transformed(transformation)
    }

    /// Kept for call-chain compatibility. Edges built on surfaces carry
    /// their 3D curves from construction, so there is nothing to compute.
    #[must_use]
    pub fn build_curves_3d(self) -> Self {
        self
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.0.edges.len()
    }

    /// Whether the chain ends where it starts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.0.edges.first(), self.0.edges.last()) {
            (Some(first), Some(last)) => {
                points_coincide(&first.start_point(), &last.end_point())
            }
            _ => false,
        }
    }

    /// The edges in chain order.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.0.edges.iter().map(|oe| oe.edge.clone()).collect()
    }

    pub(crate) fn from_edges(edges: Vec<OrientedEdge>) -> Self {
        Self(Arc::new(WireNode { edges }))
    }

    pub(crate) fn oriented(&self) -> &[OrientedEdge] {
        &self.0.edges
    }

    /// The same loop traversed backwards.
    pub(crate) fn reversed(&self) -> Self {
        Self::from_edges(reversed(&self.0.edges))
    }
}

impl Transformable for Wire {
    fn transformed(&self, transformation: &Transformation) -> Self {
        super::transform::TransformMemo::new(transformation).wire(self)
    }
}

impl fmt::Debug for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wire")
            .field("edges", &self.edge_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn line(a: (f64, f64), b: (f64, f64)) -> Edge {
        Edge::line(&Point::new(a.0, a.1, 0.0), &Point::new(b.0, b.1, 0.0)).unwrap()
    }

    #[test]
    fn fragments_are_reversed_to_connect() {
        let a = line((0.0, 0.0), (1.0, 0.0));
        let b = line((1.0, 1.0), (1.0, 0.0));
        let c = line((0.0, 1.0), (0.0, 0.0));
        let mut builder = WireBuilder::new();
        builder.add(&a).unwrap().add(&b).unwrap().add(&c).unwrap();
        let wire = Wire::create(builder).unwrap();
        assert_eq!(wire.edge_count(), 3);
        assert!(!wire.is_closed());
        // c was prepended, b appended backwards
        let edges = wire.oriented();
        assert_eq!(edges[0].start_point(), c.start().0);
        assert!(edges[0].forward);
        assert_eq!(edges[1].start_point(), a.start().0);
        assert!(edges[1].forward);
        assert_eq!(edges[2].end_point(), b.start().0);
        assert!(!edges[2].forward);
    }

    #[test]
    fn touching_ends_share_one_vertex() {
        let a = line((0.0, 0.0), (1.0, 0.0));
        let b = line((1.0, 1.0), (1.0, 0.0));
        let c = line((0.0, 1.0), (0.0, 0.0));
        let mut builder = WireBuilder::new();
        builder.add(&a).unwrap().add(&b).unwrap().add(&c).unwrap();
        let wire = Wire::create(builder).unwrap();
        let edges = wire.oriented();
        for pair in edges.windows(2) {
            assert!(pair[0].end_vertex().ptr_eq(pair[1].start_vertex()));
        }
        assert!(!edges[0].start_vertex().ptr_eq(edges[2].end_vertex()));
    }

    #[test]
    fn closing_edge_welds_onto_the_first_vertex() {
        let p = [(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)];
        let edges: Vec<Edge> = (0..4).map(|i| line(p[i], p[(i + 1) % 4])).collect();
        let segments: Vec<&dyn WireSegment> = edges.iter().map(|e| e as &dyn WireSegment).collect();
        let wire = Wire::new(&segments).unwrap();
        assert!(wire.is_closed());
        let oriented = wire.oriented();
        for i in 0..4 {
            assert!(oriented[i].end_vertex().ptr_eq(oriented[(i + 1) % 4].start_vertex()));
        }
        let mut vertices: Vec<usize> = oriented.iter().map(|oe| oe.start_vertex().key()).collect();
        vertices.sort_unstable();
        vertices.dedup();
        assert_eq!(vertices.len(), 4);
    }

    #[test]
    fn welded_wires_keep_their_shared_vertices() {
        let half = Wire::new(&[&line((0.0, 0.0), (1.0, 0.0)), &line((1.0, 0.0), (1.0, 1.0))]).unwrap();
        let other = Wire::new(&[&line((0.0, 0.0), (0.0, 1.0)), &line((0.0, 1.0), (1.0, 1.0))]).unwrap();
        let full = Wire::new(&[&half, &other]).unwrap();
        let oriented = full.oriented();
        for i in 0..4 {
            assert!(oriented[i].end_vertex().ptr_eq(oriented[(i + 1) % 4].start_vertex()));
        }
        // the half that already connected is reused as is
        assert!(Arc::ptr_eq(&oriented[0].edge.0, &half.oriented()[0].edge.0));
    }

    #[test]
    fn disconnected_fragment_is_rejected_without_losing_state() {
        let mut builder = WireBuilder::new();
        builder.add(&line((0.0, 0.0), (1.0, 0.0))).unwrap();
        let err = builder.add(&line((5.0, 5.0), (6.0, 5.0))).unwrap_err();
        assert!(matches!(err, SolidkitError::DisconnectedWire(_)));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn empty_builder_returns_itself() {
        let err = Wire::create(WireBuilder::new()).unwrap_err();
        assert!(matches!(err.error(), SolidkitError::NullEntity(_)));
        assert!(err.into_builder().is_empty());
    }

    #[test]
    fn wires_combine_into_closed_loop() {
        let half = Wire::new(&[&line((0.0, 0.0), (1.0, 0.0)), &line((1.0, 0.0), (1.0, 1.0))]).unwrap();
        let other = Wire::new(&[&line((0.0, 0.0), (0.0, 1.0)), &line((0.0, 1.0), (1.0, 1.0))]).unwrap();
        let full = Wire::new(&[&half, &other]).unwrap();
        assert_eq!(full.edge_count(), 4);
        assert!(full.is_closed());
        assert_eq!(full.clone().build_curves_3d().edge_count(), 4);
    }
}
