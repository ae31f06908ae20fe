//! Shared-structure boundary representation.
//!
//! Every entity is an `Arc` handle to immutable data. Two faces meeting
//! along an edge hold the same [`Edge`]; identity comparisons use the
//! handle, never coordinates.

mod edge;
mod explore;
mod face;
mod shape;
mod solid;
pub(crate) mod transform;
mod vertex;
mod wire;

pub use edge::Edge;
pub use explore::{EdgeIterator, FaceIterator};
pub use face::Face;
pub use shape::{Shape, ShapeType};
pub use vertex::Vertex;
pub use wire::{Wire, WireBuilder, WireSegment};

pub(crate) use edge::OrientedEdge;
pub(crate) use face::{FaceNode, FaceRegion};
pub(crate) use shape::ShapeNode;
pub(crate) use solid::{Shell, Solid};
