//! B-Rep solid modeling toolkit.
//!
//! Geometry values ([`geometry`]) are immutable and shared through `Arc`
//! handles. Topological entities ([`topology`]) compose them into vertices,
//! edges, wires, faces and shapes. Builders accumulate input and produce one
//! immutable [`Shape`] when consumed by `build()`.

pub mod bottle;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod tessellation;
pub mod topology;

pub use error::{BuildError, Result, SolidkitError};
pub use geometry::{
    Axis, Axis2D, Curve2D, CylindricalSurface, Direction, Direction2D, Ellipse2D, Plane,
    PlaneAxis, Point, Point2D, SpaceAxis, Surface, Transformable, Transformation, TrimmedCurve,
    TrimmedCurve2D, Vector,
};
pub use operations::{CompoundBuilder, FilletBuilder, Loft, ShellBuilder};
pub use tessellation::{Mesh, TessellationParams};
pub use topology::{
    Edge, EdgeIterator, Face, FaceIterator, Shape, ShapeType, Vertex, Wire, WireBuilder,
    WireSegment,
};
