use tracing::debug;

use crate::topology::Shape;

/// Collects shapes into one compound without validating them.
///
/// ```
/// use solidkit::{CompoundBuilder, Point, Shape, ShapeType, Vector};
///
/// let a = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0))?;
/// let b = Shape::cuboid(&Point::new(3.0, 0.0, 0.0), &Vector::new(1.0, 1.0, 1.0))?;
/// let both = CompoundBuilder::new().add(&a).add(&b).build();
/// assert_eq!(both.shape_type(), ShapeType::Compound);
/// # Ok::<(), solidkit::SolidkitError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompoundBuilder {
    children: Vec<Shape>,
}

impl CompoundBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a shape; insertion order is kept.
    #[must_use]
    pub fn add(mut self, shape: &Shape) -> Self {
        self.children.push(shape.clone());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Always succeeds; an empty builder yields a null compound.
    #[must_use]
    pub fn build(self) -> Shape {
        debug!(children = self.children.len(), "built compound");
        Shape::compound(self.children)
    }
}
