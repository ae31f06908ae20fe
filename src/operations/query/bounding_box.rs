use crate::math::Point3;
use crate::tessellation::TessellationParams;
use crate::topology::Shape;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Aabb {
    pub(crate) min: Point3,
    pub(crate) max: Point3,
}

impl Aabb {
    pub(crate) fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub(crate) fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include(p);
        }
        aabb
    }

    pub(crate) fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub(crate) fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }

    /// Whether the boxes overlap by more than `tol` on every axis.
    pub(crate) fn overlaps(&self, other: &Self, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] < other.max[i] - tol && other.min[i] < self.max[i] - tol)
    }
}

/// Bounding box of a shape's tessellation.
pub(crate) struct BoundingBox {
    shape: Shape,
}

impl BoundingBox {
    pub(crate) fn new(shape: &Shape) -> Self {
        Self {
            shape: shape.clone(),
        }
    }

    pub(crate) fn execute(&self) -> Aabb {
        let mesh = self.shape.mesh_with(TessellationParams {
            linear_deflection: 0.1,
            angular_deflection: 1.0,
        });
        let mut aabb = Aabb::empty();
        for p in mesh.iter().flat_map(|m| m.vertices()) {
            aabb.include(&p.0);
        }
        for edge in self.shape.edges() {
            aabb.include(&edge.0.start.position());
            aabb.include(&edge.0.end.position());
        }
        aabb
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Vector};
    use approx::assert_relative_eq;

    #[test]
    fn box_bounds() {
        let b = Shape::cuboid(&Point::new(1.0, 2.0, 3.0), &Vector::new(1.0, 1.0, 2.0)).unwrap();
        let aabb = BoundingBox::new(&b).execute();
        assert_relative_eq!(aabb.min, Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(aabb.max, Point3::new(2.0, 3.0, 5.0));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::from_points(&[Point3::origin(), Point3::new(1.0, 1.0, 1.0)]);
        let b = Aabb::from_points(&[Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0)]);
        assert!(!a.overlaps(&b, 1e-9));
        let c = Aabb::from_points(&[Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 1.0, 1.0)]);
        assert!(a.overlaps(&c, 1e-9));
    }
}
