pub mod polygon;
pub mod quadrature;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Confusion distance: points closer than this are the same point.
pub const TOLERANCE: f64 = 1e-7;

/// Distance tolerance scaled to the magnitude of the coordinates involved.
#[must_use]
pub fn scaled_tolerance(magnitude: f64) -> f64 {
    TOLERANCE * (1.0 + magnitude.abs())
}

/// Returns `true` when two points coincide within the scaled tolerance.
#[must_use]
pub fn points_coincide(a: &Point3, b: &Point3) -> bool {
    let magnitude = a.coords.amax().max(b.coords.amax());
    (a - b).norm() <= scaled_tolerance(magnitude)
}

/// A unit vector perpendicular to `v`.
///
/// Picks the world axis least aligned with `v` as a reference so the result
/// is deterministic.
#[must_use]
pub fn perpendicular(v: &Vector3) -> Vector3 {
    let a = v.abs();
    let reference = if a.x <= a.y && a.x <= a.z {
        Vector3::x()
    } else if a.y <= a.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    v.cross(&reference).normalize()
}

/// Linear interpolation between two points.
#[must_use]
pub fn lerp(a: &Point3, b: &Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perpendicular_is_unit_and_orthogonal() {
        for v in [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(-5.0, 0.1, 0.0),
        ] {
            let p = perpendicular(&v);
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-12);
            assert!(p.dot(&v).abs() < 1e-12);
        }
    }

    #[test]
    fn coincidence_scales_with_magnitude() {
        let a = Point3::new(1000.0, 0.0, 0.0);
        let b = Point3::new(1000.0 + 1e-6, 0.0, 0.0);
        assert!(points_coincide(&a, &b));
        let c = Point3::new(0.0, 0.0, 0.0);
        let d = Point3::new(1e-6, 0.0, 0.0);
        assert!(!points_coincide(&c, &d));
    }
}
