use super::{Point2, Point3, Vector3};

/// Area vector of a closed 3D polygon: `0.5 * sum(p_i x p_{i+1})`.
///
/// Its direction is the polygon normal (right-hand rule on the vertex order)
/// and its length is the enclosed area.
#[must_use]
pub fn area_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut acc = Vector3::zeros();
    for i in 0..n {
        acc += points[i].coords.cross(&points[(i + 1) % n].coords);
    }
    acc * 0.5
}

/// Unit normal of a polygon by Newell's method, `None` if it has no area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let a = area_vector(points);
    let len = a.norm();
    (len > f64::EPSILON).then(|| a / len)
}

/// Average of the polygon vertices.
#[must_use]
pub fn vertex_centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    Point3::from(sum / points.len() as f64)
}

/// Area centroid of a closed planar polygon with the given unit normal.
#[must_use]
pub fn area_centroid(points: &[Point3], normal: &Vector3) -> Point3 {
    let base = vertex_centroid(points);
    let n = points.len();
    let mut weighted = Vector3::zeros();
    let mut total = 0.0;
    for i in 0..n {
        let a = points[i] - base;
        let b = points[(i + 1) % n] - base;
        let w = a.cross(&b).dot(normal) * 0.5;
        weighted += (a + b) / 3.0 * w;
        total += w;
    }
    if total.abs() <= f64::EPSILON {
        base
    } else {
        base + weighted / total
    }
}

/// Signed area of a 2D polygon (positive when counter-clockwise).
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    acc * 0.5
}

/// Winding number of `p` with respect to polygon `verts`.
///
/// Non-zero means inside, zero means outside.
#[must_use]
pub fn winding_number_2d(p: &Point2, verts: &[Point2]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let side = cross_2d(b.x - a.x, b.y - a.y, p.x - a.x, p.y - a.y);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
#[must_use]
pub fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Whether segments `a0-a1` and `b0-b1` touch or cross, within `tol`.
#[must_use]
pub fn segments_intersect_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2, tol: f64) -> bool {
    let d1 = orient(b0, b1, a0);
    let d2 = orient(b0, b1, a1);
    let d3 = orient(a0, a1, b0);
    let d4 = orient(a0, a1, b1);

    let len_a = (a1 - a0).norm().max(f64::EPSILON);
    let len_b = (b1 - b0).norm().max(f64::EPSILON);
    let (e1, e2) = (tol * len_b, tol * len_a);

    if ((d1 > e1 && d2 < -e1) || (d1 < -e1 && d2 > e1))
        && ((d3 > e2 && d4 < -e2) || (d3 < -e2 && d4 > e2))
    {
        return true;
    }

    (d1.abs() <= e1 && on_segment(b0, b1, a0, tol))
        || (d2.abs() <= e1 && on_segment(b0, b1, a1, tol))
        || (d3.abs() <= e2 && on_segment(a0, a1, b0, tol))
        || (d4.abs() <= e2 && on_segment(a0, a1, b1, tol))
}

fn orient(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    cross_2d(b.x - a.x, b.y - a.y, c.x - a.x, c.y - a.y)
}

fn on_segment(a: &Point2, b: &Point2, p: &Point2, tol: f64) -> bool {
    p.x >= a.x.min(b.x) - tol
        && p.x <= a.x.max(b.x) + tol
        && p.y >= a.y.min(b.y) - tol
        && p.y <= a.y.max(b.y) + tol
}

/// Distance from `p` to segment `a-b` and the clamped parameter of the foot.
#[must_use]
pub fn point_segment_distance(p: &Point3, a: &Point3, b: &Point3) -> (f64, f64) {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return ((p - a).norm(), 0.0);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    ((p - (a + ab * t)).norm(), t)
}

/// Distance from `p` to a convex planar polygon with outward unit `normal`.
#[must_use]
pub fn point_convex_polygon_distance(p: &Point3, polygon: &[Point3], normal: &Vector3) -> f64 {
    let n = polygon.len();
    let mut inside = true;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if (b - a).cross(&(p - a)).dot(normal) < 0.0 {
            inside = false;
            break;
        }
    }
    if inside && n >= 3 {
        return (p - polygon[0]).dot(normal).abs();
    }
    (0..n)
        .map(|i| point_segment_distance(p, &polygon[i], &polygon[(i + 1) % n]).0)
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p2(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        ]
    }

    #[test]
    fn area_vector_of_square() {
        let a = area_vector(&square());
        assert_relative_eq!(a.z, 4.0, epsilon = 1e-12);
        assert_relative_eq!(newell_normal(&square()).unwrap().z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn area_centroid_of_square() {
        let c = area_centroid(&square(), &Vector3::z());
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn winding_inside_and_outside() {
        let poly = [p2(0.0, 0.0), p2(1.0, 0.0), p2(1.0, 1.0), p2(0.0, 1.0)];
        assert_ne!(winding_number_2d(&p2(0.5, 0.5), &poly), 0);
        assert_eq!(winding_number_2d(&p2(1.5, 0.5), &poly), 0);
        assert!(signed_area_2d(&poly) > 0.0);
    }

    #[test]
    fn crossing_and_disjoint_segments() {
        assert!(segments_intersect_2d(
            &p2(0.0, 0.0),
            &p2(1.0, 1.0),
            &p2(0.0, 1.0),
            &p2(1.0, 0.0),
            1e-9
        ));
        assert!(!segments_intersect_2d(
            &p2(0.0, 0.0),
            &p2(1.0, 0.0),
            &p2(0.0, 1.0),
            &p2(1.0, 1.0),
            1e-9
        ));
    }

    #[test]
    fn distance_to_square_polygon() {
        let d = point_convex_polygon_distance(&Point3::new(1.0, 1.0, 3.0), &square(), &Vector3::z());
        assert_relative_eq!(d, 2.0, epsilon = 1e-12);
        let d = point_convex_polygon_distance(&Point3::new(3.0, 1.0, 1.0), &square(), &Vector3::z());
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
    }
}
