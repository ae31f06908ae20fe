use crate::geometry::{ParametricSurface, Surface};
use crate::math::polygon::{
    area_vector, point_convex_polygon_distance, point_segment_distance, winding_number_2d,
};
use crate::math::{Matrix3, Point2, Point3, Vector3};
use crate::tessellation::{curve::wire_polygon, TessellationParams};
use crate::topology::{Face, FaceRegion};

/// Seed grid resolution per parameter direction.
const SEEDS: usize = 8;

/// Gauss–Newton steps after seeding.
const ITERATIONS: usize = 24;

/// Closest point of a surface patch to a query point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SurfaceProjection {
    pub(crate) uv: Point2,
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) point: Point3,
    pub(crate) distance: f64,
}

/// Projects a point onto a surface restricted to a parameter rectangle.
pub(crate) struct ClosestPointOnSurface<'a> {
    surface: &'a Surface,
    u: (f64, f64),
    v: (f64, f64),
}

impl<'a> ClosestPointOnSurface<'a> {
    pub(crate) fn new(surface: &'a Surface, u: (f64, f64), v: (f64, f64)) -> Self {
        Self { surface, u, v }
    }

    /// Best grid seed refined by Gauss–Newton, clamped to the rectangle.
    pub(crate) fn execute(&self, p: &Point3) -> SurfaceProjection {
        let (u0, u1) = self.u;
        let (v0, v1) = self.v;
        let at = |i: usize, n: usize, a: f64, b: f64| {
            #[allow(clippy::cast_precision_loss)]
            let f = i as f64 / n as f64;
            a + (b - a) * f
        };
        let mut best = Point2::new(u0, v0);
        let mut best_d = f64::INFINITY;
        for i in 0..=SEEDS {
            for j in 0..=SEEDS {
                let uv = Point2::new(at(i, SEEDS, u0, u1), at(j, SEEDS, v0, v1));
                let d = (ParametricSurface::value(self.surface, uv.x, uv.y) - p).norm_squared();
                if d < best_d {
                    best_d = d;
                    best = uv;
                }
            }
        }

        let mut uv = best;
        for _ in 0..ITERATIONS {
            let (s, su, sv) = self.surface.derivatives(uv.x, uv.y);
            let r = s - p;
            let a = su.dot(&su);
            let b = su.dot(&sv);
            let c = sv.dot(&sv);
            let det = a * c - b * b;
            if det.abs() <= 1e-20 {
                break;
            }
            let gu = su.dot(&r);
            let gv = sv.dot(&r);
            let du = (c * gu - b * gv) / det;
            let dv = (a * gv - b * gu) / det;
            let next = Point2::new(
                (uv.x - du).clamp(u0.min(u1), u0.max(u1)),
                (uv.y - dv).clamp(v0.min(v1), v0.max(v1)),
            );
            let step = (next - uv).norm();
            uv = next;
            if step <= 1e-13 * (1.0 + uv.coords.amax()) {
                break;
            }
        }
        let point = ParametricSurface::value(self.surface, uv.x, uv.y);
        SurfaceProjection {
            uv,
            point,
            distance: (point - p).norm(),
        }
    }
}

/// Outward unit normal of `face` at the face point nearest to `p`.
pub(crate) fn outward_normal(face: &Face, p: &Point3) -> Option<Vector3> {
    let sense = face.sense();
    match &face.0.region {
        FaceRegion::Planar => {
            let plane = face.0.surface.as_plane().ok()?;
            Some(plane.normal_vector().normalize() * sense)
        }
        FaceRegion::Faceted(polygons) => polygons
            .iter()
            .filter_map(|poly| {
                let n = area_vector(poly).try_normalize(1e-14)?;
                Some((point_convex_polygon_distance(p, poly, &n), n))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, n)| n),
        FaceRegion::Patch { map, u, v, .. } => {
            let hit = ClosestPointOnSurface::new(map, *u, *v).execute(p);
            map.unit_normal(hit.uv.x, hit.uv.y).map(|n| n * sense)
        }
    }
}

/// Whether `p` lies on `face` within `tol`, boundary included.
pub(crate) fn face_contains(face: &Face, p: &Point3, tol: f64) -> bool {
    match &face.0.region {
        FaceRegion::Planar => {
            let Ok(plane) = face.0.surface.as_plane() else {
                return false;
            };
            if plane.signed_distance(p).abs() > tol {
                return false;
            }
            let params = TessellationParams::default();
            let q = plane.project(p);
            let mut winding = 0;
            for wire in &face.0.wires {
                let outline = wire_polygon(wire, &params);
                let n = outline.len();
                if (0..n).any(|i| point_segment_distance(p, &outline[i], &outline[(i + 1) % n]).0 <= tol) {
                    return true;
                }
                let flat: Vec<Point2> = outline.iter().map(|x| plane.project(x)).collect();
                winding += winding_number_2d(&q, &flat);
            }
            winding != 0
        }
        FaceRegion::Faceted(polygons) => polygons.iter().any(|poly| {
            area_vector(poly)
                .try_normalize(1e-14)
                .is_some_and(|n| point_convex_polygon_distance(p, poly, &n) <= tol)
        }),
        FaceRegion::Patch { map, u, v, .. } => {
            ClosestPointOnSurface::new(map, *u, *v).execute(p).distance <= tol
        }
    }
}

/// Least-squares point satisfying `n_i · x = d_i` for every plane, closest
/// to `fallback` along directions the planes leave free. Nearly parallel
/// planes count as one.
pub(crate) fn planes_meet(planes: &[(Vector3, f64)], fallback: &Point3) -> Point3 {
    let mut m = Matrix3::zeros();
    let mut rhs = Vector3::zeros();
    for (n, d) in planes {
        m += n * n.transpose();
        rhs += n * *d;
    }
    let offset = rhs - m * fallback.coords;
    let svd = m.svd(true, true);
    match svd.solve(&offset, 1e-2) {
        Ok(delta) => fallback + delta,
        Err(_) => *fallback,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{CylindricalSurface, Direction, Point, Vector};
    use crate::topology::Shape;
    use approx::assert_relative_eq;

    #[test]
    fn projects_onto_cylinder() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        let s = Surface::from(&CylindricalSurface::new(&axis, 2.0).unwrap());
        let hit = ClosestPointOnSurface::new(&s, (0.0, std::f64::consts::TAU), (-5.0, 5.0))
            .execute(&Point3::new(0.0, 5.0, 1.0));
        assert_relative_eq!(hit.point, Point3::new(0.0, 2.0, 1.0), epsilon = 1e-8);
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-8);
    }

    #[test]
    fn cube_normals_point_outward() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap();
        let center = Point3::new(0.5, 0.5, 0.5);
        for face in cube.faces() {
            let p = crate::math::polygon::vertex_centroid(
                &face.oriented_edges().map(|oe| oe.start_point()).collect::<Vec<_>>(),
            );
            let n = outward_normal(&face, &p).unwrap();
            assert!(n.dot(&(p - center)) > 0.4);
        }
    }

    #[test]
    fn containment_on_box_faces() {
        let cube = Shape::cuboid(&Point::origin(), &Vector::new(2.0, 1.0, 1.0)).unwrap();
        let on_top = Point3::new(1.5, 0.5, 1.0);
        let hits = cube.faces().filter(|f| face_contains(f, &on_top, 1e-9)).count();
        assert_eq!(hits, 1);
        let corner = Point3::new(2.0, 1.0, 1.0);
        assert_eq!(cube.faces().filter(|f| face_contains(f, &corner, 1e-9)).count(), 3);
        let beyond = Point3::new(2.5, 0.5, 1.0);
        assert!(cube.faces().all(|f| !face_contains(&f, &beyond, 1e-9)));
    }

    #[test]
    fn three_planes_meet_at_corner() {
        let planes = [
            (Vector3::x(), 1.0),
            (Vector3::y(), 2.0),
            (Vector3::z(), 3.0),
        ];
        let p = planes_meet(&planes, &Point3::origin());
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn parallel_planes_keep_the_free_direction() {
        let planes = [(Vector3::z(), 1.0), (Vector3::z(), 1.0)];
        let p = planes_meet(&planes, &Point3::new(4.0, 5.0, 0.0));
        assert_relative_eq!(p, Point3::new(4.0, 5.0, 1.0), epsilon = 1e-12);
    }
}
