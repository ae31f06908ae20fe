use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};
use tracing::warn;

use crate::error::{Result, SolidkitError};
use crate::geometry::{ParametricSurface, Surface};
use crate::math::{Point2, Point3, Vector3};
use crate::topology::{Face, FaceRegion, OrientedEdge};

use super::curve::{loop_points, EdgeCache};
use super::TessellationParams;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Iso-curve probes used to size the interior grid of curved faces.
const ISO_PROBES: usize = 16;

/// Triangles of `face`, counter-clockwise around its outward normal.
pub(crate) fn triangulate(
    face: &Face,
    params: &TessellationParams,
    cache: &EdgeCache,
) -> Result<Vec<[Point3; 3]>> {
    let mut triangles = match &face.0.region {
        FaceRegion::Faceted(polygons) => return Ok(fan(polygons)),
        FaceRegion::Planar => planar(face, cache)?,
        FaceRegion::Patch { map, u, v, sides } => patch(map, *u, *v, sides, params, cache)?,
    };
    if face.0.reversed {
        for tri in &mut triangles {
            tri.swap(1, 2);
        }
    }
    Ok(triangles)
}

fn fan(polygons: &[Vec<Point3>]) -> Vec<[Point3; 3]> {
    polygons
        .iter()
        .flat_map(|poly| (1..poly.len().saturating_sub(1)).map(move |i| [poly[0], poly[i], poly[i + 1]]))
        .collect()
}

/// A constrained Delaunay triangulation in (scaled) parameter space that
/// remembers the 3D point of every vertex it was given.
struct Triangulator {
    cdt: Cdt,
    points: HashMap<usize, Point3>,
    scale: (f64, f64),
}

impl Triangulator {
    fn new(scale: (f64, f64)) -> Self {
        Self {
            cdt: Cdt::new(),
            points: HashMap::new(),
            scale,
        }
    }

    fn insert(&mut self, uv: &Point2, xyz: Point3) -> Result<FixedVertexHandle> {
        let handle = self
            .cdt
            .insert(SpadePoint2::new(uv.x * self.scale.0, uv.y * self.scale.1))
            .map_err(|e: InsertionError| {
                SolidkitError::DegenerateGeometry(format!("triangulation insert failed: {e}"))
            })?;
        self.points.entry(handle.index()).or_insert(xyz);
        Ok(handle)
    }

    fn constraint_loop(&mut self, uv: &[Point2], xyz: &[Point3]) -> Result<()> {
        if uv.len() < 3 {
            return Err(SolidkitError::DegenerateGeometry(
                "boundary loop needs at least three points".into(),
            ));
        }
        let mut handles = Vec::with_capacity(uv.len());
        for (p, q) in uv.iter().zip(xyz) {
            handles.push(self.insert(p, *q)?);
        }
        for i in 0..handles.len() {
            let from = handles[i];
            let to = handles[(i + 1) % handles.len()];
            if from == to {
                continue;
            }
            if self.cdt.can_add_constraint(from, to) {
                self.cdt.add_constraint(from, to);
            } else {
                warn!(segment = i, "boundary segment crosses an earlier one; left unconstrained");
            }
        }
        Ok(())
    }

    /// Triangles of the kept faces, counter-clockwise in parameter space.
    fn triangles(&self, keep: Option<&HashSet<usize>>) -> Vec<[Point3; 3]> {
        let mut out = Vec::new();
        for face in self.cdt.inner_faces() {
            if keep.is_some_and(|k| !k.contains(&face.fix().index())) {
                continue;
            }
            let vs = face.vertices();
            let mut tri = [Point3::origin(); 3];
            let mut complete = true;
            for (slot, v) in tri.iter_mut().zip(vs.iter()) {
                match self.points.get(&v.fix().index()) {
                    Some(p) => *slot = *p,
                    None => complete = false,
                }
            }
            if complete {
                out.push(tri);
            }
        }
        out
    }

    /// Faces enclosed by an odd number of constraint crossings from the
    /// outer face.
    fn interior(&self) -> HashSet<usize> {
        let cdt = &self.cdt;
        let mut interior = HashSet::new();
        let mut depth: HashMap<usize, u32> = HashMap::new();
        let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

        let outer = cdt.outer_face().fix();
        for edge in cdt.directed_edges() {
            if edge.face().fix() != outer {
                continue;
            }
            if let Some(inner) = edge.rev().face().as_inner() {
                let idx = inner.fix().index();
                if depth.contains_key(&idx) {
                    continue;
                }
                let d = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth.insert(idx, d);
                queue.push_back((inner.fix(), d));
            }
        }

        while let Some((fix, d)) = queue.pop_front() {
            if d % 2 == 1 {
                interior.insert(fix.index());
            }
            for edge in cdt.face(fix).adjacent_edges() {
                let Some(next) = edge.rev().face().as_inner() else {
                    continue;
                };
                let idx = next.fix().index();
                if depth.contains_key(&idx) {
                    continue;
                }
                let nd = d + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth.insert(idx, nd);
                queue.push_back((next.fix(), nd));
            }
        }
        interior
    }
}

fn planar(face: &Face, cache: &EdgeCache) -> Result<Vec<[Point3; 3]>> {
    let plane = face.0.surface.as_plane()?;
    let mut tri = Triangulator::new((1.0, 1.0));
    for wire in &face.0.wires {
        let xyz = loop_points(wire.oriented(), cache);
        let uv: Vec<Point2> = xyz.iter().map(|p| plane.project(p)).collect();
        tri.constraint_loop(&uv, &xyz)?;
    }
    let keep = tri.interior();
    Ok(tri.triangles(Some(&keep)))
}

/// Chords needed along an iso-curve sampled at `points`.
fn iso_segments(points: &[Point3], params: &TessellationParams) -> usize {
    let mut length = 0.0;
    let mut theta = 0.0;
    let mut prev: Option<Vector3> = None;
    for w in points.windows(2) {
        let d = w[1] - w[0];
        length += d.norm();
        let Some(d) = d.try_normalize(1e-14) else {
            continue;
        };
        if let Some(p) = prev {
            theta += p.dot(&d).clamp(-1.0, 1.0).acos();
        }
        prev = Some(d);
    }
    if theta <= 1e-9 {
        return 1;
    }
    let radius = length / theta;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let by_angle = (theta / params.angular_deflection).ceil() as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let by_chord = if radius > params.linear_deflection {
        (theta / (2.0 * (1.0 - params.linear_deflection / radius).acos())).ceil() as usize
    } else {
        1
    };
    by_angle.max(by_chord).clamp(1, 512)
}

#[allow(clippy::cast_precision_loss)]
fn lerp(a: f64, b: f64, i: usize, n: usize) -> f64 {
    a + (b - a) * i as f64 / n as f64
}

/// Grid resolution and parameter-space scale for `[u0, u1] x [v0, v1]`.
fn grid(
    surface: &Surface,
    (u0, u1): (f64, f64),
    (v0, v1): (f64, f64),
    params: &TessellationParams,
) -> ((usize, usize), (f64, f64)) {
    let mut nu = 1;
    let mut nv = 1;
    let mut su = 0.0;
    let mut sv = 0.0;
    for k in 0..=2 {
        let v = lerp(v0, v1, k, 2);
        let row: Vec<Point3> = (0..=ISO_PROBES)
            .map(|i| surface.value(lerp(u0, u1, i, ISO_PROBES), v).0)
            .collect();
        nu = nu.max(iso_segments(&row, params));
        let u = lerp(u0, u1, k, 2);
        let col: Vec<Point3> = (0..=ISO_PROBES)
            .map(|i| surface.value(u, lerp(v0, v1, i, ISO_PROBES)).0)
            .collect();
        nv = nv.max(iso_segments(&col, params));
        let (_, du, dv) = surface.derivatives(u, v);
        su += du.norm();
        sv += dv.norm();
    }
    let scale = |s: f64| if s > 1e-12 { s / 3.0 } else { 1.0 };
    ((nu, nv), (scale(su), scale(sv)))
}

fn patch(
    map: &Surface,
    u: (f64, f64),
    v: (f64, f64),
    sides: &[Option<OrientedEdge>; 4],
    params: &TessellationParams,
    cache: &EdgeCache,
) -> Result<Vec<[Point3; 3]>> {
    let corners = [
        Point2::new(u.0, v.0),
        Point2::new(u.1, v.0),
        Point2::new(u.1, v.1),
        Point2::new(u.0, v.1),
    ];
    let ((nu, nv), scale) = grid(map, u, v, params);
    let mut tri = Triangulator::new(scale);

    let mut uv = Vec::new();
    let mut xyz = Vec::new();
    for (k, side) in sides.iter().enumerate() {
        let (a, b) = (corners[k], corners[(k + 1) % 4]);
        match side {
            Some(oe) => {
                let samples = cache.oriented(oe);
                for (f, p) in &samples[..samples.len() - 1] {
                    uv.push(a + (b - a) * *f);
                    xyz.push(*p);
                }
            }
            None => {
                uv.push(a);
                xyz.push(map.value(a.x, a.y).0);
            }
        }
    }
    tri.constraint_loop(&uv, &xyz)?;

    for i in 1..nu {
        for j in 1..nv {
            let p = Point2::new(lerp(u.0, u.1, i, nu), lerp(v.0, v.1, j, nv));
            tri.insert(&p, map.value(p.x, p.y).0)?;
        }
    }
    Ok(tri.triangles(None))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::math::polygon::area_vector;
    use crate::topology::{Edge, Wire};

    fn square_with_hole() -> Face {
        let loop_of = |pts: &[(f64, f64)]| {
            let edges: Vec<Edge> = pts
                .iter()
                .zip(pts.iter().cycle().skip(1))
                .map(|(a, b)| Edge::line(&Point::new(a.0, a.1, 0.0), &Point::new(b.0, b.1, 0.0)).unwrap())
                .collect();
            let segs: Vec<&dyn crate::topology::WireSegment> =
                edges.iter().map(|e| e as &dyn crate::topology::WireSegment).collect();
            Wire::new(&segs).unwrap()
        };
        let outer = loop_of(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hole = loop_of(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        let face = outer.face().unwrap();
        let plane = face.surface().as_plane().unwrap();
        Face::planar(plane, vec![outer, hole])
    }

    #[test]
    fn planar_hole_is_left_open() {
        let face = square_with_hole();
        let params = TessellationParams::default();
        let cache = EdgeCache::build(face.oriented_edges().map(|oe| oe.edge.clone()), &params);
        let triangles = triangulate(&face, &params, &cache).unwrap();
        let area: f64 = triangles.iter().map(|t| area_vector(t).z).sum();
        assert!((area - 12.0).abs() < 1e-9);
        assert!(triangles.iter().all(|t| area_vector(t).z > 0.0));
    }

    #[test]
    fn fan_covers_convex_polygon() {
        let square = vec![vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]];
        let tris = fan(&square);
        assert_eq!(tris.len(), 2);
        let area: f64 = tris.iter().map(|t| area_vector(t).z).sum();
        assert!((area - 1.0).abs() < 1e-12);
    }
}
