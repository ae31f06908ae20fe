use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{BuildError, Result, SolidkitError};
use crate::geometry::{
    CylindricalSurface, OpaqueSurface, Plane, Rail, Surface, SweptSurface, TrimmedCurve,
};
use crate::math::polygon::{area_vector, newell_normal};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::boolean::{Polygon, Sew};
use crate::operations::query::{face_contains, outward_normal, Aabb, BoundingBox};
use crate::tessellation::curve::{arc_segments, sample_edge};
use crate::tessellation::TessellationParams;
use crate::topology::{Edge, Face, OrientedEdge, Shape};

/// Rounds edges of a shape with circular blends.
///
/// Each requested edge gets a wedge solid swept along it: the region between
/// the edge and a circular arc tangent to both neighbouring faces. Convex
/// edges have the wedge cut away; concave edges have it filled in.
///
/// ```
/// use solidkit::{Point, Shape, Vector};
///
/// let cube = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0))?;
/// let mut fillet = cube.fillet();
/// let edge = cube.edges().next().unwrap();
/// fillet.add(0.1, &edge);
/// let rounded = fillet.build()?;
/// assert!(rounded.mass() < 1.0);
/// # Ok::<(), solidkit::SolidkitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilletBuilder {
    shape: Shape,
    fillets: Vec<(f64, Edge)>,
}

/// Cross-section of the blend at one point of the edge.
#[derive(Debug, Clone, Copy)]
struct Station {
    corner: Point3,
    tangent: Vector3,
    n1: Vector3,
    n2: Vector3,
    t1: Point3,
    t2: Point3,
    center: Point3,
}

/// A validated fillet, ready to be turned into a wedge.
#[derive(Debug)]
struct Plan {
    radius: f64,
    convex: bool,
    closed: bool,
    setback: f64,
    faces: [usize; 2],
    segment: Option<(Point3, Point3)>,
    stations: Vec<Station>,
}

impl FilletBuilder {
    #[must_use]
    pub fn new(shape: &Shape) -> Self {
        Self {
            shape: shape.clone(),
            fillets: Vec::new(),
        }
    }

    /// Requests a blend of `radius` on `edge`. Nothing is checked until
    /// [`build`](Self::build).
    pub fn add(&mut self, radius: f64, edge: &Edge) -> &mut Self {
        self.fillets.push((radius, edge.clone()));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fillets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fillets.is_empty()
    }

    /// Applies every requested fillet.
    ///
    /// Edges where the two faces meet tangentially, and seam edges of a
    /// single face, are skipped.
    ///
    /// # Errors
    ///
    /// Returns the builder with [`SolidkitError::FilletFailure`] if a radius
    /// is not positive, an edge is not part of the shape or not shared by
    /// exactly two faces, the blend does not fit on a neighbouring face, or
    /// two blends on one face overlap.
    pub fn build(self) -> std::result::Result<Shape, BuildError<Self>> {
        match self.apply() {
            Ok(shape) => Ok(shape),
            Err(err) => Err(BuildError::new(self, err)),
        }
    }

    fn apply(&self) -> Result<Shape> {
        if self.fillets.is_empty() {
            return Ok(self.shape.clone());
        }
        let tol = 1e-6 * (1.0 + BoundingBox::new(&self.shape).execute().diagonal());
        let known: HashSet<usize> = self.shape.edges().map(|e| e.key()).collect();
        let mut uses: HashMap<usize, Vec<(Face, OrientedEdge)>> = HashMap::new();
        for face in self.shape.faces() {
            for oe in face.oriented_edges() {
                uses.entry(oe.edge.key())
                    .or_default()
                    .push((face.clone(), oe.clone()));
            }
        }

        let mut seen = HashSet::new();
        let mut plans = Vec::new();
        for (radius, edge) in &self.fillets {
            if *radius <= TOLERANCE || !radius.is_finite() {
                return Err(SolidkitError::FilletFailure(format!(
                    "radius {radius} must be positive"
                )));
            }
            if !known.contains(&edge.key()) {
                return Err(SolidkitError::FilletFailure(
                    "edge is not part of the shape".into(),
                ));
            }
            if !seen.insert(edge.key()) {
                continue;
            }
            let adjacent = uses.get(&edge.key()).map_or(&[][..], Vec::as_slice);
            let [(f1, oe1), (f2, _)] = adjacent else {
                return Err(SolidkitError::FilletFailure(format!(
                    "edge is shared by {} faces instead of two",
                    adjacent.len()
                )));
            };
            if f1.ptr_eq(f2) {
                warn!(?edge, "skipping seam edge");
                continue;
            }
            match plan_edge(*radius, edge, (f1, oe1), f2, tol)? {
                Some(plan) => plans.push(plan),
                None => warn!(?edge, "skipping edge between tangent faces"),
            }
        }
        check_overlaps(&plans, tol)?;

        let mut result = self.shape.clone();
        for plan in &plans {
            let wedge = wedge(plan)?;
            let blended = if plan.convex {
                result.subtract(&wedge)
            } else {
                result.fuse(&wedge)
            };
            result = blended.map_err(|err| {
                SolidkitError::FilletFailure(format!("cannot blend edge: {err}"))
            })?;
        }
        debug!(requested = self.fillets.len(), applied = plans.len(), "filleted shape");
        Ok(result)
    }
}

/// Cross-sections along `edge`, or `None` when the faces meet tangentially.
fn plan_edge(
    radius: f64,
    edge: &Edge,
    (f1, oe1): (&Face, &OrientedEdge),
    f2: &Face,
    tol: f64,
) -> Result<Option<Plan>> {
    let failure = |msg: &str| SolidkitError::FilletFailure(msg.into());
    let curve = &edge.0.curve;
    let sign = if oe1.forward { 1.0 } else { -1.0 };
    let closed = edge.is_closed();
    let mut samples = sample_edge(edge, &TessellationParams::default());
    if closed {
        samples.pop();
    }

    let mut stations = Vec::with_capacity(samples.len());
    let mut convexity: Option<bool> = None;
    let mut setback = 0.0;
    for (s, corner) in samples {
        let tangent = (curve.derivative_normalized(s) * sign)
            .try_normalize(1e-14)
            .ok_or_else(|| failure("edge has no tangent"))?;
        let n1 = outward_normal(f1, &corner).ok_or_else(|| failure("face has no normal"))?;
        let n2 = outward_normal(f2, &corner).ok_or_else(|| failure("face has no normal"))?;
        if n1.cross(&n2).norm() < 1e-6 {
            return Ok(None);
        }
        // Directions into each face, perpendicular to the edge.
        let b1 = n1.cross(&tangent).normalize();
        let b2 = tangent.cross(&n2).normalize();
        let convex = b1.dot(&n2) < 0.0;
        if convexity.is_some_and(|c| c != convex) {
            return Err(failure("edge changes between convex and concave"));
        }
        convexity = Some(convex);

        let theta = b1.dot(&b2).clamp(-1.0, 1.0).acos();
        setback = radius / (theta / 2.0).tan();
        let sigma = if convex { 1.0 } else { -1.0 };
        let t1 = corner + b1 * setback;
        let t2 = corner + b2 * setback;
        let slack = tol + 0.1 * radius;
        if !face_contains(f1, &t1, slack) || !face_contains(f2, &t2, slack) {
            return Err(SolidkitError::FilletFailure(format!(
                "radius {radius} does not fit on the faces next to the edge"
            )));
        }
        stations.push(Station {
            corner,
            tangent,
            n1,
            n2,
            t1,
            t2,
            center: t1 - n1 * (sigma * radius),
        });
    }

    let segment = curve
        .as_line()
        .map(|_| (edge.0.start.position(), edge.0.end.position()));
    Ok(Some(Plan {
        radius,
        convex: convexity.unwrap_or(true),
        closed,
        setback,
        faces: [f1.key(), f2.key()],
        segment,
        stations,
    }))
}

/// Parallel straight fillets sharing a face must leave room for each other.
fn check_overlaps(plans: &[Plan], tol: f64) -> Result<()> {
    for (i, a) in plans.iter().enumerate() {
        for b in &plans[i + 1..] {
            let (Some((a0, a1)), Some((b0, b1))) = (a.segment, b.segment) else {
                continue;
            };
            if !a.faces.iter().any(|f| b.faces.contains(f)) {
                continue;
            }
            let dir = (a1 - a0).normalize();
            if dir.cross(&(b1 - b0).normalize()).norm() > 1e-9 {
                continue;
            }
            let (lo, hi) = (0.0, (a1 - a0).norm());
            let (p, q) = ((b0 - a0).dot(&dir), (b1 - a0).dot(&dir));
            if p.max(q) <= lo + tol || p.min(q) >= hi - tol {
                continue;
            }
            let offset = b0 - a0;
            let distance = (offset - dir * offset.dot(&dir)).norm();
            if a.setback + b.setback > distance + tol {
                return Err(SolidkitError::FilletFailure(format!(
                    "fillets of radius {} and {} overlap on a shared face",
                    a.radius, b.radius
                )));
            }
        }
    }
    Ok(())
}

/// Outline of the wedge at one station: outer corner, the two tangent points
/// pushed past the faces, and the arc between them.
fn section(st: &Station, radius: f64, arc: usize, eps: f64, sigma: f64) -> Vec<Point3> {
    let a = st.t1 - st.center;
    let c = st.t2 - st.center;
    let phi = a.angle(&c);
    let mut out = Vec::with_capacity(arc + 4);
    out.push(st.corner + (st.n1 + st.n2) * (sigma * eps));
    out.push(st.t1 + st.n1 * (sigma * eps));
    for i in 0..=arc {
        #[allow(clippy::cast_precision_loss)]
        let f = i as f64 / arc as f64;
        let w = if phi.sin().abs() < 1e-12 {
            a + (c - a) * f
        } else {
            (a * ((1.0 - f) * phi).sin() + c * (f * phi).sin()) / phi.sin()
        };
        out.push(st.center + w.normalize() * radius);
    }
    out.push(st.t2 + st.n2 * (sigma * eps));
    out
}

fn polyline_rail(points: Vec<Point3>) -> Result<Rail> {
    Ok(Rail::new(TrimmedCurve::polyline(points)?, false))
}

/// Sews the swept cross-sections into a closed wedge solid.
fn wedge(plan: &Plan) -> Result<Shape> {
    let eps = 0.02 * plan.radius;
    let sigma = if plan.convex { 1.0 } else { -1.0 };
    let first = &plan.stations[0];
    let sweep = (first.t1 - first.center).angle(&(first.t2 - first.center));
    let arc = arc_segments(sweep, plan.radius, &TessellationParams::default()).max(2);

    let mut sections: Vec<Vec<Point3>> = plan
        .stations
        .iter()
        .map(|st| section(st, plan.radius, arc, eps, sigma))
        .collect();
    let n = sections.len();
    if n < 2 && !plan.closed {
        return Err(SolidkitError::FilletFailure("edge is too short".into()));
    }
    // Convex wedges poke out past the ends of an open edge.
    if plan.convex && !plan.closed {
        let (t0, t1) = (plan.stations[0].tangent, plan.stations[n - 1].tangent);
        for p in &mut sections[0] {
            *p -= t0 * eps;
        }
        for p in &mut sections[n - 1] {
            *p += t1 * eps;
        }
    }

    let m = sections[0].len();
    let is_arc = |j: usize| (2..arc + 2).contains(&j);
    let straight = plan.segment.is_some();

    let mut surfaces: Vec<Surface> = Vec::new();
    let arc_source = surfaces.len();
    surfaces.push(if straight {
        let x = (first.t1 - first.center) / plan.radius;
        Surface::Cylindrical(CylindricalSurface::from_frame(
            first.center,
            x,
            first.tangent.cross(&x),
            first.tangent,
            plan.radius,
        ))
    } else {
        let mut centers: Vec<Point3> = plan.stations.iter().map(|s| s.center).collect();
        if plan.closed {
            centers.push(centers[0]);
        }
        Surface::Other(OpaqueSurface::new(SweptSurface::Pipe {
            spine: TrimmedCurve::polyline(centers)?,
            up: first.n1,
            radius: plan.radius,
            handedness: 1.0,
        }))
    });
    let mut side_sources = HashMap::new();
    for j in (0..m).filter(|&j| !is_arc(j)) {
        let jn = (j + 1) % m;
        side_sources.insert(j, surfaces.len());
        surfaces.push(if straight {
            let quad = [sections[0][j], sections[0][jn], sections[n - 1][jn], sections[n - 1][j]];
            let normal = newell_normal(&quad).unwrap_or_else(Vector3::z);
            Surface::Plane(Plane::from_normal(quad[0], &normal))
        } else {
            let rail = |k: usize| {
                let mut pts: Vec<Point3> = sections.iter().map(|s| s[k]).collect();
                if plan.closed {
                    pts.push(pts[0]);
                }
                polyline_rail(pts)
            };
            Surface::Other(OpaqueSurface::new(SweptSurface::Ruled {
                rails: [rail(j)?, rail(jn)?],
            }))
        });
    }

    let mut polygons = Vec::new();
    let strips = if plan.closed { n } else { n - 1 };
    for i in 0..strips {
        let (s0, s1) = (&sections[i], &sections[(i + 1) % n]);
        for j in 0..m {
            let jn = (j + 1) % m;
            let source = if is_arc(j) { arc_source } else { side_sources[&j] };
            polygons.extend(Polygon::new(vec![s0[j], s0[jn], s1[jn]], source));
            polygons.extend(Polygon::new(vec![s0[j], s1[jn], s1[j]], source));
        }
    }
    if !plan.closed {
        for (cap, reverse) in [(&sections[0], true), (&sections[n - 1], false)] {
            let source = surfaces.len();
            let normal = newell_normal(cap).unwrap_or_else(Vector3::z);
            surfaces.push(Surface::Plane(Plane::from_normal(cap[0], &normal)));
            for k in 1..m - 1 {
                let tri = if reverse {
                    vec![cap[0], cap[k + 1], cap[k]]
                } else {
                    vec![cap[0], cap[k], cap[k + 1]]
                };
                polygons.extend(Polygon::new(tri, source));
            }
        }
    }

    let volume: f64 = polygons
        .iter()
        .map(|p| {
            let v = &p.vertices;
            v[0].coords.dot(&v[1].coords.cross(&v[2].coords)) / 6.0
        })
        .sum();
    if volume < 0.0 {
        for p in &mut polygons {
            p.flip();
        }
    }
    let bounds = Aabb::from_points(sections.iter().flatten());
    let diag = bounds.diagonal();
    debug!(
        stations = n,
        polygons = polygons.len(),
        area = polygons.iter().map(|p| area_vector(&p.vertices).norm()).sum::<f64>(),
        "built fillet wedge"
    );
    Sew::new(polygons, &surfaces, 1e-6 * (1.0 + diag), diag)
        .execute()
        .map_err(|err| SolidkitError::FilletFailure(format!("cannot build blend: {err}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, PlaneAxis, Point, Vector};
    use crate::topology::ShapeType;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn unit_cube() -> Shape {
        Shape::cuboid(&Point::origin(), &Vector::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn single_edge_removes_the_corner_region() {
        let cube = unit_cube();
        let edge = cube.edges().next().unwrap();
        let mut fillet = cube.fillet();
        fillet.add(0.2, &edge);
        let rounded = fillet.build().unwrap();
        assert_eq!(rounded.shape_type(), ShapeType::Solid);
        assert!(rounded.is_closed());
        let removed = (1.0 - PI / 4.0) * 0.04;
        assert_relative_eq!(rounded.mass(), 1.0 - removed, max_relative = 2e-3);
        assert!(rounded.faces().any(|f| f.surface().as_cylinder().is_ok()));
    }

    #[test]
    fn every_cube_edge() {
        let cube = unit_cube();
        let mut fillet = cube.fillet();
        for edge in cube.edges() {
            fillet.add(0.1, &edge);
        }
        let rounded = fillet.build().unwrap();
        let mass = rounded.mass();
        assert!(mass > 0.95 && mass < 1.0, "mass {mass}");
    }

    #[test]
    fn oversized_radius_returns_the_builder() {
        let cube = unit_cube();
        let mut fillet = cube.fillet();
        for edge in cube.edges() {
            fillet.add(0.6, &edge);
        }
        let err = fillet.build().unwrap_err();
        assert!(matches!(err.error(), SolidkitError::FilletFailure(_)));
        assert_eq!(err.into_builder().len(), 12);
    }

    #[test]
    fn radius_wider_than_the_face_fails() {
        let cube = unit_cube();
        let edge = cube.edges().next().unwrap();
        let mut fillet = cube.fillet();
        fillet.add(1.5, &edge);
        assert!(fillet.build().is_err());
    }

    #[test]
    fn invalid_requests() {
        let cube = unit_cube();
        let other = unit_cube();
        let mut fillet = cube.fillet();
        fillet.add(0.1, &other.edges().next().unwrap());
        assert!(matches!(
            fillet.build().unwrap_err().error(),
            SolidkitError::FilletFailure(_)
        ));

        let mut fillet = cube.fillet();
        fillet.add(0.0, &cube.edges().next().unwrap());
        assert!(fillet.build().is_err());
    }

    #[test]
    fn cylinder_rim_and_skipped_seam() {
        let axis = PlaneAxis::new(&Point::origin(), &Direction::z());
        let cylinder = Shape::cylinder(&axis, 1.0, 2.0).unwrap();
        let mut fillet = cylinder.fillet();
        for edge in cylinder.edges() {
            fillet.add(0.2, &edge);
        }
        let rounded = fillet.build().unwrap();
        assert!(rounded.mass() < cylinder.mass());
        assert!(rounded.mass() > 0.9 * cylinder.mass());
    }

    #[test]
    fn no_requests_is_identity() {
        let cube = unit_cube();
        let same = cube.fillet().build().unwrap();
        assert_relative_eq!(same.mass(), 1.0, epsilon = 1e-12);
    }
}
