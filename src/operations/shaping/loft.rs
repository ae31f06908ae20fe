use std::collections::HashMap;

use tracing::debug;

use crate::error::{BuildError, Result, SolidkitError};
use crate::geometry::{OpaqueSurface, Plane, Rail, Surface, SweptSurface};
use crate::math::polygon::{newell_normal, vertex_centroid};
use crate::math::{Point3, Vector3};
use crate::operations::query::{solid_volume, Aabb};
use crate::tessellation::curve::wire_polygon;
use crate::tessellation::TessellationParams;
use crate::topology::{Edge, Face, OrientedEdge, Shape, Shell, Solid, Vertex, Wire};

/// Interpolates a surface or solid through an ordered series of wires.
///
/// Consecutive stations are joined edge by edge with ruled patches. In
/// solid mode the first and last stations are capped.
///
/// ```
/// use solidkit::{Edge, Loft, Point, Wire, WireSegment};
///
/// let square = |z: f64| -> solidkit::Result<Wire> {
///     let p = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].map(|(x, y)| Point::new(x, y, z));
///     let edges = [
///         Edge::line(&p[0], &p[1])?,
///         Edge::line(&p[1], &p[2])?,
///         Edge::line(&p[2], &p[3])?,
///         Edge::line(&p[3], &p[0])?,
///     ];
///     let segments: Vec<&dyn WireSegment> = edges.iter().map(|e| e as &dyn WireSegment).collect();
///     Wire::new(&segments)
/// };
/// let mut loft = Loft::new_solid();
/// loft.add_wires(&[&square(0.0)?, &square(2.0)?]);
/// let prism = loft.build()?;
/// assert!((prism.mass() - 2.0).abs() < 1e-9);
/// # Ok::<(), solidkit::SolidkitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Loft {
    solid: bool,
    compatible: bool,
    wires: Vec<Wire>,
}

impl Loft {
    /// A loft that caps its ends into a closed solid.
    #[must_use]
    pub fn new_solid() -> Self {
        Self {
            solid: true,
            compatible: true,
            wires: Vec::new(),
        }
    }

    /// A loft that only produces the lateral shell.
    #[must_use]
    pub fn new_surface() -> Self {
        Self {
            solid: false,
            ..Self::new_solid()
        }
    }

    pub fn add_wire(&mut self, wire: &Wire) -> &mut Self {
        self.wires.push(wire.clone());
        self
    }

    pub fn add_wires(&mut self, wires: &[&Wire]) -> &mut Self {
        self.wires.extend(wires.iter().map(|&w| w.clone()));
        self
    }

    /// Whether stations with different edge counts are resampled so that
    /// they correspond point by point. On by default.
    pub fn ensure_wire_compatibility(&mut self, check: bool) -> &mut Self {
        self.compatible = check;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wires.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// # Errors
    ///
    /// Returns the builder with [`SolidkitError::LoftFailure`] if fewer than
    /// two wires were added, the stations cannot be matched edge for edge, a
    /// solid loft has an open station, or the result encloses no volume.
    pub fn build(self) -> std::result::Result<Shape, BuildError<Self>> {
        match self.apply() {
            Ok(shape) => Ok(shape),
            Err(err) => Err(BuildError::new(self, err)),
        }
    }

    fn apply(&self) -> Result<Shape> {
        let failure = SolidkitError::LoftFailure;
        if self.wires.len() < 2 {
            return Err(failure(format!(
                "loft needs at least two wires, got {}",
                self.wires.len()
            )));
        }
        let closed = self.wires[0].is_closed();
        if self.wires.iter().any(|w| w.is_closed() != closed) {
            return Err(failure("stations mix open and closed wires".into()));
        }
        if self.solid && !closed {
            return Err(failure("a solid loft needs closed wires".into()));
        }

        let params = TessellationParams::default();
        let polygons: Vec<Vec<Point3>> = self
            .wires
            .iter()
            .map(|w| station_points(w, closed, &params))
            .collect();
        let tol = 1e-6 * (1.0 + Aabb::from_points(polygons.iter().flatten()).diagonal());

        let counts: Vec<usize> = self.wires.iter().map(Wire::edge_count).collect();
        let stations = if counts.windows(2).all(|w| w[0] == w[1]) {
            if self.compatible && closed {
                aligned_orientation(&self.wires, &polygons)
            } else {
                self.wires.clone()
            }
        } else if self.compatible {
            resample(&polygons, closed)?
        } else {
            return Err(failure(format!(
                "stations have {} and {} edges",
                counts.iter().min().unwrap_or(&0),
                counts.iter().max().unwrap_or(&0)
            )));
        };

        let mut faces = Vec::new();
        for pair in stations.windows(2) {
            faces.extend(ruled_faces(&pair[0], &pair[1], closed, tol)?);
        }
        if !self.solid {
            debug!(stations = stations.len(), faces = faces.len(), "lofted surface");
            return Ok(Shape::from_shell(Shell::new(faces)));
        }

        let last = stations.len() - 1;
        faces.extend(cap(&stations[0].reversed(), &params, tol)?);
        faces.extend(cap(&stations[last], &params, tol)?);
        let mut solid = Solid::from_faces(faces);
        let volume = solid_volume(&solid);
        if volume.abs() <= tol * tol * tol {
            return Err(failure("loft encloses no volume".into()));
        }
        if volume < 0.0 {
            solid = Solid::from_faces(solid.faces().map(Face::flipped).collect());
        }
        debug!(
            stations = stations.len(),
            faces = solid.faces().count(),
            volume = volume.abs(),
            "lofted solid"
        );
        Ok(Shape::from_solids(vec![solid]))
    }
}

/// Sample points of a station, including the end point of an open wire.
fn station_points(wire: &Wire, closed: bool, params: &TessellationParams) -> Vec<Point3> {
    let mut points = wire_polygon(wire, params);
    if !closed {
        if let Some(last) = wire.oriented().last() {
            points.push(last.end_point());
        }
    }
    points
}

/// Closed stations reversed where they wind against the first one.
fn aligned_orientation(wires: &[Wire], polygons: &[Vec<Point3>]) -> Vec<Wire> {
    let reference = newell_normal(&polygons[0]);
    wires
        .iter()
        .zip(polygons)
        .map(|(wire, polygon)| match (reference, newell_normal(polygon)) {
            (Some(a), Some(b)) if a.dot(&b) < 0.0 => wire.reversed(),
            _ => wire.clone(),
        })
        .collect()
}

/// Rebuilds every station as a polyline with the same number of points,
/// spaced by arc length and starting next to the previous station's start.
fn resample(polygons: &[Vec<Point3>], closed: bool) -> Result<Vec<Wire>> {
    let count = polygons.iter().map(Vec::len).max().unwrap_or(0).max(if closed { 3 } else { 2 });
    let mut reference: Option<(Point3, Option<Vector3>)> = None;
    let mut wires = Vec::with_capacity(polygons.len());
    for polygon in polygons {
        if polygon.len() < 2 {
            return Err(SolidkitError::LoftFailure("station has no extent".into()));
        }
        let mut points = polygon.clone();
        if closed {
            if let Some((start, ref_normal)) = reference {
                if let (Some(a), Some(b)) = (ref_normal, newell_normal(&points)) {
                    if a.dot(&b) < 0.0 {
                        points.reverse();
                    }
                }
                let nearest = points
                    .iter()
                    .enumerate()
                    .min_by(|(_, p), (_, q)| {
                        (*p - start).norm_squared().total_cmp(&(*q - start).norm_squared())
                    })
                    .map_or(0, |(i, _)| i);
                points.rotate_left(nearest);
            }
            reference = Some((points[0], newell_normal(&points)));
        }
        let samples = arc_length_samples(&points, count, closed);
        let vertices: Vec<Vertex> = samples.into_iter().map(Vertex::at).collect();
        let spans = if closed { count } else { count - 1 };
        let edges = (0..spans)
            .map(|i| {
                Edge::segment(&vertices[i], &vertices[(i + 1) % count])
                    .map(|e| OrientedEdge::new(e, true))
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|err| SolidkitError::LoftFailure(format!("cannot resample station: {err}")))?;
        wires.push(Wire::from_edges(edges));
    }
    Ok(wires)
}

/// `count` points evenly spaced by arc length along a polyline.
fn arc_length_samples(points: &[Point3], count: usize, closed: bool) -> Vec<Point3> {
    let mut path = points.to_vec();
    if closed {
        path.push(points[0]);
    }
    let mut lengths = vec![0.0];
    for w in path.windows(2) {
        let total = lengths[lengths.len() - 1] + (w[1] - w[0]).norm();
        lengths.push(total);
    }
    let total = lengths[lengths.len() - 1];
    let divisions = if closed { count } else { count - 1 };
    let mut out = Vec::with_capacity(count);
    let mut seg = 0;
    for k in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let target = total * k as f64 / divisions as f64;
        while seg + 2 < lengths.len() && lengths[seg + 1] < target {
            seg += 1;
        }
        let span = lengths[seg + 1] - lengths[seg];
        let f = if span > 0.0 {
            ((target - lengths[seg]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(path[seg] + (path[seg + 1] - path[seg]) * f);
    }
    out
}

/// Ruled patches joining matching edges of two stations.
fn ruled_faces(a: &Wire, b: &Wire, closed: bool, tol: f64) -> Result<Vec<Face>> {
    let (lower, upper) = (a.oriented(), b.oriented());
    let n = lower.len();
    let connector = |va: &Vertex, vb: &Vertex| {
        Edge::segment(va, vb).map_err(|err| {
            SolidkitError::LoftFailure(format!("stations touch at a vertex: {err}"))
        })
    };
    let mut connectors = Vec::with_capacity(n + 1);
    for (oa, ob) in lower.iter().zip(upper) {
        connectors.push(connector(oa.start_vertex(), ob.start_vertex())?);
    }
    if !closed {
        connectors.push(connector(lower[n - 1].end_vertex(), upper[n - 1].end_vertex())?);
    }

    let mut faces = Vec::with_capacity(n);
    for (j, (oa, ob)) in lower.iter().zip(upper).enumerate() {
        let left = &connectors[j];
        let right = &connectors[if closed { (j + 1) % n } else { j + 1 }];
        let map = Surface::Other(OpaqueSurface::new(SweptSurface::Ruled {
            rails: [
                Rail::new(oa.edge.curve(), !oa.forward),
                Rail::new(ob.edge.curve(), !ob.forward),
            ],
        }));
        let quad = [oa.start_point(), oa.end_point(), ob.end_point(), ob.start_point()];
        let carrier = if oa.edge.0.curve.as_line().is_some() && ob.edge.0.curve.as_line().is_some() {
            flat_carrier(&quad, tol).unwrap_or_else(|| map.clone())
        } else {
            map.clone()
        };
        faces.push(Face::patch(
            carrier,
            map,
            (0.0, 1.0),
            (0.0, 1.0),
            [
                Some(oa.clone()),
                Some(OrientedEdge::new(right.clone(), true)),
                Some(ob.reversed()),
                Some(OrientedEdge::new(left.clone(), false)),
            ],
            false,
        ));
    }
    Ok(faces)
}

/// A plane through `points` if they are coplanar within `tol`.
fn flat_carrier(points: &[Point3], tol: f64) -> Option<Surface> {
    let normal = newell_normal(points)?;
    let origin = points[0];
    points
        .iter()
        .all(|p| (p - origin).dot(&normal).abs() <= tol)
        .then(|| Surface::Plane(Plane::from_normal(origin, &normal)))
}

/// Closes the loft end bounded by `boundary`: a planar face when the wire is
/// flat, otherwise a fan of patches meeting at the wire's centroid.
fn cap(boundary: &Wire, params: &TessellationParams, tol: f64) -> Result<Vec<Face>> {
    let points = wire_polygon(boundary, params);
    let normal = newell_normal(&points)
        .ok_or_else(|| SolidkitError::LoftFailure("end station has no area".into()))?;
    let center = vertex_centroid(&points);
    if points.iter().all(|p| (p - center).dot(&normal).abs() <= tol) {
        return Ok(vec![Face::planar(
            Plane::from_normal(center, &normal),
            vec![boundary.clone()],
        )]);
    }

    let apex = Vertex::at(center);
    let mut spokes: HashMap<usize, Edge> = HashMap::new();
    let mut spoke = |v: &Vertex| -> Result<Edge> {
        if let Some(e) = spokes.get(&v.key()) {
            return Ok(e.clone());
        }
        let e = Edge::segment(v, &apex).map_err(|err| {
            SolidkitError::LoftFailure(format!("end station passes through its centroid: {err}"))
        })?;
        spokes.insert(v.key(), e.clone());
        Ok(e)
    };
    let mut faces = Vec::new();
    for oe in boundary.oriented() {
        let inward = spoke(oe.end_vertex())?;
        let outward = spoke(oe.start_vertex())?;
        let map = Surface::Other(OpaqueSurface::new(SweptSurface::Apex {
            rail: Rail::new(oe.edge.curve(), !oe.forward),
            apex: center,
        }));
        let carrier = if oe.edge.0.curve.as_line().is_some() {
            flat_carrier(&[oe.start_point(), oe.end_point(), center], tol)
                .unwrap_or_else(|| map.clone())
        } else {
            map.clone()
        };
        faces.push(Face::patch(
            carrier,
            map,
            (0.0, 1.0),
            (0.0, 1.0),
            [
                Some(oe.clone()),
                Some(OrientedEdge::new(inward, true)),
                None,
                Some(OrientedEdge::new(outward, false)),
            ],
            false,
        ));
    }
    Ok(faces)
}
