use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, warn};

use crate::error::{Result, SolidkitError};
use crate::geometry::{Surface, TrimmedCurve};
use crate::math::polygon::{area_vector, point_segment_distance};
use crate::math::{Point3, Vector3};
use crate::topology::{Edge, Face, OrientedEdge, Shape, Shell, Solid, Vertex, Wire};

use super::polygon::Polygon;

new_key_type! {
    pub(crate) struct VertexKey;
}

/// Merges points closer than `cell_size` into one vertex key.
pub(crate) struct VertexMerger {
    cell_size: f64,
    cells: HashMap<(i64, i64, i64), Vec<VertexKey>>,
    points: SlotMap<VertexKey, Point3>,
}

impl VertexMerger {
    pub(crate) fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            points: SlotMap::with_key(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point3) -> (i64, i64, i64) {
        let inv = 1.0 / self.cell_size;
        (
            (p.x * inv).floor() as i64,
            (p.y * inv).floor() as i64,
            (p.z * inv).floor() as i64,
        )
    }

    pub(crate) fn point(&self, key: VertexKey) -> Point3 {
        self.points[key]
    }

    pub(crate) fn get_or_insert(&mut self, point: &Point3) -> VertexKey {
        let cell = self.cell_key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(keys) = self.cells.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &key in keys {
                        if (point - self.points[key]).norm() < self.cell_size {
                            return key;
                        }
                    }
                }
            }
        }
        let key = self.points.insert(*point);
        self.cells.entry(cell).or_default().push(key);
        key
    }
}

/// A directed boundary segment of one face group.
#[derive(Debug, Clone, Copy)]
struct HalfEdge {
    from: VertexKey,
    to: VertexKey,
    group: usize,
}

/// A run of half-edges between corner vertices, already turned into an edge.
struct Chain {
    group: usize,
    from: VertexKey,
    to: VertexKey,
    edge: OrientedEdge,
    points: Vec<Point3>,
}

/// Rebuilds a boundary representation from the polygon soup a boolean leaves.
///
/// Coincident points are welded, T-junctions split, and polygons that share
/// an edge and come from the same input face are merged back into one face.
/// Runs of half-edges between corners become shared edges; closed shells
/// with positive volume become solids and negative ones become their voids.
pub(crate) struct Sew<'a> {
    polygons: Vec<Polygon>,
    surfaces: &'a [Surface],
    tol: f64,
    diag: f64,
}

impl<'a> Sew<'a> {
    pub(crate) fn new(polygons: Vec<Polygon>, surfaces: &'a [Surface], tol: f64, diag: f64) -> Self {
        Self {
            polygons,
            surfaces,
            tol,
            diag,
        }
    }

    /// # Errors
    ///
    /// Returns [`SolidkitError::BooleanOpFailure`] if the polygons enclose no
    /// volume or a face boundary cannot be closed.
    pub(crate) fn execute(self) -> Result<Shape> {
        let mut merger = VertexMerger::new(self.tol);
        let mut loops = Vec::with_capacity(self.polygons.len());
        let mut sources = Vec::with_capacity(self.polygons.len());
        for polygon in &self.polygons {
            let mut keys: Vec<VertexKey> =
                polygon.vertices.iter().map(|p| merger.get_or_insert(p)).collect();
            keys.dedup();
            while keys.len() > 1 && keys.first() == keys.last() {
                keys.pop();
            }
            if keys.len() < 3 {
                continue;
            }
            let points: Vec<Point3> = keys.iter().map(|&k| merger.points[k]).collect();
            if area_vector(&points).norm() <= self.tol * self.tol {
                continue;
            }
            loops.push(keys);
            sources.push(polygon.source);
        }
        let points = merger.points;
        split_t_junctions(&points, &mut loops, self.tol);

        let groups = group_polygons(&loops, &sources);
        let half_edges = boundary_half_edges(&loops, &groups);
        let corners = find_corners(&half_edges);
        let mut vertices: HashMap<VertexKey, Vertex> = HashMap::new();
        let (chains, adjacency) = build_chains(
            &half_edges,
            &corners,
            &points,
            &mut vertices,
            groups.len(),
            self.tol,
        )
        .map_err(|err| SolidkitError::BooleanOpFailure(format!("cannot rebuild edges: {err}")))?;

        let mut faces = Vec::with_capacity(groups.len());
        for (g, polys) in groups.iter().enumerate() {
            let wires = group_wires(g, &chains)?;
            let polygons: Vec<Vec<Point3>> = polys
                .iter()
                .map(|&p| loops[p].iter().map(|&k| points[k]).collect())
                .collect();
            let surface = self.surfaces[sources[polys[0]]].clone();
            faces.push(Face::faceted(surface, polygons, wires));
        }

        let min_volume = 1e-9 * self.diag.powi(3);
        let mut outer: Vec<(f64, Vec<usize>)> = Vec::new();
        let mut voids: Vec<Vec<usize>> = Vec::new();
        for component in connected_components(groups.len(), &adjacency) {
            let volume: f64 = component
                .iter()
                .flat_map(|&g| groups[g].iter())
                .map(|&p| loop_volume(&loops[p], &points))
                .sum();
            if volume > min_volume {
                outer.push((volume, component));
            } else if volume < -min_volume {
                voids.push(component);
            } else {
                debug!(volume, "dropping shell without volume");
            }
        }
        if outer.is_empty() {
            return Err(SolidkitError::BooleanOpFailure(
                "result encloses no volume".into(),
            ));
        }

        let triangles = |component: &[usize]| -> Vec<[Point3; 3]> {
            component
                .iter()
                .flat_map(|&g| groups[g].iter())
                .flat_map(|&p| fan(&loops[p], &points))
                .collect()
        };
        let solid_triangles: Vec<Vec<[Point3; 3]>> =
            outer.iter().map(|(_, c)| triangles(c)).collect();
        let mut cavities: Vec<Vec<Shell>> = vec![Vec::new(); outer.len()];
        for void in voids {
            let probe = points[loops[groups[void[0]][0]][0]];
            let host = outer
                .iter()
                .enumerate()
                .filter(|&(i, _)| point_inside(&probe, &solid_triangles[i]))
                .min_by(|a, b| a.1 .0.total_cmp(&b.1 .0))
                .map(|(i, _)| i);
            let shell = Shell::new(void.iter().map(|&g| faces[g].clone()).collect());
            match host {
                Some(i) => cavities[i].push(shell),
                None => warn!("dropping void shell outside every solid"),
            }
        }

        let solids: Vec<Solid> = outer
            .iter()
            .zip(cavities)
            .map(|((_, component), cavities)| {
                let mut shells = vec![Shell::new(
                    component.iter().map(|&g| faces[g].clone()).collect(),
                )];
                shells.extend(cavities);
                Solid::new(shells)
            })
            .collect();
        debug!(
            polygons = self.polygons.len(),
            faces = faces.len(),
            solids = solids.len(),
            "sewed boolean result"
        );
        Ok(Shape::from_solids(solids))
    }
}

/// Inserts every welded vertex lying inside a polygon edge into that edge.
fn split_t_junctions(
    points: &SlotMap<VertexKey, Point3>,
    loops: &mut [Vec<VertexKey>],
    tol: f64,
) {
    let mut by_x: Vec<(f64, VertexKey)> = points.iter().map(|(k, p)| (p.x, k)).collect();
    by_x.sort_by(|a, b| a.0.total_cmp(&b.0));

    for keys in loops.iter_mut() {
        let n = keys.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (keys[i], keys[(i + 1) % n]);
            out.push(a);
            let (pa, pb) = (points[a], points[b]);
            let lo = pa.x.min(pb.x) - tol;
            let hi = pa.x.max(pb.x) + tol;
            let start = by_x.partition_point(|&(x, _)| x < lo);
            let mut inner: Vec<(f64, VertexKey)> = by_x[start..]
                .iter()
                .take_while(|&&(x, _)| x <= hi)
                .filter(|&&(_, k)| k != a && k != b)
                .filter_map(|&(_, k)| {
                    let (d, t) = point_segment_distance(&points[k], &pa, &pb);
                    (d <= tol && t > 0.0 && t < 1.0).then_some((t, k))
                })
                .collect();
            inner.sort_by(|x, y| x.0.total_cmp(&y.0));
            out.extend(inner.into_iter().map(|(_, k)| k));
        }
        out.dedup();
        *keys = out;
    }
}

fn directed_edges(keys: &[VertexKey]) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
    (0..keys.len()).map(move |i| (keys[i], keys[(i + 1) % keys.len()]))
}

/// Polygons from the same source face joined across shared edges.
fn group_polygons(loops: &[Vec<VertexKey>], sources: &[usize]) -> Vec<Vec<usize>> {
    let mut owners: HashMap<(VertexKey, VertexKey), Vec<usize>> = HashMap::new();
    for (p, keys) in loops.iter().enumerate() {
        for e in directed_edges(keys) {
            owners.entry(e).or_default().push(p);
        }
    }
    let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); loops.len()];
    for (p, keys) in loops.iter().enumerate() {
        for (a, b) in directed_edges(keys) {
            for &q in owners.get(&(b, a)).into_iter().flatten() {
                if q != p && sources[q] == sources[p] {
                    adjacency[p].insert(q);
                    adjacency[q].insert(p);
                }
            }
        }
    }
    connected_components(loops.len(), &adjacency)
}

/// Breadth-first connected components, each sorted, in order of first member.
fn connected_components(n: usize, adjacency: &[HashSet<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(cur) = queue.pop_front() {
            for &next in &adjacency[cur] {
                if !visited[next] {
                    visited[next] = true;
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Half-edges of each group not cancelled by a twin inside the same group.
fn boundary_half_edges(loops: &[Vec<VertexKey>], groups: &[Vec<usize>]) -> Vec<HalfEdge> {
    let mut out = Vec::new();
    for (g, polys) in groups.iter().enumerate() {
        let mut counts: HashMap<(VertexKey, VertexKey), i32> = HashMap::new();
        for &p in polys {
            for e in directed_edges(&loops[p]) {
                *counts.entry(e).or_default() += 1;
            }
        }
        let mut kept: Vec<((VertexKey, VertexKey), i32)> = counts
            .iter()
            .map(|(&(a, b), &c)| ((a, b), c - counts.get(&(b, a)).copied().unwrap_or(0)))
            .filter(|&(_, c)| c > 0)
            .collect();
        kept.sort_unstable_by_key(|&(e, _)| e);
        for ((from, to), c) in kept {
            for _ in 0..c {
                out.push(HalfEdge {
                    from,
                    to,
                    group: g,
                });
            }
        }
    }
    out
}

/// Vertices where an edge must end: where other than two faces meet, where
/// the boundary is open, or where a face touches itself.
fn find_corners(half_edges: &[HalfEdge]) -> HashSet<VertexKey> {
    let pairs: HashSet<(VertexKey, VertexKey)> =
        half_edges.iter().map(|h| (h.from, h.to)).collect();
    let mut groups: HashMap<VertexKey, BTreeSet<usize>> = HashMap::new();
    let mut outgoing: HashMap<(usize, VertexKey), usize> = HashMap::new();
    let mut corners = HashSet::new();
    for h in half_edges {
        groups.entry(h.from).or_default().insert(h.group);
        groups.entry(h.to).or_default().insert(h.group);
        *outgoing.entry((h.group, h.from)).or_default() += 1;
        if !pairs.contains(&(h.to, h.from)) {
            corners.insert(h.from);
            corners.insert(h.to);
        }
    }
    corners.extend(
        groups
            .into_iter()
            .filter(|(_, g)| g.len() != 2)
            .map(|(v, _)| v),
    );
    corners.extend(
        outgoing
            .into_iter()
            .filter(|&(_, c)| c > 1)
            .map(|((_, v), _)| v),
    );
    corners
}

/// Chains half-edges into edges. Twin chains of neighbouring faces share one
/// edge, traversed in opposite directions. Also returns face adjacency.
fn build_chains(
    half_edges: &[HalfEdge],
    corners: &HashSet<VertexKey>,
    points: &SlotMap<VertexKey, Point3>,
    vertices: &mut HashMap<VertexKey, Vertex>,
    group_count: usize,
    tol: f64,
) -> Result<(Vec<Chain>, Vec<HashSet<usize>>)> {
    let mut outgoing: HashMap<(usize, VertexKey), Vec<usize>> = HashMap::new();
    for (i, h) in half_edges.iter().enumerate() {
        outgoing.entry((h.group, h.from)).or_default().push(i);
    }
    let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); group_count];
    let mut used = vec![false; half_edges.len()];
    let mut built: HashMap<(VertexKey, VertexKey), (Edge, usize)> = HashMap::new();
    let mut chains = Vec::new();

    let walk = |start: usize, used: &[bool]| -> Vec<usize> {
        let mut run = vec![start];
        let mut cur = start;
        while run.len() <= half_edges.len() {
            let h = half_edges[cur];
            if corners.contains(&h.to) {
                break;
            }
            let next = outgoing
                .get(&(h.group, h.to))
                .and_then(|c| c.iter().copied().find(|&n| !used[n] && !run.contains(&n)));
            match next {
                Some(n) => {
                    run.push(n);
                    cur = n;
                }
                None => break,
            }
        }
        run
    };

    let mut emit = |run: Vec<usize>, used: &mut [bool]| -> Result<()> {
        for &h in &run {
            used[h] = true;
        }
        let mut keys: Vec<VertexKey> = run.iter().map(|&h| half_edges[h].from).collect();
        let last = half_edges[run[run.len() - 1]];
        keys.push(last.to);
        let group = last.group;
        let n = keys.len() - 1;
        let chain_points: Vec<Point3> = keys.iter().map(|&k| points[k]).collect();
        let edge = match built.get(&(keys[n], keys[n - 1])) {
            Some((edge, owner)) => {
                adjacency[group].insert(*owner);
                adjacency[*owner].insert(group);
                OrientedEdge::new(edge.clone(), false)
            }
            None => {
                let start = vertex_for(vertices, keys[0], points);
                let end = vertex_for(vertices, keys[n], points);
                let curve = chain_curve(&chain_points, tol)?;
                let edge = Edge::with_vertices(curve, start, end);
                built.insert((keys[0], keys[1]), (edge.clone(), group));
                OrientedEdge::new(edge, true)
            }
        };
        chains.push(Chain {
            group,
            from: keys[0],
            to: keys[n],
            edge,
            points: chain_points,
        });
        Ok(())
    };

    for i in 0..half_edges.len() {
        if !used[i] && corners.contains(&half_edges[i].from) {
            let run = walk(i, &used);
            emit(run, &mut used)?;
        }
    }
    // What is left are closed loops without corners; each starts at its
    // smallest key so both sides of a seam agree on where the edge begins.
    for i in 0..half_edges.len() {
        if used[i] {
            continue;
        }
        let mut run = walk(i, &used);
        let first = run
            .iter()
            .enumerate()
            .min_by_key(|&(_, &h)| half_edges[h].from)
            .map_or(0, |(pos, _)| pos);
        run.rotate_left(first);
        emit(run, &mut used)?;
    }
    Ok((chains, adjacency))
}

fn vertex_for(
    vertices: &mut HashMap<VertexKey, Vertex>,
    key: VertexKey,
    points: &SlotMap<VertexKey, Point3>,
) -> Vertex {
    vertices
        .entry(key)
        .or_insert_with(|| Vertex::at(points[key]))
        .clone()
}

/// A straight segment when every point is on the chord, else a polyline.
fn chain_curve(points: &[Point3], tol: f64) -> Result<TrimmedCurve> {
    let (a, b) = (points[0], points[points.len() - 1]);
    let straight = (a - b).norm() > tol
        && points[1..points.len() - 1]
            .iter()
            .all(|p| point_segment_distance(p, &a, &b).0 <= tol);
    if straight {
        TrimmedCurve::segment(&a, &b)
    } else {
        TrimmedCurve::polyline(points.to_vec())
    }
}

/// Closes the chains of group `g` into wires, the largest loop first.
fn group_wires(g: usize, chains: &[Chain]) -> Result<Vec<Wire>> {
    let mine: Vec<usize> = (0..chains.len()).filter(|&c| chains[c].group == g).collect();
    let mut starting: HashMap<VertexKey, Vec<usize>> = HashMap::new();
    for &c in &mine {
        starting.entry(chains[c].from).or_default().push(c);
    }
    let mut used: HashSet<usize> = HashSet::new();
    let mut loops: Vec<(f64, Wire)> = Vec::new();
    for &first in &mine {
        if used.contains(&first) {
            continue;
        }
        used.insert(first);
        let mut edges = vec![chains[first].edge.clone()];
        let mut outline: Vec<Point3> = chains[first].points[..chains[first].points.len() - 1].to_vec();
        let mut at = chains[first].to;
        while at != chains[first].from {
            let next = starting
                .get(&at)
                .and_then(|c| c.iter().copied().find(|c| !used.contains(c)))
                .ok_or_else(|| {
                    SolidkitError::BooleanOpFailure("face boundary does not close".into())
                })?;
            used.insert(next);
            edges.push(chains[next].edge.clone());
            outline.extend_from_slice(&chains[next].points[..chains[next].points.len() - 1]);
            at = chains[next].to;
        }
        loops.push((area_vector(&outline).norm(), Wire::from_edges(edges)));
    }
    loops.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(loops.into_iter().map(|(_, w)| w).collect())
}

fn fan(keys: &[VertexKey], points: &SlotMap<VertexKey, Point3>) -> Vec<[Point3; 3]> {
    let p0 = points[keys[0]];
    keys.windows(2)
        .skip(1)
        .map(|w| [p0, points[w[0]], points[w[1]]])
        .collect()
}

/// Signed volume of the cone from the origin over one polygon.
fn loop_volume(keys: &[VertexKey], points: &SlotMap<VertexKey, Point3>) -> f64 {
    fan(keys, points)
        .iter()
        .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
        .sum()
}

/// Ray directions chosen off every axis and diagonal.
const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [0.577_215_664_9, 0.618_033_988_7, 0.531_652_995_3],
    [-0.414_213_562_3, 0.732_050_807_6, 0.236_067_977_5],
    [0.301_029_995_7, -0.434_294_481_9, 0.693_147_180_6],
];

/// Parity test by ray casting; the majority over three rays decides.
fn point_inside(p: &Point3, triangles: &[[Point3; 3]]) -> bool {
    let votes = RAY_DIRECTIONS
        .iter()
        .filter(|d| {
            let dir = Vector3::new(d[0], d[1], d[2]).normalize();
            triangles.iter().filter(|t| ray_hits(p, &dir, t)).count() % 2 == 1
        })
        .count();
    votes >= 2
}

/// Moller-Trumbore ray/triangle test for hits strictly ahead of `origin`.
fn ray_hits(origin: &Point3, dir: &Vector3, [a, b, c]: &[Point3; 3]) -> bool {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < 1e-14 {
        return false;
    }
    let s = origin - a;
    let u = s.dot(&h) / det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = s.cross(&e1);
    let v = dir.dot(&q) / det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    e2.dot(&q) / det > 1e-12
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Plane;
    use crate::topology::ShapeType;

    fn quad(points: [[f64; 3]; 4], source: usize) -> Polygon {
        Polygon::new(
            points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect(),
            source,
        )
        .unwrap()
    }

    /// Outward quads of `[lo, hi]^3`, one source per side.
    fn cube(lo: f64, hi: f64) -> Vec<Polygon> {
        vec![
            quad([[lo, lo, lo], [lo, hi, lo], [hi, hi, lo], [hi, lo, lo]], 0),
            quad([[lo, lo, hi], [hi, lo, hi], [hi, hi, hi], [lo, hi, hi]], 1),
            quad([[lo, lo, lo], [hi, lo, lo], [hi, lo, hi], [lo, lo, hi]], 2),
            quad([[lo, hi, lo], [lo, hi, hi], [hi, hi, hi], [hi, hi, lo]], 3),
            quad([[lo, lo, lo], [lo, lo, hi], [lo, hi, hi], [lo, hi, lo]], 4),
            quad([[hi, lo, lo], [hi, hi, lo], [hi, hi, hi], [hi, lo, hi]], 5),
        ]
    }

    fn surfaces() -> Vec<Surface> {
        (0..6)
            .map(|_| Surface::Plane(Plane::from_normal(Point3::origin(), &Vector3::z())))
            .collect()
    }

    #[test]
    fn cube_quads_sew_into_a_closed_solid() {
        let surfaces = surfaces();
        let shape = Sew::new(cube(0.0, 1.0), &surfaces, 1e-6, 1.7).execute().unwrap();
        assert_eq!(shape.shape_type(), ShapeType::Solid);
        assert_eq!(shape.faces().count(), 6);
        assert_eq!(shape.edges().count(), 12);
        assert!(shape.is_closed());
        assert!((shape.mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn split_face_is_merged_and_t_junctions_resolved() {
        let surfaces = surfaces();
        let mut polygons = cube(0.0, 1.0);
        polygons.remove(1);
        polygons.push(quad([[0.0, 0.0, 1.0], [0.5, 0.0, 1.0], [0.5, 1.0, 1.0], [0.0, 1.0, 1.0]], 1));
        polygons.push(quad([[0.5, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.5, 1.0, 1.0]], 1));
        let shape = Sew::new(polygons, &surfaces, 1e-6, 1.7).execute().unwrap();
        assert_eq!(shape.faces().count(), 6);
        assert_eq!(shape.edges().count(), 12);
        assert!(shape.is_closed());
    }

    #[test]
    fn inner_cube_becomes_a_void() {
        let surfaces = surfaces();
        let mut polygons = cube(0.0, 3.0);
        for mut p in cube(1.0, 2.0) {
            p.flip();
            polygons.push(p);
        }
        let shape = Sew::new(polygons, &surfaces, 1e-6, 5.2).execute().unwrap();
        let solids = shape.solids();
        assert_eq!(solids.len(), 1);
        assert_eq!(solids[0].shells().len(), 2);
        assert!((shape.mass() - 26.0).abs() < 1e-9);
    }

    #[test]
    fn inside_out_soup_is_rejected() {
        let surfaces = surfaces();
        let polygons = cube(0.0, 1.0)
            .into_iter()
            .map(|mut p| {
                p.flip();
                p
            })
            .collect();
        assert!(matches!(
            Sew::new(polygons, &surfaces, 1e-6, 1.7).execute(),
            Err(SolidkitError::BooleanOpFailure(_))
        ));
    }

    #[test]
    fn ray_parity_classifies_points() {
        let keys_cube: Vec<[Point3; 3]> = cube(0.0, 1.0)
            .iter()
            .flat_map(|p| {
                let v = &p.vertices;
                [[v[0], v[1], v[2]], [v[0], v[2], v[3]]]
            })
            .collect();
        assert!(point_inside(&Point3::new(0.5, 0.5, 0.5), &keys_cube));
        assert!(!point_inside(&Point3::new(1.5, 0.5, 0.5), &keys_cube));
    }
}
