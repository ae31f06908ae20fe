use super::polygon::{split_polygon, PlaneEq, Polygon, Split};

type NodeId = usize;

#[derive(Debug, Default)]
struct Node {
    plane: Option<PlaneEq>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    polygons: Vec<Polygon>,
}

/// Binary space partition of a closed polygon soup.
///
/// Nodes live in an arena and every traversal runs on an explicit stack, so
/// deep trees from finely tessellated operands cannot overflow the call
/// stack. Polygon normals point out of the solid; the back half-space of
/// each plane is inside.
#[derive(Debug)]
pub(crate) struct Bsp {
    nodes: Vec<Node>,
    eps: f64,
}

impl Bsp {
    pub(crate) fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut bsp = Self {
            nodes: vec![Node::default()],
            eps,
        };
        bsp.build(polygons);
        bsp
    }

    /// Turns the solid inside out.
    pub(crate) fn invert(&mut self) {
        for node in &mut self.nodes {
            for p in &mut node.polygons {
                p.flip();
            }
            node.plane = node.plane.map(PlaneEq::flipped);
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// The parts of `polygons` outside this solid.
    pub(crate) fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut kept = Vec::new();
        let mut stack: Vec<(NodeId, Vec<Polygon>)> = vec![(0, polygons)];
        while let Some((id, polygons)) = stack.pop() {
            let node = &self.nodes[id];
            let Some(plane) = node.plane else {
                kept.extend(polygons);
                continue;
            };
            let (mut front, mut back) = (Vec::new(), Vec::new());
            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            for polygon in polygons {
                split_polygon(
                    &plane,
                    polygon,
                    self.eps,
                    &mut Split {
                        coplanar_front: &mut coplanar_front,
                        coplanar_back: &mut coplanar_back,
                        front: &mut front,
                        back: &mut back,
                    },
                );
            }
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
            match node.front {
                Some(child) => stack.push((child, front)),
                None => kept.extend(front),
            }
            // Behind a leaf plane is solid: those pieces are dropped.
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }
        kept
    }

    /// Removes every polygon of this tree that lies inside `other`.
    pub(crate) fn clip_to(&mut self, other: &Self) {
        for node in &mut self.nodes {
            let polygons = std::mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons);
        }
    }

    pub(crate) fn all_polygons(&self) -> Vec<Polygon> {
        self.nodes
            .iter()
            .flat_map(|n| n.polygons.iter().cloned())
            .collect()
    }

    /// Inserts polygons, growing the tree where they fall off a leaf.
    pub(crate) fn build(&mut self, polygons: Vec<Polygon>) {
        let mut stack: Vec<(NodeId, Vec<Polygon>)> = vec![(0, polygons)];
        while let Some((id, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }
            let plane = *self.nodes[id].plane.get_or_insert(polygons[0].plane);
            let (mut front, mut back, mut coplanar) = (Vec::new(), Vec::new(), Vec::new());
            let mut coplanar_back = Vec::new();
            for polygon in polygons {
                split_polygon(
                    &plane,
                    polygon,
                    self.eps,
                    &mut Split {
                        coplanar_front: &mut coplanar,
                        coplanar_back: &mut coplanar_back,
                        front: &mut front,
                        back: &mut back,
                    },
                );
            }
            coplanar.append(&mut coplanar_back);
            self.nodes[id].polygons.append(&mut coplanar);
            if !front.is_empty() {
                let child = self.child(id, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = self.child(id, false);
                stack.push((child, back));
            }
        }
    }

    fn child(&mut self, id: NodeId, front: bool) -> NodeId {
        let existing = if front {
            self.nodes[id].front
        } else {
            self.nodes[id].back
        };
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        if front {
            self.nodes[id].front = Some(child);
        } else {
            self.nodes[id].back = Some(child);
        }
        child
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{polygon::area_vector, Point3};

    /// Axis-aligned cube `[lo, hi]^3` with outward polygons.
    fn cube(lo: f64, hi: f64) -> Vec<Polygon> {
        let p = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        let faces = [
            [p(lo, lo, lo), p(lo, hi, lo), p(hi, hi, lo), p(hi, lo, lo)],
            [p(lo, lo, hi), p(hi, lo, hi), p(hi, hi, hi), p(lo, hi, hi)],
            [p(lo, lo, lo), p(hi, lo, lo), p(hi, lo, hi), p(lo, lo, hi)],
            [p(lo, hi, lo), p(lo, hi, hi), p(hi, hi, hi), p(hi, hi, lo)],
            [p(lo, lo, lo), p(lo, lo, hi), p(lo, hi, hi), p(lo, hi, lo)],
            [p(hi, lo, lo), p(hi, hi, lo), p(hi, hi, hi), p(hi, lo, hi)],
        ];
        faces
            .iter()
            .enumerate()
            .map(|(i, f)| Polygon::new(f.to_vec(), i).unwrap())
            .collect()
    }

    fn total_area(polygons: &[Polygon]) -> f64 {
        polygons.iter().map(|p| area_vector(&p.vertices).norm()).sum()
    }

    #[test]
    fn clipping_keeps_only_outside_parts() {
        let tree = Bsp::new(cube(0.0, 1.0), 1e-9);
        let clipped = tree.clip_polygons(cube(0.5, 1.5));
        // Three faces of the second cube are a quarter inside.
        assert!((total_area(&clipped) - (6.0 - 3.0 * 0.25)).abs() < 1e-9);
    }

    #[test]
    fn inverted_tree_keeps_inside_parts() {
        let mut tree = Bsp::new(cube(0.0, 1.0), 1e-9);
        tree.invert();
        let clipped = tree.clip_polygons(cube(0.5, 1.5));
        assert!((total_area(&clipped) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let mut polygons = Vec::new();
        for i in 0..5_000 {
            let z = f64::from(i) * 1e-3;
            polygons.push(
                Polygon::new(
                    vec![
                        Point3::new(0.0, 0.0, z),
                        Point3::new(1.0, 0.0, z),
                        Point3::new(0.0, 1.0, z),
                    ],
                    0,
                )
                .unwrap(),
            );
        }
        let tree = Bsp::new(polygons, 1e-9);
        assert_eq!(tree.all_polygons().len(), 5_000);
    }
}
