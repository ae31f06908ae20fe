use crate::math::polygon::newell_normal;
use crate::math::{lerp, Point3, Vector3};

/// Oriented plane `normal · x = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlaneEq {
    pub(crate) normal: Vector3,
    pub(crate) w: f64,
}

impl PlaneEq {
    pub(crate) fn through(points: &[Point3]) -> Option<Self> {
        let normal = newell_normal(points)?;
        Some(Self {
            normal,
            w: normal.dot(&points[0].coords),
        })
    }

    pub(crate) fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    pub(crate) fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }
}

/// A convex planar polygon, counter-clockwise around its plane normal,
/// tagged with the face it was cut from.
#[derive(Debug, Clone)]
pub(crate) struct Polygon {
    pub(crate) vertices: Vec<Point3>,
    pub(crate) plane: PlaneEq,
    pub(crate) source: usize,
}

impl Polygon {
    pub(crate) fn new(vertices: Vec<Point3>, source: usize) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = PlaneEq::through(&vertices)?;
        Some(Self {
            vertices,
            plane,
            source,
        })
    }

    pub(crate) fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Where the pieces of a split polygon go.
pub(crate) struct Split<'a> {
    pub(crate) coplanar_front: &'a mut Vec<Polygon>,
    pub(crate) coplanar_back: &'a mut Vec<Polygon>,
    pub(crate) front: &'a mut Vec<Polygon>,
    pub(crate) back: &'a mut Vec<Polygon>,
}

/// Splits `polygon` by `plane`.
///
/// Coplanar polygons go to the coplanar list matching their facing; spanning
/// ones are cut in two along the plane.
pub(crate) fn split_polygon(plane: &PlaneEq, polygon: Polygon, eps: f64, out: &mut Split<'_>) {
    let mut kind = COPLANAR;
    let types: Vec<u8> = polygon
        .vertices
        .iter()
        .map(|v| {
            let t = plane.distance(v);
            let ty = if t < -eps {
                BACK
            } else if t > eps {
                FRONT
            } else {
                COPLANAR
            };
            kind |= ty;
            ty
        })
        .collect();

    match kind {
        COPLANAR => {
            if plane.normal.dot(&polygon.plane.normal) > 0.0 {
                out.coplanar_front.push(polygon);
            } else {
                out.coplanar_back.push(polygon);
            }
        }
        FRONT => out.front.push(polygon),
        BACK => out.back.push(polygon),
        _ => {
            let n = polygon.vertices.len();
            let mut f = Vec::with_capacity(n + 1);
            let mut b = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if (ti | tj) == SPANNING {
                    let t = (plane.w - plane.normal.dot(&vi.coords))
                        / plane.normal.dot(&(vj - vi));
                    let v = lerp(&vi, &vj, t);
                    f.push(v);
                    b.push(v);
                }
            }
            if f.len() >= 3 {
                out.front.push(Polygon {
                    vertices: f,
                    plane: polygon.plane,
                    source: polygon.source,
                });
            }
            if b.len() >= 3 {
                out.back.push(Polygon {
                    vertices: b,
                    plane: polygon.plane,
                    source: polygon.source,
                });
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon::area_vector;

    fn square() -> Polygon {
        Polygon::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            7,
        )
        .unwrap()
    }

    #[test]
    fn spanning_polygon_is_cut_in_two() {
        let plane = PlaneEq {
            normal: Vector3::x(),
            w: 0.5,
        };
        let (mut cf, mut cb, mut f, mut b) = (vec![], vec![], vec![], vec![]);
        split_polygon(
            &plane,
            square(),
            1e-9,
            &mut Split {
                coplanar_front: &mut cf,
                coplanar_back: &mut cb,
                front: &mut f,
                back: &mut b,
            },
        );
        assert_eq!((f.len(), b.len()), (1, 1));
        assert!((area_vector(&f[0].vertices).z - 3.0).abs() < 1e-12);
        assert!((area_vector(&b[0].vertices).z - 1.0).abs() < 1e-12);
        assert_eq!(f[0].source, 7);
    }

    #[test]
    fn coplanar_polygon_sorts_by_facing() {
        let plane = PlaneEq {
            normal: -Vector3::z(),
            w: 0.0,
        };
        let (mut cf, mut cb, mut f, mut b) = (vec![], vec![], vec![], vec![]);
        split_polygon(
            &plane,
            square(),
            1e-9,
            &mut Split {
                coplanar_front: &mut cf,
                coplanar_back: &mut cb,
                front: &mut f,
                back: &mut b,
            },
        );
        assert_eq!(cb.len(), 1);
        assert!(cf.is_empty() && f.is_empty() && b.is_empty());
    }
}
