use crate::geometry::ParametricSurface;
use crate::math::polygon::area_vector;
use crate::math::quadrature::{integrate_2d, integrate_panels};
use crate::math::{Point3, Vector3};
use crate::topology::{Face, FaceRegion, OrientedEdge, Shape, Solid};

/// Computes the enclosed volume of every solid in a shape.
///
/// Uses the divergence theorem, `V = 1/3 ∮ (x - c) · n dA`, integrated face
/// by face: planar faces exactly from their boundary curves, patches with
/// Gauss–Legendre quadrature over the parameter rectangle, and faceted faces
/// exactly.
pub(crate) struct Volume {
    shape: Shape,
}

impl Volume {
    pub(crate) fn new(shape: &Shape) -> Self {
        Self {
            shape: shape.clone(),
        }
    }

    pub(crate) fn execute(&self) -> f64 {
        self.shape.solids().iter().map(solid_volume).sum()
    }
}

pub(crate) fn solid_volume(solid: &Solid) -> f64 {
    let Some(center) = solid
        .faces()
        .flat_map(Face::oriented_edges)
        .map(OrientedEdge::start_point)
        .next()
    else {
        return 0.0;
    };
    solid.faces().map(|f| face_flux(f, &center)).sum::<f64>() / 3.0
}

/// `∫∫ (x - c) · n dA` over one face, `n` the outward normal.
fn face_flux(face: &Face, c: &Point3) -> f64 {
    match &face.0.region {
        FaceRegion::Planar => {
            let Some(p0) = face.oriented_edges().next().map(OrientedEdge::start_point) else {
                return 0.0;
            };
            let area: Vector3 = face.oriented_edges().map(|oe| edge_area_moment(oe, c)).sum();
            (p0 - c).dot(&area)
        }
        FaceRegion::Patch { map, u, v, .. } => {
            let ub = map.u_breaks(u.0, u.1);
            let vb = map.v_breaks(v.0, v.1);
            let flux = integrate_2d(&ub, &vb, |s, t| {
                let (p, su, sv) = map.derivatives(s, t);
                (p - c).dot(&su.cross(&sv))
            });
            flux * face.sense()
        }
        FaceRegion::Faceted(polygons) => polygons
            .iter()
            .filter(|poly| !poly.is_empty())
            .map(|poly| (poly[0] - c).dot(&area_vector(poly)))
            .sum(),
    }
}

/// `1/2 ∫ (p - c) × dp` along one oriented edge.
fn edge_area_moment(oe: &OrientedEdge, c: &Point3) -> Vector3 {
    let mut breaks = oe.edge.0.curve.normalized_breaks();
    if !oe.forward {
        breaks = breaks.into_iter().rev().map(|s| 1.0 - s).collect();
    }
    let moment = |f: f64| (oe.point_at(f) - c).cross(&oe.tangent_at(f));
    let x = integrate_panels(&breaks, |f| moment(f).x);
    let y = integrate_panels(&breaks, |f| moment(f).y);
    let z = integrate_panels(&breaks, |f| moment(f).z);
    Vector3::new(x, y, z) * 0.5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Direction, Point, Vector};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn cylinder_volume_is_exact() {
        let axis = Point::origin().plane_axis_with(&Direction::z());
        let c = Shape::cylinder(&axis, 1.0, 2.0).unwrap();
        assert_relative_eq!(Volume::new(&c).execute(), 2.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn shapes_without_solids_have_no_volume() {
        let e = crate::topology::Edge::line(&Point::origin(), &Point::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(Shape::from(e).mass(), 0.0);
    }

    #[test]
    fn volume_ignores_position() {
        let near = Shape::cuboid(&Point::origin(), &Vector::new(1.0, 2.0, 3.0)).unwrap();
        let far = Shape::cuboid(&Point::new(1e4, -1e4, 5e3), &Vector::new(1.0, 2.0, 3.0)).unwrap();
        assert_relative_eq!(near.mass(), far.mass(), max_relative = 1e-9);
    }
}
