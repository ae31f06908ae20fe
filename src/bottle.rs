//! The classic bottle: a filleted, hollowed body with a threaded neck.
//!
//! Exercises most of the toolkit end to end: wires from lines and arcs,
//! mirroring, extrusion, fillets, booleans, shelling, edges on surfaces and
//! lofting.

use std::f64::consts::PI;

use tracing::debug;

use crate::error::{Result, SolidkitError};
use crate::geometry::{
    CylindricalSurface, Direction, Direction2D, Ellipse2D, PlaneAxis, Point, Point2D, Surface,
    Transformation, TrimmedCurve2D, Vector,
};
use crate::operations::{CompoundBuilder, Loft};
use crate::topology::{Edge, Shape, Wire, WireSegment};

/// Builds the bottle as a compound of the hollow body and the thread.
///
/// # Errors
///
/// Returns [`SolidkitError::DegenerateGeometry`] if a dimension is not
/// positive, and propagates any failure of the modeling steps.
pub fn make_bottle(width: f64, height: f64, thickness: f64) -> Result<Shape> {
    if [width, height, thickness].iter().any(|d| *d <= 0.0 || !d.is_finite()) {
        return Err(SolidkitError::DegenerateGeometry(format!(
            "bottle dimensions {width} x {height} x {thickness} must be positive"
        )));
    }

    let body = profile(width, thickness)?
        .face()?
        .extrude(&Vector::new(0.0, 0.0, height))?;

    let mut fillet = body.fillet();
    for edge in body.edges() {
        fillet.add(thickness / 12.0, &edge);
    }
    let body = fillet.build()?;

    let neck_axis = Point::new(0.0, 0.0, height).plane_axis_with(&Direction::z());
    let neck_radius = thickness / 4.0;
    let neck_height = height / 10.0;
    let neck = Shape::cylinder(&neck_axis, neck_radius, neck_height)?;
    let body = body.fuse(&neck)?;

    let opening = body
        .faces()
        .filter_map(|f| f.surface().as_plane().ok().map(|p| (p.location().z(), f)))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, f)| f)
        .ok_or_else(|| SolidkitError::NullEntity("bottle has no planar face".into()))?;
    let body = body
        .shell()
        .faces_to_remove(&[opening])
        .offset(-thickness / 50.0)
        .tolerance(1e-3)
        .build()?;
    debug!(mass = body.mass(), "hollowed bottle body");

    let thread = threading(&neck_axis, neck_radius, neck_height)?;
    Ok(CompoundBuilder::new().add(&body).add(&thread).build())
}

/// Half of the cross-section mirrored into the closed outline.
fn profile(width: f64, thickness: f64) -> Result<Wire> {
    let p1 = Point::new(-width / 2.0, 0.0, 0.0);
    let p2 = Point::new(-width / 2.0, -thickness / 4.0, 0.0);
    let p3 = Point::new(0.0, -thickness / 2.0, 0.0);
    let p4 = Point::new(width / 2.0, -thickness / 4.0, 0.0);
    let p5 = Point::new(width / 2.0, 0.0, 0.0);

    let arc = Edge::arc_of_circle(&p2, &p3, &p4)?;
    let left = Edge::line(&p1, &p2)?;
    let right = Edge::line(&p4, &p5)?;
    let half = Wire::new(&[&left as &dyn WireSegment, &arc, &right])?;

    let mut mirror = Transformation::new();
    mirror.mirror(&Point::origin().axis_with(&Direction::x()));
    let other = mirror.apply(&half);
    Wire::new(&[&half as &dyn WireSegment, &other])
}

/// Solid thread lofted between two elliptic arcs wrapped around the neck.
fn threading(neck_axis: &PlaneAxis, neck_radius: f64, neck_height: f64) -> Result<Shape> {
    let inner = Surface::from(&CylindricalSurface::new(neck_axis, neck_radius * 0.99)?);
    let outer = Surface::from(&CylindricalSurface::new(neck_axis, neck_radius * 1.05)?);

    let axis = Point2D::new(2.0 * PI, neck_height / 2.0)
        .axis2d_with(&Direction2D::new(2.0 * PI, neck_height / 4.0)?);
    let major = 2.0 * PI;
    let minor = neck_height / 10.0;
    let wide = Ellipse2D::new(&axis, major, minor)?;
    let narrow = Ellipse2D::new(&axis, major, minor / 4.0)?;
    let chord = TrimmedCurve2D::line(&wide.value(0.0), &wide.value(PI))?;

    let station = |ellipse: &Ellipse2D, surface: &Surface| -> Result<Wire> {
        let arc = ellipse.curve().trim(0.0, PI)?;
        let arc = Edge::new_with_surface(&(&arc).into(), surface)?;
        let base = Edge::new_with_surface(&(&chord).into(), surface)?;
        Ok(Wire::new(&[&arc as &dyn WireSegment, &base])?.build_curves_3d())
    };
    let mut loft = Loft::new_solid();
    loft.add_wires(&[&station(&wide, &inner)?, &station(&narrow, &outer)?])
        .ensure_wire_compatibility(false);
    Ok(loft.build()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_closed_and_planar() {
        let wire = profile(50.0, 30.0).unwrap();
        assert!(wire.is_closed());
        assert_eq!(wire.edge_count(), 6);
        let face = wire.face().unwrap();
        assert!(face.surface().is_plane());
    }

    #[test]
    fn thread_is_a_closed_solid() {
        let axis = Point::new(0.0, 0.0, 70.0).plane_axis_with(&Direction::z());
        let thread = threading(&axis, 7.5, 7.0).unwrap();
        assert!(thread.is_closed());
        assert!(thread.mass() > 0.0);
    }

    #[test]
    fn rejects_flat_dimensions() {
        assert!(matches!(
            make_bottle(50.0, 0.0, 30.0),
            Err(SolidkitError::DegenerateGeometry(_))
        ));
    }
}
