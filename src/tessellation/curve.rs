use std::collections::HashMap;

use rayon::prelude::*;

use crate::geometry::{CurveGeometry, TrimmedCurve};
use crate::math::{Point3, Vector3};
use crate::topology::{Edge, OrientedEdge, Wire};

use super::TessellationParams;

/// Upper bound on chords per edge.
const MAX_SEGMENTS: usize = 4096;

/// Probes used to estimate how much a general curve turns.
const TURN_PROBES: usize = 32;

/// Samples of an edge as `(s, point)`, `s` the edge's normalized parameter
/// running from 0 at the start vertex to 1 at the end vertex.
pub(crate) type EdgeSamples = Vec<(f64, Point3)>;

/// Chords needed for an arc of `radius` turning through `sweep`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn arc_segments(sweep: f64, radius: f64, params: &TessellationParams) -> usize {
    let sweep = sweep.abs();
    if sweep <= 1e-12 {
        return 1;
    }
    let by_angle = (sweep / params.angular_deflection).ceil();
    let by_chord = if radius > params.linear_deflection {
        let half = (1.0 - params.linear_deflection / radius).acos();
        (sweep / (2.0 * half)).ceil()
    } else {
        1.0
    };
    (by_angle.max(by_chord) as usize).clamp(1, MAX_SEGMENTS)
}

/// Total turning of the curve tangent over the trimmed range.
fn turning(curve: &TrimmedCurve) -> f64 {
    let mut total = 0.0;
    let mut prev: Option<Vector3> = None;
    for i in 0..=TURN_PROBES {
        #[allow(clippy::cast_precision_loss)]
        let s = i as f64 / TURN_PROBES as f64;
        let Some(d) = curve.derivative_normalized(s).try_normalize(1e-14) else {
            continue;
        };
        if let Some(p) = prev {
            total += p.dot(&d).clamp(-1.0, 1.0).acos();
        }
        prev = Some(d);
    }
    total
}

/// Normalized parameters at which to sample `curve`.
pub(crate) fn sample_parameters(curve: &TrimmedCurve, params: &TessellationParams) -> Vec<f64> {
    let uniform = |n: usize| -> Vec<f64> {
        #[allow(clippy::cast_precision_loss)]
        (0..=n).map(|i| i as f64 / n as f64).collect()
    };
    match curve.geometry.as_ref() {
        CurveGeometry::Line(_) => vec![0.0, 1.0],
        CurveGeometry::Polyline(_) => curve.normalized_breaks(),
        CurveGeometry::Circle(circle) => {
            let n = arc_segments(curve.last - curve.first, circle.radius(), params);
            uniform(if curve.is_closed() { n.max(3) } else { n })
        }
        CurveGeometry::OnSurface(_) => {
            let theta = turning(curve);
            if theta <= 1e-9 {
                return vec![0.0, 1.0];
            }
            let radius = curve.length() / theta;
            uniform(arc_segments(theta, radius, params))
        }
    }
}

/// Samples an edge, pinning the ends to the exact vertex positions.
pub(crate) fn sample_edge(edge: &Edge, params: &TessellationParams) -> EdgeSamples {
    let curve = &edge.0.curve;
    let params_s = sample_parameters(curve, params);
    let last = params_s.len() - 1;
    params_s
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let p = if i == 0 {
                edge.0.start.position()
            } else if i == last {
                edge.0.end.position()
            } else {
                curve.point_normalized(s)
            };
            (s, p)
        })
        .collect()
}

/// Edge samples keyed by edge identity.
#[derive(Debug, Default)]
pub(crate) struct EdgeCache {
    samples: HashMap<usize, EdgeSamples>,
    params: TessellationParams,
}

impl EdgeCache {
    pub(crate) fn build<I>(edges: I, params: &TessellationParams) -> Self
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut unique: HashMap<usize, Edge> = HashMap::new();
        for edge in edges {
            unique.entry(edge.key()).or_insert(edge);
        }
        let samples = unique
            .into_par_iter()
            .map(|(key, edge)| (key, sample_edge(&edge, params)))
            .collect();
        Self {
            samples,
            params: *params,
        }
    }

    /// Samples along `oe` as `(f, point)`, `f` the traversal fraction.
    pub(crate) fn oriented(&self, oe: &OrientedEdge) -> EdgeSamples {
        let samples = self
            .samples
            .get(&oe.edge.key())
            .cloned()
            .unwrap_or_else(|| sample_edge(&oe.edge, &self.params));
        if oe.forward {
            samples
        } else {
            samples.into_iter().rev().map(|(s, p)| (1.0 - s, p)).collect()
        }
    }
}

/// Closed polygon through the samples of a wire, without repeating the
/// first point.
pub(crate) fn wire_polygon(wire: &Wire, params: &TessellationParams) -> Vec<Point3> {
    let cache = EdgeCache {
        samples: HashMap::new(),
        params: *params,
    };
    loop_points(wire.oriented(), &cache)
}

/// Chains the oriented samples of a loop, dropping each edge's last point.
pub(crate) fn loop_points(edges: &[OrientedEdge], cache: &EdgeCache) -> Vec<Point3> {
    let mut points = Vec::new();
    for oe in edges {
        let samples = cache.oriented(oe);
        points.extend(samples[..samples.len() - 1].iter().map(|(_, p)| *p));
    }
    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn lines_are_single_chords() {
        let e = Edge::line(&Point::origin(), &Point::new(3.0, 0.0, 0.0)).unwrap();
        let s = sample_edge(&e, &TessellationParams::default());
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].1, Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn arcs_respect_chordal_deflection() {
        let e = Edge::arc_of_circle(
            &Point::new(10.0, 0.0, 0.0),
            &Point::new(0.0, 10.0, 0.0),
            &Point::new(-10.0, 0.0, 0.0),
        )
        .unwrap();
        let params = TessellationParams::default();
        let s = sample_edge(&e, &params);
        for w in s.windows(2) {
            let mid = (w[0].1.coords + w[1].1.coords) * 0.5;
            let sagitta = 10.0 - mid.norm();
            assert!(sagitta <= params.linear_deflection + 1e-12);
        }
    }

    #[test]
    fn reversed_edge_samples_run_backwards() {
        let e = Edge::line(&Point::origin(), &Point::new(1.0, 0.0, 0.0)).unwrap();
        let cache = EdgeCache::build([e.clone()], &TessellationParams::default());
        let back = cache.oriented(&OrientedEdge::new(e, false));
        assert_eq!(back[0], (0.0, Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(back[1].1, Point3::origin());
    }
}
