//! Gauss–Legendre quadrature used by the mass and area integrals.

/// Nodes of the 8-point rule on `[-1, 1]` (positive half).
const NODES: [f64; 4] = [
    0.183_434_642_495_649_8,
    0.525_532_409_916_329,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_3,
];

/// Weights matching [`NODES`].
const WEIGHTS: [f64; 4] = [
    0.362_683_783_378_362,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
];

/// Integrates `f` over `[a, b]` with one 8-point panel.
pub fn integrate<F: FnMut(f64) -> f64>(a: f64, b: f64, mut f: F) -> f64 {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    let mut sum = 0.0;
    for (x, w) in NODES.iter().zip(WEIGHTS.iter()) {
        sum += w * (f(mid - half * x) + f(mid + half * x));
    }
    sum * half
}

/// Integrates `f` piecewise between consecutive `breaks`.
pub fn integrate_panels<F: FnMut(f64) -> f64>(breaks: &[f64], mut f: F) -> f64 {
    breaks
        .windows(2)
        .map(|w| integrate(w[0], w[1], &mut f))
        .sum()
}

/// Double integral over the tensor product of two break sequences.
pub fn integrate_2d<F: FnMut(f64, f64) -> f64>(u_breaks: &[f64], v_breaks: &[f64], mut f: F) -> f64 {
    integrate_panels(u_breaks, |u| integrate_panels(v_breaks, |v| f(u, v)))
}

/// Splits `[a, b]` into `n` equal panels, returning `n + 1` breakpoints.
#[must_use]
pub fn uniform_breaks(a: f64, b: f64, n: usize) -> Vec<f64> {
    let n = n.max(1);
    #[allow(clippy::cast_precision_loss)]
    (0..=n).map(|i| a + (b - a) * i as f64 / n as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn exact_for_polynomials_up_to_degree_15() {
        let v = integrate(0.0, 2.0, |x| x.powi(15));
        assert_relative_eq!(v, 2f64.powi(16) / 16.0, max_relative = 1e-12);
    }

    #[test]
    fn trig_over_panels() {
        let v = integrate_panels(&uniform_breaks(0.0, PI, 4), f64::sin);
        assert_relative_eq!(v, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn double_integral_of_product() {
        let v = integrate_2d(&[0.0, 1.0], &[0.0, 3.0], |u, v| u * v);
        assert_relative_eq!(v, 0.5 * 4.5, epsilon = 1e-12);
    }
}
