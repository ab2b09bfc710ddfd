use std::f64::consts::PI;
use std::sync::OnceLock;

use argmin::core::{CostFunction, Executor};
use argmin::solver::brent::BrentRoot;

use crate::{datatypes::ForceDisplacementCurve, error::SpringError};

/// Mode 1 eigenvalue, N = (j+1) * pi for odd modes
pub const N1: f64 = 2.0 * PI;

/// Mode 3 eigenvalue
pub const N3: f64 = 4.0 * PI;

/// Paper-derived bistability threshold with the second mode constrained;
/// below this the second buckling mode limits the mechanism even though the
/// cubic still has real roots
pub const Q_BISTABLE: f64 = 2.31;

/// Q below which the cubic force-displacement relation has no real roots
pub fn q_real_root_threshold() -> f64 {
    2.0 / f64::sqrt(3.0)
}

/// Q parameter of a beam: initial offset over thickness
pub fn q_parameter(initial_offset: f64, thickness: f64) -> f64 {
    initial_offset / thickness
}

/// Whether a beam with this Q is bistable under the mode-2 constraint
pub fn is_bistable(q: f64) -> bool {
    q > Q_BISTABLE
}

/// The two nonzero roots of the cubic force-displacement relation,
/// r1,2 = 1.5 -/+ sqrt(0.25 - 4/(3 Q^2)); None when Q is below the
/// real-root discriminant threshold
pub fn equilibria(q: f64) -> Option<(f64, f64)> {
    let discriminant = 0.25 - 4.0 / (3.0 * q * q);
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_term = discriminant.sqrt();
    Some((1.5 - sqrt_term, 1.5 + sqrt_term))
}

/// First-kind (mode-1) normalized force at normalized displacement delta:
///
///   F1 = (3 pi^4 Q^2 / 2) * delta * (delta - r1) * (delta - r2)
///
/// Returns NaN below the real-root threshold. Out-of-domain physics is an
/// expected outcome, not an error; callers check for NaN explicitly.
pub fn f1(delta: f64, q: f64) -> f64 {
    match equilibria(q) {
        Some((r1, r2)) => {
            let coeff = 3.0 * PI.powi(4) * q * q / 2.0;
            coeff * delta * (delta - r1) * (delta - r2)
        }
        None => f64::NAN,
    }
}

/// Third-kind (mode-3 constrained) linear reference relation:
///
///   F3 = (N1^2 (N3^2 - N1^2) / 8) * (N3^2 / (N3^2 - N1^2) - delta)
pub fn f3(delta: f64) -> f64 {
    let coeff = N1 * N1 * (N3 * N3 - N1 * N1) / 8.0;
    let offset = N3 * N3 / (N3 * N3 - N1 * N1);
    coeff * (offset - delta)
}

/// Samples the cubic force-displacement relation. All-NaN below the
/// real-root threshold.
///
/// # Arguments
/// * `deltas` - Normalized displacement samples
/// * `q` - Beam Q parameter
///
/// # Returns
/// A compute-once, read-only ForceDisplacementCurve
pub fn force_displacement(deltas: &[f64], q: f64) -> ForceDisplacementCurve {
    ForceDisplacementCurve {
        q,
        delta: deltas.to_vec(),
        force: deltas.iter().map(|&d| f1(d, q)).collect(),
    }
}

/// Snap-through summary of a bistable curve: peak restoring force before
/// the forward snap and peak (negative) force of the reverse snap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchingForces {
    pub d_top: f64,
    pub f_top: f64,
    pub d_bot: f64,
    pub f_bot: f64,
}

impl SwitchingForces {
    /// Switching-OFF to switching-ON force magnitude ratio
    pub fn force_ratio(&self) -> f64 {
        self.f_bot.abs() / self.f_top
    }
}

/// Interior extrema of the cubic, solved from its derivative in closed
/// form; None when Q is below the real-root threshold
pub fn switching_forces(q: f64) -> Option<SwitchingForces> {
    let (r1, r2) = equilibria(q)?;

    // F1 = c * (d^3 - S d^2 + P d) with S = r1 + r2, P = r1 r2
    let s = r1 + r2;
    let p = r1 * r2;
    let root_term = f64::sqrt(s * s - 3.0 * p);

    let d_top = (s - root_term) / 3.0;
    let d_bot = (s + root_term) / 3.0;

    Some(SwitchingForces {
        d_top,
        f_top: f1(d_top, q),
        d_bot,
        f_bot: f1(d_bot, q),
    })
}

struct TanFixedPoint;

impl CostFunction for TanFixedPoint {
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(x.tan() - x)
    }
}

/// Solves tan(x) = x on the first bracket past pi with Brent's method
fn solve_tan_fixed_point() -> Result<f64, argmin::core::Error> {
    let solver = BrentRoot::new(PI + 0.1, 1.5 * PI - 0.1, 1e-11);

    let res = Executor::new(TanFixedPoint, solver)
        .configure(|state| state.max_iters(100))
        .run()?;

    match res.state().best_param {
        Some(x) => Ok(x),
        None => Err(argmin::core::Error::msg(
            "Brent produced no best parameter",
        )),
    }
}

/// Mode 2 eigenvalue N2 = 2x where tan(x) = x, solved once and cached
pub fn mode2_eigenvalue() -> f64 {
    static N2: OnceLock<f64> = OnceLock::new();

    *N2.get_or_init(|| match solve_tan_fixed_point() {
        Ok(x) => 2.0 * x,
        Err(err) => {
            println!(
                "warning [analytic]: Brent solve for tan(x)=x failed ({err}); using tabulated root"
            );
            2.0 * 4.493409457909064
        }
    })
}

/// Buckling mode shape sampled over normalized position X in [0, 1]
///
/// Odd modes (1, 3): W(X) = 1 - cos(N X)
/// Even mode (2):    W(X) = 1 - 2X - cos(N X) + 2 sin(N X) / N
///
/// # Arguments
/// * `xs` - Normalized positions
/// * `mode_index` - Buckling mode, 1 through 3
pub fn mode_shape(xs: &[f64], mode_index: usize) -> Result<Vec<f64>, SpringError> {
    let shape: Vec<f64> = match mode_index {
        1 => xs.iter().map(|&x| 1.0 - f64::cos(N1 * x)).collect(),
        2 => {
            let n2 = mode2_eigenvalue();
            xs.iter()
                .map(|&x| 1.0 - 2.0 * x - f64::cos(n2 * x) + 2.0 * f64::sin(n2 * x) / n2)
                .collect()
        }
        3 => xs.iter().map(|&x| 1.0 - f64::cos(N3 * x)).collect(),
        other => {
            return Err(SpringError::Geometry(format!(
                "mode_index must be 1, 2, or 3; got {}",
                other
            )))
        }
    };

    Ok(shape)
}

impl ForceDisplacementCurve {
    /// Displacements where the sampled force changes sign strictly between
    /// samples, linearly interpolated
    pub fn interior_zero_crossings(&self) -> Vec<f64> {
        let mut crossings = Vec::new();
        for i in 0..self.force.len().saturating_sub(1) {
            let f0 = self.force[i];
            let f1 = self.force[i + 1];
            if f0.is_nan() || f1.is_nan() {
                continue;
            }
            if f0 * f1 < 0.0 {
                let frac = f0.abs() / (f0.abs() + f1.abs());
                crossings.push(self.delta[i] + (self.delta[i + 1] - self.delta[i]) * frac);
            }
        }
        crossings
    }

    /// True when the whole curve is outside the modeled domain
    pub fn is_out_of_domain(&self) -> bool {
        self.force.iter().all(|f| f.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_samples(n: usize) -> Vec<f64> {
        (0..=n).map(|i| 2.0 * i as f64 / n as f64).collect()
    }

    #[test]
    fn bistable_curve_has_two_interior_crossings() {
        let curve = force_displacement(&delta_samples(400), 6.0);
        let crossings = curve.interior_zero_crossings();
        assert_eq!(crossings.len(), 2);

        let (r1, r2) = equilibria(6.0).unwrap();
        assert!((crossings[0] - r1).abs() < 0.01);
        assert!((crossings[1] - r2).abs() < 0.01);

        // Positive restoring force before the first crossing, negative well
        // between the crossings
        let before: Vec<f64> = curve
            .delta
            .iter()
            .zip(&curve.force)
            .filter(|(d, _)| **d > 0.0 && **d < crossings[0])
            .map(|(_, f)| *f)
            .collect();
        let between: Vec<f64> = curve
            .delta
            .iter()
            .zip(&curve.force)
            .filter(|(d, _)| **d > crossings[0] && **d < crossings[1])
            .map(|(_, f)| *f)
            .collect();

        assert!(before.iter().cloned().fold(f64::MIN, f64::max) > 0.0);
        assert!(between.iter().cloned().fold(f64::MAX, f64::min) < 0.0);
    }

    #[test]
    fn low_q_is_out_of_domain() {
        let curve = force_displacement(&delta_samples(100), 1.0);
        assert!(curve.is_out_of_domain());
        assert!(curve.interior_zero_crossings().is_empty());
    }

    #[test]
    fn equilibria_collapse_at_the_discriminant_threshold() {
        let q = q_real_root_threshold();
        let (r1, r2) = equilibria(q + 1e-9).unwrap();
        assert!((r1 - 1.5).abs() < 1e-3);
        assert!((r2 - 1.5).abs() < 1e-3);
        assert!(equilibria(q - 1e-6).is_none());
    }

    #[test]
    fn f3_reference_line_values() {
        // F3(0) = 8 pi^4, zero crossing at 4/3, slope -6 pi^4
        let pi4 = PI.powi(4);
        assert!((f3(0.0) - 8.0 * pi4).abs() < 1e-9);
        assert!(f3(4.0 / 3.0).abs() < 1e-9);
        assert!((f3(1.0) - f3(0.0) + 6.0 * pi4).abs() < 1e-9);
    }

    #[test]
    fn switching_forces_bracket_zero() {
        let snap = switching_forces(6.0).unwrap();
        assert!(snap.f_top > 0.0);
        assert!(snap.f_bot < 0.0);
        assert!(snap.d_top < snap.d_bot);
        let ratio = snap.force_ratio();
        assert!(ratio > 0.0 && ratio < 1.0);
        assert!(switching_forces(1.0).is_none());
    }

    #[test]
    fn mode2_eigenvalue_solves_the_fixed_point() {
        let n2 = mode2_eigenvalue();
        let x = n2 / 2.0;
        assert!((x.tan() - x).abs() < 1e-6);
        assert!((n2 / PI - 2.86).abs() < 0.01);
    }

    #[test]
    fn mode_shapes_satisfy_clamped_ends() {
        let xs = [0.0, 0.5, 1.0];

        let w1 = mode_shape(&xs, 1).unwrap();
        assert!(w1[0].abs() < 1e-12);
        assert!((w1[1] - 2.0).abs() < 1e-12);
        assert!(w1[2].abs() < 1e-12);

        let w2 = mode_shape(&xs, 2).unwrap();
        assert!(w2[0].abs() < 1e-12);
        assert!(w2[2].abs() < 1e-6);

        let w3 = mode_shape(&[0.25], 3).unwrap();
        assert!((w3[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_mode_index_is_rejected() {
        assert!(matches!(
            mode_shape(&[0.0], 5),
            Err(SpringError::Geometry(_))
        ));
    }

    #[test]
    fn default_spring_q_is_bistable() {
        let q = q_parameter(1.2, 0.5);
        assert!((q - 2.4).abs() < 1e-12);
        assert!(is_bistable(q));
        assert!(!is_bistable(q_parameter(0.2, 0.5)));
    }
}
