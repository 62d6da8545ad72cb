//! Airy functions of complex argument.
//!
//! The groundwave residue series is written in terms of Fock's Airy function of
//! the second kind, _w₂(t) = √π (Bi(t) - i Ai(t))_, whose zeros sit along the
//! ray _arg t = -π/3_. Rather than evaluating Bi and Ai separately (and losing
//! everything to cancellation where one dominates), we use the rotation
//!
//! > _w₂(t) = 2√π e^(-iπ/6) Ai(t e^(-i2π/3))_
//!
//! so a single evaluation of Ai and Ai′ at a rotated argument is all we need.
//!
//! Values are returned exponentially scaled: an [`Airy`] holds mantissas and a
//! shared complex exponent, with the true value being `mantissa × exp(exponent)`.
//! Height-gain ratios can then be formed from mantissas and the exponents
//! folded into the propagation phase before anything overflows or underflows.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Ai(0).
const AI_ZERO: f64 = 0.355_028_053_887_817_239;

/// -Ai′(0).
const AI_PRIME_ZERO: f64 = 0.258_819_403_792_806_798;

/// Below this modulus the Maclaurin series is used, above it the asymptotic
/// expansions. At |z| = 6 the series still keeps about eight digits on the
/// positive real axis (its worst direction), and the expansions already beat
/// that everywhere.
const SERIES_RADIUS: f64 = 6.0;

/// Number of asymptotic coefficients kept. Optimal truncation stops well
/// before this for every argument past `SERIES_RADIUS`.
const ASYMPTOTIC_TERMS: usize = 40;

/// Hard cap on Maclaurin terms; |z| ≤ 6 settles in under forty.
const MACLAURIN_TERMS: usize = 120;

/// Relative size of a term at which summation stops.
const TERM_EPSILON: f64 = 1e-17;

/// An exponentially scaled Airy function value and its derivative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Airy {
    /// Scaled function value.
    pub value: Complex64,

    /// Scaled derivative.
    pub derivative: Complex64,

    /// Common exponent: the true value is `value × exp(exponent)`.
    pub exponent: Complex64,
}

impl Airy {
    /// The function value without scaling. May overflow.
    pub fn unscaled_value(&self) -> Complex64 {
        self.value * self.exponent.exp()
    }

    /// The derivative without scaling. May overflow.
    pub fn unscaled_derivative(&self) -> Complex64 {
        self.derivative * self.exponent.exp()
    }
}

/// Ai(z) and Ai′(z).
pub fn ai(z: Complex64) -> Airy {
    if z.norm() <= SERIES_RADIUS {
        maclaurin(z)
    } else if z.arg().abs() <= 2.0 * PI / 3.0 {
        exponential_expansion(z)
    } else {
        oscillatory_expansion(-z)
    }
}

/// Fock's _w₂(t)_ and _w₂′(t)_.
pub fn w2(t: Complex64) -> Airy {
    let rotation = Complex64::from_polar(1.0, -2.0 * PI / 3.0);
    let scale = 2.0 * PI.sqrt();

    let inner = ai(t * rotation);

    Airy {
        value: inner.value * Complex64::from_polar(scale, -PI / 6.0),
        derivative: inner.derivative * Complex64::from_polar(scale, -5.0 * PI / 6.0),
        exponent: inner.exponent,
    }
}

/// Ai = c₁f - c₂g with f and g the two power series solutions of y″ = zy.
///
/// See A&S 10.4.2 through 10.4.5.
fn maclaurin(z: Complex64) -> Airy {
    let z3 = z * z * z;

    // aₖz³ᵏ⁻¹ and bₖz³ᵏ: series terms with one power of z held back, so the
    // derivatives never divide by z
    let mut f_low = z * z / 6.0;
    let mut g_low = Complex64::new(1.0, 0.0);

    let mut f = Complex64::new(1.0, 0.0);
    let mut df = Complex64::new(0.0, 0.0);
    let mut g = Complex64::new(0.0, 0.0);
    let mut dg = Complex64::new(0.0, 0.0);

    for k in 0..MACLAURIN_TERMS {
        let kf = k as f64;
        let next = kf + 1.0;

        g += z * g_low;
        dg += (3.0 * kf + 1.0) * g_low;

        f += z * f_low;
        df += 3.0 * next * f_low;

        let settled = (z * f_low).norm() <= TERM_EPSILON * f.norm()
            && (z * g_low).norm() <= TERM_EPSILON * g.norm();

        if settled {
            break;
        }

        f_low *= z3 / ((3.0 * next + 2.0) * (3.0 * next + 3.0));
        g_low *= z3 / ((3.0 * kf + 3.0) * (3.0 * kf + 4.0));
    }

    Airy {
        value: AI_ZERO * f - AI_PRIME_ZERO * g,
        derivative: AI_ZERO * df - AI_PRIME_ZERO * dg,
        exponent: Complex64::new(0.0, 0.0),
    }
}

/// The uₖ and vₖ coefficients of the Airy asymptotic expansions.
///
/// _uₖ = (2k+1)(2k+3)…(6k-1) / (216ᵏ k!)_ and _vₖ = -uₖ (6k+1)/(6k-1)_.
/// See DLMF 9.7.2.
fn expansion_coefficients() -> ([f64; ASYMPTOTIC_TERMS], [f64; ASYMPTOTIC_TERMS]) {
    let mut u = [0.0; ASYMPTOTIC_TERMS];
    let mut v = [0.0; ASYMPTOTIC_TERMS];
    u[0] = 1.0;
    v[0] = 1.0;

    for k in 1..ASYMPTOTIC_TERMS {
        let kf = k as f64;
        u[k] = u[k - 1] * (6.0 * kf - 5.0) * (6.0 * kf - 3.0) * (6.0 * kf - 1.0)
            / ((2.0 * kf - 1.0) * 216.0 * kf);
        v[k] = -u[k] * (6.0 * kf + 1.0) / (6.0 * kf - 1.0);
    }

    (u, v)
}

/// Sums `Σ sign·c[k]/ζᵏ` over every `step`-th coefficient starting at `start`,
/// with alternating signs, stopping at the smallest term.
fn truncated_sum(coefficients: &[f64], zeta: Complex64, start: usize, step: usize) -> Complex64 {
    let inverse = zeta.inv();
    let mut sum = Complex64::new(0.0, 0.0);
    let mut previous = f64::INFINITY;
    let mut sign = 1.0;

    for k in (start..coefficients.len()).step_by(step) {
        let term = sign * coefficients[k] * inverse.powu(k as u32);
        let size = term.norm();

        if size > previous {
            break;
        }

        sum += term;
        previous = size;
        sign = -sign;

        if size <= TERM_EPSILON * sum.norm() {
            break;
        }
    }

    sum
}

/// DLMF 9.7.5 and 9.7.6, valid for |arg z| < π but used only up to 2π/3.
fn exponential_expansion(z: Complex64) -> Airy {
    let (u, v) = expansion_coefficients();
    let zeta = 2.0 / 3.0 * z.powf(1.5);
    let quarter = z.powf(0.25);
    let norm = 2.0 * PI.sqrt();

    Airy {
        value: truncated_sum(&u, zeta, 0, 1) / (norm * quarter),
        derivative: -quarter * truncated_sum(&v, zeta, 0, 1) / norm,
        exponent: -zeta,
    }
}

/// DLMF 9.7.9 and 9.7.10: Ai(-w) and Ai′(-w) for |arg w| < π/3.
fn oscillatory_expansion(w: Complex64) -> Airy {
    let (u, v) = expansion_coefficients();
    let zeta = 2.0 / 3.0 * w.powf(1.5);
    let quarter = w.powf(0.25);
    let i = Complex64::new(0.0, 1.0);

    // cos and sin of ζ - π/4 grow like e^|Im ζ|; factor that growth out
    let exponent = if zeta.im >= 0.0 { -i * zeta } else { i * zeta };
    let phase = zeta - PI / 4.0;
    let plus = (i * phase - exponent).exp();
    let minus = (-i * phase - exponent).exp();
    let cos = (plus + minus) / 2.0;
    let sin = (plus - minus) / (2.0 * i);

    let p = truncated_sum(&u, zeta, 0, 2);
    let q = truncated_sum(&u, zeta, 1, 2);
    let r = truncated_sum(&v, zeta, 0, 2);
    let s = truncated_sum(&v, zeta, 1, 2);

    let norm = PI.sqrt();

    Airy {
        value: (cos * p + sin * q) / (norm * quarter),
        derivative: quarter * (sin * r - cos * s) / norm,
        exponent,
    }
}
