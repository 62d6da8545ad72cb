//! Short paths: flat-Earth attenuation with a curvature correction.
//!
//! Close to the transmitter the residue series converges too slowly to be of
//! use. There the attenuation is Sommerfeld's flat-Earth function of the
//! numerical distance _p_,
//!
//! ```text
//! F(p) = 1 - i √(πp) w(-√p)
//! ```
//!
//! with _w_ the [Faddeeva function](crate::formulae::faddeeva), plus the first
//! term of Wait's expansion in Earth curvature:
//!
//! ```text
//! C = [1 - i √(πp) - (1 + 2p) F(p)] / 4q³
//! ```
//!
//! For small _|p|_ the bracket is a difference of nearly equal numbers, so it is
//! summed as a power series in _√p_ instead. Antenna heights enter through the
//! first-order height gain _1 + ikhδ_ of each antenna.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::formulae::faddeeva;
use crate::geometry::DerivedGeometry;

/// Below this |p| the curvature correction is summed as a series.
const SERIES_LIMIT: f64 = 1.0;

/// Terms of the curvature series; |√p| < 1 so they decay factorially.
const SERIES_TERMS: usize = 40;

/// Normalised groundwave field over a flat Earth, corrected for curvature.
///
/// Cannot fail on validated input; a non-finite result is caught by the caller.
pub fn field(geometry: &DerivedGeometry) -> f64 {
    let i = Complex64::i();
    let k = geometry.wave_number;
    let delta = geometry.delta;

    let p = -i * k * geometry.distance * delta * delta / 2.0;
    let s = distance_root(p);

    let attenuation = sommerfeld(s);
    let correction = curvature_correction(p, s, attenuation, geometry);

    let gain = (1.0 + i * k * geometry.low_height * delta) * (1.0 + i * k * geometry.high_height * delta);

    tracing::trace!(p = %p, attenuation = %attenuation, correction = %correction, "flat earth");

    ((attenuation + correction) * gain).norm()
}

/// The square root of _p_ with _Im ≤ 0_, so that _-s_ stays in the upper
/// half-plane where the Faddeeva function is bounded.
///
/// Over lossless ground (ε = 1, horizontal) _p_ is negative real, and the
/// principal root lands on the wrong side of the cut.
fn distance_root(p: Complex64) -> Complex64 {
    let s = p.sqrt();
    if s.im > 0.0 {
        -s
    } else {
        s
    }
}

/// Sommerfeld's attenuation function, of _s = √p_.
fn sommerfeld(s: Complex64) -> Complex64 {
    1.0 - Complex64::i() * PI.sqrt() * s * faddeeva(-s)
}

fn curvature_correction(
    p: Complex64,
    s: Complex64,
    attenuation: Complex64,
    geometry: &DerivedGeometry,
) -> Complex64 {
    let i = Complex64::i();
    let q = geometry.q;

    if p.norm() >= SERIES_LIMIT {
        let bracket = 1.0 - i * PI.sqrt() * s - (1.0 + 2.0 * p) * attenuation;
        return bracket / (4.0 * q * q * q);
    }

    // s/q = √(ix) whatever q is, which also covers q = 0
    let ratio = if q.norm() > 0.0 {
        s / q
    } else {
        (i * geometry.x()).sqrt()
    };

    // aₙ = (-i)ⁿ / Γ(n/2 + 1), by aₙ = -2aₙ₋₂/n
    let mut a = [Complex64::new(0.0, 0.0); SERIES_TERMS];
    a[0] = Complex64::new(1.0, 0.0);
    a[1] = -i * 2.0 / PI.sqrt();
    for n in 2..SERIES_TERMS {
        a[n] = -2.0 * a[n - 2] / n as f64;
    }

    let mut sum = Complex64::new(0.0, 0.0);
    let mut power = Complex64::new(1.0, 0.0);
    for m in 3..=SERIES_TERMS {
        sum += (a[m - 1] + 2.0 * a[m - 3]) * power;
        power *= s;
    }

    i * PI.sqrt() / 4.0 * ratio * ratio * ratio * sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Polarisation, Request};

    fn geometry(distance: f64, frequency: f64, polarisation: Polarisation) -> DerivedGeometry {
        ground(distance, frequency, polarisation, 15.0, 0.005)
    }

    fn ground(
        distance: f64,
        frequency: f64,
        polarisation: Polarisation,
        permittivity: f64,
        conductivity: f64,
    ) -> DerivedGeometry {
        DerivedGeometry::new(&Request {
            tx_height: 0.0,
            rx_height: 0.0,
            frequency,
            power: 1000.0,
            surface_refractivity: 301.0,
            distance,
            permittivity,
            conductivity,
            polarisation,
        })
    }

    #[test]
    fn sommerfeld_limits() {
        // F(0) = 1, and F(p) ~ -1/2p for large p
        let at_zero = sommerfeld(Complex64::new(0.0, 0.0));
        assert!((at_zero - 1.0).norm() < 1e-14);

        let p = Complex64::from_polar(400.0, -PI / 4.0);
        let far = sommerfeld(p.sqrt());
        let asymptote = -1.0 / (2.0 * p);
        assert!((far - asymptote).norm() < 0.05 * asymptote.norm());
    }

    #[test]
    fn correction_branches_meet() {
        // straddle |p| = 1 and compare both forms of the correction
        let g = geometry(1.0, 0.5, Polarisation::Vertical);
        let i = Complex64::i();
        let p = -i * g.wave_number * g.distance * g.delta * g.delta / 2.0;
        let unit = p / p.norm();

        let correction = |p: Complex64| {
            let s = distance_root(p);
            curvature_correction(p, s, sommerfeld(s), &g)
        };
        let series = correction(unit * (1.0 - 1e-9));
        let closed = correction(unit * (1.0 + 1e-9));
        assert!((series - closed).norm() < 1e-6 * closed.norm(), "{} vs {}", series, closed);
    }

    #[test]
    fn vertical_is_stronger_than_horizontal() {
        let v = field(&geometry(20.0, 0.5, Polarisation::Vertical));
        let h = field(&geometry(20.0, 0.5, Polarisation::Horizontal));
        assert!(v > h);
        assert!(v <= 1.0 + 1e-9);
    }

    #[test]
    fn attenuation_grows_with_distance() {
        let near = field(&geometry(1.0, 1.0, Polarisation::Vertical));
        let far = field(&geometry(50.0, 1.0, Polarisation::Vertical));
        assert!(far < near);
    }

    #[test]
    fn root_keeps_faddeeva_argument_in_upper_half_plane() {
        let negative = distance_root(Complex64::new(-400.0, 0.0));
        assert!((negative - Complex64::new(0.0, -20.0)).norm() < 1e-12);

        let third_quadrant = distance_root(Complex64::new(-400.0, -1e-3));
        assert!(third_quadrant.im < 0.0);
        assert!((negative - third_quadrant).norm() < 1e-3);
    }

    #[test]
    fn lossless_dielectric_matches_its_limit() {
        // ε = 1 makes p negative real for horizontal polarisation
        for &(frequency, conductivity) in &[(1.0, 0.005), (0.01, 100.0), (0.1, 100.0)] {
            let exact = field(&ground(50.0, frequency, Polarisation::Horizontal, 1.0, conductivity));
            let nudged = field(&ground(
                50.0,
                frequency,
                Polarisation::Horizontal,
                1.0 + 1e-9,
                conductivity,
            ));

            assert!(exact.is_finite() && exact > 0.0, "f = {}: {}", frequency, exact);
            assert!((exact - nudged).abs() < 1e-3 * nudged, "{} vs {}", exact, nudged);
        }
    }
}
