//! Decibel conversions and the Faddeeva function.
//!
//! The dB helpers turn the normalised field and the transmitter power into the
//! reported loss, field strength and received power. The Faddeeva function is
//! the only special function the flat-Earth solver needs.

use num_complex::Complex64;

/// 2/√π, the normalisation of the error function.
const TWO_OVER_SQRT_PI: f64 = 1.128_379_167_095_512_573_88;

/// Decibels of a power ratio.
pub fn db_power(ratio: f64) -> f64 {
    10.0 * ratio.log10()
}

/// Decibels of a field (amplitude) ratio.
pub fn db_field(ratio: f64) -> f64 {
    20.0 * ratio.log10()
}

/// Linear power ratio from decibels.
pub fn from_db_power(db: f64) -> f64 {
    10_f64.powf(db / 10.0)
}

/// The Faddeeva function _w(z) = e^(-z²) erfc(-iz)_.
///
/// This is the scaled complementary error function at complex argument, which
/// the flat-Earth attenuation function is written in terms of. The algorithm
/// is that of [Poppe and Wijers][TOMS680]: a power series near the origin, a
/// Gautschi continued fraction (with Taylor acceleration in the middle region)
/// everywhere else in the first quadrant, and the symmetry relations
/// _w(-z̄) = w̅(z)_ and _w(-z) = 2e^(-z²) - w(z)_ for the other three.
///
/// Accuracy is around 14 significant digits. In the lower half-plane the
/// result grows like _e^(-z²)_ and overflows to infinity for large |z|.
///
/// [TOMS680]: https://doi.org/10.1145/77626.77630
pub fn faddeeva(z: Complex64) -> Complex64 {
    let xabs = z.re.abs();
    let yabs = z.im.abs();
    let x = xabs / 6.3;
    let y = yabs / 4.4;

    let mut qrho = x * x + y * y;
    let mut xquad = xabs * xabs - yabs * yabs;
    let yquad = 2.0 * xabs * yabs;

    let near_origin = qrho < 0.085_264;

    // e^(-z²) for the first-quadrant image, kept for the reflection below
    let mut u2 = 0.0;
    let mut v2 = 0.0;

    let (mut u, mut v);

    if near_origin {
        // Power series, A&S 7.1.5, then multiplied through by e^(-z²).
        qrho = (1.0 - 0.85 * y) * qrho.sqrt();
        let n = (6.0 + 72.0 * qrho).round() as usize;
        let mut j = 2 * n + 1;
        let mut xsum = 1.0 / j as f64;
        let mut ysum = 0.0;

        for i in (1..=n).rev() {
            j -= 2;
            let xaux = (xsum * xquad - ysum * yquad) / i as f64;
            ysum = (xsum * yquad + ysum * xquad) / i as f64;
            xsum = xaux + 1.0 / j as f64;
        }

        let u1 = -TWO_OVER_SQRT_PI * (xsum * yabs + ysum * xabs) + 1.0;
        let v1 = TWO_OVER_SQRT_PI * (xsum * xabs - ysum * yabs);
        let daux = (-xquad).exp();
        u2 = daux * yquad.cos();
        v2 = -daux * yquad.sin();

        u = u1 * u2 - v1 * v2;
        v = u1 * v2 + v1 * u2;
    } else {
        let (h, kapn, nu) = if qrho > 1.0 {
            let rho = qrho.sqrt();
            (0.0, 0, (3.0 + 1442.0 / (26.0 * rho + 77.0)) as usize)
        } else {
            let rho = (1.0 - y) * (1.0 - qrho).sqrt();
            (
                1.88 * rho,
                (7.0 + 34.0 * rho).round() as usize,
                (16.0 + 26.0 * rho).round() as usize,
            )
        };

        let h2 = 2.0 * h;
        let accelerate = h > 0.0;
        let mut qlambda = if accelerate { h2.powi(kapn as i32) } else { 0.0 };

        let (mut rx, mut ry, mut sx, mut sy) = (0.0, 0.0, 0.0, 0.0);

        for n in (0..=nu).rev() {
            let np1 = (n + 1) as f64;
            let tx = yabs + h + np1 * rx;
            let ty = xabs - np1 * ry;
            let c = 0.5 / (tx * tx + ty * ty);
            rx = c * tx;
            ry = c * ty;

            if accelerate && n <= kapn {
                let tx = qlambda + sx;
                sx = rx * tx - ry * sy;
                sy = ry * tx + rx * sy;
                qlambda /= h2;
            }
        }

        if accelerate {
            u = TWO_OVER_SQRT_PI * sx;
            v = TWO_OVER_SQRT_PI * sy;
        } else {
            u = TWO_OVER_SQRT_PI * rx;
            v = TWO_OVER_SQRT_PI * ry;
        }

        if yabs == 0.0 {
            u = (-xabs * xabs).exp();
        }
    }

    if z.im < 0.0 {
        if near_origin {
            u2 *= 2.0;
            v2 *= 2.0;
        } else {
            xquad = -xquad;
            let w1 = 2.0 * xquad.exp();
            u2 = w1 * yquad.cos();
            v2 = -w1 * yquad.sin();
        }

        u = u2 - u;
        v = v2 - v;

        if z.re > 0.0 {
            v = -v;
        }
    } else if z.re < 0.0 {
        v = -v;
    }

    Complex64::new(u, v)
}
