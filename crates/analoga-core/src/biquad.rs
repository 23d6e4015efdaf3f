//! Second-order IIR section and coefficient designers.
//!
//! Coefficients follow the RBJ Audio EQ Cookbook. Shelf and peak designers
//! take a *linear* gain factor (1.5 = +3.5 dB) rather than decibels, matching
//! how the console modes are specified.

use core::f32::consts::PI;
use libm::{cosf, sinf, sqrtf, tanf};

use crate::flush_denormal;

/// Raw coefficient set `(b0, b1, b2, a0, a1, a2)`, not yet normalized.
pub type BiquadCoefficients = (f32, f32, f32, f32, f32, f32);

/// Butterworth Q used by the pass filters.
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Direct Form I biquad.
///
/// ```text
/// y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] − a1·y[n-1] − a2·y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// A passthrough section.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Load coefficients, normalizing by `a0`. History is kept.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let inv = 1.0 / a0;
        self.b0 = b0 * inv;
        self.b1 = b1 * inv;
        self.b2 = b2 * inv;
        self.a1 = a1 * inv;
        self.a2 = a2 * inv;
    }

    /// Load a coefficient tuple from one of the designers below.
    pub fn set(&mut self, coeffs: BiquadCoefficients) {
        let (b0, b1, b2, a0, a1, a2) = coeffs;
        self.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = flush_denormal(output);
        output
    }

    /// Clear the history.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Bilinear-transform lowpass (`n = 1/tan(π·f/fs)` form).
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let n = 1.0 / tanf(PI * frequency / sample_rate);
    let n2 = n * n;
    let inv_q = 1.0 / q;
    let c1 = 1.0 / (1.0 + inv_q * n + n2);
    (
        c1,
        c1 * 2.0,
        c1,
        1.0,
        c1 * 2.0 * (1.0 - n2),
        c1 * (1.0 - inv_q * n + n2),
    )
}

/// Bilinear-transform highpass.
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let n = tanf(PI * frequency / sample_rate);
    let n2 = n * n;
    let inv_q = 1.0 / q;
    let c1 = 1.0 / (1.0 + inv_q * n + n2);
    (
        c1,
        c1 * -2.0,
        c1,
        1.0,
        c1 * 2.0 * (n2 - 1.0),
        c1 * (1.0 - inv_q * n + n2),
    )
}

/// Peaking bell with a linear gain factor at `frequency`.
pub fn peak_coefficients(frequency: f32, q: f32, gain: f32, sample_rate: f32) -> BiquadCoefficients {
    let a = sqrtf(gain.max(0.0));
    let omega = 2.0 * PI * frequency / sample_rate;
    let alpha = sinf(omega) / (2.0 * q);
    let c2 = -2.0 * cosf(omega);
    (
        1.0 + alpha * a,
        c2,
        1.0 - alpha * a,
        1.0 + alpha / a,
        c2,
        1.0 - alpha / a,
    )
}

/// Low shelf with a linear gain factor below `frequency`.
pub fn low_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain: f32,
    sample_rate: f32,
) -> BiquadCoefficients {
    let a = sqrtf(gain.max(0.0));
    let am1 = a - 1.0;
    let ap1 = a + 1.0;
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_o = cosf(omega);
    let beta = sinf(omega) * sqrtf(a) / q;
    let am1_cos = am1 * cos_o;
    (
        a * (ap1 - am1_cos + beta),
        a * 2.0 * (am1 - ap1 * cos_o),
        a * (ap1 - am1_cos - beta),
        ap1 + am1_cos + beta,
        -2.0 * (am1 + ap1 * cos_o),
        ap1 + am1_cos - beta,
    )
}

/// High shelf with a linear gain factor above `frequency`.
pub fn high_shelf_coefficients(
    frequency: f32,
    q: f32,
    gain: f32,
    sample_rate: f32,
) -> BiquadCoefficients {
    let a = sqrtf(gain.max(0.0));
    let am1 = a - 1.0;
    let ap1 = a + 1.0;
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_o = cosf(omega);
    let beta = sinf(omega) * sqrtf(a) / q;
    let am1_cos = am1 * cos_o;
    (
        a * (ap1 + am1_cos + beta),
        a * -2.0 * (am1 + ap1 * cos_o),
        a * (ap1 + am1_cos - beta),
        ap1 - am1_cos + beta,
        2.0 * (am1 - ap1 * cos_o),
        ap1 - am1_cos - beta,
    )
}
