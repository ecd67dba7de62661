//! Fast scalar math for per-frame camera work.
//!
//! `cos`/`sin`/`tan` are a parabolic approximation with one refinement step:
//! bounded error (see [`COS_TOLERANCE`]), no table, no libm. They are not
//! IEEE accurate and `tan` is unguarded near odd multiples of π/2.
//!
//! The f32/f64 promotion points in `cos` are part of the result; keep them
//! where they are.

use core::f64::consts::{FRAC_PI_2, PI};

/// Largest absolute error of [`cos`]/[`sin`] over `[-2π, 2π]`.
pub const COS_TOLERANCE: f32 = 0.002;

/// 2^52: at or above this magnitude every f64 is already an integer.
const TOINT: f64 = 4503599627370496.0;

/// Round toward negative infinity by forcing the FPU's round-to-nearest at
/// the 2^52 boundary and correcting by at most one.
pub fn floor(x: f64) -> f64 {
    let bits = x.to_bits();
    let e = ((bits >> 52) & 0x7ff) as i32;
    let negative = bits >> 63 != 0;

    if e >= 0x3ff + 52 || x == 0.0 {
        return x;
    }
    let y = if negative {
        x - TOINT + TOINT - x
    } else {
        x + TOINT - TOINT - x
    };
    // |x| < 1
    if e <= 0x3ff - 1 {
        return if negative { -1.0 } else { 0.0 };
    }
    if y > 0.0 {
        x + y - 1.0
    } else {
        x + y
    }
}

#[inline]
pub fn abs(a: f32) -> f32 {
    if a > 0.0 {
        a
    } else {
        -a
    }
}

/// Floor of log2 for positive `n`; -1 for zero.
#[inline]
pub fn ilog2(n: u32) -> i32 {
    31 - n.leading_zeros() as i32
}

pub fn cos(x: f32) -> f32 {
    let tp = (1.0 / (2.0 * PI)) as f32;
    let mut x = x * tp;
    // Range-reduce to [-0.5, 0.5) turns with cos(0) at -0.25.
    x = (x as f64 - (0.25 + floor(x as f64 + 0.25) as f32 as f64)) as f32;
    x = (x as f64 * (16.0 * (abs(x) as f64 - 0.5))) as f32;
    x = (x as f64 + 0.225 * x as f64 * (abs(x) as f64 - 1.0)) as f32;
    x
}

pub fn sin(x: f32) -> f32 {
    cos((x as f64 - FRAC_PI_2) as f32)
}

pub fn tan(x: f32) -> f32 {
    sin(x) / cos(x)
}
