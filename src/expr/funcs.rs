//! Math primitives behind the builtins that have no direct `f64` method.

/// Tolerance used by the `eps` constant and the gate functions.
pub const EPSILON: f64 = 1e-9;

/// Value returned by a closed gate. Far outside the audible window, so a
/// gated-off formula renders as a rest and plots off-screen.
pub const GATE_SENTINEL: f64 = -1.0e6;

pub fn step(edge: f64, x: f64) -> f64 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clamp that tolerates `min > max` (min wins) instead of panicking like
/// [`f64::clamp`].
pub fn clamp(x: f64, min: f64, max: f64) -> f64 {
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        // 0.0, -0.0 and NaN fall through unchanged
        x * 0.0
    }
}

/// Approximate `1/sqrt(x)`: magic-number seed plus one Newton-Raphson step.
pub fn inversesqrt(x: f64) -> f64 {
    const MAGIC: u64 = 0x5fe6_eb50_c7b5_37a9;
    let half = 0.5 * x;
    let y = f64::from_bits(MAGIC.wrapping_sub(x.to_bits() >> 1));
    y * (1.5 - half * y * y)
}

pub fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// Floored modulo: the result takes the sign of `y`.
pub fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// `v` while `x` has not passed `threshold`.
pub fn until(x: f64, v: f64, threshold: f64) -> f64 {
    if x <= threshold + EPSILON {
        v
    } else {
        GATE_SENTINEL
    }
}

/// `v` once `x` has reached `threshold`.
pub fn after(x: f64, v: f64, threshold: f64) -> f64 {
    if x >= threshold - EPSILON {
        v
    } else {
        GATE_SENTINEL
    }
}
