//! Decimal fixed-point coordinate space, 10^6 units per display unit
//!
//! All physics state (positions, velocities, radii) lives in this space so
//! that the same spawn offset replays the same trajectory on every platform
//! and every run — the landing bin is a bet outcome, not a visual detail.
//! Only the render boundary converts back to `f32`.

/// Scaled scalar.
pub type Fx = i64;

/// Scaled units per display unit.
pub const SCALE: Fx = 1_000_000;

/// 1.0 in scaled space.
pub const FX_ONE: Fx = SCALE;

/// Convert a display-space value to scaled space (nearest scaled unit).
#[inline]
pub fn scale(v: f32) -> Fx {
    (v as f64 * SCALE as f64).round() as Fx
}

/// Convert back to display space. Precision is 1/SCALE plus the `f32`
/// rounding of the result itself.
#[inline]
pub fn unscale(x: Fx) -> f32 {
    (x as f64 / SCALE as f64) as f32
}

/// Whole display units, exactly.
#[inline]
pub fn from_int(n: i64) -> Fx {
    n * SCALE
}

/// Fixed-point multiply, widening through i128. Truncates toward zero.
#[inline]
pub fn fx_mul(a: Fx, b: Fx) -> Fx {
    ((a as i128 * b as i128) / SCALE as i128) as Fx
}

/// Fixed-point divide, widening through i128. Truncates toward zero.
#[inline]
pub fn fx_div(a: Fx, b: Fx) -> Fx {
    ((a as i128 * SCALE as i128) / b as i128) as Fx
}

/// `⌊√(dx² + dy²)⌋` in scaled units. Integer throughout, so two runs can
/// never disagree about a collision normal.
pub fn fx_hypot(dx: Fx, dy: Fx) -> Fx {
    let n = (dx as i128 * dx as i128 + dy as i128 * dy as i128) as u128;
    isqrt(n) as Fx
}

/// Newton integer square root, rounding down.
fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let mut x = 1u128 << (n.ilog2() / 2 + 1);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}
