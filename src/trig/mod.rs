//! Degree-domain trigonometry
//!
//! The astronomical formulas in this crate are written in degrees, so this
//! module wraps the radian-based `std` functions with degree-in/degree-out
//! semantics. Inverse functions return degrees.

/// Sine of an angle given in degrees.
pub fn dsin(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle given in degrees.
pub fn dcos(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

/// Cotangent of an angle given in degrees.
///
/// `cot(x) = cos(x) / sin(x)`, which is genuinely undefined at multiples of
/// 180 degrees. The division is deliberately unguarded there; at exactly 0
/// degrees the IEEE result is infinite.
pub fn dcot(degrees: f64) -> f64 {
    let radians = degrees.to_radians();
    radians.cos() / radians.sin()
}

/// Arcsine, returning degrees.
pub fn dasin(value: f64) -> f64 {
    value.asin().to_degrees()
}

/// Arccosine, returning degrees.
pub fn dacos(value: f64) -> f64 {
    value.acos().to_degrees()
}

/// Two-argument arctangent of `y / x`, returning degrees in (-180, 180].
///
/// Unlike a plain arctangent this keeps track of the quadrant of the angle.
pub fn datan2(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Quadrant-correct inverse cotangent, returning degrees in [0, 180).
///
/// Computed through [`datan2`] so the result lands in the correct quadrant:
/// positive inputs map to (0, 90), negative inputs to (90, 180), and zero
/// maps to exactly 90. The Asr shadow formula relies on this full range to
/// distinguish the juristic shadow-length variants.
pub fn dacot(value: f64) -> f64 {
    if value == 0.0 {
        return 90.0;
    }

    let angle = datan2(1.0, value);
    // A negative raw angle belongs in the upper quadrant.
    if angle < 0.0 {
        angle + 180.0
    } else {
        angle
    }
}
