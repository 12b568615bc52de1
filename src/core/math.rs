//! Angle helpers for pitch/roll derivation.

/// Radians to degrees.
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

/// Wrap an angle into [-180, 180] degrees with a single ±360 step.
///
/// Inputs produced by `90 - atan2(..)` or `atan2(..) - 90` never lie more
/// than one turn outside the range, so one step is enough.
///
/// # Example
/// ```
/// use samatal::core::math::wrap_degrees;
///
/// assert_eq!(wrap_degrees(190.0), -170.0);
/// assert_eq!(wrap_degrees(-190.0), 170.0);
/// assert_eq!(wrap_degrees(180.0), 180.0);
/// ```
#[inline]
pub fn wrap_degrees(angle_deg: f64) -> f64 {
    if angle_deg < -180.0 {
        angle_deg + 360.0
    } else if angle_deg > 180.0 {
        angle_deg - 360.0
    } else {
        angle_deg
    }
}

/// `atan2(y, x)` in degrees.
#[inline]
pub fn atan2_deg(y: f64, x: f64) -> f64 {
    y.atan2(x) * RAD_TO_DEG
}
