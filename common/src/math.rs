use std::f64::consts::PI;

/// Wraps an angle in radians into the range `[0, 2*PI)`.
pub fn wrap_2pi(angle: f64) -> f64 {
    angle - (angle / (2.0 * PI)).floor() * (2.0 * PI)
}

/// Computes the shortest distance between two angles in radians and returns the result in the
/// range [-PI,PI)
///
/// Source: https://stackoverflow.com/a/28037434
pub fn angle_diff(alpha: f64, beta: f64) -> f64 {
    let diff = (beta - alpha + PI) % (PI * 2.0) - PI;
    if diff < -PI {
        diff + 2.0 * PI
    } else {
        diff
    }
}
