//! Mathematical primitives for 2D localization.
//!
//! Two angle conventions are used throughout the crate:
//! - bearings are stored canonicalized to `[0, 2π)`
//! - differences between angles are signed and wrapped to `[-π, π]`

use std::f32::consts::{PI, TAU};

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use sthiti::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}

/// Wrap a bearing to [0, 2π).
///
/// `rem_euclid` can round up to exactly 2π for tiny negative inputs,
/// which is folded back to 0.
///
/// # Example
/// ```
/// use sthiti::core::math::wrap_bearing;
/// use std::f32::consts::{FRAC_PI_2, PI};
///
/// assert!((wrap_bearing(-FRAC_PI_2) - 1.5 * PI).abs() < 1e-6);
/// assert_eq!(wrap_bearing(0.0), 0.0);
/// ```
#[inline]
pub fn wrap_bearing(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Shortest angular difference from angle `a` to angle `b`.
///
/// Returns the signed angle you need to add to `a` to reach `b`,
/// taking the shortest path around the circle.
///
/// # Example
/// ```
/// use sthiti::core::math::angle_diff;
/// use std::f32::consts::PI;
///
/// // From 0 to π/2 is +π/2
/// assert!((angle_diff(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-6);
///
/// // 359° to 1° is +2°, not -358°
/// let diff = angle_diff(359f32.to_radians(), 1f32.to_radians());
/// assert!((diff - 2f32.to_radians()).abs() < 1e-5);
/// ```
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(b - a)
}

/// Circular mean of a set of angles, wrapped to [0, 2π).
///
/// Averages the unit vectors of the angles so that samples on both sides
/// of the 0/2π seam do not cancel out. Returns `None` for an empty input
/// or when the resultant vector vanishes (e.g. two opposite angles).
pub fn circular_mean<I>(angles: I) -> Option<f32>
where
    I: IntoIterator<Item = f32>,
{
    let mut sum_sin = 0.0f64;
    let mut sum_cos = 0.0f64;
    let mut count = 0usize;

    for angle in angles {
        let (s, c) = angle.sin_cos();
        sum_sin += s as f64;
        sum_cos += c as f64;
        count += 1;
    }

    let eps = 1e-6 * count as f64;
    if count == 0 || (sum_sin.abs() < eps && sum_cos.abs() < eps) {
        return None;
    }

    Some(wrap_bearing(sum_sin.atan2(sum_cos) as f32))
}

/// Zero-mean Gaussian probability density.
#[inline]
pub fn gaussian_density(x: f64, sigma: f64) -> f64 {
    let norm = 1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    norm * (-0.5 * (x * x) / (sigma * sigma)).exp()
}
