//! The thin plate spline radial basis kernel.
//!
//! Both evaluation backends and the system assembler call the same
//! function here, so the kernel formula cannot diverge between them.

/// The kernel value for a squared distance: `U = r^2 * ln(r^2)`.
///
/// The `0 * ln(0)` singularity at `r2 == 0` is defined to be zero.
#[inline]
pub fn tps_kernel_r2(r2: f32) -> f32 {
    if r2 == 0.0 {
        0.0
    } else {
        r2 * r2.ln()
    }
}

/// The kernel value between two 2d points.
///
/// # Examples
///
/// ```
/// use tps_spline::kernel::tps_kernel;
///
/// assert_eq!(tps_kernel([3.0, 4.0], [3.0, 4.0]), 0.0);
/// ```
#[inline]
pub fn tps_kernel(p: [f32; 2], q: [f32; 2]) -> f32 {
    let dx = p[0] - q[0];
    let dy = p[1] - q[1];
    tps_kernel_r2(dx * dx + dy * dy)
}

/// Double precision rendition of the same formula, used by the system
/// assembler where the downstream SVD runs in f64.
#[inline]
pub fn tps_kernel_f64(p: [f64; 2], q: [f64; 2]) -> f64 {
    let dx = p[0] - q[0];
    let dy = p[1] - q[1];
    let r2 = dx * dx + dy * dy;
    if r2 == 0.0 {
        0.0
    } else {
        r2 * r2.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kernel_zero_at_coincident_points() {
        assert_eq!(tps_kernel([5.0, 5.0], [5.0, 5.0]), 0.0);
        assert_eq!(tps_kernel_r2(0.0), 0.0);
    }

    #[test]
    fn kernel_symmetry() {
        let pairs = [
            ([0.0, 0.0], [3.0, 4.0]),
            ([5.0, 5.0], [20.0, 20.0]),
            ([1.5, 2.5], [7.25, 0.75]),
        ];
        for (p, q) in pairs {
            assert_eq!(tps_kernel(p, q), tps_kernel(q, p));
        }
    }

    #[test]
    fn kernel_value() {
        // r2 = 25 -> U = 25 * ln(25)
        assert_relative_eq!(
            tps_kernel([0.0, 0.0], [3.0, 4.0]),
            25.0 * 25f32.ln(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn kernel_finite_for_tiny_distances() {
        // r2 * ln(r2) tends to 0 from below, never NaN
        let u = tps_kernel_r2(1e-30);
        assert!(u.is_finite());
        assert!(u <= 0.0);
    }
}
