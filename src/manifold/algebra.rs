//! Lie algebra so(3) operators
//!
//! Free functions acting on tangent vectors ω ∈ R³ and their skew-symmetric
//! matrix form [ω]ₓ ∈ so(3). The closed-form exponential and logarithm live here
//! as well, expressed directly on quaternions so that [`SO3`](super::so3::SO3)
//! only has to wrap the result.
//!
//! Both maps switch to a Taylor expansion when the relevant quantity drops below
//! [`SMALL_EPS`](crate::SMALL_EPS), which keeps every finite unit input NaN-free.

use nalgebra::{Matrix3, Quaternion, Vector3};

use crate::SMALL_EPS;

/// Hat operator: ω → [ω]ₓ.
///
/// # Notes
/// [ω]ₓ = [0 -ωz ωy; ωz 0 -ωx; -ωy ωx 0]
///
pub fn hat(omega: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -omega.z, omega.y, //
        omega.z, 0.0, -omega.x, //
        -omega.y, omega.x, 0.0,
    )
}

/// Vee operator: [ω]ₓ → ω.
///
/// Inverse of [`hat`]. Only the entries below are read, so the input is assumed
/// to be skew-symmetric.
pub fn vee(omega_hat: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(omega_hat[(2, 1)], omega_hat[(0, 2)], omega_hat[(1, 0)])
}

/// Lie bracket [a, b] = vee([a]ₓ[b]ₓ - [b]ₓ[a]ₓ).
///
/// For so(3) the commutator reduces to the cross product.
#[inline]
pub fn lie_bracket(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a.cross(b)
}

/// Derivative of [a, b] with respect to a.
///
/// [a, b] = a × b = -b × a = -[b]ₓ a
pub fn d_lie_bracket_ab_by_d_a(b: &Vector3<f64>) -> Matrix3<f64> {
    -hat(b)
}

/// Get the ith generator of the so(3) Lie algebra.
///
/// # Panics
/// Panics if `i` is not 0, 1 or 2.
pub fn generator(i: usize) -> Matrix3<f64> {
    assert!(i < 3, "SO(3) only has generators for indices 0, 1, 2");

    let mut e = Vector3::zeros();
    e[i] = 1.0;
    hat(&e)
}

/// Closed-form exponential map returning a unit quaternion.
///
/// # Notes
/// q = Exp(ω) = (cos(θ/2), sin(θ/2)/θ · ω), θ = ‖ω‖
///
/// θ is computed from ω scaled by its largest component, so it stays finite for
/// every finite ω. For θ < `SMALL_EPS` the imaginary factor uses
/// sin(θ/2)/θ ≈ 1/2 - θ²/48 + θ⁴/3840.
///
pub fn exp_quaternion(omega: &Vector3<f64>) -> Quaternion<f64> {
    let scale = omega.amax();
    if scale == 0.0 {
        return Quaternion::identity();
    }

    let scaled = omega / scale;
    let scaled_norm = scaled.norm();
    // θ/2 = (scale/2)·‖ω/scale‖ cannot overflow, θ itself can
    let half_theta = (0.5 * scale) * scaled_norm;
    let real_factor = half_theta.cos();

    if half_theta < 0.5 * SMALL_EPS {
        let theta_sq = 4.0 * half_theta * half_theta;
        let theta_po4 = theta_sq * theta_sq;
        let imag_factor = 0.5 - theta_sq / 48.0 + theta_po4 / 3840.0;
        Quaternion::from_parts(real_factor, omega * imag_factor)
    } else {
        let axis = scaled / scaled_norm;
        Quaternion::from_parts(real_factor, axis * half_theta.sin())
    }
}

/// Closed-form logarithm of a unit quaternion.
///
/// Returns the tangent vector together with the signed rotation angle θ. The
/// angle always lies in [-π, π] and the norm of the returned vector is |θ|.
///
/// # Notes
/// θ = sign(w) · 2·atan2(‖v‖, |w|), ω = θ / ‖v‖ · v
///
/// Taking |w| selects the representative with w ≥ 0 (q and -q are the same
/// rotation), which is what keeps θ inside [-π, π]; the sign of w is carried
/// into θ so that ω still reproduces q. atan2 has no singularity at w = 0, so
/// the only special case is ‖v‖ < `SMALL_EPS`, where
/// 2·atan(n/w)/n ≈ 2/w - (2/3)·n²/w³.
///
pub fn log_and_theta(quaternion: &Quaternion<f64>) -> (Vector3<f64>, f64) {
    let imag = quaternion.imag();
    let n = imag.norm();
    let w = quaternion.w;

    let two_atan_nbyw_by_n = if n < SMALL_EPS {
        // |w| ≈ 1 on this branch
        let w_cubed = w * w * w;
        2.0 / w - (2.0 / 3.0) * (n * n) / w_cubed
    } else {
        w.signum() * 2.0 * n.atan2(w.abs()) / n
    };

    let theta = two_atan_nbyw_by_n * n;
    (imag * two_atan_nbyw_by_n, theta)
}
