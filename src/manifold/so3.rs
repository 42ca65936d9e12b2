//! SO3 - Special Orthogonal Group in 3D
//!
//! This module implements the Special Orthogonal group SO(3), which represents
//! rotations in 3D space.
//!
//! SO(3) elements are represented using nalgebra's UnitQuaternion internally.
//! SO(3) tangent elements are axis-angle vectors in R³, where the direction gives
//! the axis of rotation and the magnitude gives the angle.
//!
//! # Numerical Conditioning
//!
//! `exp` and `log` are closed form. Each has one removable singularity in its
//! exact expression (θ = 0 for `exp`, ‖v‖ = 0 for `log`) that is replaced by a
//! Taylor expansion below [`SMALL_EPS`](crate::SMALL_EPS). `log` goes through
//! atan2, so it stays continuous across w = 0 and `exp(log(R))` reproduces `R`
//! near the half turn as well. `exp` accepts any finite ω without overflowing.

use crate::manifold::{LieGroup, ManifoldError, ManifoldResult, algebra};
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};
use std::{
    fmt,
    fmt::{Display, Formatter},
    ops::{Mul, MulAssign},
};

/// SO(3) group element representing rotations in 3D.
///
/// Internally represented using nalgebra's UnitQuaternion<f64>. The quaternion
/// is renormalized after construction and after every composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SO3 {
    /// Internal representation as a unit quaternion
    quaternion: UnitQuaternion<f64>,
}

impl Display for SO3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let q = self.quaternion.quaternion();
        write!(
            f,
            "SO3(quaternion: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            q.w, q.i, q.j, q.k
        )
    }
}

impl Default for SO3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl SO3 {
    /// Get the identity element of the group.
    pub fn identity() -> Self {
        SO3 {
            quaternion: UnitQuaternion::identity(),
        }
    }

    /// Create a new SO(3) element from a possibly unnormalized quaternion.
    ///
    /// The quaternion is scaled to unit length. Passing the zero quaternion is a
    /// precondition violation; use [`try_new`](Self::try_new) for unchecked input.
    ///
    /// # Arguments
    /// * `quaternion` - Quaternion representing the rotation
    pub fn new(quaternion: Quaternion<f64>) -> Self {
        debug_assert!(
            quaternion.norm() > 0.0,
            "SO3::new() requires a non-zero quaternion"
        );
        SO3 {
            quaternion: UnitQuaternion::new_normalize(quaternion),
        }
    }

    /// Create a new SO(3) element, rejecting quaternions that cannot be normalized.
    ///
    /// # Errors
    /// Returns [`ManifoldError::InvalidElement`] if the quaternion is zero or has
    /// non-finite coefficients.
    pub fn try_new(quaternion: Quaternion<f64>) -> ManifoldResult<Self> {
        if quaternion.coords.iter().any(|c| !c.is_finite()) {
            return Err(ManifoldError::InvalidElement(format!(
                "quaternion has non-finite coefficients: {:?}",
                quaternion.coords.as_slice()
            )));
        }

        let norm = quaternion.norm();
        if norm == 0.0 {
            return Err(ManifoldError::InvalidElement(
                "zero quaternion cannot be normalized".to_string(),
            ));
        }

        Ok(Self::new(quaternion))
    }

    /// Create a new SO(3) element from a unit quaternion.
    #[inline]
    pub fn from_unit_quaternion(quaternion: UnitQuaternion<f64>) -> Self {
        SO3 { quaternion }
    }

    /// Create SO(3) from quaternion coefficients in nalgebra convention `[w, x, y, z]`.
    ///
    /// # Arguments
    /// * `w` - w (real) component of quaternion
    /// * `x` - i component of quaternion
    /// * `y` - j component of quaternion
    /// * `z` - k component of quaternion
    pub fn from_quaternion_wxyz(w: f64, x: f64, y: f64, z: f64) -> Self {
        SO3::new(Quaternion::new(w, x, y, z))
    }

    /// Create SO(3) from axis-angle representation.
    ///
    /// The axis does not need to be normalized.
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Self {
        let norm = axis.norm();
        if norm < f64::EPSILON {
            return Self::identity();
        }
        Self::exp(&(axis * (angle / norm)))
    }

    /// Create SO(3) from a rotation matrix.
    ///
    /// A matrix that is not exactly orthonormal is projected onto the closest
    /// rotation.
    pub fn from_matrix(matrix: &Matrix3<f64>) -> Self {
        SO3 {
            quaternion: UnitQuaternion::from_matrix(matrix),
        }
    }

    /// Generate a random rotation (useful for testing and benchmarks).
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let omega = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        Self::exp(&(omega * std::f64::consts::PI))
    }

    /// Get the raw quaternion coefficients.
    pub fn quaternion(&self) -> Quaternion<f64> {
        *self.quaternion.quaternion()
    }

    /// Get the unit quaternion representation.
    pub fn unit_quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Get the x component of the quaternion.
    #[inline]
    pub fn x(&self) -> f64 {
        self.quaternion.i
    }

    /// Get the y component of the quaternion.
    #[inline]
    pub fn y(&self) -> f64 {
        self.quaternion.j
    }

    /// Get the z component of the quaternion.
    #[inline]
    pub fn z(&self) -> f64 {
        self.quaternion.k
    }

    /// Get the w component of the quaternion.
    #[inline]
    pub fn w(&self) -> f64 {
        self.quaternion.w
    }

    /// Get coefficients as array [w, x, y, z].
    #[inline]
    pub fn coeffs(&self) -> [f64; 4] {
        let q = self.quaternion.quaternion();
        [q.w, q.i, q.j, q.k]
    }

    /// Get the rotation matrix (3x3).
    ///
    /// The result satisfies RᵀR = I and det(R) = 1 up to rounding.
    pub fn matrix(&self) -> Matrix3<f64> {
        self.quaternion.to_rotation_matrix().into_inner()
    }

    /// SO3 composition.
    ///
    /// # Notes
    /// q₁ ∘ q₂ = q₁ q₂, renormalized to absorb drift over long chains.
    pub fn compose(&self, other: &SO3) -> SO3 {
        let mut quaternion = self.quaternion * other.quaternion;
        quaternion.renormalize();
        SO3 { quaternion }
    }

    /// SO3 inverse.
    ///
    /// # Notes
    /// R⁻¹ = Rᵀ, for quaternions: q⁻¹ = q*
    pub fn inverse(&self) -> SO3 {
        SO3 {
            quaternion: self.quaternion.conjugate(),
        }
    }

    /// Rotate a vector: R ⊙ v = q v q*.
    pub fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion.transform_vector(vector)
    }

    /// SO3 exponential map.
    ///
    /// # Notes
    /// # Equation 132: Exponential map for unit quaternions (S³)
    /// q = Exp(θu) = cos(θ/2) + u sin(θ/2) ∈ H
    ///
    pub fn exp(omega: &Vector3<f64>) -> SO3 {
        SO3 {
            quaternion: UnitQuaternion::new_normalize(algebra::exp_quaternion(omega)),
        }
    }

    /// SO3 logarithmic map.
    ///
    /// Returns the axis-angle vector with angle in [-π, π].
    pub fn log(&self) -> Vector3<f64> {
        self.log_and_theta().0
    }

    /// SO3 logarithmic map, also returning the signed rotation angle.
    ///
    /// # Notes
    /// # Equation 133: Logarithmic map for unit quaternions (S³)
    /// θu = Log(q) = (2 / ||v||) * v * arctan(||v|| / w) ∈ R³
    ///
    /// θ ∈ [-π, π] and the norm of the returned vector equals |θ|.
    pub fn log_and_theta(&self) -> (Vector3<f64>, f64) {
        algebra::log_and_theta(self.quaternion.quaternion())
    }

    /// Hat operator, see [`algebra::hat`].
    pub fn hat(omega: &Vector3<f64>) -> Matrix3<f64> {
        algebra::hat(omega)
    }

    /// Vee operator, see [`algebra::vee`].
    pub fn vee(omega_hat: &Matrix3<f64>) -> Vector3<f64> {
        algebra::vee(omega_hat)
    }

    /// Lie bracket, see [`algebra::lie_bracket`].
    pub fn lie_bracket(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        algebra::lie_bracket(a, b)
    }

    /// Derivative of the Lie bracket wrt its first argument.
    pub fn d_lie_bracket_ab_by_d_a(b: &Vector3<f64>) -> Matrix3<f64> {
        algebra::d_lie_bracket_ab_by_d_a(b)
    }

    /// Get the ith generator of so(3).
    pub fn generator(i: usize) -> Matrix3<f64> {
        algebra::generator(i)
    }

    /// Adjoint matrix. For SO(3) this is the rotation matrix itself.
    pub fn adjoint(&self) -> Matrix3<f64> {
        self.matrix()
    }

    /// Relative rotation self⁻¹ ∘ other.
    pub fn between(&self, other: &SO3) -> SO3 {
        self.inverse().compose(other)
    }

    /// Geodesic distance: the angle of the relative rotation between the two elements.
    pub fn distance(&self, other: &SO3) -> f64 {
        self.between(other).log_and_theta().1.abs()
    }

    /// Check if the element is approximately equal to another element.
    ///
    /// q and -q compare equal since they represent the same rotation.
    pub fn is_approx(&self, other: &SO3, tolerance: f64) -> bool {
        self.distance(other) < tolerance
    }

    /// Renormalize the internal quaternion.
    pub fn normalize(&mut self) {
        self.quaternion.renormalize();
    }

    /// Check if the quaternion is unit length within the tolerance.
    pub fn is_valid(&self, tolerance: f64) -> bool {
        (self.quaternion.norm() - 1.0).abs() < tolerance
    }
}

impl LieGroup for SO3 {
    type TangentVector = Vector3<f64>;
    type LieAlgebra = Matrix3<f64>;
    type AdjointMatrix = Matrix3<f64>;

    const DIM: usize = 3;
    const DOF: usize = 3;
    const REP_SIZE: usize = 4;

    fn identity() -> Self {
        SO3::identity()
    }

    fn inverse(&self) -> Self {
        SO3::inverse(self)
    }

    fn compose(&self, other: &Self) -> Self {
        SO3::compose(self, other)
    }

    fn exp(tangent: &Vector3<f64>) -> Self {
        SO3::exp(tangent)
    }

    fn log(&self) -> Vector3<f64> {
        SO3::log(self)
    }

    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        SO3::act(self, vector)
    }

    fn adjoint(&self) -> Matrix3<f64> {
        SO3::adjoint(self)
    }

    fn hat(tangent: &Vector3<f64>) -> Matrix3<f64> {
        algebra::hat(tangent)
    }

    fn vee(omega_hat: &Matrix3<f64>) -> Vector3<f64> {
        algebra::vee(omega_hat)
    }

    fn lie_bracket(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        algebra::lie_bracket(a, b)
    }
}

impl Mul for SO3 {
    type Output = SO3;

    fn mul(self, rhs: SO3) -> SO3 {
        self.compose(&rhs)
    }
}

impl Mul<&SO3> for &SO3 {
    type Output = SO3;

    fn mul(self, rhs: &SO3) -> SO3 {
        self.compose(rhs)
    }
}

impl MulAssign for SO3 {
    fn mul_assign(&mut self, rhs: SO3) {
        *self = self.compose(&rhs);
    }
}

impl Mul<Vector3<f64>> for SO3 {
    type Output = Vector3<f64>;

    fn mul(self, rhs: Vector3<f64>) -> Vector3<f64> {
        self.act(&rhs)
    }
}

impl Mul<&Vector3<f64>> for &SO3 {
    type Output = Vector3<f64>;

    fn mul(self, rhs: &Vector3<f64>) -> Vector3<f64> {
        self.act(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_so3_constructor_quat() {
        let so3 = SO3::new(Quaternion::identity());
        assert_eq!(0.0, so3.x());
        assert_eq!(0.0, so3.y());
        assert_eq!(0.0, so3.z());
        assert_eq!(1.0, so3.w());
    }

    #[test]
    fn test_so3_identity() {
        let so3 = SO3::identity();
        assert_eq!(so3, SO3::default());
        assert_eq!([1.0, 0.0, 0.0, 0.0], so3.coeffs());
    }

    #[test]
    fn test_so3_constructor_normalizes() {
        let so3 = SO3::from_quaternion_wxyz(0.4, 0.1, 0.2, 0.3);
        let normalized = Quaternion::new(0.4, 0.1, 0.2, 0.3).normalize();
        let coeffs = so3.coeffs();

        assert!((coeffs[0] - normalized.w).abs() < TOLERANCE);
        assert!((coeffs[1] - normalized.i).abs() < TOLERANCE);
        assert!((coeffs[2] - normalized.j).abs() < TOLERANCE);
        assert!((coeffs[3] - normalized.k).abs() < TOLERANCE);
        assert!(so3.is_valid(TOLERANCE));
    }

    #[test]
    fn test_so3_try_new_rejects_degenerate() {
        assert!(matches!(
            SO3::try_new(Quaternion::new(0.0, 0.0, 0.0, 0.0)),
            Err(ManifoldError::InvalidElement(_))
        ));
        assert!(matches!(
            SO3::try_new(Quaternion::new(f64::NAN, 0.0, 1.0, 0.0)),
            Err(ManifoldError::InvalidElement(_))
        ));
        assert!(SO3::try_new(Quaternion::new(2.0, 0.0, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_so3_rotation_matrix_orthonormal() {
        let so3 = SO3::exp(&Vector3::new(0.3, 0.5, 0.1));
        let rotation = so3.matrix();

        assert!((rotation.transpose() * rotation - Matrix3::identity()).norm() < TOLERANCE);
        assert!((rotation.determinant() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_so3_inverse() {
        let so3_inv = SO3::identity().inverse();
        assert_eq!([1.0, 0.0, 0.0, 0.0], so3_inv.coeffs());

        // inverse of random in quaternion form is conjugate
        let so3 = SO3::random();
        let so3_inv = so3.inverse();
        assert!((so3.x() + so3_inv.x()).abs() < TOLERANCE);
        assert!((so3.y() + so3_inv.y()).abs() < TOLERANCE);
        assert!((so3.z() + so3_inv.z()).abs() < TOLERANCE);
        assert!((so3.w() - so3_inv.w()).abs() < TOLERANCE);

        let product = so3.matrix() * so3_inv.matrix();
        assert!((product - Matrix3::identity()).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_compose() {
        let so3_1 = SO3::random();
        let so3_2 = SO3::random();
        let composed = so3_1.compose(&so3_2);
        assert!(composed.is_valid(TOLERANCE));
        assert!((composed.matrix() - so3_1.matrix() * so3_2.matrix()).norm() < 1e-10);

        let identity = SO3::identity();
        assert!(so3_1.compose(&identity).is_approx(&so3_1, 1e-10));
        assert!(identity.compose(&so3_1).is_approx(&so3_1, 1e-10));
    }

    #[test]
    fn test_so3_compose_associative() {
        let so3_1 = SO3::random();
        let so3_2 = SO3::random();
        let so3_3 = SO3::random();

        let left_assoc = (so3_1 * so3_2) * so3_3;
        let right_assoc = so3_1 * (so3_2 * so3_3);
        assert!((left_assoc.matrix() - right_assoc.matrix()).norm() < 1e-10);
    }

    #[test]
    fn test_so3_compose_not_commutative() {
        let rx = SO3::exp(&Vector3::new(FRAC_PI_2, 0.0, 0.0));
        let ry = SO3::exp(&Vector3::new(0.0, FRAC_PI_2, 0.0));
        assert!(!(rx * ry).is_approx(&(ry * rx), 1e-6));
    }

    #[test]
    fn test_so3_mul_assign() {
        let step = SO3::exp(&Vector3::new(0.0, 0.0, 0.1));
        let mut so3 = SO3::identity();
        for _ in 0..10 {
            so3 *= step;
        }
        assert!((so3.log() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-10);
    }

    #[test]
    fn test_so3_act() {
        let transformed = SO3::identity().act(&Vector3::new(1.0, 1.0, 1.0));
        assert!((transformed - Vector3::new(1.0, 1.0, 1.0)).norm() < TOLERANCE);

        let so3 = SO3::exp(&Vector3::new(0.2, 0.5, -1.0));
        let p = Vector3::new(1.0, 2.0, 4.0);
        assert!((so3 * p - so3.matrix() * p).norm() < TOLERANCE);
        assert!((&so3 * &p - so3.act(&p)).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_specific_rotations() {
        let so3_x = SO3::from_axis_angle(&Vector3::x(), FRAC_PI_2);
        let rotated = so3_x.act(&Vector3::y());
        assert!((rotated - Vector3::z()).norm() < TOLERANCE);

        let so3_z = SO3::from_axis_angle(&Vector3::new(0.0, 0.0, 2.0), FRAC_PI_2);
        let rotated = so3_z.act(&Vector3::x());
        assert!((rotated - Vector3::y()).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_exp_log_consistency() {
        let tangent = Vector3::new(0.1, 0.2, 0.3);
        let recovered = SO3::exp(&tangent).log();
        assert!((tangent - recovered).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_exp_of_negative_is_inverse() {
        let so3 = SO3::exp(&Vector3::new(0.1, 0.2, 0.3));
        let so3_neg = SO3::exp(&Vector3::new(-0.1, -0.2, -0.3));
        assert!(so3_neg.is_approx(&so3.inverse(), TOLERANCE));
    }

    #[test]
    fn test_so3_log_of_inverse_is_negative_log() {
        let so3 = SO3::random();
        let log = so3.log();
        let inv_log = so3.inverse().log();
        assert!((log + inv_log).norm() < 1e-10);
    }

    #[test]
    fn test_so3_log_and_theta_range() {
        let samples = [
            SO3::from_quaternion_wxyz(0.1e-11, 0.0, 1.0, 0.0),
            SO3::from_quaternion_wxyz(-1.0, 0.00001, 0.0, 0.0),
            SO3::exp(&Vector3::new(PI, 0.0, 0.0)),
            SO3::exp(&Vector3::new(0.0, 0.0, 0.00001)),
            SO3::exp(&Vector3::zeros()),
        ];

        for so3 in samples {
            let (omega, theta) = so3.log_and_theta();
            assert!(!theta.is_nan());
            assert!((-PI..=PI).contains(&theta));
            assert!((omega.norm() - theta.abs()).abs() < TOLERANCE);
            assert!((SO3::exp(&omega).matrix() - so3.matrix()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_so3_log_continuous_across_half_turn() {
        for w in [5e-11, -5e-11, 9e-11, -9e-11, 1e-9, -1e-9] {
            let so3 = SO3::from_quaternion_wxyz(w, 0.0, 1.0, 0.0);
            let (omega, theta) = so3.log_and_theta();

            assert!((-PI..=PI).contains(&theta));
            let residual = (SO3::exp(&omega).matrix() - so3.matrix()).norm();
            assert!(residual < TOLERANCE, "w = {w}: residual {residual:e}");
        }
    }

    #[test]
    fn test_so3_random_round_trip() {
        for _ in 0..1000 {
            let so3 = SO3::random();
            let (omega, theta) = so3.log_and_theta();

            assert!((-PI..=PI).contains(&theta));
            assert!((SO3::exp(&omega).matrix() - so3.matrix()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_so3_exp_huge_tangent() {
        for omega in [
            Vector3::new(1e200, 0.0, 0.0),
            Vector3::new(0.0, -1e300, 1e299),
            Vector3::new(1e308, 1e308, 1e308),
        ] {
            let so3 = SO3::exp(&omega);
            assert!(so3.coeffs().iter().all(|c| c.is_finite()));
            assert!(so3.is_valid(1e-10));

            let (log, theta) = so3.log_and_theta();
            assert!(log.iter().all(|c| c.is_finite()));
            assert!((-PI..=PI).contains(&theta));
        }
    }

    #[test]
    fn test_so3_small_angle_approximations() {
        let small_tangent = Vector3::new(1e-8, 2e-8, 3e-8);
        let recovered = SO3::exp(&small_tangent).log();
        assert!((small_tangent - recovered).norm() < TOLERANCE);
    }

    #[test]
    fn test_so3_from_matrix() {
        let so3 = SO3::exp(&Vector3::new(0.3, -0.5, 1.2));
        let rebuilt = SO3::from_matrix(&so3.matrix());
        assert!(rebuilt.is_approx(&so3, 1e-10));
    }

    #[test]
    fn test_so3_between() {
        let so3_1 = SO3::random();
        let so3_2 = SO3::random();
        let between = so3_1.between(&so3_2);

        let result = so3_1.compose(&between);
        assert!(result.distance(&so3_2) < 1e-10);
    }

    #[test]
    fn test_so3_distance() {
        let so3_1 = SO3::random();
        assert!(so3_1.distance(&so3_1) < TOLERANCE);

        let a = SO3::exp(&Vector3::new(0.0, 0.0, 0.5));
        let b = SO3::exp(&Vector3::new(0.0, 0.0, -0.25));
        assert!((a.distance(&b) - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_so3_adjoint() {
        let so3 = SO3::random();
        let adj = so3.adjoint();
        assert!((adj.determinant() - 1.0).abs() < 1e-10);

        // Ad(R) ω = vee(R [ω]ₓ Rᵀ)
        let omega = Vector3::new(0.3, -0.1, 0.7);
        let conjugated = so3.matrix() * SO3::hat(&omega) * so3.matrix().transpose();
        assert!((adj * omega - SO3::vee(&conjugated)).norm() < 1e-10);
    }

    #[test]
    fn test_so3_normalize() {
        let mut so3 = SO3::from_quaternion_wxyz(0.5, 0.5, 0.5, 0.5);
        so3.normalize();
        assert!(so3.is_valid(TOLERANCE));
    }

    #[test]
    fn test_so3_lie_group_trait() {
        fn round_trip<G: LieGroup>(g: &G) -> G {
            G::exp(&g.log())
        }

        assert_eq!(<SO3 as LieGroup>::DIM, 3);
        assert_eq!(<SO3 as LieGroup>::DOF, 3);
        assert_eq!(<SO3 as LieGroup>::REP_SIZE, 4);

        let so3 = SO3::exp(&Vector3::new(0.3, 0.5, 0.1));
        assert!(round_trip(&so3).is_approx(&so3, 1e-10));

        let other = SO3::exp(&Vector3::new(-0.2, 0.4, 1.1));
        let between = LieGroup::between(&so3, &other);
        assert!(between.is_approx(&so3.between(&other), TOLERANCE));
    }

    #[test]
    fn test_so3_display() {
        let display = format!("{}", SO3::identity());
        assert_eq!(
            display,
            "SO3(quaternion: [w: 1.0000, x: 0.0000, y: 0.0000, z: 0.0000])"
        );
    }
}
