//! Manifold representations for rotations in 3D.
//!
//! This module provides the SO(3) Lie group together with the operators of its
//! Lie algebra so(3):
//!
//! Lie group M,° | size   | dim | X ∈ M  | Constraint | T_E M        | T_X M      | Exp(T)        | Comp. | Action
//! ------------- | ------ | --- | ------ | ---------- | ------------ | ---------- | ------------- | ----- | ------
//! 3-sphere      | S³,.   | 4   | q ∈ H  | q*q = 1    | θ/2 ∈ Hp     | θ ∈ R³     | q = exp(uθ/2) | q₁q₂  | qxq*
//! Rotation      | SO(3),.| 9   | R      | RᵀR = I    | [θ]x ∈ so(3) | [θ] ∈ R³   | R = exp([θ]x) | R₁R₂  | Rx
//!
//! SO(3) elements are stored as unit quaternions (the S³ double cover) and
//! exposed as rotation matrices on demand. Tangent vectors are plain
//! `Vector3<f64>` in axis-angle form.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::Vector3;
//! use so3_manifold::manifold::so3::SO3;
//!
//! let rotation = SO3::exp(&Vector3::new(0.2, 0.5, 0.0));
//! let (omega, theta) = rotation.log_and_theta();
//! assert!((omega - Vector3::new(0.2, 0.5, 0.0)).norm() < 1e-10);
//! assert!(theta.abs() <= std::f64::consts::PI);
//! ```

use nalgebra::Vector3;
use std::fmt::Debug;
use thiserror::Error;

pub mod algebra;
pub mod so3;

pub use algebra::{
    d_lie_bracket_ab_by_d_a, exp_quaternion, generator, hat, lie_bracket, log_and_theta, vee,
};
pub use so3::SO3;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Numerical instability in computation
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Invalid manifold element
    #[error("Invalid manifold element: {0}")]
    InvalidElement(String),
}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Core trait for Lie group operations.
///
/// Provides the group structure (identity, composition, inverse), the group
/// action on R³, and the exponential/logarithmic maps linking the group to its
/// Lie algebra.
///
/// # Dimensions
///
/// - `DIM`: Space dimension - dimension of ambient space the group acts on
/// - `DOF`: Degrees of freedom - tangent space dimension
/// - `REP_SIZE`: Representation size - underlying data size
pub trait LieGroup: Clone + Debug + PartialEq + Sized {
    /// The tangent space vector type
    type TangentVector: Clone + Debug + PartialEq;

    /// Matrix form of the Lie algebra
    type LieAlgebra: Clone + Debug + PartialEq;

    /// Adjoint representation matrix type
    type AdjointMatrix: Clone + Debug + PartialEq;

    /// Space dimension - dimension of the ambient space that the group acts on
    const DIM: usize;

    /// Degrees of freedom - dimension of the tangent space
    const DOF: usize;

    /// Representation size - size of the underlying data representation
    const REP_SIZE: usize;

    /// Get the identity element of the group.
    ///
    /// Returns the neutral element e such that e ∘ g = g ∘ e = g for any group element g.
    fn identity() -> Self;

    /// Compute the inverse g⁻¹ such that g ∘ g⁻¹ = e.
    fn inverse(&self) -> Self;

    /// Compose this element with another (group multiplication g₁ ∘ g₂).
    fn compose(&self, other: &Self) -> Self;

    /// Exponential map from the tangent space to the group.
    fn exp(tangent: &Self::TangentVector) -> Self;

    /// Logarithmic map from the group to the tangent space.
    fn log(&self) -> Self::TangentVector;

    /// Act on a vector v: g ⊙ v.
    fn act(&self, vector: &Vector3<f64>) -> Vector3<f64>;

    /// Adjoint matrix Ad(g).
    ///
    /// Ad(g) φ = log(g ∘ exp(φ^∧) ∘ g⁻¹)^∨.
    fn adjoint(&self) -> Self::AdjointMatrix;

    /// Hat operator: φ^∧ (vector to matrix).
    fn hat(tangent: &Self::TangentVector) -> Self::LieAlgebra;

    /// Vee operator: φ^∨ (matrix to vector).
    fn vee(algebra: &Self::LieAlgebra) -> Self::TangentVector;

    /// Lie bracket [a, b] of two tangent vectors.
    fn lie_bracket(a: &Self::TangentVector, b: &Self::TangentVector) -> Self::TangentVector;

    /// Compute g₁⁻¹ ∘ g₂ (relative transformation).
    fn between(&self, other: &Self) -> Self {
        self.inverse().compose(other)
    }
}
