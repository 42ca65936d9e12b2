//! Numerical contract checks for the SO(3) maps
//!
//! Each check compares two ways of computing the same quantity and fails when
//! the residual is NaN or exceeds the configured tolerance:
//!
//! | Check                | Compared quantities                              |
//! |----------------------|--------------------------------------------------|
//! | exp/log round trip   | `matrix(exp(log(R)))` vs `matrix(R)`, θ ∈ [-π, π] |
//! | action consistency   | `R ⊙ p` vs `matrix(R) p`                          |
//! | inverse law          | `matrix(R) matrix(R⁻¹)` vs `I`                    |
//! | Lie bracket          | `lie_bracket(a, b)` vs `vee([a]ₓ[b]ₓ - [b]ₓ[a]ₓ)`  |
//! | exponential agreement| `matrix(exp(ω))` vs `expm([ω]ₓ)`                  |
//!
//! [`Verifier::run_all`] runs every check over the canonical sample sets and
//! logs each failure through `tracing`.

use nalgebra::{Matrix3, Vector3};
use std::f64::consts::{FRAC_PI_2, PI};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    SMALL_EPS,
    error::{So3Error, So3Result},
    manifold::{algebra, so3::SO3},
};

/// A violated numerical contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    /// The residual itself is NaN
    #[error("{check}: residual is NaN (case {case})")]
    NotANumber { check: &'static str, case: usize },

    /// The residual is finite but above tolerance
    #[error("{check}: residual {residual:e} exceeds tolerance {tolerance:e} (case {case})")]
    ToleranceExceeded {
        check: &'static str,
        case: usize,
        residual: f64,
        tolerance: f64,
    },

    /// `log` returned an angle outside the principal range
    #[error("log theta {theta} not in [-pi, pi] (case {case})")]
    AngleOutOfRange { case: usize, theta: f64 },
}

/// Configuration for the verification checks.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationConfig {
    /// Maximum accepted residual norm
    pub tolerance: f64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            tolerance: SMALL_EPS,
        }
    }
}

impl VerificationConfig {
    /// Create a configuration with the default tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted residual norm.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Reject tolerances that would make every check pass or fail trivially.
    pub fn validate(&self) -> So3Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(So3Error::InvalidInput(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Outcome of [`Verifier::run_all`].
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    checks_run: usize,
    failures: Vec<VerificationError>,
}

impl VerificationReport {
    /// True when no check failed.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of individual checks executed.
    pub fn checks_run(&self) -> usize {
        self.checks_run
    }

    /// All recorded failures in execution order.
    pub fn failures(&self) -> &[VerificationError] {
        &self.failures
    }

    fn record(&mut self, outcome: Result<(), VerificationError>) {
        self.checks_run += 1;
        if let Err(failure) = outcome {
            error!("{failure}");
            self.failures.push(failure);
        }
    }
}

/// Runs the numerical contract checks with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerificationConfig,
}

impl Verifier {
    /// Create a verifier with the given configuration.
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// `exp(log(R)) == R`.
    pub fn check_exp_log_round_trip(
        &self,
        case: usize,
        rotation: &SO3,
    ) -> Result<(), VerificationError> {
        let omega = rotation.log();
        let residual = (rotation.matrix() - SO3::exp(&omega).matrix()).norm();
        self.check_residual("SO3 - exp(log(SO3))", case, residual)
    }

    /// θ returned by `log_and_theta` lies in [-π, π].
    pub fn check_log_angle_range(
        &self,
        case: usize,
        rotation: &SO3,
    ) -> Result<(), VerificationError> {
        let (_, theta) = rotation.log_and_theta();
        check_angle(case, theta)
    }

    /// `R ⊙ p == matrix(R) p`.
    pub fn check_action_consistency(
        &self,
        case: usize,
        rotation: &SO3,
        point: &Vector3<f64>,
    ) -> Result<(), VerificationError> {
        let residual = (rotation.act(point) - rotation.matrix() * point).norm();
        self.check_residual("transform vector", case, residual)
    }

    /// `matrix(R) matrix(R⁻¹) == I`.
    pub fn check_inverse_law(&self, case: usize, rotation: &SO3) -> Result<(), VerificationError> {
        let product = rotation.matrix() * rotation.inverse().matrix();
        let residual = (product - Matrix3::identity()).norm();
        self.check_residual("inverse", case, residual)
    }

    /// `lie_bracket(a, b) == vee([a]ₓ[b]ₓ - [b]ₓ[a]ₓ)`.
    pub fn check_lie_bracket(
        &self,
        case: usize,
        a: &Vector3<f64>,
        b: &Vector3<f64>,
    ) -> Result<(), VerificationError> {
        let a_hat = algebra::hat(a);
        let b_hat = algebra::hat(b);
        let commutator = algebra::vee(&(a_hat * b_hat - b_hat * a_hat));
        let residual = (algebra::lie_bracket(a, b) - commutator).norm();
        self.check_residual("SO3 Lie bracket", case, residual)
    }

    /// Closed-form `exp(ω)` agrees with the generic matrix exponential of `[ω]ₓ`.
    pub fn check_exp_agreement(
        &self,
        case: usize,
        omega: &Vector3<f64>,
    ) -> Result<(), VerificationError> {
        let closed_form = SO3::exp(omega).matrix();
        let generic = algebra::hat(omega).exp();
        let residual = (closed_form - generic).norm();
        self.check_residual("expmap(hat(x)) - exp(x)", case, residual)
    }

    /// Run every check over [`sample_rotations`] and [`sample_tangents`].
    pub fn run_all(&self) -> VerificationReport {
        let mut report = VerificationReport::default();
        let rotations = sample_rotations();
        let tangents = sample_tangents();
        let point = Vector3::new(1.0, 2.0, 4.0);

        info!(
            "verifying {} rotations and {} tangent vectors (tolerance {:e})",
            rotations.len(),
            tangents.len(),
            self.config.tolerance
        );

        for (case, rotation) in rotations.iter().enumerate() {
            debug!("rotation case {case}: {rotation}");
            report.record(self.check_exp_log_round_trip(case, rotation));
            report.record(self.check_log_angle_range(case, rotation));
            report.record(self.check_action_consistency(case, rotation, &point));
            report.record(self.check_inverse_law(case, rotation));
        }

        for (i, a) in tangents.iter().enumerate() {
            debug!("tangent case {i}: [{}, {}, {}]", a.x, a.y, a.z);
            for (j, b) in tangents.iter().enumerate() {
                report.record(self.check_lie_bracket(i * tangents.len() + j, a, b));
            }
            report.record(self.check_exp_agreement(i, a));
        }

        if report.passed() {
            info!("all {} checks passed", report.checks_run());
        } else {
            error!(
                "{} of {} checks failed",
                report.failures().len(),
                report.checks_run()
            );
        }
        report
    }

    fn check_residual(
        &self,
        check: &'static str,
        case: usize,
        residual: f64,
    ) -> Result<(), VerificationError> {
        if residual.is_nan() {
            return Err(VerificationError::NotANumber { check, case });
        }
        if residual > self.config.tolerance {
            return Err(VerificationError::ToleranceExceeded {
                check,
                case,
                residual,
                tolerance: self.config.tolerance,
            });
        }
        Ok(())
    }
}

fn check_angle(case: usize, theta: f64) -> Result<(), VerificationError> {
    if (-PI..=PI).contains(&theta) {
        Ok(())
    } else {
        Err(VerificationError::AngleOutOfRange { case, theta })
    }
}

/// Rotations covering the singular and generic regimes of `exp`/`log`.
///
/// Includes a half turn built from a quaternion with w ≈ 0, a near-identity
/// quaternion with negative real part, θ = 0, θ = 1e-5, θ = π about x, and two
/// conjugated half turns `A·B·A⁻¹`.
pub fn sample_rotations() -> Vec<SO3> {
    let half_turn_x = SO3::exp(&Vector3::new(PI, 0.0, 0.0));
    let conjugate = |omega: Vector3<f64>| SO3::exp(&omega) * half_turn_x * SO3::exp(&-omega);

    vec![
        SO3::from_quaternion_wxyz(0.1e-11, 0.0, 1.0, 0.0),
        SO3::from_quaternion_wxyz(-1.0, 0.00001, 0.0, 0.0),
        SO3::exp(&Vector3::new(0.2, 0.5, 0.0)),
        SO3::exp(&Vector3::new(0.2, 0.5, -1.0)),
        SO3::exp(&Vector3::new(0.0, 0.0, 0.0)),
        SO3::exp(&Vector3::new(0.0, 0.0, 0.00001)),
        half_turn_x,
        conjugate(Vector3::new(0.2, 0.5, 0.0)),
        conjugate(Vector3::new(0.3, 0.5, 0.1)),
    ]
}

/// Tangent vectors for the bracket and exponential agreement checks.
///
/// Several have norm well above π so that the exponential wraps.
pub fn sample_tangents() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(FRAC_PI_2, FRAC_PI_2, 0.0),
        Vector3::new(-1.0, 1.0, 0.0),
        Vector3::new(20.0, -1.0, 0.0),
        Vector3::new(30.0, 5.0, -1.0),
    ]
}
