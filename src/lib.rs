//! SO(3) rotation group for robotics and vision pipelines.
//!
//! Provides the [`SO3`](manifold::so3::SO3) group element backed by a unit
//! quaternion, the so(3) algebra operators (`hat`, `vee`, `lie_bracket`) and the
//! closed-form exponential and logarithm maps linking the two. The
//! [`verification`] module checks the numerical contracts of those maps and is
//! what the `verify_so3` binary runs.

pub mod error;
pub mod logger;
pub mod manifold;
pub mod verification;

pub use error::{So3Error, So3Result};
pub use logger::{init_logger, init_logger_with_level, try_init_logger_with_level};
pub use manifold::{LieGroup, ManifoldError, ManifoldResult, SO3};

/// Threshold below which `exp` and `log` switch to their Taylor expansions.
///
/// Also the default pass/fail tolerance of the verification checks.
pub const SMALL_EPS: f64 = 1e-10;
