#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// field comparison module.
pub mod compare;

/// Error types for the spline module.
pub mod error;

/// dense basis matrix evaluation module.
pub mod evaluator;

/// radial basis kernel module.
pub mod kernel;

/// end to end interpolation pipeline module.
pub mod pipeline;

/// augmented system solver module.
pub mod solver;

/// field synthesis module.
pub mod synth;

/// augmented system assembly module.
pub mod system;

pub use crate::compare::{compare, ComparisonReport, DEFAULT_THRESHOLD};
pub use crate::error::TpsError;
pub use crate::evaluator::{BasisMatrix, FieldEvaluator, ParallelEvaluator, SequentialEvaluator};
pub use crate::pipeline::{cross_validate, interpolate};
pub use crate::synth::Field;
