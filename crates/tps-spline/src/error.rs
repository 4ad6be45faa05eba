use tps_image::{ControlPointError, ImageError};

/// An error type for the spline module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TpsError {
    /// The control point set is degenerate or insufficient.
    #[error("invalid control points: {0}")]
    InvalidControlPoints(#[from] ControlPointError),

    /// The augmented system cannot be inverted.
    #[error("augmented system of dimension {0} is numerically singular")]
    SingularSystem(usize),

    /// An evaluation backend could not allocate its output buffer.
    #[error("failed to allocate {0} bytes")]
    OutOfMemory(usize),

    /// Two operands have incompatible shapes.
    #[error("shape mismatch: expected {0} elements, got {1}")]
    ShapeMismatch(usize, usize),

    /// The thread pool for a parallel backend failed to build.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Error from the underlying image types.
    #[error(transparent)]
    Image(#[from] ImageError),
}
