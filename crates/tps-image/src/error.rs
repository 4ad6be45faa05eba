/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the buffer length does not match the image extent.
    #[error("Data length ({0}) does not match the image extent ({1})")]
    InvalidBufferSize(usize, usize),

    /// Error when the row stride is smaller than the image width.
    #[error("Row stride ({0}) must be greater or equal to the image width ({1})")]
    InvalidStride(usize, usize),
}

/// An error type for control point set construction.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ControlPointError {
    /// Error when the set contains no control points.
    #[error("Control point set must contain at least one point")]
    Empty,

    /// Error when a control point lies outside the image extent.
    #[error("Control point {0} at ({1}, {2}) is outside the image extent")]
    OutOfBounds(usize, f32, f32),

    /// Error when two control points share the same position.
    #[error("Control points {0} and {1} share the same position")]
    DuplicatePosition(usize, usize),
}
