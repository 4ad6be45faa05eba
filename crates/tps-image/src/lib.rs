#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// single channel image buffer representation.
pub mod image;

/// control point set representation.
pub mod control_points;

/// Error types for the image module.
pub mod error;

pub use crate::control_points::{ControlPoint, ControlPointSet};
pub use crate::error::{ControlPointError, ImageError};
pub use crate::image::{Image, ImageSize};
