use crate::error::ControlPointError;
use crate::image::ImageSize;

/// A known sample the interpolated field must pass through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    /// Horizontal position in pixels, inside `[0, width)`.
    pub x: f32,
    /// Vertical position in pixels, inside `[0, height)`.
    pub y: f32,
    /// Scalar value of the sample at this position.
    pub value: f32,
}

/// An ordered set of control points inside an image extent.
///
/// The insertion order is semantic: it fixes the row and column order of
/// every matrix derived from the set, and must therefore be the same for
/// all evaluation backends. Construction validates the set invariants
/// (`n >= 1`, in-bounds, pairwise distinct positions) so downstream
/// stages can assume them.
///
/// # Examples
///
/// ```
/// use tps_image::{ControlPoint, ControlPointSet, ImageSize};
///
/// let points = ControlPointSet::new(
///     vec![
///         ControlPoint { x: 5.0, y: 5.0, value: 10.0 },
///         ControlPoint { x: 20.0, y: 20.0, value: 50.0 },
///     ],
///     ImageSize { width: 32, height: 32 },
/// )
/// .unwrap();
///
/// assert_eq!(points.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
}

impl ControlPointSet {
    /// Create a new control point set, validating the set invariants.
    ///
    /// # Arguments
    ///
    /// * `points` - The control points in their semantic order.
    /// * `extent` - The image extent the positions must lie inside.
    ///
    /// # Errors
    ///
    /// Returns [`ControlPointError`] when the set is empty, a position is
    /// outside the extent, or two points share the same position.
    pub fn new(points: Vec<ControlPoint>, extent: ImageSize) -> Result<Self, ControlPointError> {
        if points.is_empty() {
            return Err(ControlPointError::Empty);
        }
        for (i, p) in points.iter().enumerate() {
            if !(p.x >= 0.0 && p.x < extent.width as f32 && p.y >= 0.0 && p.y < extent.height as f32)
            {
                return Err(ControlPointError::OutOfBounds(i, p.x, p.y));
            }
        }
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if points[i].x == points[j].x && points[i].y == points[j].y {
                    return Err(ControlPointError::DuplicatePosition(i, j));
                }
            }
        }
        Ok(Self { points })
    }

    /// The number of control points in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty. Always `false` for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The control points in their semantic order.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Iterate over the control points in their semantic order.
    pub fn iter(&self) -> std::slice::Iter<'_, ControlPoint> {
        self.points.iter()
    }

    /// The value vector `Y`: each point's scalar value in set order.
    pub fn values(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Whether pixel `(x, y)` coincides with a control point position.
    pub fn contains_pixel(&self, x: usize, y: usize) -> bool {
        let (xf, yf) = (x as f32, y as f32);
        self.points.iter().any(|p| p.x == xf && p.y == yf)
    }
}
