//! Synthesis of the interpolated field `I = M . K* . Y`.
//!
//! The product is right-associated: the `(n+3)`-length coefficient
//! vector `K* . Y` is formed once, then applied to every basis row. The
//! shape of the result is the same either way.

use crate::error::TpsError;
use crate::evaluator::BasisMatrix;
use crate::solver::InvertedSystem;

/// The interpolated field: one value per enumerated non-control pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    values: Vec<f32>,
}

impl Field {
    /// Build a field directly from per-pixel values.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// The number of field entries `m`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The field values in pixel enumeration order.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// The number of non-finite entries in the field.
    pub fn num_non_finite(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }
}

/// Synthesize the field from a basis matrix, an inverted system and the
/// control point value vector.
///
/// # Arguments
///
/// * `basis` - The `m x (n+3)` basis matrix from an evaluation backend.
/// * `inverted` - The inverted augmented system.
/// * `values` - The length-`n` control point value vector, in set order.
///
/// # Errors
///
/// Returns [`TpsError::ShapeMismatch`] when the basis column count does
/// not equal `n + 3` or the value vector length does not equal `n`, and
/// [`TpsError::OutOfMemory`] when the field buffer cannot be allocated.
pub fn synthesize(
    basis: &BasisMatrix,
    inverted: &InvertedSystem,
    values: &[f32],
) -> Result<Field, TpsError> {
    if basis.cols() != inverted.dim() {
        return Err(TpsError::ShapeMismatch(inverted.dim(), basis.cols()));
    }

    // K* . Y, checked against n inside
    let coeffs = inverted.tps_coefficients(values)?;

    let mut out = Vec::new();
    out.try_reserve_exact(basis.rows())
        .map_err(|_| TpsError::OutOfMemory(basis.rows() * std::mem::size_of::<f32>()))?;

    for row in basis.row_iter() {
        let mut acc = 0f64;
        for (&a, c) in row.iter().zip(coeffs.iter()) {
            acc += a as f64 * c;
        }
        out.push(acc as f32);
    }

    Ok(Field::from_values(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{FieldEvaluator, SequentialEvaluator};
    use crate::solver;
    use crate::system::AugmentedSystemMatrix;
    use tps_image::{ControlPoint, ControlPointSet, ImageSize};

    fn set(size: ImageSize, points: &[(f32, f32, f32)]) -> ControlPointSet {
        ControlPointSet::new(
            points
                .iter()
                .map(|&(x, y, value)| ControlPoint { x, y, value })
                .collect(),
            size,
        )
        .unwrap()
    }

    #[test]
    fn synthesize_shape() -> Result<(), TpsError> {
        let size = ImageSize {
            width: 16,
            height: 16,
        };
        let cps = set(size, &[(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (0.0, 10.0, 3.0)]);
        let sys = AugmentedSystemMatrix::assemble(&cps)?;
        let inv = solver::invert(&sys)?;
        let basis = SequentialEvaluator.evaluate(size, &cps)?;

        let field = synthesize(&basis, &inv, &cps.values())?;
        assert_eq!(field.len(), 16 * 16 - 3);
        assert_eq!(field.num_non_finite(), 0);
        Ok(())
    }

    #[test]
    fn synthesize_affine_case_is_exact() -> Result<(), TpsError> {
        // three non-collinear points lie on the plane f(x, y) = 1 + 0.1x + 0.2y,
        // so the bending weights vanish and the field is that plane
        let size = ImageSize {
            width: 20,
            height: 20,
        };
        let cps = set(size, &[(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (0.0, 10.0, 3.0)]);
        let sys = AugmentedSystemMatrix::assemble(&cps)?;
        let inv = solver::invert(&sys)?;
        let basis = SequentialEvaluator.evaluate(size, &cps)?;
        let field = synthesize(&basis, &inv, &cps.values())?;

        let mut idx = 0;
        for y in 0..20usize {
            for x in 0..20usize {
                if cps.contains_pixel(x, y) {
                    continue;
                }
                let expected = 1.0 + 0.1 * x as f32 + 0.2 * y as f32;
                let got = field.as_slice()[idx];
                assert!(
                    (got - expected).abs() < 1e-2,
                    "pixel ({x}, {y}): {got} vs {expected}"
                );
                idx += 1;
            }
        }
        Ok(())
    }

    #[test]
    fn synthesize_value_len_mismatch() -> Result<(), TpsError> {
        let size = ImageSize {
            width: 8,
            height: 8,
        };
        let cps = set(size, &[(0.0, 0.0, 1.0), (5.0, 0.0, 2.0), (0.0, 5.0, 3.0)]);
        let sys = AugmentedSystemMatrix::assemble(&cps)?;
        let inv = solver::invert(&sys)?;
        let basis = SequentialEvaluator.evaluate(size, &cps)?;

        let res = synthesize(&basis, &inv, &[1.0]);
        assert_eq!(res.err(), Some(TpsError::ShapeMismatch(3, 1)));
        Ok(())
    }
}
