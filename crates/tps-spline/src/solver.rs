//! Inversion of the augmented control point system.
//!
//! The system is small (a few hundred rows at most), so robustness wins
//! over speed: both entry points go through a full f64 SVD. [`invert`]
//! refuses numerically rank deficient systems, while [`pseudo_invert`]
//! truncates the small singular values and always produces a usable
//! coefficient system, matching the historical SVD-decomposition invert
//! this pipeline was validated against.

use crate::error::TpsError;
use crate::system::AugmentedSystemMatrix;

/// The inverse (or pseudo-inverse) of an [`AugmentedSystemMatrix`].
///
/// Only the left `(n+3) x n` slice (`K*`) participates in field
/// synthesis; the trailing three columns correspond to the constraint
/// rows of the system and are never read back.
#[derive(Debug)]
pub struct InvertedSystem {
    mat: faer::Mat<f64>,
    num_points: usize,
}

impl InvertedSystem {
    /// The number of control points `n` behind this system.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// The full matrix dimension `n + 3`.
    pub fn dim(&self) -> usize {
        self.num_points + 3
    }

    /// The matrix entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.mat.read(row, col)
    }

    /// The TPS coefficient vector `K* . Y` for a value vector `Y`.
    ///
    /// Only the left `n` columns of the inverse are touched. The first
    /// `n` entries of the result are the bending weights, the trailing
    /// three the affine part.
    ///
    /// # Errors
    ///
    /// Returns [`TpsError::ShapeMismatch`] when `values.len() != n`.
    pub fn tps_coefficients(&self, values: &[f32]) -> Result<Vec<f64>, TpsError> {
        let n = self.num_points;
        if values.len() != n {
            return Err(TpsError::ShapeMismatch(n, values.len()));
        }

        let dim = self.dim();
        let mut coeffs = vec![0f64; dim];
        for (row, c) in coeffs.iter_mut().enumerate() {
            let mut acc = 0f64;
            for (col, &y) in values.iter().enumerate() {
                acc += self.mat.read(row, col) * y as f64;
            }
            *c = acc;
        }
        Ok(coeffs)
    }
}

/// Relative rank cutoff: singular values below `dim * eps * s_max` are
/// treated as zero.
fn rank_tolerance(dim: usize, s_max: f64) -> f64 {
    dim as f64 * f64::EPSILON * s_max
}

/// Invert the augmented system, rejecting rank deficient inputs.
///
/// # Errors
///
/// Returns [`TpsError::SingularSystem`] when the smallest singular value
/// falls below the rank tolerance. This happens for `n < 3` (the affine
/// constraint rows are linearly dependent) and for all-collinear control
/// points.
pub fn invert(system: &AugmentedSystemMatrix) -> Result<InvertedSystem, TpsError> {
    let dim = system.dim();
    let (pinv, s_min, s_max) = svd_pseudo_inverse(system.as_mat(), dim);
    if !(s_max > 0.0) || s_min < rank_tolerance(dim, s_max) {
        return Err(TpsError::SingularSystem(dim));
    }
    Ok(InvertedSystem {
        mat: pinv,
        num_points: system.num_points(),
    })
}

/// Pseudo-invert the augmented system via truncated SVD.
///
/// Singular values below the rank tolerance are dropped instead of
/// reciprocated, so the call succeeds even for exactly singular systems
/// such as `n = 2`. The result is the Moore-Penrose pseudo-inverse.
pub fn pseudo_invert(system: &AugmentedSystemMatrix) -> Result<InvertedSystem, TpsError> {
    let dim = system.dim();
    let (pinv, _, _) = svd_pseudo_inverse(system.as_mat(), dim);
    Ok(InvertedSystem {
        mat: pinv,
        num_points: system.num_points(),
    })
}

/// Truncated SVD pseudo-inverse together with the extreme singular values.
fn svd_pseudo_inverse(mat: faer::MatRef<'_, f64>, dim: usize) -> (faer::Mat<f64>, f64, f64) {
    let svd = mat.svd();
    let s = svd.s_diagonal();

    // faer returns singular values in descending order
    let s_max = s[0];
    let s_min = s[dim - 1];
    let tol = rank_tolerance(dim, s_max);

    // scale the columns of V by the truncated reciprocal spectrum
    let v = svd.v();
    let mut vs = faer::Mat::<f64>::zeros(dim, dim);
    for k in 0..dim {
        let sk = s[k];
        if sk <= tol {
            continue;
        }
        let inv_sk = 1.0 / sk;
        for i in 0..dim {
            vs.write(i, k, v.read(i, k) * inv_sk);
        }
    }

    // pinv = V . S^+ . U^T
    let mut pinv = faer::Mat::<f64>::zeros(dim, dim);
    faer::linalg::matmul::matmul(
        pinv.as_mut(),
        vs.as_ref(),
        svd.u().transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    (pinv, s_min, s_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tps_image::{ControlPoint, ControlPointSet, ImageSize};

    fn system(points: &[(f32, f32, f32)]) -> AugmentedSystemMatrix {
        let cps = ControlPointSet::new(
            points
                .iter()
                .map(|&(x, y, value)| ControlPoint { x, y, value })
                .collect(),
            ImageSize {
                width: 64,
                height: 64,
            },
        )
        .unwrap();
        AugmentedSystemMatrix::assemble(&cps).unwrap()
    }

    #[test]
    fn invert_noncollinear_succeeds() -> Result<(), TpsError> {
        let sys = system(&[(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (0.0, 10.0, 3.0)]);
        let inv = invert(&sys)?;
        assert_eq!(inv.dim(), 6);

        // inv * L should be close to the identity
        for i in 0..sys.dim() {
            for j in 0..sys.dim() {
                let mut acc = 0f64;
                for k in 0..sys.dim() {
                    acc += inv.get(i, k) * sys.get(k, j);
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (acc - expected).abs() < 1e-8,
                    "entry ({i}, {j}) = {acc}, expected {expected}"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn invert_two_points_is_singular() {
        let sys = system(&[(5.0, 5.0, 10.0), (20.0, 20.0, 50.0)]);
        assert_eq!(invert(&sys).err(), Some(TpsError::SingularSystem(5)));
    }

    #[test]
    fn invert_one_point_is_singular() {
        let sys = system(&[(5.0, 5.0, 10.0)]);
        assert_eq!(invert(&sys).err(), Some(TpsError::SingularSystem(4)));
    }

    #[test]
    fn invert_collinear_is_singular() {
        let sys = system(&[
            (0.0, 0.0, 1.0),
            (10.0, 10.0, 2.0),
            (20.0, 20.0, 3.0),
            (30.0, 30.0, 4.0),
        ]);
        assert_eq!(invert(&sys).err(), Some(TpsError::SingularSystem(7)));
    }

    #[test]
    fn pseudo_invert_two_points_succeeds() -> Result<(), TpsError> {
        let sys = system(&[(5.0, 5.0, 10.0), (20.0, 20.0, 50.0)]);
        let inv = pseudo_invert(&sys)?;
        for i in 0..inv.dim() {
            for j in 0..inv.dim() {
                assert!(inv.get(i, j).is_finite());
            }
        }
        Ok(())
    }

    #[test]
    fn coefficients_solve_interpolation_conditions() -> Result<(), TpsError> {
        // three non-collinear points: L . c == [Y; 0] must hold
        let points = [(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (0.0, 10.0, 3.0)];
        let sys = system(&points);
        let inv = invert(&sys)?;
        let y: Vec<f32> = points.iter().map(|p| p.2).collect();
        let c = inv.tps_coefficients(&y)?;
        assert_eq!(c.len(), 6);

        for row in 0..sys.dim() {
            let mut acc = 0f64;
            for (k, ck) in c.iter().enumerate() {
                acc += sys.get(row, k) * ck;
            }
            let expected = if row < y.len() { y[row] as f64 } else { 0.0 };
            assert!(
                (acc - expected).abs() < 1e-8,
                "row {row}: {acc} vs {expected}"
            );
        }
        Ok(())
    }

    #[test]
    fn coefficients_shape_mismatch() {
        let sys = system(&[(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (0.0, 10.0, 3.0)]);
        let inv = pseudo_invert(&sys).unwrap();
        assert_eq!(
            inv.tps_coefficients(&[1.0, 2.0]).err(),
            Some(TpsError::ShapeMismatch(3, 2))
        );
    }
}
