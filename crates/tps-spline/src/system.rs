//! Assembly of the augmented control point system.
//!
//! For `n` control points the system matrix has dimension `n + 3` with
//! the block layout
//!
//! ```text
//! L = | K   P |      K[i][j] = U(cp_i, cp_j)     (n x n)
//!     | P^T 0 |      P[i]    = [1, x_i, y_i]     (n x 3)
//! ```
//!
//! where the trailing three rows and columns carry the affine part. The
//! system is assembled and solved in f64; only the dense per-pixel side
//! of the pipeline stays in f32.

use tps_image::ControlPointSet;

use crate::error::TpsError;
use crate::kernel::tps_kernel_f64;

/// The `(n+3) x (n+3)` augmented system matrix for a control point set.
///
/// Rebuilt from scratch whenever the control points change; never
/// mutated after assembly.
#[derive(Debug)]
pub struct AugmentedSystemMatrix {
    mat: faer::Mat<f64>,
    num_points: usize,
}

impl AugmentedSystemMatrix {
    /// Assemble the augmented system from a control point set.
    ///
    /// The control point order fixes the row and column order of the `K`
    /// and `P` blocks and must match the basis matrix column order used
    /// by the evaluation backends.
    ///
    /// # Errors
    ///
    /// Returns [`TpsError::InvalidControlPoints`] when the set is empty
    /// or two points coincide. A constructed [`ControlPointSet`] already
    /// guarantees both; the checks here guard hand-built inputs reaching
    /// this layer through future call sites.
    pub fn assemble(control_points: &ControlPointSet) -> Result<Self, TpsError> {
        if control_points.is_empty() {
            return Err(TpsError::InvalidControlPoints(
                tps_image::ControlPointError::Empty,
            ));
        }

        let n = control_points.len();
        let dim = n + 3;
        let points = control_points.points();
        let mut mat = faer::Mat::<f64>::zeros(dim, dim);

        // K block: pairwise kernel values, symmetric with zero diagonal
        for i in 0..n {
            let pi = [points[i].x as f64, points[i].y as f64];
            for j in (i + 1)..n {
                let pj = [points[j].x as f64, points[j].y as f64];
                if pi == pj {
                    return Err(TpsError::InvalidControlPoints(
                        tps_image::ControlPointError::DuplicatePosition(i, j),
                    ));
                }
                let u = tps_kernel_f64(pi, pj);
                mat.write(i, j, u);
                mat.write(j, i, u);
            }
        }

        // P block and its transpose; the trailing 3x3 block stays zero
        for (i, p) in points.iter().enumerate() {
            mat.write(i, n, 1.0);
            mat.write(i, n + 1, p.x as f64);
            mat.write(i, n + 2, p.y as f64);
            mat.write(n, i, 1.0);
            mat.write(n + 1, i, p.x as f64);
            mat.write(n + 2, i, p.y as f64);
        }

        Ok(Self {
            mat,
            num_points: n,
        })
    }

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

    /// Borrow the underlying matrix.
    pub(crate) fn as_mat(&self) -> faer::MatRef<'_, f64> {
        self.mat.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tps_image::{ControlPoint, ControlPointSet, ImageSize};

    fn set(points: &[(f32, f32, f32)]) -> ControlPointSet {
        ControlPointSet::new(
            points
                .iter()
                .map(|&(x, y, value)| ControlPoint { x, y, value })
                .collect(),
            ImageSize {
                width: 64,
                height: 64,
            },
        )
        .unwrap()
    }

    #[test]
    fn assemble_block_layout() -> Result<(), TpsError> {
        let cps = set(&[(5.0, 5.0, 10.0), (20.0, 20.0, 50.0)]);
        let sys = AugmentedSystemMatrix::assemble(&cps)?;
        assert_eq!(sys.dim(), 5);
        assert_eq!(sys.num_points(), 2);

        // zero diagonal of K
        assert_eq!(sys.get(0, 0), 0.0);
        assert_eq!(sys.get(1, 1), 0.0);

        // P rows [1, x, y]
        assert_eq!(sys.get(0, 2), 1.0);
        assert_eq!(sys.get(0, 3), 5.0);
        assert_eq!(sys.get(0, 4), 5.0);
        assert_eq!(sys.get(1, 3), 20.0);

        // P^T block mirrors P
        assert_eq!(sys.get(2, 0), 1.0);
        assert_eq!(sys.get(3, 1), 20.0);
        assert_eq!(sys.get(4, 1), 20.0);

        // trailing 3x3 zero block
        for i in 2..5 {
            for j in 2..5 {
                assert_eq!(sys.get(i, j), 0.0);
            }
        }
        Ok(())
    }

    #[test]
    fn assemble_k_block_symmetric() -> Result<(), TpsError> {
        let cps = set(&[
            (1.0, 2.0, 0.0),
            (30.0, 4.0, 0.0),
            (11.0, 47.0, 0.0),
            (60.0, 60.0, 0.0),
        ]);
        let sys = AugmentedSystemMatrix::assemble(&cps)?;
        let n = sys.num_points();
        for i in 0..n {
            for j in 0..n {
                assert_eq!(sys.get(i, j), sys.get(j, i));
            }
        }
        Ok(())
    }

    #[test]
    fn assemble_k_entries_finite() -> Result<(), TpsError> {
        let cps = set(&[(0.0, 0.0, 1.0), (10.0, 0.0, 2.0), (0.0, 10.0, 3.0)]);
        let sys = AugmentedSystemMatrix::assemble(&cps)?;
        for i in 0..sys.dim() {
            for j in 0..sys.dim() {
                assert!(sys.get(i, j).is_finite());
            }
        }
        Ok(())
    }
}
