//! Dense evaluation of the TPS basis matrix.
//!
//! For an image extent of `width x height` and `n` control points, an
//! evaluator produces the `m x (n+3)` basis matrix `M` with one row per
//! pixel that is not itself a control point (`m = width*height - n`).
//! Row `j` for pixel `p` holds
//!
//! ```text
//! [U(p, cp_0), ..., U(p, cp_{n-1}), 1, p.x, p.y]
//! ```
//!
//! Pixels are enumerated in row major scan order and the control pixel
//! skip policy lives in one shared helper, so every backend produces the
//! same rows in the same order. Rows have no cross-row dependency, which
//! makes the parallel backend a plain row map.

use rayon::prelude::*;

use tps_image::{ControlPointSet, ImageSize};

use crate::error::TpsError;
use crate::kernel::tps_kernel;

/// The `m x (n+3)` basis matrix produced by an evaluation backend.
#[derive(Debug, Clone)]
pub struct BasisMatrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl BasisMatrix {
    /// Allocate a zeroed matrix, reporting allocation failure instead of
    /// aborting.
    fn try_new(rows: usize, cols: usize) -> Result<Self, TpsError> {
        let len = rows
            .checked_mul(cols)
            .ok_or(TpsError::OutOfMemory(usize::MAX))?;
        let bytes = len * std::mem::size_of::<f32>();
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| TpsError::OutOfMemory(bytes))?;
        data.resize(len, 0f32);
        Ok(Self { data, rows, cols })
    }

    /// The number of rows `m`.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The number of columns `n + 3`.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The row for the `r`-th enumerated pixel.
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// The underlying row major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Iterate over the rows in pixel enumeration order.
    pub fn row_iter(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.cols)
    }
}

/// Enumerate the non-control pixels in row major order.
///
/// This is the single source of truth for the row order and the control
/// pixel skip policy of every backend.
fn control_free_pixels(
    size: ImageSize,
    control_points: &ControlPointSet,
) -> Result<Vec<[usize; 2]>, TpsError> {
    // upper bound; control points on integer positions reduce the count
    let max_rows = size.numel();
    let mut pixels = Vec::new();
    pixels
        .try_reserve(max_rows)
        .map_err(|_| TpsError::OutOfMemory(max_rows * std::mem::size_of::<[usize; 2]>()))?;

    for y in 0..size.height {
        for x in 0..size.width {
            if control_points.contains_pixel(x, y) {
                continue;
            }
            pixels.push([x, y]);
        }
    }
    Ok(pixels)
}

/// Fill one basis row for pixel `(x, y)`.
///
/// Shared by all backends so the kernel formula and its evaluation order
/// cannot diverge between them.
#[inline]
fn fill_basis_row(row: &mut [f32], pixel: [usize; 2], control_points: &ControlPointSet) {
    let p = [pixel[0] as f32, pixel[1] as f32];
    let n = control_points.len();
    for (j, cp) in control_points.iter().enumerate() {
        row[j] = tps_kernel(p, [cp.x, cp.y]);
    }
    row[n] = 1.0;
    row[n + 1] = p[0];
    row[n + 2] = p[1];
}

/// A backend that evaluates the dense TPS basis matrix.
///
/// Implementations must produce the same rows in the same order; they
/// are free to differ in execution strategy only.
pub trait FieldEvaluator {
    /// Evaluate the basis matrix for an image extent and control points.
    fn evaluate(
        &self,
        size: ImageSize,
        control_points: &ControlPointSet,
    ) -> Result<BasisMatrix, TpsError>;

    /// A short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Single threaded reference backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialEvaluator;

impl FieldEvaluator for SequentialEvaluator {
    fn evaluate(
        &self,
        size: ImageSize,
        control_points: &ControlPointSet,
    ) -> Result<BasisMatrix, TpsError> {
        let pixels = control_free_pixels(size, control_points)?;
        let cols = control_points.len() + 3;
        let mut basis = BasisMatrix::try_new(pixels.len(), cols)?;

        basis
            .data
            .chunks_exact_mut(cols)
            .zip(pixels.iter())
            .for_each(|(row, &pixel)| fill_basis_row(row, pixel, control_points));

        Ok(basis)
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Data parallel backend mapping over basis rows with rayon.
///
/// Uses the global thread pool by default; [`ParallelEvaluator::with_num_threads`]
/// runs on a local pool instead, which has build overhead and is meant
/// for benchmarking or isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelEvaluator {
    num_threads: Option<usize>,
}

impl ParallelEvaluator {
    /// Create a backend running on the global rayon thread pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend running on a local pool with `num_threads` threads.
    pub fn with_num_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }

    fn evaluate_rows(
        pixels: &[[usize; 2]],
        basis: &mut BasisMatrix,
        control_points: &ControlPointSet,
    ) {
        let cols = basis.cols;
        basis
            .data
            .par_chunks_exact_mut(cols)
            .zip(pixels.par_iter())
            .for_each(|(row, &pixel)| fill_basis_row(row, pixel, control_points));
    }
}

impl FieldEvaluator for ParallelEvaluator {
    fn evaluate(
        &self,
        size: ImageSize,
        control_points: &ControlPointSet,
    ) -> Result<BasisMatrix, TpsError> {
        let pixels = control_free_pixels(size, control_points)?;
        let cols = control_points.len() + 3;
        let mut basis = BasisMatrix::try_new(pixels.len(), cols)?;

        match self.num_threads {
            None => Self::evaluate_rows(&pixels, &mut basis, control_points),
            Some(n) => {
                if n == 0 {
                    return Err(TpsError::ThreadPool(
                        "thread count must be > 0".to_string(),
                    ));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| TpsError::ThreadPool(e.to_string()))?;
                pool.install(|| Self::evaluate_rows(&pixels, &mut basis, control_points));
            }
        }

        Ok(basis)
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}
