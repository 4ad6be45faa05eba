//! End to end interpolation and backend cross-validation.
//!
//! Stage order per run: assemble the augmented system, pseudo-invert it,
//! evaluate the basis matrix with the requested backend, synthesize the
//! field. Every intermediate is rebuilt per call and dropped as soon as
//! the next stage has consumed it; the basis matrix in particular
//! dominates the memory footprint and does not outlive synthesis.

use tps_image::{ControlPointSet, Image};

use crate::compare::{compare, ComparisonReport};
use crate::error::TpsError;
use crate::evaluator::{FieldEvaluator, ParallelEvaluator, SequentialEvaluator};
use crate::solver;
use crate::synth::{synthesize, Field};
use crate::system::AugmentedSystemMatrix;

/// Interpolate the TPS field for an image with the given backend.
///
/// The image contributes its geometry; the interpolated values are
/// driven entirely by the control points. Uses the truncated SVD
/// pseudo-inverse so degenerate-but-meaningful inputs (such as two
/// control points) still produce a field.
///
/// # Arguments
///
/// * `image` - The image whose extent the field covers.
/// * `control_points` - The control point set.
/// * `evaluator` - The evaluation backend to run.
///
/// # Returns
///
/// The interpolated field with one entry per non-control pixel.
pub fn interpolate<E: FieldEvaluator>(
    image: &Image,
    control_points: &ControlPointSet,
    evaluator: &E,
) -> Result<Field, TpsError> {
    let now = std::time::Instant::now();

    let system = AugmentedSystemMatrix::assemble(control_points)?;
    let inverted = solver::pseudo_invert(&system)?;

    let basis = evaluator.evaluate(image.size(), control_points)?;
    log::debug!(
        "{}: basis {}x{} evaluated in {:?}",
        evaluator.name(),
        basis.rows(),
        basis.cols(),
        now.elapsed()
    );

    let field = synthesize(&basis, &inverted, &control_points.values())?;
    log::debug!("{}: field synthesized in {:?}", evaluator.name(), now.elapsed());

    Ok(field)
}

/// Run both backends on the same inputs and compare their fields.
///
/// The sequential backend provides the gold field, the parallel backend
/// the candidate. Both run to completion before the comparison starts.
///
/// # Arguments
///
/// * `image` - The image whose extent the fields cover.
/// * `control_points` - The control point set shared by both backends.
/// * `threshold` - The pass threshold for the normalized L1 error.
pub fn cross_validate(
    image: &Image,
    control_points: &ControlPointSet,
    threshold: f32,
) -> Result<ComparisonReport, TpsError> {
    let gold = interpolate(image, control_points, &SequentialEvaluator)?;
    let candidate = interpolate(image, control_points, &ParallelEvaluator::new())?;

    compare(&gold, &candidate, image.size(), threshold)
}
