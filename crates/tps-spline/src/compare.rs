//! Gold versus candidate field comparison.
//!
//! The sequential backend's field is the gold reference; the parallel
//! backend's field is the candidate. The comparison accumulates an L1
//! sum over all entry pairs and normalizes by the declared image pixel
//! count `width * height`, not by the field length `m`, preserving the
//! historical denominator contract of this check.

use tps_image::ImageSize;

use crate::error::TpsError;
use crate::synth::Field;

/// The default pass threshold for the normalized L1 error.
pub const DEFAULT_THRESHOLD: f32 = 0.05;

/// Diagnostic result of a gold versus candidate comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonReport {
    /// L1 sum of absolute differences normalized by `width * height`.
    pub l1_error: f32,
    /// Number of entry pairs whose values differ at all.
    pub num_diverging: usize,
    /// Largest absolute difference among diverging pairs.
    pub max_divergence: f32,
    /// Number of non-finite entries on the gold side. A nonzero count
    /// indicates a defect in the reference computation itself.
    pub gold_non_finite: usize,
    /// Number of non-finite entries on the candidate side.
    pub candidate_non_finite: usize,
    /// Whether the candidate passes: the normalized error is strictly
    /// below the threshold and the candidate contains no non-finite
    /// entries.
    pub pass: bool,
}

/// Compare two fields of identical shape entry by entry.
///
/// # Arguments
///
/// * `gold` - The reference field (sequential backend).
/// * `candidate` - The field under test (parallel backend).
/// * `size` - The declared image extent; its pixel count is the error
///   denominator.
/// * `threshold` - The pass threshold for the normalized L1 error, e.g.
///   [`DEFAULT_THRESHOLD`].
///
/// # Errors
///
/// Returns [`TpsError::ShapeMismatch`] when the fields differ in length.
///
/// # Examples
///
/// ```
/// use tps_image::ImageSize;
/// use tps_spline::{compare, Field, DEFAULT_THRESHOLD};
///
/// let field = Field::from_values(vec![1.0, 2.0, 3.0]);
/// let size = ImageSize { width: 2, height: 2 };
///
/// let report = compare(&field, &field.clone(), size, DEFAULT_THRESHOLD).unwrap();
/// assert_eq!(report.l1_error, 0.0);
/// assert!(report.pass);
/// ```
pub fn compare(
    gold: &Field,
    candidate: &Field,
    size: ImageSize,
    threshold: f32,
) -> Result<ComparisonReport, TpsError> {
    if gold.len() != candidate.len() {
        return Err(TpsError::ShapeMismatch(gold.len(), candidate.len()));
    }

    let mut l1_sum = 0f32;
    let mut num_diverging = 0usize;
    let mut max_divergence = 0f32;
    let mut gold_non_finite = 0usize;
    let mut candidate_non_finite = 0usize;

    for (&g, &c) in gold.as_slice().iter().zip(candidate.as_slice().iter()) {
        let diff = (g - c).abs();
        l1_sum += diff;
        if g != c {
            num_diverging += 1;
            // a NaN diff never replaces the running maximum
            if diff >= max_divergence {
                max_divergence = diff;
            }
        }
        if !g.is_finite() {
            gold_non_finite += 1;
        }
        if !c.is_finite() {
            candidate_non_finite += 1;
        }
    }

    // normalized by the declared image extent, not the field length
    let l1_error = l1_sum / size.numel() as f32;
    let pass = l1_error < threshold && candidate_non_finite == 0;

    log::debug!(
        "compare: l1_error={l1_error} diverging={num_diverging} max={max_divergence} \
         gold_nan={gold_non_finite} candidate_nan={candidate_non_finite} pass={pass}"
    );

    Ok(ComparisonReport {
        l1_error,
        num_diverging,
        max_divergence,
        gold_non_finite,
        candidate_non_finite,
        pass,
    })
}
