use crate::utils::primitive::BoxFloat;
use crate::Errors;
use anyhow::Result;
use log::warn;
use ndarray::{ArrayView1, ArrayView2};

/// Number of values that describe a box: `cx, cy, width, height, angle`
pub const BOX_COLUMNS: usize = 5;

pub(crate) fn check_box_columns<T>(boxes: &ArrayView2<T>) -> Result<()> {
    if boxes.ncols() != BOX_COLUMNS {
        return Err(Errors::BoxColumns {
            expected: BOX_COLUMNS,
            actual: boxes.ncols(),
        }
        .into());
    }
    Ok(())
}

pub(crate) fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Errors::ShapeMismatch {
            name,
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

/// Checks that every index of `0..order.len()` appears exactly once
///
pub(crate) fn check_permutation(order: &[usize]) -> Result<()> {
    let len = order.len();
    let mut seen = vec![false; len];
    for (position, &index) in order.iter().enumerate() {
        if index >= len {
            return Err(Errors::OrderIndexOutOfRange {
                position,
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            }
            .into());
        }
        if seen[index] {
            return Err(Errors::OrderNotPermutation { index }.into());
        }
        seen[index] = true;
    }
    Ok(())
}

pub(crate) fn check_threshold<T: BoxFloat>(threshold: T) -> Result<()> {
    if threshold.is_nan() || threshold < T::zero() || threshold > T::one() {
        return Err(Errors::InvalidThreshold(threshold.to_f64().unwrap_or(f64::NAN)).into());
    }
    Ok(())
}

/// Rejects NaN scores
///
pub(crate) fn check_scores<T: BoxFloat>(scores: &ArrayView1<T>) -> Result<()> {
    match scores.iter().position(|s| s.is_nan()) {
        Some(index) => Err(Errors::InvalidScore {
            index,
            score: f64::NAN,
        }
        .into()),
        None => Ok(()),
    }
}

/// Checks that every box has finite parameters and positive width and height.
///
/// The kernels never fail on malformed boxes (their overlap is reported as zero),
/// so callers that need the guarantee run this check before computing IoU or NMS.
///
pub fn validate_boxes<T: BoxFloat>(boxes: ArrayView2<T>) -> Result<()> {
    check_box_columns(&boxes)?;
    for (index, row) in boxes.rows().into_iter().enumerate() {
        let (width, height) = (row[2], row[3]);
        let finite = row.iter().all(|v| v.is_finite());
        if !finite || width <= T::zero() || height <= T::zero() {
            warn!("Malformed box {} found: {:?}", index, row);
            return Err(Errors::InvalidBox {
                index,
                width: width.to_f64().unwrap_or(f64::NAN),
                height: height.to_f64().unwrap_or(f64::NAN),
            }
            .into());
        }
    }
    Ok(())
}
