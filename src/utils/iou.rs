use crate::executor::Executor;
use crate::utils::bbox::{BoxPolygon, OrientedBox};
use crate::utils::clipping::intersection_area;
use crate::utils::primitive::BoxFloat;
use crate::utils::validation::check_box_columns;
use anyhow::Result;
use log::debug;
use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;

/// How the overlap of two boxes is measured
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IouMethod {
    /// Exact overlap of the rotated rectangles
    #[default]
    Rotated,
    /// Overlap of the rectangles with their rotation ignored
    AxisAligned,
}

fn ratio<T: BoxFloat>(intersection: T, l_area: T, r_area: T) -> T {
    if intersection.is_nan() || intersection <= T::zero() {
        return T::zero();
    }
    let union = l_area + r_area - intersection;
    if union <= T::zero() {
        return T::zero();
    }
    (intersection / union).min(T::one())
}

/// IoU of two rotated boxes with precomputed corners
///
pub fn polygon_iou<T: BoxFloat>(l: &BoxPolygon<T>, r: &BoxPolygon<T>) -> T {
    ratio(intersection_area(l, r), l.area(), r.area())
}

/// IoU of two boxes
///
pub fn box_iou<T: BoxFloat>(l: &OrientedBox<T>, r: &OrientedBox<T>, method: IouMethod) -> T {
    match method {
        IouMethod::Rotated => polygon_iou(&l.gen_vertices(), &r.gen_vertices()),
        IouMethod::AxisAligned => {
            let intersection =
                OrientedBox::aligned_intersection(l, r).min(l.area().min(r.area()));
            ratio(intersection, l.area(), r.area())
        }
    }
}

pub(crate) fn prepare<T: BoxFloat>(boxes: &ArrayView2<T>, executor: &Executor) -> Vec<BoxPolygon<T>> {
    if executor.is_parallel() {
        executor.install(|| {
            (0..boxes.nrows())
                .into_par_iter()
                .map(|i| OrientedBox::from_row(boxes.row(i)).gen_vertices())
                .collect()
        })
    } else {
        boxes
            .rows()
            .into_iter()
            .map(|row| OrientedBox::from_row(row).gen_vertices())
            .collect()
    }
}

fn fill<T, F>(result: &mut Array2<T>, executor: &Executor, pair: F)
where
    T: BoxFloat,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    if executor.is_parallel() {
        executor.install(|| {
            Zip::indexed(result.view_mut()).par_for_each(|(i, j), out| *out = pair(i, j));
        });
    } else {
        Zip::indexed(result.view_mut()).for_each(|(i, j), out| *out = pair(i, j));
    }
}

/// IoU of every pair of boxes from two sets
///
/// # Parameters
/// * `boxes_a` - `[n, 5]` array of `cx, cy, width, height, angle` rows;
/// * `boxes_b` - `[m, 5]` array in the same format;
/// * `method` - rotated or axis-aligned overlap;
/// * `executor` - sequential or parallel execution path.
///
/// Returns the `[n, m]` matrix where the cell `(i, j)` holds the IoU of `boxes_a[i]` and `boxes_b[j]`.
/// Every cell is computed independently, so both execution paths produce identical values.
///
pub fn box2d_iou<T: BoxFloat>(
    boxes_a: ArrayView2<T>,
    boxes_b: ArrayView2<T>,
    method: IouMethod,
    executor: &Executor,
) -> Result<Array2<T>> {
    check_box_columns(&boxes_a)?;
    check_box_columns(&boxes_b)?;

    debug!(
        "IoU {:?} of {}x{} boxes, parallel={}",
        method,
        boxes_a.nrows(),
        boxes_b.nrows(),
        executor.is_parallel()
    );

    let mut result = Array2::zeros((boxes_a.nrows(), boxes_b.nrows()));
    let a = prepare(&boxes_a, executor);
    let b = prepare(&boxes_b, executor);
    match method {
        IouMethod::Rotated => {
            fill(&mut result, executor, |i, j| polygon_iou(&a[i], &b[j]));
        }
        IouMethod::AxisAligned => {
            fill(&mut result, executor, |i, j| {
                box_iou(a[i].bbox(), b[j].bbox(), IouMethod::AxisAligned)
            });
        }
    }
    Ok(result)
}

/// IoU of rotated boxes computed on the calling thread
///
pub fn rotated_box_iou<T: BoxFloat>(
    boxes_a: ArrayView2<T>,
    boxes_b: ArrayView2<T>,
) -> Result<Array2<T>> {
    box2d_iou(boxes_a, boxes_b, IouMethod::Rotated, &Executor::sequential())
}

/// IoU of rotated boxes on the given execution path
///
pub fn rotated_box_iou_with<T: BoxFloat>(
    boxes_a: ArrayView2<T>,
    boxes_b: ArrayView2<T>,
    executor: &Executor,
) -> Result<Array2<T>> {
    box2d_iou(boxes_a, boxes_b, IouMethod::Rotated, executor)
}
