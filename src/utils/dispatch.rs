use crate::executor::Executor;
use crate::utils::iou::rotated_box_iou_with;
use crate::utils::nms::rotated_box_nms_with;
use crate::utils::primitive::{BoxFloat, ElementType};
use crate::utils::validation::{check_len, check_threshold};
use crate::Errors;
use anyhow::Result;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Box array of a runtime-selected element type
///
#[derive(Clone, Debug)]
pub enum BoxTensor<'a> {
    F32(ArrayView2<'a, f32>),
    F64(ArrayView2<'a, f64>),
}

impl BoxTensor<'_> {
    pub fn element_type(&self) -> ElementType {
        match self {
            BoxTensor::F32(_) => ElementType::F32,
            BoxTensor::F64(_) => ElementType::F64,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            BoxTensor::F32(v) => v.nrows(),
            BoxTensor::F64(v) => v.nrows(),
        }
    }
}

impl<'a> From<ArrayView2<'a, f32>> for BoxTensor<'a> {
    fn from(v: ArrayView2<'a, f32>) -> Self {
        BoxTensor::F32(v)
    }
}

impl<'a> From<ArrayView2<'a, f64>> for BoxTensor<'a> {
    fn from(v: ArrayView2<'a, f64>) -> Self {
        BoxTensor::F64(v)
    }
}

/// IoU matrix with the element type of its inputs
///
#[derive(Clone, Debug, PartialEq)]
pub enum IouTensor {
    F32(Array2<f32>),
    F64(Array2<f64>),
}

impl IouTensor {
    pub fn element_type(&self) -> ElementType {
        match self {
            IouTensor::F32(_) => ElementType::F32,
            IouTensor::F64(_) => ElementType::F64,
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        match self {
            IouTensor::F32(v) => v.dim(),
            IouTensor::F64(v) => v.dim(),
        }
    }
}

fn mixed(l: ElementType, r: ElementType) -> anyhow::Error {
    Errors::UnsupportedElementType(format!("mixed {:?} and {:?} inputs", l, r)).into()
}

/// IoU of rotated boxes dispatched by element type
///
/// Both arrays must share the element type; the result has the same type.
///
pub fn rbox_2d_iou(
    boxes_a: BoxTensor<'_>,
    boxes_b: BoxTensor<'_>,
    executor: &Executor,
) -> Result<IouTensor> {
    match (boxes_a, boxes_b) {
        (BoxTensor::F32(a), BoxTensor::F32(b)) => {
            Ok(IouTensor::F32(rotated_box_iou_with(a, b, executor)?))
        }
        (BoxTensor::F64(a), BoxTensor::F64(b)) => {
            Ok(IouTensor::F64(rotated_box_iou_with(a, b, executor)?))
        }
        (a, b) => Err(mixed(a.element_type(), b.element_type())),
    }
}

fn convert_order(order: ArrayView1<i64>, len: usize) -> Result<Vec<usize>> {
    order
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            usize::try_from(index)
                .ok()
                .filter(|i| *i < len)
                .ok_or_else(|| {
                    Errors::OrderIndexOutOfRange {
                        position,
                        index,
                        len,
                    }
                    .into()
                })
        })
        .collect()
}

fn nms_typed<T: BoxFloat>(
    boxes: ArrayView2<T>,
    order: &[usize],
    threshold: f64,
    suppressed: &mut [bool],
    executor: &Executor,
) -> Result<usize> {
    rotated_box_nms_with(
        boxes,
        order,
        T::from_f64_lossy(threshold),
        suppressed,
        executor,
    )
}

/// NMS on rotated boxes dispatched by element type
///
/// `order` holds signed indices as produced by tensor argsort routines; negative
/// or out of range entries are rejected before any computation. The threshold is
/// checked at full precision before it is converted to the element type.
///
pub fn rbox_2d_nms(
    boxes: BoxTensor<'_>,
    order: ArrayView1<i64>,
    threshold: f64,
    suppressed: &mut [bool],
    executor: &Executor,
) -> Result<usize> {
    check_len("order", boxes.rows(), order.len())?;
    check_threshold(threshold)?;
    let order = convert_order(order, boxes.rows())?;
    match boxes {
        BoxTensor::F32(b) => nms_typed(b, &order, threshold, suppressed, executor),
        BoxTensor::F64(b) => nms_typed(b, &order, threshold, suppressed, executor),
    }
}
