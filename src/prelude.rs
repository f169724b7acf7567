use crate::executor;
use crate::utils;

pub use executor::{Executor, ExecutorBuilder};
pub use utils::bbox::{BoxPolygon, OrientedBox};
pub use utils::dispatch::{rbox_2d_iou, rbox_2d_nms, BoxTensor, IouTensor};
pub use utils::iou::{box2d_iou, box_iou, rotated_box_iou, rotated_box_iou_with, IouMethod};
pub use utils::nms::{nms, rotated_box_nms, rotated_box_nms_with};
pub use utils::primitive::{BoxFloat, ElementType};
pub use utils::validation::validate_boxes;

pub use crate::Errors;
