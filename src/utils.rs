/// Oriented bounding boxes
pub mod bbox;

/// Convex polygon clipping functions
pub mod clipping;

/// Element type dispatch for untyped box arrays
pub mod dispatch;

/// IoU kernels for box sets
pub mod iou;

/// Non maximum suppression implementation for detected boxes
pub mod nms;

/// Trait implementations for primitive types
pub mod primitive;

/// Input checks shared by the entry points
pub mod validation;
