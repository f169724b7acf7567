//! Intersection-over-Union of rotated 2D boxes and non-maximum suppression
//! built on 64-box overlap bitmasks.
//!
//! Boxes are rows of five values: `center_x, center_y, width, height, angle`
//! (angle in radians). Both operations have a sequential and a parallel form,
//! the latter is selected by passing a parallel [`executor::Executor`].
//!
use thiserror::Error;

/// Random box generators used by tests and benchmarks
pub mod examples;

/// Sequential and thread pool backed execution
pub mod executor;

/// Commonly used items
pub mod prelude;

/// Geometry, IoU and NMS kernels
pub mod utils;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Errors {
    #[error("Box array must have {expected} columns (cx, cy, width, height, angle), but it has {actual}.")]
    BoxColumns { expected: usize, actual: usize },
    #[error("`{name}` has length {actual}, but the box array has {expected} rows.")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Order entry {index} at position {position} is out of range for {len} boxes.")]
    OrderIndexOutOfRange {
        position: usize,
        index: i64,
        len: usize,
    },
    #[error("Order is not a permutation: index {index} appears more than once.")]
    OrderNotPermutation { index: usize },
    #[error("Overlap threshold {0} must be within [0, 1].")]
    InvalidThreshold(f64),
    #[error("Score {score} of box {index} cannot be ranked.")]
    InvalidScore { index: usize, score: f64 },
    #[error("Box {index} is malformed: width={width}, height={height}.")]
    InvalidBox {
        index: usize,
        width: f64,
        height: f64,
    },
    #[error("Unsupported element type: {0}.")]
    UnsupportedElementType(String),
    #[error("Parallel execution is unavailable: {0}.")]
    ParallelUnavailable(String),
}
