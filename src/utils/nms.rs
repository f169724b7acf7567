use crate::executor::Executor;
use crate::utils::bbox::{BoxPolygon, OrientedBox};
use crate::utils::iou::{polygon_iou, prepare};
use crate::utils::primitive::BoxFloat;
use crate::utils::validation::{
    check_box_columns, check_len, check_permutation, check_scores, check_threshold,
};
use anyhow::Result;
use itertools::Itertools;
use log::{debug, warn};
use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Number of score-sorted boxes packed into one mask word
pub const BLOCK_SIZE: usize = 64;

pub fn block_count(boxes: usize) -> usize {
    boxes.div_ceil(BLOCK_SIZE)
}

/// Overlap bitmask matrix of shape `[boxes, blocks]`
///
/// Bit `t` of the word `[i, b]` is set when the box at sorted position `i`
/// overlaps the box at sorted position `BLOCK_SIZE * b + t` above the threshold.
/// Only words with `b` not less than the block of `i` are computed; the
/// remaining words stay zero and are never read.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlapMask {
    boxes: usize,
    blocks: usize,
    words: Vec<u64>,
}

impl OverlapMask {
    fn new(boxes: usize) -> Self {
        let blocks = block_count(boxes);
        Self {
            boxes,
            blocks,
            words: vec![0; boxes * blocks],
        }
    }

    pub fn boxes(&self) -> usize {
        self.boxes
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Mask words of the box at the sorted position `i`, starting from its own block
    ///
    /// Returns `None` when `i` is out of range.
    ///
    pub fn row(&self, i: usize) -> Option<&[u64]> {
        if i >= self.boxes {
            return None;
        }
        let start = i * self.blocks;
        self.words.get(start + i / BLOCK_SIZE..start + self.blocks)
    }

    /// Word `[i, block]` of the matrix
    ///
    /// Returns `None` for words out of range or below the diagonal block of `i`,
    /// those are never computed.
    ///
    pub fn word(&self, i: usize, block: usize) -> Option<u64> {
        if i >= self.boxes || block >= self.blocks || block < i / BLOCK_SIZE {
            return None;
        }
        self.words.get(i * self.blocks + block).copied()
    }
}

/// Computes the mask words of the box at the sorted position `i`.
///
/// `row` is the `[blocks]` row of the mask matrix; only words from the block of
/// `i` on are written and within the diagonal block only later positions are compared.
///
fn fill_row<T: BoxFloat>(i: usize, row: &mut [u64], sorted: &[BoxPolygon<T>], threshold: T) {
    let current = &sorted[i];
    for (col_block, word) in row.iter_mut().enumerate().skip(i / BLOCK_SIZE) {
        let col_start = col_block * BLOCK_SIZE;
        let col_end = (col_start + BLOCK_SIZE).min(sorted.len());
        let first = (i + 1).max(col_start) - col_start;

        let mut bits = 0_u64;
        for (t, other) in sorted[col_start..col_end].iter().enumerate().skip(first) {
            if polygon_iou(current, other) > threshold {
                bits |= 1_u64 << t;
            }
        }
        *word = bits;
    }
}

/// Builds the overlap bitmask matrix for boxes given in score order
///
/// Every mask row is an independent task writing only its own words, so the
/// parallel path needs no synchronization besides the completion of all tasks.
/// Rows of early blocks carry more words, rayon balances them by work stealing.
///
pub fn overlap_mask<T: BoxFloat>(
    sorted: &[BoxPolygon<T>],
    threshold: T,
    executor: &Executor,
) -> OverlapMask {
    let mut mask = OverlapMask::new(sorted.len());
    if sorted.is_empty() {
        return mask;
    }

    let blocks = mask.blocks;
    if executor.is_parallel() {
        executor.install(|| {
            mask.words
                .par_chunks_mut(blocks)
                .enumerate()
                .for_each(|(i, row)| fill_row(i, row, sorted, threshold));
        });
    } else {
        mask.words
            .chunks_mut(blocks)
            .enumerate()
            .for_each(|(i, row)| fill_row(i, row, sorted, threshold));
    }
    mask
}

/// Resolves suppression chains from a complete overlap mask
///
/// Walks sorted positions in order; a box survives when no surviving
/// predecessor marked it, and only survivors propagate their mask rows.
/// `suppressed` is indexed by original box ids and is only set to `true`.
///
/// `order` and `suppressed` must both match the mask size and `order` must be a
/// permutation; otherwise an error is returned and nothing is written.
///
/// Returns the number of suppressed boxes.
///
pub fn collect_suppressed(
    order: &[usize],
    mask: &OverlapMask,
    suppressed: &mut [bool],
) -> Result<usize> {
    check_len("order", mask.boxes(), order.len())?;
    check_len("suppressed", mask.boxes(), suppressed.len())?;
    check_permutation(order)?;

    let mut remv = vec![0_u64; mask.blocks()];
    let mut count = 0;

    for (i, &index) in order.iter().enumerate() {
        let block = i / BLOCK_SIZE;
        let bit = 1_u64 << (i % BLOCK_SIZE);

        if remv[block] & bit == 0 {
            for (acc, word) in remv[block..].iter_mut().zip(mask.row(i).unwrap_or_default()) {
                *acc |= word;
            }
        } else {
            suppressed[index] = true;
            count += 1;
        }
    }
    Ok(count)
}

fn gather_sorted<T: BoxFloat>(
    boxes: &ArrayView2<T>,
    order: &[usize],
    executor: &Executor,
) -> Vec<BoxPolygon<T>> {
    let sorted = boxes.select(Axis(0), order);
    prepare(&sorted.view(), executor)
}

/// NMS on rotated boxes computed on the calling thread
///
/// See [`rotated_box_nms_with`].
///
pub fn rotated_box_nms<T: BoxFloat>(
    boxes: ArrayView2<T>,
    order: &[usize],
    threshold: T,
    suppressed: &mut [bool],
) -> Result<usize> {
    rotated_box_nms_with(boxes, order, threshold, suppressed, &Executor::sequential())
}

/// NMS on rotated boxes with a caller-provided score order
///
/// # Parameters
/// * `boxes` - `[n, 5]` array of `cx, cy, width, height, angle` rows;
/// * `order` - permutation of `0..n` sorted by descending score;
/// * `threshold` - IoU in `[0, 1]` above which the lower scored box is suppressed;
/// * `suppressed` - `n` flags indexed by box id, expected to be `false` on entry;
/// * `executor` - the path used to build the overlap mask; the collection is always serial.
///
/// Returns the number of boxes marked as suppressed. All arguments are checked
/// before the computation starts, nothing is written on error.
///
pub fn rotated_box_nms_with<T: BoxFloat>(
    boxes: ArrayView2<T>,
    order: &[usize],
    threshold: T,
    suppressed: &mut [bool],
    executor: &Executor,
) -> Result<usize> {
    check_box_columns(&boxes)?;
    check_len("order", boxes.nrows(), order.len())?;
    check_len("suppressed", boxes.nrows(), suppressed.len())?;
    check_permutation(order)?;
    check_threshold(threshold)?;

    if suppressed.iter().any(|s| *s) {
        warn!("Suppression flags are expected to be cleared before NMS, the set ones are kept");
    }

    let sorted = gather_sorted(&boxes, order, executor);
    let mask = overlap_mask(&sorted, threshold, executor);
    debug!(
        "Overlap mask is built: {} boxes, {} blocks, parallel={}",
        mask.boxes(),
        mask.blocks(),
        executor.is_parallel()
    );

    let count = collect_suppressed(order, &mask, suppressed)?;
    debug!("{} of {} boxes are suppressed", count, order.len());
    Ok(count)
}

/// NMS algorithm implementation driven by detection scores
///
/// # Parameters
/// * `boxes` - `[n, 5]` array of rotated boxes;
/// * `scores` - detection scores, one per box;
/// * `nms_threshold` - when to exclude the box from set by NMS;
/// * `score_threshold` - boxes with score not greater than it are excluded before NMS; if `None`, nothing is excluded by score;
/// * `executor` - execution path.
///
/// Boxes with non-positive width or height never take part and are not returned.
/// A NaN score has no rank and is reported as [`crate::Errors::InvalidScore`].
/// Returns indices of the kept boxes ordered by descending score.
///
pub fn nms<T: BoxFloat>(
    boxes: ArrayView2<T>,
    scores: ArrayView1<T>,
    nms_threshold: T,
    score_threshold: Option<T>,
    executor: &Executor,
) -> Result<Vec<usize>> {
    check_box_columns(&boxes)?;
    check_len("scores", boxes.nrows(), scores.len())?;
    check_scores(&scores)?;
    check_threshold(nms_threshold)?;

    let candidates = (0..boxes.nrows())
        .filter(|&i| score_threshold.map_or(true, |t| scores[i] > t))
        .filter(|&i| OrientedBox::from_row(boxes.row(i)).is_valid())
        .sorted_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        })
        .collect::<Vec<_>>();

    let sorted = gather_sorted(&boxes, &candidates, executor);
    let mask = overlap_mask(&sorted, nms_threshold, executor);

    let identity = (0..candidates.len()).collect::<Vec<_>>();
    let mut suppressed = vec![false; candidates.len()];
    let count = collect_suppressed(&identity, &mask, &mut suppressed)?;
    debug!(
        "NMS kept {} of {} candidates ({} boxes in total)",
        candidates.len() - count,
        candidates.len(),
        boxes.nrows()
    );

    Ok(candidates
        .into_iter()
        .zip(suppressed)
        .filter(|(_, s)| !*s)
        .map(|(i, _)| i)
        .collect())
}
