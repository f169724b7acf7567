use crate::utils::bbox::OrientedBox;
use crate::utils::primitive::BoxFloat;
use ndarray::Array2;
use rand::distributions::Uniform;
use rand::prelude::ThreadRng;
use rand::Rng;
use std::f64::consts::TAU;
use std::ops::Range;

/// Random `[n, 5]` box array
///
/// Centers are uniform in `[0, extent)`, width and height are drawn from `size`,
/// angles are uniform in `[-2π, 2π)` to exercise angle normalization.
///
pub fn random_boxes<T, R>(rng: &mut R, n: usize, extent: f64, size: Range<f64>) -> Array2<T>
where
    T: BoxFloat,
    R: Rng,
{
    let dist_pos = Uniform::new(0.0, extent);
    let dist_size = Uniform::new(size.start, size.end);
    let dist_angle = Uniform::new(-TAU, TAU);
    Array2::from_shape_fn((n, 5), |(_, c)| {
        let v = match c {
            0 | 1 => rng.sample(&dist_pos),
            2 | 3 => rng.sample(&dist_size),
            _ => rng.sample(&dist_angle),
        };
        T::from_f64_lossy(v)
    })
}

/// Random detection scores in `[0, 1)`
///
pub fn random_scores<T, R>(rng: &mut R, n: usize) -> Vec<T>
where
    T: BoxFloat,
    R: Rng,
{
    (0..n).map(|_| T::from_f64_lossy(rng.gen::<f64>())).collect()
}

/// Rotated box that drifts in position, size and angle on every step
///
pub struct RotatedBoxGen {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    angle: f32,
    gen: ThreadRng,
    dist_pos: Uniform<f32>,
    dist_box: Uniform<f32>,
    dist_angle: Uniform<f32>,
}

impl RotatedBoxGen {
    pub fn new(x: f32, y: f32, width: f32, height: f32, pos_drift: f32, box_drift: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            angle: 0.0,
            gen: rand::thread_rng(),
            dist_pos: Uniform::new(-pos_drift, pos_drift),
            dist_box: Uniform::new(-box_drift, box_drift),
            dist_angle: Uniform::new(-0.1, 0.1),
        }
    }
}

impl Iterator for RotatedBoxGen {
    type Item = OrientedBox<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        self.x += self.gen.sample(self.dist_pos);
        self.y += self.gen.sample(self.dist_pos);

        self.width += self.gen.sample(self.dist_box);
        self.height += self.gen.sample(self.dist_box);
        self.angle += self.gen.sample(self.dist_angle);

        if self.width < 1.0 {
            self.width = 1.0;
        }
        if self.height < 1.0 {
            self.height = 1.0;
        }

        Some(OrientedBox::new(
            self.x,
            self.y,
            self.width,
            self.height,
            self.angle,
        ))
    }
}

/// Collects generated boxes into a `[n, 5]` array
///
pub fn boxes_to_array<T: BoxFloat>(boxes: &[OrientedBox<T>]) -> Array2<T> {
    Array2::from_shape_fn((boxes.len(), 5), |(r, c)| {
        let b = &boxes[r];
        match c {
            0 => b.center_x(),
            1 => b.center_y(),
            2 => b.width(),
            3 => b.height(),
            _ => b.angle(),
        }
    })
}
