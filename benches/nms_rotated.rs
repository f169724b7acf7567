#![feature(test)]

extern crate test;

use rbox::examples::{boxes_to_array, RotatedBoxGen};
use rbox::executor::{Executor, ExecutorBuilder};
use rbox::utils::nms::rotated_box_nms_with;
use test::Bencher;

#[bench]
fn nms_rotated_00100(b: &mut Bencher) {
    bench_nms(100, &Executor::sequential(), b);
}

#[bench]
fn nms_rotated_00500(b: &mut Bencher) {
    bench_nms(500, &Executor::sequential(), b);
}

#[bench]
fn nms_rotated_02000(b: &mut Bencher) {
    bench_nms(2000, &Executor::sequential(), b);
}

#[bench]
fn nms_rotated_parallel_00500(b: &mut Bencher) {
    bench_nms(500, &ExecutorBuilder::default().build().unwrap(), b);
}

#[bench]
fn nms_rotated_parallel_02000(b: &mut Bencher) {
    bench_nms(2000, &ExecutorBuilder::default().build().unwrap(), b);
}

fn bench_nms(objects: usize, executor: &Executor, b: &mut Bencher) {
    let pos_drift = 10.0;
    let box_drift = 1.0;
    let mut iterators = Vec::default();

    for i in 0..objects {
        iterators.push(RotatedBoxGen::new(
            i as f32, i as f32, 50.0, 50.0, pos_drift, box_drift,
        ));
    }

    let order = (0..objects).collect::<Vec<_>>();

    b.iter(|| {
        let observations = iterators
            .iter_mut()
            .map(|i| i.next().unwrap())
            .collect::<Vec<_>>();
        let boxes = boxes_to_array(&observations);
        let mut suppressed = vec![false; objects];
        rotated_box_nms_with(boxes.view(), &order, 0.5, &mut suppressed, executor).unwrap();
    });
}
