#![feature(test)]

extern crate test;

use pmmh_tracker::filter::options::{ObservationModel, ParticleFilterOptions};
use pmmh_tracker::filter::ParticleFilter;
use pmmh_tracker::likelihood::DiscreteLikelihood;
use pmmh_tracker::test_stuff::{GridExtractor, SceneGen};
use pmmh_tracker::utils::bbox::{BoundingBox, FrameSize};
use std::sync::Arc;
use test::Bencher;

#[bench]
fn continuous_00100(b: &mut Bencher) {
    bench_filter(100, ObservationModel::Continuous, b);
}

#[bench]
fn continuous_01000(b: &mut Bencher) {
    bench_filter(1000, ObservationModel::Continuous, b);
}

#[bench]
fn multinomial_01000(b: &mut Bencher) {
    bench_filter(
        1000,
        ObservationModel::Discrete(DiscreteLikelihood::Multinomial),
        b,
    );
}

#[bench]
fn dirichlet_01000(b: &mut Bencher) {
    bench_filter(
        1000,
        ObservationModel::Discrete(DiscreteLikelihood::Dirichlet),
        b,
    );
}

fn bench_filter(particles: usize, model: ObservationModel, b: &mut Bencher) {
    let mut scene = SceneGen::new(
        FrameSize::new(320, 240),
        BoundingBox::new(100.0, 80.0, 40.0, 60.0),
        (1.0, 0.5),
    );
    let opts = ParticleFilterOptions::default()
        .particles(particles)
        .use_shape(true)
        .seed(1);
    let mut filter = ParticleFilter::new(&opts, Arc::new(GridExtractor::default()));
    let (frame, roi) = scene.next().unwrap();
    filter.initialize_from_frame(&frame, roi).unwrap();

    b.iter(|| {
        let (frame, _) = scene.next().unwrap();
        filter.predict().unwrap();
        filter.update_with(&frame, model).unwrap();
        filter.estimate();
    });
}
