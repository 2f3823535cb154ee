use anyhow::Result;
use log::info;
use pmmh_tracker::prelude::*;
use pmmh_tracker::test_stuff::{GridExtractor, SceneGen};
use std::sync::Arc;

/// Overlap below which the track is considered lost
const LOST_IOU: f64 = 0.1;

#[derive(Default)]
struct CountingRenderer {
    particles: usize,
    estimates: usize,
}

impl Renderer for CountingRenderer {
    fn rectangle(&mut self, _bbox: &BoundingBox, color: Color) {
        if color == Color::ESTIMATE {
            self.estimates += 1;
        } else {
            self.particles += 1;
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let scene = SceneGen::new(
        FrameSize::new(320, 240),
        BoundingBox::new(60.0, 80.0, 40.0, 50.0),
        (2.0, 0.5),
    );
    let opts = PmmhOptions::default()
        .particles(200)
        .lag(3)
        .mcmc_steps(3)
        .seed(42);
    let mut tracker = Pmmh::new(opts, Arc::new(GridExtractor::default()))?;
    let mut renderer = CountingRenderer::default();

    for (t, (frame, truth)) in scene.take(60).enumerate() {
        if !tracker.is_initialized() {
            tracker.initialize(frame, truth)?;
            continue;
        }
        tracker.update(frame)?;
        tracker.draw_particles(&mut renderer);
        let estimate = tracker.draw_estimate(&mut renderer);
        let iou = estimate.iou(&truth);
        info!("Frame {}: estimate {:?}, IoU {:.3}", t, estimate, iou);

        if iou < LOST_IOU {
            info!("Frame {}: track lost, reinitializing", t);
            tracker.reinitialize()?;
        }
    }

    let theta = tracker.hyperparameters();
    println!(
        "Acceptance rate {:.3}, motion {:?}, colour {:?}",
        tracker.acceptance_rate(),
        theta.motion,
        theta.observation.color
    );
    println!(
        "Drawn {} particle boxes and {} estimates",
        renderer.particles, renderer.estimates
    );
    Ok(())
}
