use crate::features::{FeatureExtractor, Frame, Histogram};
use crate::utils::bbox::{BoundingBox, FrameSize};
use std::f64::consts::PI;
use std::sync::Arc;

/// HSV pixel, every channel within `[0, 255]`
pub type Pixel = [u8; 3];

/// In-memory frame of HSV pixels
///
#[derive(Clone, Debug)]
pub struct SyntheticFrame {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl SyntheticFrame {
    pub fn new(width: u32, height: u32, background: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, p: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = p;
        }
    }

    /// Paints the region with a checkerboard of `tile`-sized cells; the cells alternate the
    /// value channel between the pixel value and a third of it.
    ///
    pub fn paint(&mut self, roi: &BoundingBox, p: Pixel, tile: u32) {
        let region = self.pixels_of(roi);
        let tile = tile.max(1);
        for (x, y) in region {
            let dark = ((x / tile) + (y / tile)) % 2 == 1;
            let value = if dark { p[2] / 3 } else { p[2] };
            self.set_pixel(x, y, [p[0], p[1], value]);
        }
    }

    /// Integer pixel coordinates covered by the box, clipped to the frame
    ///
    pub fn pixels_of(&self, roi: &BoundingBox) -> Vec<(u32, u32)> {
        let r = roi.rounded().clip(&self.size());
        if r.is_empty() {
            return vec![];
        }
        let (x0, y0) = (r.x() as u32, r.y() as u32);
        let (x1, y1) = ((r.x() + r.width()) as u32, (r.y() + r.height()) as u32);
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .collect()
    }
}

impl Frame for SyntheticFrame {
    fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

/// Hue/saturation histogram with a gradient orientation histogram as the shape descriptor
///
#[derive(Clone, Debug)]
pub struct GridExtractor {
    pub hue_bins: usize,
    pub sat_bins: usize,
    pub orientation_bins: usize,
}

impl Default for GridExtractor {
    fn default() -> Self {
        Self {
            hue_bins: 8,
            sat_bins: 4,
            orientation_bins: 9,
        }
    }
}

impl FeatureExtractor for GridExtractor {
    type Frame = SyntheticFrame;

    fn color_histogram(&self, frame: &SyntheticFrame, roi: &BoundingBox) -> Histogram {
        let mut h = Histogram::zeros(self.hue_bins, self.sat_bins);
        for (x, y) in frame.pixels_of(roi) {
            let p = frame.pixel(x, y);
            let hue = p[0] as usize * self.hue_bins / 256;
            let sat = p[1] as usize * self.sat_bins / 256;
            h[(hue, sat)] += 1.0;
        }
        h
    }

    fn shape_descriptor(&self, frame: &SyntheticFrame, roi: &BoundingBox) -> Option<Histogram> {
        let r = roi.rounded().clip(&frame.size());
        if r.width() < 3.0 || r.height() < 3.0 {
            return None;
        }
        let value = |x: u32, y: u32| frame.pixel(x, y)[2] as f64;
        let (x0, y0) = (r.x() as u32, r.y() as u32);
        let (x1, y1) = ((r.x() + r.width()) as u32, (r.y() + r.height()) as u32);

        let mut h = Histogram::zeros(1, self.orientation_bins);
        for y in y0 + 1..y1 - 1 {
            for x in x0 + 1..x1 - 1 {
                let gx = value(x + 1, y) - value(x - 1, y);
                let gy = value(x, y + 1) - value(x, y - 1);
                let magnitude = gx.hypot(gy);
                if magnitude == 0.0 {
                    continue;
                }
                let angle = gy.atan2(gx).rem_euclid(PI);
                let bin = ((angle / PI * self.orientation_bins as f64) as usize)
                    .min(self.orientation_bins - 1);
                h[(0, bin)] += magnitude;
            }
        }
        Some(h)
    }
}

/// Generates frames with a single textured object moving at constant velocity
///
pub struct SceneGen {
    size: FrameSize,
    roi: BoundingBox,
    velocity: (f64, f64),
    object: Pixel,
    background: Pixel,
    t: usize,
}

impl SceneGen {
    pub fn new(size: FrameSize, roi: BoundingBox, velocity: (f64, f64)) -> Self {
        Self {
            size,
            roi,
            velocity,
            object: [200, 220, 240],
            background: [30, 60, 100],
            t: 0,
        }
    }

    /// Ground truth box at time `t`
    ///
    pub fn roi(&self, t: usize) -> BoundingBox {
        let t = t as f64;
        BoundingBox::new(
            self.roi.x() + self.velocity.0 * t,
            self.roi.y() + self.velocity.1 * t,
            self.roi.width(),
            self.roi.height(),
        )
    }

    pub fn frame(&self, t: usize) -> SyntheticFrame {
        let mut frame = SyntheticFrame::new(self.size.width, self.size.height, self.background);
        frame.paint(&self.roi(t), self.object, 4);
        frame
    }
}

impl Iterator for SceneGen {
    type Item = (Arc<SyntheticFrame>, BoundingBox);

    fn next(&mut self) -> Option<Self::Item> {
        let item = (Arc::new(self.frame(self.t)), self.roi(self.t));
        self.t += 1;
        Some(item)
    }
}
