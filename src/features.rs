use crate::utils::bbox::{BoundingBox, FrameSize};
use crate::Errors;
use anyhow::Result;
use nalgebra::DMatrix;

/// Histogram or descriptor representation. The matrix shape is significant: two descriptors
/// are comparable only when their shapes match.
///
pub type Histogram = DMatrix<f64>;

/// The frame consumed by the tracker. Pixel access is the business of the feature extractor.
///
pub trait Frame: Send + Sync {
    fn size(&self) -> FrameSize;
}

/// Feature extraction contract
///
/// Both methods are pure functions of the pixel data. The `roi` passed is always clipped to
/// the frame bounds and has a positive area.
///
pub trait FeatureExtractor: Send + Sync {
    type Frame: Frame;

    /// Colour histogram of the region
    ///
    fn color_histogram(&self, frame: &Self::Frame, roi: &BoundingBox) -> Histogram;

    /// Shape/texture descriptor of the region (HOG, LBP, ...). Extractors without such a
    /// descriptor return `None`.
    ///
    fn shape_descriptor(&self, _frame: &Self::Frame, _roi: &BoundingBox) -> Option<Histogram> {
        None
    }
}

/// Replaces exactly-zero bins with machine epsilon so that log-likelihoods stay finite
///
pub fn epsilon_floor(h: &Histogram) -> Histogram {
    h.map(|v| if v != 0.0 { v } else { f64::EPSILON })
}

/// Reference model of the tracked object
///
#[derive(Clone, Debug)]
pub struct ReferenceModel {
    pub roi: BoundingBox,
    pub histogram: Histogram,
    pub descriptor: Option<Histogram>,
}

impl ReferenceModel {
    /// Extracts the reference model for `roi` from the frame
    ///
    /// Fails when the rounded region has no positive area inside the frame.
    ///
    pub fn extract<E: FeatureExtractor>(
        extractor: &E,
        frame: &E::Frame,
        roi: BoundingBox,
    ) -> Result<Self> {
        let region = roi.rounded().clip(&frame.size());
        if region.is_empty() {
            return Err(Errors::DegenerateRoi.into());
        }
        Ok(Self {
            roi,
            histogram: extractor.color_histogram(frame, &region),
            descriptor: extractor.shape_descriptor(frame, &region),
        })
    }
}
