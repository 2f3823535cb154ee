use crate::EstimateClose;
use geo::{coord, Area, Rect};

/// Frame dimensions in pixels
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Bounding box in the format (x, y, width, height), where (x, y) is the top left corner
///
/// The default box is the empty (zero-size) box.
///
#[derive(Clone, Default, Debug, Copy, PartialEq)]
pub struct BoundingBox {
    _x: f64,
    _y: f64,
    _width: f64,
    _height: f64,
}

impl BoundingBox {
    /// Constructor
    ///
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            _x: x,
            _y: y,
            _width: width,
            _height: height,
        }
    }

    pub fn x(&self) -> f64 {
        self._x
    }

    pub fn y(&self) -> f64 {
        self._y
    }

    pub fn width(&self) -> f64 {
        self._width
    }

    pub fn height(&self) -> f64 {
        self._height
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.as_rect().unsigned_area()
        }
    }

    /// The box has no positive extent
    ///
    pub fn is_empty(&self) -> bool {
        self._width <= 0.0 || self._height <= 0.0
    }

    /// Same box with the corner coordinates and dimensions rounded to integer pixels
    ///
    pub fn rounded(&self) -> Self {
        Self::new(
            self._x.round(),
            self._y.round(),
            self._width.round(),
            self._height.round(),
        )
    }

    /// Checks that the box lies strictly inside the frame: the left/top edge is
    /// non-negative and the right/bottom edge is less than the frame dimension.
    ///
    pub fn is_within(&self, frame: &FrameSize) -> bool {
        self._x >= 0.0
            && self._y >= 0.0
            && self._x + self._width < frame.width as f64
            && self._y + self._height < frame.height as f64
    }

    /// Intersection of the box with the frame area; empty when they do not overlap
    ///
    pub fn clip(&self, frame: &FrameSize) -> Self {
        let frame_box = BoundingBox::new(0.0, 0.0, frame.width as f64, frame.height as f64);
        self.intersection(&frame_box).unwrap_or_default()
    }

    /// Intersection of two boxes, `None` when it is empty
    ///
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let (l, r) = (self.as_rect(), other.as_rect());
        let (x1, y1) = (l.min().x.max(r.min().x), l.min().y.max(r.min().y));
        let (x2, y2) = (l.max().x.min(r.max().x), l.max().y.min(r.max().y));

        if x2 > x1 && y2 > y1 {
            Some(BoundingBox::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Intersection over union, used by callers to decide when the track is lost
    ///
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let intersection = match self.intersection(other) {
            Some(b) => b.area(),
            None => return 0.0,
        };
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    fn as_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self._x, y: self._y },
            coord! { x: self._x + self._width, y: self._y + self._height },
        )
    }
}

impl EstimateClose for BoundingBox {
    /// Allows comparing bboxes
    ///
    fn almost_same(&self, other: &Self, eps: f64) -> bool {
        (self._x - other._x).abs() < eps
            && (self._y - other._y).abs() < eps
            && (self._width - other._width).abs() < eps
            && (self._height - other._height).abs() < eps
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::bbox::{BoundingBox, FrameSize};
    use crate::{EstimateClose, EPS};

    #[test]
    fn intersection() {
        let l = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let r = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
        let i = l.intersection(&r).unwrap();
        assert!(i.almost_same(&BoundingBox::new(5.0, 5.0, 5.0, 5.0), EPS));

        let far = BoundingBox::new(20.0, 20.0, 1.0, 1.0);
        assert!(l.intersection(&far).is_none());
        assert!(l.intersection(&BoundingBox::default()).is_none());
    }

    #[test]
    fn iou() {
        let l = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!((l.iou(&l) - 1.0).abs() < EPS);

        let r = BoundingBox::new(5.0, 0.0, 10.0, 10.0);
        assert!((l.iou(&r) - 50.0 / 150.0).abs() < EPS);

        assert_eq!(l.iou(&BoundingBox::default()), 0.0);
    }

    #[test]
    fn frame_bounds() {
        let frame = FrameSize::new(100, 100);
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_within(&frame));
        assert!(!BoundingBox::new(-1.0, 0.0, 10.0, 10.0).is_within(&frame));
        assert!(!BoundingBox::new(90.0, 0.0, 10.0, 10.0).is_within(&frame));

        let clipped = BoundingBox::new(95.0, -5.0, 10.0, 10.0).clip(&frame);
        assert!(clipped.almost_same(&BoundingBox::new(95.0, 0.0, 5.0, 5.0), EPS));
        assert!(BoundingBox::new(200.0, 200.0, 10.0, 10.0)
            .clip(&frame)
            .is_empty());
    }

    #[test]
    fn rounding() {
        let b = BoundingBox::new(1.4, 1.6, 10.5, 9.49).rounded();
        assert!(b.almost_same(&BoundingBox::new(1.0, 2.0, 11.0, 9.0), EPS));
    }
}
