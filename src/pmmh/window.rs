use crate::utils::bbox::BoundingBox;
use std::collections::VecDeque;
use std::sync::Arc;

/// Sliding window of the last frames with the box the tracker believed for each of them
///
pub struct FrameWindow<F> {
    lag: usize,
    frames: VecDeque<(Arc<F>, BoundingBox)>,
}

impl<F> FrameWindow<F> {
    pub fn new(lag: usize) -> Self {
        assert!(lag > 0, "Lag must be a positive number");
        Self {
            lag,
            frames: VecDeque::with_capacity(lag + 1),
        }
    }

    /// Appends the frame, dropping the oldest one when the window is full
    ///
    pub fn push(&mut self, frame: Arc<F>, roi: BoundingBox) {
        self.frames.push_back((frame, roi));
        while self.frames.len() > self.lag {
            self.frames.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Arc<F>, BoundingBox)> {
        self.frames.iter()
    }

    pub fn oldest(&self) -> Option<&(Arc<F>, BoundingBox)> {
        self.frames.front()
    }

    pub fn latest(&self) -> Option<&(Arc<F>, BoundingBox)> {
        self.frames.back()
    }
}

#[cfg(test)]
mod tests {
    use crate::pmmh::window::FrameWindow;
    use crate::utils::bbox::BoundingBox;
    use std::sync::Arc;

    #[test]
    fn slides() {
        let mut w = FrameWindow::new(2);
        assert!(w.is_empty());
        for i in 0..5 {
            w.push(Arc::new(i), BoundingBox::new(i as f64, 0.0, 1.0, 1.0));
        }
        assert_eq!(w.len(), 2);
        assert_eq!(*w.oldest().unwrap().0, 3);
        assert_eq!(w.latest().unwrap().1.x(), 4.0);
        w.clear();
        assert!(w.oldest().is_none());
    }
}
