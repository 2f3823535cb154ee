use crate::utils::bbox::BoundingBox;

/// RGB colour of an overlay
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const PARTICLE: Color = Color(255, 255, 0);
    pub const ESTIMATE: Color = Color(255, 0, 0);
}

/// Drawing backend. The tracker only knows how to describe what to draw.
///
pub trait Renderer {
    fn rectangle(&mut self, bbox: &BoundingBox, color: Color);
}
