use crate::utils::bbox::BoundingBox;

/// Location, size, velocity and scale of a hypothesis
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

impl ParticleState {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Particle with its state before the last prediction
///
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub state: ParticleState,
    pub previous: ParticleState,
}

impl Particle {
    pub fn new(state: ParticleState) -> Self {
        Self {
            state,
            previous: state,
        }
    }

    /// Moves the particle to `state`, keeping the current one as previous
    ///
    pub fn advance(&self, state: ParticleState) -> Self {
        Self {
            state,
            previous: self.state,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.state.bbox()
    }
}
