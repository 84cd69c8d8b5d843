//! Proprioceptors: stateless readers of muscle kinematics

use crate::core::types::{ComponentKind, Handle};
use crate::model::muscle::MuscleId;
use crate::model::state::SimState;
use crate::model::Component;

pub type SpindleId = Handle<Spindle>;
pub type GolgiId = Handle<GolgiTendon>;

/// A sensor attached to exactly one muscle
pub trait Sensor: Component {
    fn muscle(&self) -> MuscleId;
}

/// Muscle spindle: reports fiber stretch and stretch velocity
#[derive(Debug, Clone, PartialEq)]
pub struct Spindle {
    name: String,
    muscle: MuscleId,
}

impl Spindle {
    pub fn new(name: impl Into<String>, muscle: MuscleId) -> Self {
        Self {
            name: name.into(),
            muscle,
        }
    }

    pub fn length(&self, state: &SimState) -> f64 {
        state.kinematics(self.muscle).fiber_stretch
    }

    pub fn speed(&self, state: &SimState) -> f64 {
        state.kinematics(self.muscle).fiber_velocity
    }
}

impl Component for Spindle {
    const KIND: ComponentKind = ComponentKind::Spindle;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Sensor for Spindle {
    fn muscle(&self) -> MuscleId {
        self.muscle
    }
}

/// Golgi tendon organ: reports tendon stretch
#[derive(Debug, Clone, PartialEq)]
pub struct GolgiTendon {
    name: String,
    muscle: MuscleId,
}

impl GolgiTendon {
    pub fn new(name: impl Into<String>, muscle: MuscleId) -> Self {
        Self {
            name: name.into(),
            muscle,
        }
    }

    pub fn tendon_length(&self, state: &SimState) -> f64 {
        state.kinematics(self.muscle).tendon_stretch
    }
}

impl Component for GolgiTendon {
    const KIND: ComponentKind = ComponentKind::Golgi;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Sensor for GolgiTendon {
    fn muscle(&self) -> MuscleId {
        self.muscle
    }
}
