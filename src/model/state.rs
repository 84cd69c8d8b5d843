//! Instantaneous simulation state handed to every evaluation call

use crate::core::types::Time;
use crate::model::muscle::MuscleId;
use crate::model::Model;

/// Per-muscle kinematic quantities sampled by the proprioceptors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MuscleKinematics {
    /// Fiber length beyond its reference (m); negative when shortened
    pub fiber_stretch: f64,
    /// Fiber lengthening velocity (m/s); negative when shortening
    pub fiber_velocity: f64,
    /// Tendon length beyond slack (m)
    pub tendon_stretch: f64,
}

impl MuscleKinematics {
    pub fn new(fiber_stretch: f64, fiber_velocity: f64, tendon_stretch: f64) -> Self {
        Self {
            fiber_stretch,
            fiber_velocity,
            tendon_stretch,
        }
    }
}

/// Snapshot of the continuous state at one solver query time.
///
/// The solver owns the real state; this is the narrow view the reflex path
/// reads. Trial evaluations may move `time` backwards.
#[derive(Debug, Clone, Default)]
pub struct SimState {
    time: Time,
    kinematics: Vec<MuscleKinematics>,
}

impl SimState {
    /// State sized for every muscle of `model`, all at rest
    pub fn for_model(model: &Model, time: Time) -> Self {
        Self {
            time,
            kinematics: vec![MuscleKinematics::default(); model.actuator_count()],
        }
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn set_time(&mut self, time: Time) {
        self.time = time;
    }

    /// Kinematics of one muscle; muscles the state was not sized for read as rest
    pub fn kinematics(&self, muscle: MuscleId) -> MuscleKinematics {
        self.kinematics
            .get(muscle.index())
            .copied()
            .unwrap_or_default()
    }

    pub fn set_kinematics(&mut self, muscle: MuscleId, kinematics: MuscleKinematics) {
        let index = muscle.index();
        if index >= self.kinematics.len() {
            self.kinematics.resize(index + 1, MuscleKinematics::default());
        }
        self.kinematics[index] = kinematics;
    }
}

/// Immutable evaluation context: the model graph plus the current state
#[derive(Debug, Clone, Copy)]
pub struct SimContext<'a> {
    pub model: &'a Model,
    pub state: &'a SimState,
}

impl<'a> SimContext<'a> {
    pub fn new(model: &'a Model, state: &'a SimState) -> Self {
        Self { model, state }
    }

    pub fn time(&self) -> Time {
        self.state.time()
    }
}
