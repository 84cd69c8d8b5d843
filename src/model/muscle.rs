//! Muscle actuator parameters read by the reflex path

use crate::core::error::{ReflexError, Result};
use crate::core::types::Handle;
use serde::{Deserialize, Serialize};

pub type MuscleId = Handle<Muscle>;

/// Physical reference parameters of a muscle-tendon actuator.
///
/// The reflex circuit only normalizes by these values; muscle dynamics
/// themselves belong to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muscle {
    pub name: String,
    /// Fiber length at peak isometric force (m)
    pub optimal_fiber_length: f64,
    /// Tendon length at which it starts to carry load (m)
    pub tendon_slack_length: f64,
    /// Max shortening velocity in optimal fiber lengths per second
    pub max_contraction_velocity: f64,
}

impl Muscle {
    pub fn new(
        name: impl Into<String>,
        optimal_fiber_length: f64,
        tendon_slack_length: f64,
        max_contraction_velocity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            optimal_fiber_length,
            tendon_slack_length,
            max_contraction_velocity,
        }
    }

    /// Fiber velocity scale: optimal fiber length times max contraction velocity
    pub fn max_fiber_speed(&self) -> f64 {
        self.optimal_fiber_length * self.max_contraction_velocity
    }

    /// Reject references the reflex path divides by.
    ///
    /// Checked once when a circuit connects so evaluation never yields NaN/Inf.
    pub fn validate_for_reflex(&self) -> Result<()> {
        let checks = [
            ("optimal fiber length", self.optimal_fiber_length),
            ("tendon slack length", self.tendon_slack_length),
            ("max contraction velocity", self.max_contraction_velocity),
            ("max fiber speed", self.max_fiber_speed()),
        ];
        for (parameter, value) in checks {
            if !value.is_finite() || value < f64::EPSILON {
                return Err(ReflexError::DegenerateMuscle {
                    muscle: self.name.clone(),
                    parameter,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Add `amount` to this muscle's slot of the shared controls vector.
    ///
    /// Accumulates: excitation written by other controllers is kept.
    pub fn add_excitation(&self, id: MuscleId, controls: &mut [f64], amount: f64) -> Result<()> {
        let found = controls.len();
        let slot = controls
            .get_mut(id.index())
            .ok_or(ReflexError::ControlsTooShort {
                expected: id.index() + 1,
                found,
            })?;
        *slot += amount;
        Ok(())
    }
}
