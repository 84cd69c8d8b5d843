//! Reflex circuit configuration
//!
//! Everything a circuit needs at model-build time: which muscle it serves,
//! which sensors it listens to, its gains, and the optional interneuron and
//! delay stages. Nothing here is consulted on the evaluation path; the
//! circuit copies what it needs when it connects.

use crate::core::error::{ReflexError, Result};
use crate::core::types::ComponentKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-afferent gain coefficients for the direct (Mode A) pipeline
///
/// No range restriction: a negative gain models inhibition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSet {
    /// Scales rectified spindle stretch
    #[serde(default = "unit_gain")]
    pub gain_length: f64,

    /// Scales rectified spindle stretch velocity
    #[serde(default = "unit_gain")]
    pub gain_velocity: f64,

    /// Scales rectified tendon stretch
    #[serde(default = "unit_gain")]
    pub gain_tendon: f64,
}

fn unit_gain() -> f64 {
    1.0
}

impl GainSet {
    pub fn new(gain_length: f64, gain_velocity: f64, gain_tendon: f64) -> Self {
        Self {
            gain_length,
            gain_velocity,
            gain_tendon,
        }
    }
}

impl Default for GainSet {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Weighted-threshold interneuron stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterneuronConfig {
    /// One weight per afferent, in afferent order (length, speed, tendon)
    pub weights: Vec<f64>,

    /// Firing threshold. The weighted sum must strictly exceed it.
    ///
    /// Thresholds below machine epsilon mean the neuron always fires.
    pub threshold: f64,
}

impl Default for InterneuronConfig {
    fn default() -> Self {
        Self {
            weights: vec![1.0, 1.0, 1.0],
            threshold: 0.0,
        }
    }
}

/// Fixed-latency delay stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Latency in seconds, at least `f64::EPSILON`
    pub delay_time: f64,

    /// Returned while no sample is old enough
    #[serde(default)]
    pub default_signal: f64,
}

impl DelayConfig {
    pub fn new(delay_time: f64, default_signal: f64) -> Self {
        Self {
            delay_time,
            default_signal,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delay_time.is_finite() || self.delay_time < f64::EPSILON {
            return Err(ReflexError::NonPositiveDelay(self.delay_time));
        }
        Ok(())
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        // Roughly a spinal stretch reflex loop latency
        Self::new(0.03, 0.0)
    }
}

/// Build-time description of one reflex circuit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitConfig {
    pub name: String,

    /// Name of the muscle the circuit serves (the muscle socket)
    pub muscle: String,

    /// Spindle names, or `["ALL"]`
    #[serde(default)]
    pub spindle_list: Vec<String>,

    /// Golgi tendon names, or `["ALL"]`
    #[serde(default)]
    pub golgi_list: Vec<String>,

    #[serde(default)]
    pub gains: GainSet,

    /// Present together with `delay` to select the interneuron + delay pipeline
    #[serde(default)]
    pub interneuron: Option<InterneuronConfig>,

    #[serde(default)]
    pub delay: Option<DelayConfig>,
}

impl CircuitConfig {
    /// Create a direct-pipeline config with unit gains and no sensors declared
    pub fn new(name: impl Into<String>, muscle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            muscle: muscle.into(),
            ..Self::default()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ReflexError::EmptyName(ComponentKind::Circuit));
        }
        if self.muscle.is_empty() {
            return Err(ReflexError::UnconnectedSocket {
                circuit: self.name.clone(),
                socket: "muscle",
            });
        }

        if let Some(delay) = &self.delay {
            delay.validate()?;
        }

        // Mode selection needs both stages or neither
        match (&self.interneuron, &self.delay) {
            (Some(_), None) => Err(ReflexError::InconsistentWiring {
                circuit: self.name.clone(),
                reason: "interneuron is configured without a delay stage".into(),
            }),
            (None, Some(_)) => Err(ReflexError::InconsistentWiring {
                circuit: self.name.clone(),
                reason: "delay stage is configured without an interneuron".into(),
            }),
            _ => Ok(()),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CircuitConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a circuit description from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}
