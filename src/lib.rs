//! Reflex Circuit - delayed proprioceptive stretch reflex for muscle simulation
//!
//! Spindle and golgi tendon readings become muscle excitation, either
//! directly through per-afferent gains or through a threshold interneuron
//! and a fixed-latency delay line. The host solver owns time, state and the
//! model graph; circuits hold handles into it and are driven by evaluation
//! calls.

pub mod circuit;
pub mod core;
pub mod model;

pub use crate::circuit::{CircuitMode, ConnectReport, DelayLine, Interneuron, ReflexCircuit};
pub use crate::core::{
    rectify, CircuitConfig, DelayConfig, GainSet, InterneuronConfig, ReflexError, Result,
};
pub use crate::model::{Model, Muscle, MuscleKinematics, SimContext, SimState};
